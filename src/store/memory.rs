//! In-memory Known HSTS Host store.

use arc_swap::ArcSwap;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::observability::metrics;
use crate::store::host::canonical_key;
use crate::store::{Clock, HstsStore, KnownHost, StoreError, SystemClock, MAX_AGE_CEILING};

/// A thread-safe, process-local store of Known HSTS Hosts.
///
/// Each key owns an `ArcSwap` slot, so replacing an existing record only takes
/// a shard read lock and readers always see either the old or the new record.
#[derive(Debug)]
pub struct MemoryStore {
    inner: DashMap<String, ArcSwap<KnownHost>>,
    clock: Arc<dyn Clock>,
}

impl MemoryStore {
    /// Create an empty store using the system clock.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: DashMap::new(),
            clock,
        }
    }

    /// Pin `host` as a permanent Known HSTS Host (preload-style).
    pub fn seed(&self, host: &str, include_subdomains: bool) -> bool {
        self.upsert(&canonical_key(host), include_subdomains, true, MAX_AGE_CEILING)
    }

    /// Number of stored records, including expired ones not yet purged.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Records that currently apply, keyed by the host they are stored under.
    pub fn snapshot(&self) -> Vec<(String, KnownHost)> {
        let now = self.clock.now();
        let mut entries: Vec<(String, KnownHost)> = self
            .inner
            .iter()
            .map(|r| (r.key().clone(), KnownHost::clone(&r.value().load())))
            .filter(|(_, host)| !host.is_expired_at(now))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
    }

    /// Drop expired records. Lookups already ignore them, this only reclaims memory.
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let before = self.inner.len();
        self.inner.retain(|_, slot| !slot.load().is_expired_at(now));
        let purged = before.saturating_sub(self.inner.len());
        if purged > 0 {
            tracing::debug!(purged, "Purged expired known hosts");
            metrics::record_known_hosts(self.inner.len());
        }
        purged
    }

    fn lookup(&self, key: &str) -> Option<Arc<KnownHost>> {
        let now = self.clock.now();

        // Exact key first
        if let Some(slot) = self.inner.get(key) {
            let host = slot.load_full();
            if host.applies_at(key, now) {
                return Some(host);
            }
        }

        // Full scan; the most specific applying record wins
        let mut best: Option<(String, Arc<KnownHost>)> = None;
        for r in self.inner.iter() {
            let host = r.value().load_full();
            if !host.applies_at(key, now) {
                continue;
            }
            let better = match &best {
                Some((best_key, current)) => more_specific(
                    (r.key().as_str(), host.as_ref()),
                    (best_key.as_str(), current.as_ref()),
                ),
                None => true,
            };
            if better {
                best = Some((r.key().clone(), host));
            }
        }
        best.map(|(_, host)| host)
    }

    fn put(&self, key: &str, host: KnownHost) {
        match self.inner.get(key) {
            Some(slot) => slot.store(Arc::new(host)),
            None => {
                self.inner.insert(key.to_string(), ArcSwap::from_pointee(host));
            }
        }
    }

    fn upsert(&self, key: &str, include_subdomains: bool, permanent: bool, max_age: u64) -> bool {
        if max_age == 0 {
            let removed = self.inner.remove(key).is_some();
            if removed {
                tracing::info!(host = %key, "Known HSTS host removed");
                metrics::record_store_update("remove");
                metrics::record_known_hosts(self.inner.len());
            }
            return removed;
        }

        match self.lookup(key) {
            None => {
                let now = self.clock.now();
                let expires = now + Duration::from_secs(max_age.min(MAX_AGE_CEILING));
                let host = KnownHost::new(key, include_subdomains, permanent, now, expires);
                tracing::info!(
                    host = %key,
                    include_subdomains,
                    permanent,
                    max_age,
                    "Known HSTS host added"
                );
                self.put(key, host);
                metrics::record_store_update("insert");
                metrics::record_known_hosts(self.inner.len());
                true
            }
            Some(existing) => match existing.merged_with(include_subdomains, permanent) {
                Some(merged) => {
                    tracing::info!(
                        host = %key,
                        matched = %existing.domain,
                        include_subdomains = merged.include_subdomains,
                        permanent = merged.permanent,
                        "Known HSTS host updated"
                    );
                    self.put(key, merged);
                    metrics::record_store_update("merge");
                    metrics::record_known_hosts(self.inner.len());
                    true
                }
                None => false,
            },
        }
    }
}

/// Orders overlapping matches: longer `domain` first, then the longer key the
/// record is stored under, then the lexically smaller key. Merged copies keep
/// their superdomain's `domain`, so the key decides between them.
fn more_specific(a: (&str, &KnownHost), b: (&str, &KnownHost)) -> bool {
    let (a_key, a_host) = a;
    let (b_key, b_host) = b;
    (a_host.domain.len(), a_key.len())
        .cmp(&(b_host.domain.len(), b_key.len()))
        .then_with(|| b_key.cmp(a_key))
        .is_gt()
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl HstsStore for MemoryStore {
    fn find(&self, host: &str) -> Result<Option<Arc<KnownHost>>, StoreError> {
        Ok(self.lookup(&canonical_key(host)))
    }

    fn update(
        &self,
        host: &str,
        include_subdomains: bool,
        permanent: bool,
        max_age: u64,
    ) -> Result<bool, StoreError> {
        Ok(self.upsert(&canonical_key(host), include_subdomains, permanent, max_age))
    }
}
