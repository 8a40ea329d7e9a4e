//! Known HSTS host records.
//!
//! # Responsibilities
//! - Describe one Known HSTS Host (RFC 6797 §5.1)
//! - Decide whether a host is covered (§8.2 domain name matching)
//! - Merge a re-sent directive without narrowing its scope (§8.1.1)
//!
//! # Design Decisions
//! - Records are immutable; stores replace them wholesale
//! - Expiry is checked at read time, there is no background sweep
//! - Permanent records never expire

use serde::Serialize;
use std::time::SystemTime;

/// A host the client trusts to require secure transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KnownHost {
    /// Canonical ASCII host the record was learned for or pinned to.
    pub domain: String,
    /// Whether strict subdomains of `domain` are covered too.
    pub include_subdomains: bool,
    /// Preloaded or pinned; `expires` is ignored.
    pub permanent: bool,
    pub created: SystemTime,
    pub expires: SystemTime,
}

impl KnownHost {
    pub fn new(
        domain: impl Into<String>,
        include_subdomains: bool,
        permanent: bool,
        created: SystemTime,
        expires: SystemTime,
    ) -> Self {
        Self {
            domain: domain.into(),
            include_subdomains,
            permanent,
            created,
            expires,
        }
    }

    /// Returns true if `host` is covered by this record right now.
    pub fn applies_to(&self, host: &str) -> bool {
        self.applies_at(host, SystemTime::now())
    }

    /// Returns true if `host` is covered by this record at `now`.
    pub fn applies_at(&self, host: &str, now: SystemTime) -> bool {
        self.covers(host) && !self.is_expired_at(now)
    }

    /// Domain match only, ignoring expiry.
    pub fn covers(&self, host: &str) -> bool {
        if host == self.domain {
            return true;
        }
        self.include_subdomains
            && host.len() > self.domain.len()
            && host.ends_with(self.domain.as_str())
            && host.as_bytes()[host.len() - self.domain.len() - 1] == b'.'
    }

    pub fn is_expired_at(&self, now: SystemTime) -> bool {
        !self.permanent && self.expires < now
    }

    /// Fold a re-sent directive into this record.
    ///
    /// `include_subdomains` can only widen; `permanent` is taken as given.
    /// Domain and validity window are carried over. Returns `None` when the
    /// result would be identical to `self`.
    pub fn merged_with(&self, include_subdomains: bool, permanent: bool) -> Option<KnownHost> {
        let include_subdomains = self.include_subdomains || include_subdomains;
        if include_subdomains == self.include_subdomains && permanent == self.permanent {
            return None;
        }

        Some(KnownHost {
            include_subdomains,
            permanent,
            ..self.clone()
        })
    }
}
