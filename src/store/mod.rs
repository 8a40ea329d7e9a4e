//! Known HSTS host storage subsystem.
//!
//! # Data Flow
//! ```text
//! Outgoing request (http://host/...)
//!     → HstsStore::find(host)
//!         → exact key lookup, validated with KnownHost::applies_at
//!         → fallback scan over all records (most specific match wins)
//!
//! Incoming Strict-Transport-Security header
//!     → HstsStore::update(host, include_subdomains, permanent, max_age)
//!         → max_age == 0: remove the exact key
//!         → no match:     insert a fresh record
//!         → match:        KnownHost::merged_with, stored under the requesting host
//! ```
//!
//! # Design Decisions
//! - Records are immutable values behind `Arc`; every change is a slot swap
//! - Expired records are logically absent without eviction
//! - Stores are explicit instances shared through `Arc<dyn HstsStore>`

pub mod clock;
pub mod host;
pub mod memory;
pub mod record;

pub use clock::{Clock, ManualClock, SystemClock};
pub use host::HostComponent;
pub use memory::MemoryStore;
pub use record::KnownHost;

use std::sync::Arc;
use thiserror::Error;

/// Largest accepted directive lifetime, in seconds.
pub const MAX_AGE_CEILING: u64 = u32::MAX as u64;

/// Errors reported by a store backend.
///
/// The in-memory store never fails; persistent backends map their own
/// failures here so that lost state is never silently dropped.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store backend unavailable: {0}")]
    Unavailable(String),

    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("store serialization error: {0}")]
    Serialization(String),
}

/// Authority for "is this host currently a Known HSTS Host".
///
/// Implementations must be safe for concurrent readers and writers.
pub trait HstsStore: Send + Sync + std::fmt::Debug {
    /// Find a record currently applying to `host`.
    fn find(&self, host: &str) -> Result<Option<Arc<KnownHost>>, StoreError>;

    /// Fold an observed directive for `host` into the store.
    ///
    /// Returns whether the stored state changed. A `max_age` of zero removes
    /// the record keyed exactly by `host`.
    fn update(
        &self,
        host: &str,
        include_subdomains: bool,
        permanent: bool,
        max_age: u64,
    ) -> Result<bool, StoreError>;
}
