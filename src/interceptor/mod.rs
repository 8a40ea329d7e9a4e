//! Client-side HSTS enforcement (RFC 6797 §8).
//!
//! # Data Flow
//! ```text
//! caller
//!     → HstsService::call(request)
//!         1. scheme is http?                      no  → send unchanged
//!         2. extract host component
//!         3. IP literal?                          yes → send unchanged
//!         4. HstsStore::find(host)                hit → upgrade.rs rewrites to https
//!         5. inner transport send                 error → propagated, store untouched
//!         6. Strict-Transport-Security header?    yes → HstsStore::update(final host)
//!     ← response (status and body untouched)
//! ```
//!
//! # Design Decisions
//! - Implemented as a tower `Layer` so any `Service<Request<_>>` transport can be wrapped
//! - The store is injected, never global; all learned state lives there
//! - Header parse failures are silent: no update, no error
//! - Transport errors are boxed as-is and can be downcast to the transport's type
//! - A cancelled or failed send never reaches the update step

pub mod layer;
pub mod upgrade;

pub use layer::{BuildError, HstsLayer, HstsLayerBuilder, HstsService, HstsUpgraded, ResolvedUri};
pub use upgrade::UpgradeError;
