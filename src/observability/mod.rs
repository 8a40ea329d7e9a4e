//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! store + interceptor produce:
//!     → tracing events (structured fields: uri, host, max_age, ...)
//!     → metrics.rs (counters, gauges)
//!
//! Consumers:
//!     → logging.rs subscriber (stderr) in the binary
//!     → whatever metrics recorder the embedding application installs
//! ```
//!
//! # Design Decisions
//! - Structured fields, never pre-formatted strings
//! - Metrics are cheap (no-op without a recorder)

pub mod logging;
pub mod metrics;
