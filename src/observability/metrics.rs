//! Metrics collection.
//!
//! # Metrics
//! - `hsts_requests_upgraded_total` (counter): requests rewritten to https
//! - `hsts_ip_literal_bypass_total` (counter): insecure requests to IP literals
//! - `hsts_store_updates_total` (counter): store changes by action
//! - `hsts_header_rejected_total` (counter): malformed Strict-Transport-Security values
//! - `hsts_known_hosts` (gauge): records held by the in-memory store
//!
//! # Design Decisions
//! - Only the `metrics` facade is used; the embedding application installs
//!   whichever recorder/exporter it wants
//! - Without a recorder every call is a no-op

use metrics::{counter, gauge};

/// Record a request whose scheme was upgraded.
pub fn record_upgrade() {
    counter!("hsts_requests_upgraded_total").increment(1);
}

/// Record an insecure request that skipped matching because of an IP literal host.
pub fn record_ip_literal_bypass() {
    counter!("hsts_ip_literal_bypass_total").increment(1);
}

/// Record a store mutation (`insert`, `merge` or `remove`).
pub fn record_store_update(action: &'static str) {
    counter!("hsts_store_updates_total", "action" => action).increment(1);
}

/// Record a header value that could not be parsed.
pub fn record_header_rejected() {
    counter!("hsts_header_rejected_total").increment(1);
}

/// Record the current number of stored records.
pub fn record_known_hosts(count: usize) {
    gauge!("hsts_known_hosts").set(count as f64);
}
