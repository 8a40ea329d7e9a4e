//! Client-side HTTP Strict Transport Security (RFC 6797 §8).

pub mod client;
pub mod config;
pub mod header;
pub mod interceptor;
pub mod observability;
pub mod store;
pub mod transport;

pub use client::HstsClient;
pub use config::ClientConfig;
pub use interceptor::{HstsLayer, HstsService};
pub use store::{HstsStore, KnownHost, MemoryStore};
