//! Outbound transports.
//!
//! The HSTS layer wraps any `tower::Service<Request<_>>`; this module provides
//! the `reqwest`-backed one the binary uses.

pub mod reqwest;

pub use self::reqwest::{ReqwestTransport, TransportError};
