//! Request URI upgrade (RFC 6797 §8.3 step 5).
//!
//! # Responsibilities
//! - Detect the insecure `http` scheme (case-insensitive)
//! - Extract the host component used for Known HSTS Host matching
//! - Rewrite `http` → `https`, mapping an explicit port 80 to 443
//!
//! # Design Decisions
//! - Absent port stays absent; other explicit ports are preserved
//! - Userinfo, path and query are carried over untouched

use http::uri::{Authority, InvalidUri, InvalidUriParts, PathAndQuery, Scheme};
use hyper::Uri;
use thiserror::Error;

use crate::store::HostComponent;

const HTTP_PORT: u16 = 80;
const HTTPS_PORT: u16 = 443;

/// A URI that could not be rebuilt with the secure scheme.
#[derive(Debug, Error)]
pub enum UpgradeError {
    #[error("URI has no authority component")]
    MissingAuthority,

    #[error("invalid authority after port rewrite: {0}")]
    Authority(#[from] InvalidUri),

    #[error("invalid URI parts: {0}")]
    Parts(#[from] InvalidUriParts),
}

/// Returns true if `uri` uses the insecure `http` scheme.
pub fn is_insecure(uri: &Uri) -> bool {
    uri.scheme_str()
        .map(|s| s.eq_ignore_ascii_case("http"))
        .unwrap_or(false)
}

/// Returns true if `uri` uses the secure `https` scheme.
pub fn is_secure(uri: &Uri) -> bool {
    uri.scheme_str()
        .map(|s| s.eq_ignore_ascii_case("https"))
        .unwrap_or(false)
}

/// Host component of `uri`, if present and parseable.
pub fn host_component(uri: &Uri) -> Option<HostComponent> {
    uri.host().and_then(HostComponent::parse)
}

/// Rewrite `uri` to the secure scheme.
pub fn upgrade_uri(uri: &Uri) -> Result<Uri, UpgradeError> {
    let mut parts = uri.clone().into_parts();
    let authority = parts.authority.as_ref().ok_or(UpgradeError::MissingAuthority)?;

    parts.authority = Some(upgrade_authority(authority)?);
    parts.scheme = Some(Scheme::HTTPS);
    if parts.path_and_query.is_none() {
        parts.path_and_query = Some(PathAndQuery::from_static("/"));
    }

    Ok(Uri::from_parts(parts)?)
}

fn upgrade_authority(authority: &Authority) -> Result<Authority, InvalidUri> {
    match authority.port() {
        Some(port) if port.as_u16() == HTTP_PORT => {
            let raw = authority.as_str();
            // Keep everything up to and including the ':' before the port
            let prefix = &raw[..raw.len() - port.as_str().len()];
            format!("{}{}", prefix, HTTPS_PORT).parse()
        }
        _ => Ok(authority.clone()),
    }
}
