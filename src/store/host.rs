//! Host component canonicalization.
//!
//! Hosts are compared in their lowercase ASCII (IDNA) form with any trailing
//! root dot removed. IP literals are kept apart since they never match a
//! Known HSTS Host (RFC 6797 §8.3 step 3).

use std::fmt;
use std::net::IpAddr;
use url::Host;

/// A parsed host component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostComponent {
    Domain(String),
    Ip(IpAddr),
}

impl HostComponent {
    /// Parse a raw host (as found in a URI authority or a config file).
    ///
    /// Accepts bracketed and bare IPv6 literals. Returns `None` for hosts
    /// that are empty or not valid domain names.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if let Ok(ip) = raw.parse::<IpAddr>() {
            return Some(HostComponent::Ip(ip));
        }

        match Host::parse(raw).ok()? {
            Host::Domain(domain) => {
                let domain = domain.trim_end_matches('.');
                if domain.is_empty() {
                    return None;
                }
                Some(HostComponent::Domain(domain.to_string()))
            }
            Host::Ipv4(ip) => Some(HostComponent::Ip(IpAddr::V4(ip))),
            Host::Ipv6(ip) => Some(HostComponent::Ip(IpAddr::V6(ip))),
        }
    }

    pub fn is_ip_literal(&self) -> bool {
        matches!(self, HostComponent::Ip(_))
    }

    /// Key under which the store indexes this host.
    pub fn key(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for HostComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostComponent::Domain(d) => f.write_str(d),
            HostComponent::Ip(ip) => write!(f, "{}", ip),
        }
    }
}

/// Canonical store key for `raw`, falling back to a lowercased copy when the
/// host cannot be parsed.
pub fn canonical_key(raw: &str) -> String {
    match HostComponent::parse(raw) {
        Some(host) => host.key(),
        None => raw.trim().trim_end_matches('.').to_ascii_lowercase(),
    }
}
