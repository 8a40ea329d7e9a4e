//! Strict-Transport-Security header subsystem.
//!
//! # Data Flow
//! ```text
//! Response headers
//!     → first Strict-Transport-Security value
//!     → directive.rs (split into name[=value] directives)
//!     → StsDirectives (max-age, includeSubDomains, preload)
//!     → HstsStore::update
//! ```
//!
//! # Design Decisions
//! - Directive names are case-insensitive
//! - Unknown directives are ignored
//! - A missing or unparseable max-age reads as 0 (removal), never an error
//! - An all-digit max-age too large for u64 saturates instead
//! - `preload` marks the directive permanent; this is an extension, RFC 6797
//!   distributes preload lists out of band

pub mod directive;

pub use directive::{parse_directives, Directive, STRICT_TRANSPORT_SECURITY};

use hyper::HeaderMap;

/// The directives the client acts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StsDirectives {
    pub max_age: u64,
    pub include_subdomains: bool,
    pub preload: bool,
}

impl StsDirectives {
    /// Parse a header value. Returns `None` when it is malformed.
    pub fn parse(value: &str) -> Option<Self> {
        let directives = parse_directives(value)?;

        let include_subdomains = directives.iter().any(|d| d.is("includeSubDomains"));
        let preload = directives.iter().any(|d| d.is("preload"));
        let max_age = directives
            .iter()
            .find(|d| d.is("max-age"))
            .and_then(|d| d.value.as_deref())
            .map(|v| v.trim_matches('"'))
            .and_then(parse_delta_seconds)
            .unwrap_or(0);

        Some(Self {
            max_age,
            include_subdomains,
            preload,
        })
    }

    /// Parse the first Strict-Transport-Security header in `headers`.
    ///
    /// Returns `None` when the header is absent, not visible ASCII, or malformed.
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        let value = headers.get(STRICT_TRANSPORT_SECURITY)?.to_str().ok()?;
        Self::parse(value)
    }
}

/// `delta-seconds` from RFC 9111 §1.2.2: digits only, saturating on overflow.
fn parse_delta_seconds(value: &str) -> Option<u64> {
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(value.parse::<u64>().unwrap_or(u64::MAX))
}

#[cfg(test)]
mod tests {
    use super::*;
    use hyper::header::HeaderValue;

    #[test]
    fn test_parse_typical_header() {
        let sts = StsDirectives::parse("max-age=31536000; includeSubdomains").unwrap();
        assert_eq!(sts.max_age, 31_536_000);
        assert!(sts.include_subdomains);
        assert!(!sts.preload);
    }

    #[test]
    fn test_names_are_case_insensitive() {
        let sts = StsDirectives::parse("MAX-AGE=10; INCLUDESUBDOMAINS; Preload").unwrap();
        assert_eq!(sts.max_age, 10);
        assert!(sts.include_subdomains);
        assert!(sts.preload);
    }

    #[test]
    fn test_flag_values_are_ignored() {
        let sts = StsDirectives::parse("max-age=10; includeSubdomains=no; preload=\"0\"").unwrap();
        assert!(sts.include_subdomains);
        assert!(sts.preload);
    }

    #[test]
    fn test_max_age_defaults_to_zero() {
        assert_eq!(StsDirectives::parse("includeSubdomains").unwrap().max_age, 0);
        assert_eq!(StsDirectives::parse("max-age").unwrap().max_age, 0);
        assert_eq!(StsDirectives::parse("max-age=abc").unwrap().max_age, 0);
        assert_eq!(StsDirectives::parse("max-age=-5").unwrap().max_age, 0);
    }

    #[test]
    fn test_overflowing_max_age_saturates() {
        let sts = StsDirectives::parse("max-age=99999999999999999999").unwrap();
        assert_eq!(sts.max_age, u64::MAX);
        assert_eq!(StsDirectives::parse("max-age=+5").unwrap().max_age, 0);
        assert_eq!(StsDirectives::parse("max-age=1e9").unwrap().max_age, 0);
    }

    #[test]
    fn test_quoted_max_age() {
        assert_eq!(StsDirectives::parse("max-age=\"600\"").unwrap().max_age, 600);
    }

    #[test]
    fn test_first_max_age_wins() {
        assert_eq!(StsDirectives::parse("max-age=5; max-age=10").unwrap().max_age, 5);
    }

    #[test]
    fn test_from_headers() {
        let mut headers = HeaderMap::new();
        assert!(StsDirectives::from_headers(&headers).is_none());

        headers.append(
            "Strict-Transport-Security",
            HeaderValue::from_static("max-age=60; preload"),
        );
        headers.append(
            "Strict-Transport-Security",
            HeaderValue::from_static("max-age=0"),
        );
        let sts = StsDirectives::from_headers(&headers).unwrap();
        assert_eq!(sts.max_age, 60);
        assert!(sts.preload);
    }

    #[test]
    fn test_malformed_header() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "Strict-Transport-Security",
            HeaderValue::from_static("max age=60"),
        );
        assert!(StsDirectives::from_headers(&headers).is_none());
    }
}
