//! Strict-Transport-Security header value parsing.
//!
//! Grammar (RFC 6797 §6.1):
//! ```text
//! Strict-Transport-Security = [ directive ] *( ";" [ directive ] )
//! directive                 = directive-name [ "=" directive-value ]
//! directive-name            = token
//! directive-value           = token / quoted-string
//! ```

/// Header name matched on responses.
pub const STRICT_TRANSPORT_SECURITY: &str = "strict-transport-security";

/// One `name[=value]` member of the header. Quoted values are unescaped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    pub name: String,
    pub value: Option<String>,
}

impl Directive {
    /// Case-insensitive name comparison.
    pub fn is(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }
}

/// Split `value` into its directives.
///
/// Empty members (stray semicolons) are skipped. Returns `None` when the value
/// is empty or not well formed: a member without a name, a name or bare value
/// that is not a token, or an unterminated quoted-string.
pub fn parse_directives(value: &str) -> Option<Vec<Directive>> {
    let mut directives = Vec::new();
    for member in split_members(value)? {
        let member = member.trim();
        if member.is_empty() {
            continue;
        }
        directives.push(parse_member(member)?);
    }

    if directives.is_empty() {
        return None;
    }
    Some(directives)
}

fn parse_member(member: &str) -> Option<Directive> {
    let (name, value) = match member.split_once('=') {
        Some((name, value)) => (name.trim(), Some(value.trim())),
        None => (member, None),
    };

    if !is_token(name) {
        return None;
    }

    let value = match value {
        None => None,
        Some(v) if v.starts_with('"') => Some(unquote(v)?),
        Some(v) if is_token(v) => Some(v.to_string()),
        Some(_) => return None,
    };

    Some(Directive {
        name: name.to_string(),
        value,
    })
}

/// Split on `;` outside of quoted-strings.
fn split_members(value: &str) -> Option<Vec<&str>> {
    let mut members = Vec::new();
    let mut start = 0usize;
    let mut in_quote = false;
    let mut escaped = false;

    for (i, c) in value.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' if in_quote => escaped = true,
            '"' => in_quote = !in_quote,
            ';' if !in_quote => {
                members.push(&value[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }

    if in_quote {
        return None;
    }
    members.push(&value[start..]);
    Some(members)
}

/// Strip the surrounding quotes and resolve backslash escapes.
fn unquote(value: &str) -> Option<String> {
    let inner = value.strip_prefix('"')?.strip_suffix('"')?;
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => out.push(chars.next()?),
            '"' => return None,
            c if c.is_control() && c != '\t' => return None,
            c => out.push(c),
        }
    }
    Some(out)
}

fn is_token(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(is_tchar)
}

fn is_tchar(b: u8) -> bool {
    b.is_ascii_alphanumeric()
        || matches!(
            b,
            b'!' | b'#' | b'$' | b'%' | b'&' | b'\'' | b'*' | b'+' | b'-' | b'.' | b'^' | b'_'
                | b'`' | b'|' | b'~'
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(value: &str) -> Vec<String> {
        parse_directives(value)
            .unwrap()
            .into_iter()
            .map(|d| d.name)
            .collect()
    }

    #[test]
    fn test_parse_basic() {
        let directives = parse_directives("max-age=31536000; includeSubDomains").unwrap();
        assert_eq!(
            directives,
            vec![
                Directive {
                    name: "max-age".into(),
                    value: Some("31536000".into())
                },
                Directive {
                    name: "includeSubDomains".into(),
                    value: None
                },
            ]
        );
        assert!(directives[1].is("includesubdomains"));
    }

    #[test]
    fn test_parse_quoted_value() {
        let directives = parse_directives("max-age=\"300\"; preload").unwrap();
        assert_eq!(directives[0].value.as_deref(), Some("300"));

        let directives = parse_directives("ext=\"a;b \\\"c\\\"\"").unwrap();
        assert_eq!(directives[0].value.as_deref(), Some("a;b \"c\""));
    }

    #[test]
    fn test_empty_members_are_skipped() {
        assert_eq!(names(";max-age=5;; preload ;"), vec!["max-age", "preload"]);
    }

    #[test]
    fn test_malformed_values() {
        assert!(parse_directives("").is_none());
        assert!(parse_directives(" ; ;").is_none());
        assert!(parse_directives("=5").is_none());
        assert!(parse_directives("max age=5").is_none());
        assert!(parse_directives("max-age=\"5").is_none());
        assert!(parse_directives("max-age=5 0").is_none());
        assert!(parse_directives("max-age=\"5\"x").is_none());
    }
}
