//! Credential extraction
//!
//! A request may carry its token in several places. Each place is a
//! [`CredentialSource`]; an [`ExtractionChain`] tries them in order and the
//! first one that yields a token wins.

use std::fmt;

use http::header::{AUTHORIZATION, COOKIE};
use http::request::Parts;

use crate::claims::MAX_TOKEN_SIZE;

/// Maximum cookie header size (16KB)
const MAX_COOKIE_SIZE: usize = 16 * 1024;

/// Default cookie and query parameter name
pub const DEFAULT_TOKEN_NAME: &str = "token";

/// A single place a credential can be read from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialSource {
    /// Named cookie
    Cookie(String),
    /// `Authorization: Bearer <token>`
    BearerHeader,
    /// Named query string parameter
    QueryParam(String),
}

impl CredentialSource {
    /// Try to read a token from this source
    pub fn extract(&self, parts: &Parts) -> Option<String> {
        let token = match self {
            Self::Cookie(name) => extract_from_cookie(parts, name),
            Self::BearerHeader => extract_from_auth_header(parts),
            Self::QueryParam(name) => extract_from_query(parts, name),
        }?;

        (!token.is_empty() && token.len() <= MAX_TOKEN_SIZE).then_some(token)
    }
}

impl fmt::Display for CredentialSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cookie(name) => write!(f, "cookie:{}", name),
            Self::BearerHeader => write!(f, "bearer"),
            Self::QueryParam(name) => write!(f, "query:{}", name),
        }
    }
}

/// Ordered list of credential sources
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionChain {
    sources: Vec<CredentialSource>,
}

impl ExtractionChain {
    /// Chain over the given sources, highest priority first
    pub fn new(sources: Vec<CredentialSource>) -> Self {
        Self { sources }
    }

    /// Cookie `token`, then bearer header, then (if enabled) `?token=`
    pub fn standard(allow_query: bool) -> Self {
        let mut sources = vec![
            CredentialSource::Cookie(DEFAULT_TOKEN_NAME.to_string()),
            CredentialSource::BearerHeader,
        ];
        if allow_query {
            sources.push(CredentialSource::QueryParam(DEFAULT_TOKEN_NAME.to_string()));
        }
        Self { sources }
    }

    /// Sources in priority order
    pub fn sources(&self) -> &[CredentialSource] {
        &self.sources
    }

    /// Return the first token found along with the source it came from
    pub fn extract<'a>(&'a self, parts: &Parts) -> Option<(&'a CredentialSource, String)> {
        self.sources
            .iter()
            .find_map(|source| source.extract(parts).map(|token| (source, token)))
    }
}

impl Default for ExtractionChain {
    fn default() -> Self {
        Self::standard(false)
    }
}

fn extract_from_auth_header(parts: &Parts) -> Option<String> {
    let auth_header = parts.headers.get(AUTHORIZATION)?;

    // "Bearer " = 7 chars
    if auth_header.len() > MAX_TOKEN_SIZE + 7 {
        return None;
    }

    let auth_str = auth_header.to_str().ok()?;
    let token = auth_str.strip_prefix("Bearer ")?.trim();

    Some(token.to_string())
}

fn extract_from_query(parts: &Parts, name: &str) -> Option<String> {
    let query = parts.uri.query()?;

    if query.len() > MAX_TOKEN_SIZE * 2 {
        return None;
    }

    let params: Vec<(String, String)> = serde_urlencoded::from_str(query).ok()?;
    params
        .into_iter()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value)
}

fn extract_from_cookie(parts: &Parts, name: &str) -> Option<String> {
    for cookie_header in parts.headers.get_all(COOKIE) {
        if cookie_header.len() > MAX_COOKIE_SIZE {
            continue;
        }

        let Ok(cookies) = cookie_header.to_str() else {
            continue;
        };

        for cookie in cookies.split(';') {
            let Some((key, value)) = cookie.trim().split_once('=') else {
                continue;
            };
            if key.trim() != name {
                continue;
            }

            let value = value.trim();
            let value = if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
                &value[1..value.len() - 1]
            } else {
                value
            };

            let decoded = url_decode_simple(value);
            if !decoded.is_empty() {
                return Some(decoded);
            }
        }
    }
    None
}

/// Simple URL decoding for cookie values
fn url_decode_simple(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '%' {
            let hex: String = chars.by_ref().take(2).collect();
            if hex.len() == 2
                && let Ok(byte) = u8::from_str_radix(&hex, 16)
            {
                result.push(byte as char);
                continue;
            }
            // Invalid escape, keep as-is
            result.push('%');
            result.push_str(&hex);
        } else if c == '+' {
            result.push(' ');
        } else {
            result.push(c);
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::Request;

    fn parts(uri: &str, headers: &[(&str, &str)]) -> Parts {
        let mut builder = Request::builder().uri(uri);
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn test_cookie_wins_over_header_and_query() {
        let chain = ExtractionChain::standard(true);
        let p = parts(
            "/api/tasks?token=from-query",
            &[
                ("cookie", "theme=dark; token=from-cookie"),
                ("authorization", "Bearer from-header"),
            ],
        );

        let (source, token) = chain.extract(&p).unwrap();
        assert_eq!(token, "from-cookie");
        assert_eq!(*source, CredentialSource::Cookie("token".into()));
    }

    #[test]
    fn test_header_wins_over_query() {
        let chain = ExtractionChain::standard(true);
        let p = parts(
            "/api/tasks?token=from-query",
            &[("authorization", "Bearer from-header")],
        );

        let (source, token) = chain.extract(&p).unwrap();
        assert_eq!(token, "from-header");
        assert_eq!(*source, CredentialSource::BearerHeader);
    }

    #[test]
    fn test_query_used_last_when_enabled() {
        let chain = ExtractionChain::standard(true);
        let p = parts("/api/tasks?page=2&token=from-query", &[]);

        let (_, token) = chain.extract(&p).unwrap();
        assert_eq!(token, "from-query");
    }

    #[test]
    fn test_query_ignored_when_disabled() {
        let chain = ExtractionChain::standard(false);
        let p = parts("/api/tasks?token=from-query", &[]);
        assert!(chain.extract(&p).is_none());
        assert_eq!(chain.sources().len(), 2);
    }

    #[test]
    fn test_nothing_present() {
        let chain = ExtractionChain::standard(true);
        let p = parts("/api/tasks", &[("cookie", "theme=dark")]);
        assert!(chain.extract(&p).is_none());
    }

    #[test]
    fn test_header_requires_bearer_scheme() {
        let chain = ExtractionChain::new(vec![CredentialSource::BearerHeader]);
        let p = parts("/", &[("authorization", "Basic dXNlcjpwYXNz")]);
        assert!(chain.extract(&p).is_none());

        let p = parts("/", &[("authorization", "Bearer ")]);
        assert!(chain.extract(&p).is_none());
    }

    #[test]
    fn test_empty_cookie_falls_through() {
        let chain = ExtractionChain::standard(false);
        let p = parts(
            "/",
            &[("cookie", "token="), ("authorization", "Bearer from-header")],
        );
        let (_, token) = chain.extract(&p).unwrap();
        assert_eq!(token, "from-header");
    }

    #[test]
    fn test_cookie_name_must_match_exactly() {
        let chain = ExtractionChain::standard(false);
        let p = parts("/", &[("cookie", "csrf_token=abc; mytoken=def")]);
        assert!(chain.extract(&p).is_none());
    }

    #[test]
    fn test_quoted_and_encoded_cookie() {
        let source = CredentialSource::Cookie("token".into());
        let p = parts("/", &[("cookie", "token=\"abc%2Edef\"")]);
        assert_eq!(source.extract(&p).as_deref(), Some("abc.def"));
    }

    #[test]
    fn test_oversized_token_is_absent() {
        let big = "a".repeat(MAX_TOKEN_SIZE + 1);
        let chain = ExtractionChain::standard(false);
        let p = parts("/", &[("authorization", &format!("Bearer {}", big))]);
        assert!(chain.extract(&p).is_none());
    }

    #[test]
    fn test_url_decode_simple() {
        assert_eq!(url_decode_simple("hello"), "hello");
        assert_eq!(url_decode_simple("hello%20world"), "hello world");
        assert_eq!(url_decode_simple("hello+world"), "hello world");
        assert_eq!(url_decode_simple("invalid%GG"), "invalid%GG");
        assert_eq!(url_decode_simple("trailing%"), "trailing%");
    }

    #[test]
    fn test_source_display() {
        assert_eq!(CredentialSource::BearerHeader.to_string(), "bearer");
        assert_eq!(
            CredentialSource::Cookie("token".into()).to_string(),
            "cookie:token"
        );
    }
}
