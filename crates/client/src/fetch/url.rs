//! URL resolution relative to the worker scope, and scheme/origin checks.

use url::Url;

/// Schemes for persistent bidirectional connections. Requests to these are
/// never intercepted.
pub const STREAMING_SCHEMES: &[&str] = &["ws", "wss"];

/// Error type for URL resolution failures.
#[derive(Debug, Clone, thiserror::Error)]
pub enum UrlError {
    #[error("empty URL")]
    Empty,

    #[error("unsupported scheme: {0}")]
    UnsupportedScheme(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

/// Resolve a manifest entry or page-issued URL against the worker scope.
///
/// Normalization steps:
/// 1. Trim leading/trailing whitespace
/// 2. Join relative references (`./`, `/foo.json`, `index.html`) onto `scope`
/// 3. Remove fragment (#...)
/// 4. Keep query string intact (do not reorder)
///
/// Only http(s) and streaming schemes are accepted.
pub fn resolve(scope: &Url, input: &str) -> Result<Url, UrlError> {
    let trimmed = input.trim();

    if trimmed.is_empty() {
        return Err(UrlError::Empty);
    }

    let mut resolved = scope.join(trimmed).map_err(|e| UrlError::InvalidUrl(e.to_string()))?;

    match resolved.scheme() {
        "http" | "https" => {}
        scheme if STREAMING_SCHEMES.contains(&scheme) => {}
        scheme => return Err(UrlError::UnsupportedScheme(scheme.to_string())),
    }

    resolved.set_fragment(None);

    Ok(resolved)
}

/// True for WebSocket-style URLs the worker passes through untouched.
pub fn is_streaming(url: &Url) -> bool {
    STREAMING_SCHEMES.contains(&url.scheme())
}

/// Same scheme, host and port.
pub fn same_origin(a: &Url, b: &Url) -> bool {
    a.origin() == b.origin()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scope() -> Url {
        Url::parse("https://app.example/analyzer/").unwrap()
    }

    #[test]
    fn test_resolve_dot_slash() {
        let url = resolve(&scope(), "./").unwrap();
        assert_eq!(url.as_str(), "https://app.example/analyzer/");
    }

    #[test]
    fn test_resolve_relative_file() {
        let url = resolve(&scope(), "./index.html").unwrap();
        assert_eq!(url.as_str(), "https://app.example/analyzer/index.html");
    }

    #[test]
    fn test_resolve_root_relative() {
        let url = resolve(&scope(), "/foo.json").unwrap();
        assert_eq!(url.as_str(), "https://app.example/foo.json");
    }

    #[test]
    fn test_resolve_absolute_cross_origin() {
        let url = resolve(&scope(), "https://cdn.jsdelivr.net/npm/chart.js").unwrap();
        assert_eq!(url.host_str(), Some("cdn.jsdelivr.net"));
    }

    #[test]
    fn test_resolve_removes_fragment_keeps_query() {
        let url = resolve(&scope(), "data.json?symbol=VIX#latest").unwrap();
        assert_eq!(url.query(), Some("symbol=VIX"));
        assert_eq!(url.fragment(), None);
    }

    #[test]
    fn test_resolve_trim_and_empty() {
        assert_eq!(resolve(&scope(), "  index.html ").unwrap().path(), "/analyzer/index.html");
        assert!(matches!(resolve(&scope(), "   "), Err(UrlError::Empty)));
    }

    #[test]
    fn test_resolve_unsupported_scheme() {
        let result = resolve(&scope(), "file:///etc/passwd");
        assert!(matches!(result, Err(UrlError::UnsupportedScheme(_))));
    }

    #[test]
    fn test_streaming_schemes() {
        let ws = resolve(&scope(), "wss://stream.example/ticks").unwrap();
        assert!(is_streaming(&ws));
        assert!(!is_streaming(&scope()));
    }

    #[test]
    fn test_same_origin() {
        let page = resolve(&scope(), "./index.html").unwrap();
        let cdn = resolve(&scope(), "https://cdn.jsdelivr.net/npm/chart.js").unwrap();
        let other_port = Url::parse("https://app.example:8443/").unwrap();
        assert!(same_origin(&scope(), &page));
        assert!(!same_origin(&scope(), &cdn));
        assert!(!same_origin(&scope(), &other_port));
    }
}
