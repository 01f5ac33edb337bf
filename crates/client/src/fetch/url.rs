//! URL canonicalization and origin resolution for consistent caching.

/// Error type for URL handling failures.
#[derive(Debug, Clone, thiserror::Error)]
pub enum UrlError {
    #[error("empty URL")]
    Empty,

    #[error("unsupported scheme: {0}")]
    UnsupportedScheme(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

/// Canonicalize a URL string for consistent cache keys.
///
/// Normalization steps:
/// 1. Trim leading/trailing whitespace
/// 2. Lowercase the host
/// 3. Remove fragment (#...)
/// 4. Keep query string intact (do not reorder)
pub fn canonicalize(input: &str) -> Result<url::Url, UrlError> {
    let trimmed = input.trim();

    if trimmed.is_empty() {
        return Err(UrlError::Empty);
    }

    let mut parsed = url::Url::parse(trimmed).map_err(|e| UrlError::InvalidUrl(e.to_string()))?;

    match parsed.scheme() {
        "http" | "https" => {}
        scheme => return Err(UrlError::UnsupportedScheme(scheme.to_string())),
    }

    if let Some(host) = parsed.host_str() {
        let lowered = host.to_lowercase();
        parsed
            .set_host(Some(lowered.as_str()))
            .map_err(|e| UrlError::InvalidUrl(e.to_string()))?;
    }

    parsed.set_fragment(None);

    Ok(parsed)
}

/// Resolve a precache entry or request path against the application origin.
///
/// Absolute entries (anything with a scheme) are canonicalized as-is;
/// relative entries are joined onto the origin.
pub fn resolve(origin: &url::Url, entry: &str) -> Result<url::Url, UrlError> {
    let trimmed = entry.trim();

    if trimmed.is_empty() {
        return Err(UrlError::Empty);
    }

    if trimmed.contains("://") {
        return canonicalize(trimmed);
    }

    let joined = origin.join(trimmed).map_err(|e| UrlError::InvalidUrl(e.to_string()))?;
    canonicalize(joined.as_str())
}

/// Whether two URLs share an origin (scheme, host, and port).
pub fn is_same_origin(a: &url::Url, b: &url::Url) -> bool {
    a.scheme() == b.scheme() && a.host_str() == b.host_str() && a.port_or_known_default() == b.port_or_known_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn origin() -> url::Url {
        url::Url::parse("http://127.0.0.1:8080").unwrap()
    }

    #[test]
    fn test_canonicalize_basic() {
        let url = canonicalize("https://example.com/page?q=1").unwrap();
        assert_eq!(url.scheme(), "https");
        assert_eq!(url.host_str(), Some("example.com"));
        assert_eq!(url.query(), Some("q=1"));
    }

    #[test]
    fn test_canonicalize_lowercases_host() {
        let url = canonicalize("https://Example.COM/page").unwrap();
        assert_eq!(url.host_str(), Some("example.com"));
    }

    #[test]
    fn test_canonicalize_strips_fragment() {
        let url = canonicalize("https://example.com/page#section").unwrap();
        assert_eq!(url.fragment(), None);
    }

    #[test]
    fn test_canonicalize_rejects_empty() {
        assert!(matches!(canonicalize("   "), Err(UrlError::Empty)));
    }

    #[test]
    fn test_canonicalize_rejects_scheme() {
        assert!(matches!(canonicalize("ftp://example.com"), Err(UrlError::UnsupportedScheme(_))));
    }

    #[test]
    fn test_resolve_relative() {
        let url = resolve(&origin(), "/index.html").unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:8080/index.html");
    }

    #[test]
    fn test_resolve_root() {
        let url = resolve(&origin(), "/").unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:8080/");
    }

    #[test]
    fn test_resolve_absolute() {
        let url = resolve(&origin(), "https://unpkg.com/leaflet@1.7.1/dist/leaflet.css").unwrap();
        assert_eq!(url.host_str(), Some("unpkg.com"));
    }

    #[test]
    fn test_same_origin() {
        let a = url::Url::parse("http://127.0.0.1:8080/index.html").unwrap();
        let b = url::Url::parse("http://127.0.0.1:8080/logo.png").unwrap();
        assert!(is_same_origin(&a, &b));
    }

    #[test]
    fn test_cross_origin() {
        let a = url::Url::parse("http://127.0.0.1:8080/index.html").unwrap();
        let b = url::Url::parse("https://unpkg.com/leaflet@1.7.1/dist/leaflet.js").unwrap();
        assert!(!is_same_origin(&a, &b));
    }

    #[test]
    fn test_same_host_different_port() {
        let a = url::Url::parse("http://127.0.0.1:8080/").unwrap();
        let b = url::Url::parse("http://127.0.0.1:9090/").unwrap();
        assert!(!is_same_origin(&a, &b));
    }
}
