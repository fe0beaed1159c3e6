//! URL validation and scheme completion.
//!
//! The normalized string is used verbatim as the dedup key and as the redirect
//! target, so normalization is deliberately shallow: a missing scheme is filled
//! in and the result must parse with a usable host. Path, query and fragment
//! are left exactly as submitted.

use url::Url;

/// Maximum accepted length of a submitted URL, in characters.
pub const MAX_URL_LENGTH: usize = 2048;

/// Errors that can occur during URL normalization.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum UrlNormalizationError {
    #[error("URL cannot be empty")]
    Empty,

    #[error("URL is too long (max {MAX_URL_LENGTH} characters)")]
    TooLong,

    #[error("Invalid URL format: {0}")]
    InvalidFormat(String),

    #[error("URL must have a host")]
    MissingHost,

    #[error("URL must have a valid domain")]
    InvalidDomain,
}

/// Validates `input` and completes its scheme.
///
/// # Rules
///
/// 1. Empty input, input longer than [`MAX_URL_LENGTH`] characters, and input
///    containing control characters are rejected
/// 2. Input without an `http://` or `https://` prefix (case-insensitive) gets
///    `http://` prepended
/// 3. The result must parse as a URL with a non-empty host
/// 4. The host must contain a dot unless it is exactly `localhost`
///
/// Query parameter order is not canonicalized: `?a=1&b=2` and `?b=2&a=1` are
/// distinct keys.
///
/// # Errors
///
/// Returns the [`UrlNormalizationError`] variant naming the first rule violated.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(normalize_url("example.com/page").unwrap(), "http://example.com/page");
/// assert_eq!(normalize_url("https://example.com").unwrap(), "https://example.com");
/// assert!(normalize_url("not a url").is_err());
/// ```
pub fn normalize_url(input: &str) -> Result<String, UrlNormalizationError> {
    if input.is_empty() {
        return Err(UrlNormalizationError::Empty);
    }

    if input.chars().count() > MAX_URL_LENGTH {
        return Err(UrlNormalizationError::TooLong);
    }

    // The parser drops or escapes these, but the raw input is what gets stored.
    if input.chars().any(char::is_control) {
        return Err(UrlNormalizationError::InvalidFormat(
            "invalid control character in URL".to_string(),
        ));
    }

    let candidate = if has_http_scheme(input) {
        input.to_string()
    } else {
        format!("http://{input}")
    };

    let parsed =
        Url::parse(&candidate).map_err(|e| UrlNormalizationError::InvalidFormat(e.to_string()))?;

    let host = match parsed.host_str() {
        Some(host) if !host.is_empty() => host,
        _ => return Err(UrlNormalizationError::MissingHost),
    };

    if host != "localhost" && !host.contains('.') {
        return Err(UrlNormalizationError::InvalidDomain);
    }

    Ok(candidate)
}

fn has_http_scheme(input: &str) -> bool {
    let lower = |n: usize| input.get(..n).map(str::to_ascii_lowercase);
    lower(7).as_deref() == Some("http://") || lower(8).as_deref() == Some("https://")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prepends_scheme_when_missing() {
        assert_eq!(
            normalize_url("example.com/page").unwrap(),
            "http://example.com/page"
        );
    }

    #[test]
    fn test_keeps_existing_http_scheme() {
        assert_eq!(normalize_url("http://example.com").unwrap(), "http://example.com");
    }

    #[test]
    fn test_keeps_existing_https_scheme() {
        assert_eq!(
            normalize_url("https://example.com/a/b").unwrap(),
            "https://example.com/a/b"
        );
    }

    #[test]
    fn test_uppercase_scheme_accepted() {
        let result = normalize_url("HTTP://Example.com");
        assert!(result.is_ok());
        assert!(result.unwrap().ends_with("Example.com"));
    }

    #[test]
    fn test_does_not_rewrite_path_query_or_fragment() {
        let input = "https://example.com/Path?b=2&a=1#Section";
        assert_eq!(normalize_url(input).unwrap(), input);
    }

    #[test]
    fn test_query_order_yields_distinct_keys() {
        let a = normalize_url("example.com/?a=1&b=2").unwrap();
        let b = normalize_url("example.com/?b=2&a=1").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_localhost_accepted() {
        assert_eq!(
            normalize_url("localhost:3000/test").unwrap(),
            "http://localhost:3000/test"
        );
    }

    #[test]
    fn test_ip_address_accepted() {
        assert!(normalize_url("http://192.168.1.1:8080/api").is_ok());
    }

    #[test]
    fn test_subdomain_accepted() {
        assert!(normalize_url("https://api.example.com/v1/users").is_ok());
    }

    #[test]
    fn test_empty_rejected() {
        assert_eq!(normalize_url(""), Err(UrlNormalizationError::Empty));
    }

    #[test]
    fn test_too_long_rejected() {
        let url = format!("https://example.com/{}", "a".repeat(MAX_URL_LENGTH));
        assert_eq!(normalize_url(&url), Err(UrlNormalizationError::TooLong));
    }

    #[test]
    fn test_length_limit_is_inclusive() {
        let prefix = "https://example.com/";
        let url = format!("{prefix}{}", "a".repeat(MAX_URL_LENGTH - prefix.len()));
        assert_eq!(url.len(), MAX_URL_LENGTH);
        assert!(normalize_url(&url).is_ok());
    }

    #[test]
    fn test_text_with_spaces_rejected() {
        assert!(matches!(
            normalize_url("not a url"),
            Err(UrlNormalizationError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_single_label_host_rejected() {
        assert_eq!(
            normalize_url("http://intranet/page"),
            Err(UrlNormalizationError::InvalidDomain)
        );
    }

    #[test]
    fn test_other_scheme_is_treated_as_host() {
        // "ftp://x.com" becomes "http://ftp://x.com", whose host is "ftp".
        assert!(normalize_url("ftp://example.com/file.txt").is_err());
    }

    #[test]
    fn test_javascript_scheme_rejected() {
        assert!(normalize_url("javascript:alert('xss')").is_err());
    }

    #[test]
    fn test_missing_host_rejected() {
        assert!(normalize_url("http://").is_err());
    }

    #[test]
    fn test_deterministic() {
        let input = "example.com/some/path?x=1";
        assert_eq!(normalize_url(input), normalize_url(input));
    }

    #[test]
    fn test_control_characters_rejected() {
        for input in ["example.com/a\nb", "example.com/a\rb", "example.com/a\tb", "a\x7fb.com"] {
            assert!(
                matches!(normalize_url(input), Err(UrlNormalizationError::InvalidFormat(_))),
                "{input:?} should be rejected"
            );
        }
    }
}
