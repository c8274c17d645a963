//! Redirect Target Sanitizing
//!
//! Post-login redirects take their target from user input (`next`, OAuth
//! `state`). Only same-origin relative paths survive; everything else falls
//! back to `/`.

use url::Url;

/// Fallback redirect target
pub const DEFAULT_URI: &str = "/";

/// Origin used to resolve relative paths; any fixed host works.
const RESOLVE_BASE: &str = "http://localhost/";

/// Reduce `raw` to a safe same-origin relative URI
///
/// Returns the trimmed input unchanged when it is an absolute path on this
/// origin (query and fragment included), otherwise [`DEFAULT_URI`].
///
/// ```rust
/// use platform::uri::sanitize_uri;
///
/// assert_eq!(sanitize_uri("/admin/lists?page=2"), "/admin/lists?page=2");
/// assert_eq!(sanitize_uri("https://evil.example/"), "/");
/// ```
pub fn sanitize_uri(raw: &str) -> String {
    let candidate = raw.trim();
    if is_safe_relative(candidate) {
        candidate.to_string()
    } else {
        DEFAULT_URI.to_string()
    }
}

fn is_safe_relative(candidate: &str) -> bool {
    // Protocol-relative ("//host") and backslash variants browsers treat as such
    if !candidate.starts_with('/') || candidate.starts_with("//") {
        return false;
    }
    if candidate.contains('\\') || candidate.chars().any(char::is_control) {
        return false;
    }

    let path = candidate
        .split(['?', '#'])
        .next()
        .unwrap_or_default();
    if path
        .split('/')
        .any(|segment| segment == ".." || segment.eq_ignore_ascii_case("%2e%2e"))
    {
        return false;
    }

    // Whatever remains must resolve onto the placeholder origin.
    let Ok(base) = Url::parse(RESOLVE_BASE) else {
        return false;
    };
    match base.join(candidate) {
        Ok(resolved) => resolved.origin() == base.origin(),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_paths_pass_through() {
        for uri in [
            "/",
            "/admin",
            "/admin/lists/5",
            "/admin/campaigns?status=draft&page=2",
            "/admin#settings",
        ] {
            assert_eq!(sanitize_uri(uri), uri, "{uri}");
        }
    }

    #[test]
    fn test_absolute_urls_rejected() {
        for uri in [
            "https://evil.example",
            "http://evil.example/admin",
            "javascript:alert(1)",
            "data:text/html,hi",
            "evil.example/admin",
            "admin",
        ] {
            assert_eq!(sanitize_uri(uri), DEFAULT_URI, "{uri}");
        }
    }

    #[test]
    fn test_protocol_relative_rejected() {
        assert_eq!(sanitize_uri("//evil.example"), "/");
        assert_eq!(sanitize_uri("/\\evil.example"), "/");
        assert_eq!(sanitize_uri("\\\\evil.example"), "/");
    }

    #[test]
    fn test_traversal_and_control_chars_rejected() {
        assert_eq!(sanitize_uri("/admin/../etc"), "/");
        assert_eq!(sanitize_uri("/admin/%2E%2E/etc"), "/");
        assert_eq!(sanitize_uri("/admin\r\nSet-Cookie: x=1"), "/");
    }

    #[test]
    fn test_trimmed_and_empty() {
        assert_eq!(sanitize_uri("  /admin  "), "/admin");
        assert_eq!(sanitize_uri(""), "/");
        assert_eq!(sanitize_uri("   "), "/");
    }
}
