//! Request path normalization.
//!
//! Raw request URIs are canonicalized before route matching: the query
//! string is stripped, percent-escapes are decoded, the configured mount
//! prefix is removed, consecutive slashes collapse, and a single leading
//! slash is enforced with no trailing slash (the root path stays `/`).
//!
//! Decoded paths containing the literal substring `..` are treated as
//! traversal attempts and canonicalize to `/`. This is a deliberate
//! defensive fallback rather than an error: the request falls through to
//! whatever handles the root path (usually a not-found outcome when `/` is
//! unrouted). See DESIGN.md for the rationale behind preserving it.

use percent_encoding::percent_decode_str;

/// Normalizes a raw request URI into a canonical routable path.
///
/// `mount_prefix` is the subdirectory the application is mounted under
/// (e.g. `"/app"`); pass an empty string when mounted at the root. The
/// prefix is stripped only when present at the start of the decoded path.
///
/// # Examples
///
/// ```
/// use trellis_http::routing::normalize_path;
///
/// assert_eq!(normalize_path("/about?tab=1", ""), "/about");
/// assert_eq!(normalize_path("//a///b/", ""), "/a/b");
/// assert_eq!(normalize_path("/app/user/7", "/app"), "/user/7");
/// assert_eq!(normalize_path("/a/../etc/passwd", ""), "/");
/// assert_eq!(normalize_path("", ""), "/");
/// ```
pub fn normalize_path(raw_uri: &str, mount_prefix: &str) -> String {
    // Strip query string and fragment
    let path = raw_uri
        .split_once('?')
        .map_or(raw_uri, |(path, _)| path);
    let path = path.split_once('#').map_or(path, |(path, _)| path);

    // Decode percent-escapes
    let decoded = percent_decode_str(path).decode_utf8_lossy();
    let mut path: &str = &decoded;

    // Strip the mount prefix for subdirectory installations
    let prefix = mount_prefix.trim_end_matches('/');
    if !prefix.is_empty() && prefix != "/" {
        if let Some(stripped) = path.strip_prefix(prefix) {
            path = stripped;
        }
    }

    // Collapse consecutive slashes
    let mut collapsed = String::with_capacity(path.len());
    let mut prev_slash = false;
    for c in path.chars() {
        if c == '/' {
            if !prev_slash {
                collapsed.push('/');
            }
            prev_slash = true;
        } else {
            collapsed.push(c);
            prev_slash = false;
        }
    }

    // Single leading slash, no trailing slash
    let normalized = format!("/{}", collapsed.trim_matches('/'));

    // Traversal fallback: rewrite to the root rather than reject
    if normalized.contains("..") {
        tracing::warn!(uri = raw_uri, "path traversal attempt, rewriting to /");
        return "/".to_string();
    }

    normalized
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_path_unchanged() {
        assert_eq!(normalize_path("/about", ""), "/about");
    }

    #[test]
    fn test_strips_query_string() {
        assert_eq!(normalize_path("/search?q=rust&page=2", ""), "/search");
    }

    #[test]
    fn test_strips_fragment() {
        assert_eq!(normalize_path("/doc#section", ""), "/doc");
    }

    #[test]
    fn test_percent_decoding() {
        assert_eq!(normalize_path("/caf%C3%A9", ""), "/café");
        assert_eq!(normalize_path("/a%20b", ""), "/a b");
    }

    #[test]
    fn test_collapses_slashes() {
        assert_eq!(normalize_path("//a///b//c", ""), "/a/b/c");
    }

    #[test]
    fn test_trailing_slash_stripped() {
        assert_eq!(normalize_path("/about/", ""), "/about");
    }

    #[test]
    fn test_root_stays_root() {
        assert_eq!(normalize_path("/", ""), "/");
        assert_eq!(normalize_path("", ""), "/");
        assert_eq!(normalize_path("///", ""), "/");
    }

    #[test]
    fn test_mount_prefix_stripped() {
        assert_eq!(normalize_path("/app/user/7", "/app"), "/user/7");
        assert_eq!(normalize_path("/app", "/app"), "/");
        // Prefix absent: path untouched
        assert_eq!(normalize_path("/other/user/7", "/app"), "/other/user/7");
    }

    #[test]
    fn test_mount_prefix_root_is_ignored() {
        assert_eq!(normalize_path("/user/7", "/"), "/user/7");
        assert_eq!(normalize_path("/user/7", ""), "/user/7");
    }

    #[test]
    fn test_traversal_fallback() {
        assert_eq!(normalize_path("/a//b/../c?x=1", ""), "/");
        assert_eq!(normalize_path("/..", ""), "/");
        assert_eq!(normalize_path("/%2e%2e/etc", ""), "/");
    }

    #[test]
    fn test_traversal_check_runs_after_decoding() {
        // ".." assembled only after percent-decoding still triggers
        assert_eq!(normalize_path("/a/%2e./b", ""), "/");
    }
}
