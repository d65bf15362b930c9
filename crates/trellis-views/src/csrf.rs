//! CSRF protection.
//!
//! Uses the cookie double-submit pattern: a random token is set as a cookie
//! on safe requests, and state-changing requests must echo the same token in
//! a form field or header. Tokens are compared in constant time.

use async_trait::async_trait;
use rand::RngCore;

use trellis_core::TrellisError;
use trellis_http::{HttpRequest, HttpResponse};

use crate::middleware::Middleware;

/// Token length in bytes; hex encoding doubles it to 64 characters.
const TOKEN_LENGTH: usize = 32;

/// Name of the CSRF cookie.
pub const COOKIE_NAME: &str = "csrf_token";

/// Name of the form field carrying the token on POST submissions.
pub const FORM_FIELD: &str = "csrf_token";

/// Name of the request header carrying the token for non-form clients.
pub const HEADER_NAME: &str = "x-csrf-token";

/// Generates a random CSRF token as a 64-character hex string.
pub fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_LENGTH];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex_encode(&bytes)
}

fn hex_encode(bytes: &[u8]) -> String {
    use std::fmt::Write as _;
    bytes.iter().fold(String::with_capacity(bytes.len() * 2), |mut out, b| {
        write!(out, "{b:02x}").ok();
        out
    })
}

/// Compares two tokens in constant time.
///
/// Unequal lengths fail immediately; equal-length comparison always examines
/// every byte.
pub fn constant_time_eq(a: &str, b: &str) -> bool {
    let a = a.as_bytes();
    let b = b.as_bytes();
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}

/// Extracts the submitted token from the request: the form field first, then
/// the header.
pub fn request_token(request: &HttpRequest) -> Option<String> {
    if let Some(token) = request.post().get(FORM_FIELD) {
        return Some(token.to_string());
    }
    request
        .headers()
        .get(HEADER_NAME)
        .and_then(|v| v.to_str().ok())
        .map(String::from)
}

/// Validates the submitted token against the CSRF cookie.
pub fn validate(request: &HttpRequest) -> bool {
    let Some(cookie) = request.cookie(COOKIE_NAME) else {
        return false;
    };
    let Some(submitted) = request_token(request) else {
        return false;
    };
    constant_time_eq(&submitted, &cookie)
}

/// Builds the `Set-Cookie` value for the CSRF cookie.
fn build_cookie(token: &str) -> String {
    format!("{COOKIE_NAME}={token}; Path=/; SameSite=Lax")
}

/// Attaches the CSRF cookie to a response.
pub fn attach_cookie(response: &mut HttpResponse, token: &str) {
    if let Ok(value) = http::HeaderValue::from_str(&build_cookie(token)) {
        response
            .headers_mut()
            .insert(http::header::SET_COOKIE, value);
    }
}

/// Middleware enforcing CSRF validation on state-changing requests.
///
/// Safe methods (GET, HEAD, OPTIONS, TRACE) pass through and get a CSRF
/// cookie set on the response if the request did not already carry one.
/// Other methods are rejected with 403 unless the submitted token matches
/// the cookie, except for paths on the exempt list.
#[derive(Debug, Clone, Default)]
pub struct CsrfGuard {
    exempt_paths: Vec<String>,
}

impl CsrfGuard {
    /// Creates a guard with no exemptions.
    pub fn new() -> Self {
        Self::default()
    }

    /// Exempts a path from CSRF validation.
    #[must_use]
    pub fn exempt(mut self, path: impl Into<String>) -> Self {
        self.exempt_paths.push(path.into());
        self
    }

    const fn is_safe_method(method: &http::Method) -> bool {
        matches!(
            *method,
            http::Method::GET | http::Method::HEAD | http::Method::OPTIONS | http::Method::TRACE
        )
    }
}

#[async_trait]
impl Middleware for CsrfGuard {
    async fn process_request(&self, request: &mut HttpRequest) -> Option<HttpResponse> {
        if Self::is_safe_method(request.method()) {
            return None;
        }
        if self.exempt_paths.iter().any(|p| p == request.path()) {
            return None;
        }

        if request.cookie(COOKIE_NAME).is_none() {
            return Some(HttpResponse::forbidden("CSRF cookie not set."));
        }
        if request_token(request).is_none() {
            return Some(HttpResponse::forbidden("CSRF token missing."));
        }
        if !validate(request) {
            tracing::warn!(path = request.path(), "CSRF token mismatch");
            return Some(HttpResponse::forbidden("CSRF token invalid."));
        }
        None
    }

    async fn process_response(
        &self,
        request: &HttpRequest,
        mut response: HttpResponse,
    ) -> HttpResponse {
        // Leave responses alone when a handler already set its own cookie
        if Self::is_safe_method(request.method())
            && request.cookie(COOKIE_NAME).is_none()
            && !response.headers().contains_key(http::header::SET_COOKIE)
        {
            attach_cookie(&mut response, &generate_token());
        }
        response
    }

    async fn process_exception(
        &self,
        _request: &HttpRequest,
        _error: &TrellisError,
    ) -> Option<HttpResponse> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_token_shape() {
        let token = generate_token();
        assert_eq!(token.len(), 64);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_generated_tokens_differ() {
        assert_ne!(generate_token(), generate_token());
    }

    #[test]
    fn test_constant_time_eq() {
        assert!(constant_time_eq("abc123", "abc123"));
        assert!(!constant_time_eq("abc123", "abc124"));
        assert!(!constant_time_eq("abc", "abcdef"));
        assert!(constant_time_eq("", ""));
    }

    #[test]
    fn test_validate_matching_tokens() {
        let token = generate_token();
        let request = HttpRequest::builder()
            .method(http::Method::POST)
            .header("cookie", &format!("{COOKIE_NAME}={token}"))
            .form_field(FORM_FIELD, token.clone())
            .build();
        assert!(validate(&request));
    }

    #[test]
    fn test_validate_rejects_mismatch() {
        let request = HttpRequest::builder()
            .method(http::Method::POST)
            .header("cookie", &format!("{COOKIE_NAME}={}", generate_token()))
            .form_field(FORM_FIELD, generate_token())
            .build();
        assert!(!validate(&request));
    }

    #[test]
    fn test_validate_header_fallback() {
        let token = generate_token();
        let request = HttpRequest::builder()
            .method(http::Method::POST)
            .header("cookie", &format!("{COOKIE_NAME}={token}"))
            .header(HEADER_NAME, &token)
            .build();
        assert!(validate(&request));
    }

    #[tokio::test]
    async fn test_guard_blocks_post_without_token() {
        let guard = CsrfGuard::new();
        let mut request = HttpRequest::builder().method(http::Method::POST).build();
        let response = guard.process_request(&mut request).await;
        assert_eq!(
            response.map(|r| r.status()),
            Some(http::StatusCode::FORBIDDEN)
        );
    }

    #[tokio::test]
    async fn test_guard_passes_get_and_sets_cookie() {
        let guard = CsrfGuard::new();
        let mut request = HttpRequest::builder().build();
        assert!(guard.process_request(&mut request).await.is_none());

        let response = guard
            .process_response(&request, HttpResponse::ok("page"))
            .await;
        let cookie = response
            .headers()
            .get(http::header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .unwrap();
        assert!(cookie.starts_with("csrf_token="));
        assert!(cookie.contains("SameSite=Lax"));
    }

    #[tokio::test]
    async fn test_guard_exempt_path() {
        let guard = CsrfGuard::new().exempt("/webhook");
        let mut request = HttpRequest::builder()
            .method(http::Method::POST)
            .path("/webhook")
            .build();
        assert!(guard.process_request(&mut request).await.is_none());
    }

    #[tokio::test]
    async fn test_guard_allows_valid_post() {
        let token = generate_token();
        let guard = CsrfGuard::new();
        let mut request = HttpRequest::builder()
            .method(http::Method::POST)
            .header("cookie", &format!("{COOKIE_NAME}={token}"))
            .form_field(FORM_FIELD, token.clone())
            .build();
        assert!(guard.process_request(&mut request).await.is_none());
    }
}
