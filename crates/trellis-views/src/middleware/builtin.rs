//! Built-in middleware.
//!
//! - [`SecurityMiddleware`]: sets security headers on every response
//! - [`RequestLogMiddleware`]: logs one line per handled request

use async_trait::async_trait;

use trellis_core::TrellisError;
use trellis_http::{HttpRequest, HttpResponse};

use super::Middleware;

/// Sets security-related HTTP headers on every response:
///
/// - `X-Content-Type-Options: nosniff`
/// - `X-Frame-Options: DENY` (configurable)
/// - `X-XSS-Protection: 1; mode=block`
/// - `Referrer-Policy: strict-origin-when-cross-origin` (configurable)
#[derive(Debug, Clone)]
pub struct SecurityMiddleware {
    /// The value for the `X-Frame-Options` header.
    pub x_frame_options: String,
    /// The value for the `Referrer-Policy` header.
    pub referrer_policy: String,
}

impl Default for SecurityMiddleware {
    fn default() -> Self {
        Self {
            x_frame_options: "DENY".to_string(),
            referrer_policy: "strict-origin-when-cross-origin".to_string(),
        }
    }
}

#[async_trait]
impl Middleware for SecurityMiddleware {
    async fn process_request(&self, _request: &mut HttpRequest) -> Option<HttpResponse> {
        None
    }

    async fn process_response(
        &self,
        _request: &HttpRequest,
        mut response: HttpResponse,
    ) -> HttpResponse {
        response.headers_mut().insert(
            http::header::HeaderName::from_static("x-content-type-options"),
            http::header::HeaderValue::from_static("nosniff"),
        );
        if let Ok(value) = http::header::HeaderValue::from_str(&self.x_frame_options) {
            response.headers_mut().insert(
                http::header::HeaderName::from_static("x-frame-options"),
                value,
            );
        }
        response.headers_mut().insert(
            http::header::HeaderName::from_static("x-xss-protection"),
            http::header::HeaderValue::from_static("1; mode=block"),
        );
        if let Ok(value) = http::header::HeaderValue::from_str(&self.referrer_policy) {
            response.headers_mut().insert(
                http::header::HeaderName::from_static("referrer-policy"),
                value,
            );
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

/// Logs one structured line per handled request with method, path, and
/// response status.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestLogMiddleware;

#[async_trait]
impl Middleware for RequestLogMiddleware {
    async fn process_request(&self, _request: &mut HttpRequest) -> Option<HttpResponse> {
        None
    }

    async fn process_response(
        &self,
        request: &HttpRequest,
        response: HttpResponse,
    ) -> HttpResponse {
        tracing::info!(
            method = %request.method(),
            path = request.path(),
            status = response.status().as_u16(),
            "request handled"
        );
        response
    }

    async fn process_exception(
        &self,
        request: &HttpRequest,
        error: &TrellisError,
    ) -> Option<HttpResponse> {
        tracing::error!(
            method = %request.method(),
            path = request.path(),
            %error,
            "request failed"
        );
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_security_headers_set() {
        let mw = SecurityMiddleware::default();
        let request = HttpRequest::builder().build();
        let response = mw.process_response(&request, HttpResponse::ok("x")).await;

        let headers = response.headers();
        assert_eq!(headers.get("x-content-type-options").unwrap(), "nosniff");
        assert_eq!(headers.get("x-frame-options").unwrap(), "DENY");
        assert_eq!(headers.get("x-xss-protection").unwrap(), "1; mode=block");
        assert_eq!(
            headers.get("referrer-policy").unwrap(),
            "strict-origin-when-cross-origin"
        );
    }

    #[tokio::test]
    async fn test_custom_frame_options() {
        let mw = SecurityMiddleware {
            x_frame_options: "SAMEORIGIN".to_string(),
            ..SecurityMiddleware::default()
        };
        let request = HttpRequest::builder().build();
        let response = mw.process_response(&request, HttpResponse::ok("x")).await;
        assert_eq!(
            response.headers().get("x-frame-options").unwrap(),
            "SAMEORIGIN"
        );
    }

    #[tokio::test]
    async fn test_request_log_passes_through() {
        let mw = RequestLogMiddleware;
        let mut request = HttpRequest::builder().build();
        assert!(mw.process_request(&mut request).await.is_none());

        let response = mw
            .process_response(&request, HttpResponse::ok("body"))
            .await;
        assert_eq!(response.content_str(), "body");
    }
}
