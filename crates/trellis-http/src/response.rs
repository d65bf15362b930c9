//! HTTP response types.
//!
//! [`HttpResponse`] carries a status code, headers, and a body, with
//! constructors for the common cases. [`JsonResponse`] serializes data as
//! JSON, and the redirect helpers produce 302/301 responses with a
//! `Location` header. Responses convert into axum responses via
//! [`IntoResponse`].

use std::borrow::Cow;

use axum::response::IntoResponse;
use http::{HeaderMap, HeaderValue, StatusCode};

/// An HTTP response.
///
/// # Examples
///
/// ```
/// use trellis_http::HttpResponse;
///
/// let response = HttpResponse::ok("Hello, World!");
/// assert_eq!(response.status(), http::StatusCode::OK);
/// assert_eq!(response.content_str(), "Hello, World!");
/// ```
#[derive(Debug)]
pub struct HttpResponse {
    status: StatusCode,
    headers: HeaderMap,
    content: Vec<u8>,
    content_type: String,
    charset: String,
}

impl HttpResponse {
    /// Creates a response with the given status code and text body.
    ///
    /// The content type defaults to `text/html`.
    pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            content: body.into().into_bytes(),
            content_type: "text/html".to_string(),
            charset: "utf-8".to_string(),
        }
    }

    /// Creates a 200 OK response with the given body.
    pub fn ok(body: impl Into<String>) -> Self {
        Self::new(StatusCode::OK, body)
    }

    /// Creates a 400 Bad Request response.
    pub fn bad_request(body: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, body)
    }

    /// Creates a 403 Forbidden response.
    pub fn forbidden(body: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, body)
    }

    /// Creates a 404 Not Found response.
    pub fn not_found(body: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, body)
    }

    /// Creates a 500 Internal Server Error response.
    pub fn server_error(body: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, body)
    }

    /// Creates a 302 Found redirect to the given URL.
    pub fn redirect(url: &str) -> Self {
        Self::redirect_with_status(StatusCode::FOUND, url)
    }

    /// Creates a 301 Moved Permanently redirect to the given URL.
    pub fn redirect_permanent(url: &str) -> Self {
        Self::redirect_with_status(StatusCode::MOVED_PERMANENTLY, url)
    }

    fn redirect_with_status(status: StatusCode, url: &str) -> Self {
        let mut response = Self::new(status, "");
        if let Ok(value) = HeaderValue::from_str(url) {
            response.headers.insert(http::header::LOCATION, value);
        }
        response
    }

    /// Returns the status code.
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Sets the status code.
    pub fn set_status(&mut self, status: StatusCode) {
        self.status = status;
    }

    /// Returns a reference to the headers.
    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns a mutable reference to the headers.
    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    /// Adds a header to the response, consuming and returning it.
    #[must_use]
    pub fn set_header(mut self, name: http::header::HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Returns the content type (without charset).
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// Sets the content type.
    pub fn set_content_type(&mut self, content_type: impl Into<String>) {
        self.content_type = content_type.into();
    }

    /// Returns the body bytes.
    pub fn content(&self) -> &[u8] {
        &self.content
    }

    /// Returns the body as a string (lossy for non-UTF-8 bodies).
    pub fn content_str(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.content)
    }

    /// Returns the full content type header value including charset for
    /// text and JSON bodies.
    fn full_content_type(&self) -> String {
        if self.content_type.starts_with("text/") || self.content_type.contains("json") {
            format!("{}; charset={}", self.content_type, self.charset)
        } else {
            self.content_type.clone()
        }
    }
}

impl IntoResponse for HttpResponse {
    fn into_response(self) -> axum::response::Response {
        let mut builder = axum::response::Response::builder().status(self.status);

        if let Ok(ct) = HeaderValue::from_str(&self.full_content_type()) {
            builder = builder.header(http::header::CONTENT_TYPE, ct);
        }

        let response = builder
            .body(axum::body::Body::from(self.content))
            .unwrap_or_else(|_| {
                axum::response::Response::builder()
                    .status(StatusCode::INTERNAL_SERVER_ERROR)
                    .body(axum::body::Body::from("Internal Server Error"))
                    .expect("fallback response should always be valid")
            });

        let (mut parts, body) = response.into_parts();
        for (key, value) in &self.headers {
            parts.headers.insert(key, value.clone());
        }
        axum::response::Response::from_parts(parts, body)
    }
}

/// A JSON response constructor.
///
/// Serializes the given data with serde and sets the content type to
/// `application/json`.
pub struct JsonResponse;

impl JsonResponse {
    /// Creates a 200 OK JSON response from a serializable value.
    ///
    /// Serialization failures produce a 500 response rather than an error:
    /// by the time a handler is building its response there is nothing
    /// better to do with the failure.
    pub fn new<T: serde::Serialize>(data: &T) -> HttpResponse {
        Self::with_status(StatusCode::OK, data)
    }

    /// Creates a JSON response with a custom status code.
    pub fn with_status<T: serde::Serialize>(status: StatusCode, data: &T) -> HttpResponse {
        match serde_json::to_string(data) {
            Ok(json) => {
                let mut response = HttpResponse::new(status, json);
                response.set_content_type("application/json");
                response
            }
            Err(e) => HttpResponse::server_error(format!("JSON serialization error: {e}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ok_response() {
        let response = HttpResponse::ok("hello");
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.content_str(), "hello");
        assert_eq!(response.content_type(), "text/html");
    }

    #[test]
    fn test_status_constructors() {
        assert_eq!(
            HttpResponse::bad_request("x").status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(HttpResponse::forbidden("x").status(), StatusCode::FORBIDDEN);
        assert_eq!(HttpResponse::not_found("x").status(), StatusCode::NOT_FOUND);
        assert_eq!(
            HttpResponse::server_error("x").status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_redirect() {
        let response = HttpResponse::redirect("/home");
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(
            response.headers().get(http::header::LOCATION).unwrap(),
            "/home"
        );
    }

    #[test]
    fn test_redirect_permanent() {
        let response = HttpResponse::redirect_permanent("/new-home");
        assert_eq!(response.status(), StatusCode::MOVED_PERMANENTLY);
        assert_eq!(
            response.headers().get(http::header::LOCATION).unwrap(),
            "/new-home"
        );
    }

    #[test]
    fn test_json_response() {
        let data = serde_json::json!({"success": true, "count": 3});
        let response = JsonResponse::new(&data);
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.content_type(), "application/json");
        assert!(response.content_str().contains("\"success\":true"));
    }

    #[test]
    fn test_json_response_with_status() {
        let data = serde_json::json!({"error": "nope"});
        let response = JsonResponse::with_status(StatusCode::BAD_REQUEST, &data);
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_full_content_type_includes_charset() {
        let response = HttpResponse::ok("x");
        assert_eq!(response.full_content_type(), "text/html; charset=utf-8");

        let mut response = HttpResponse::ok("{}");
        response.set_content_type("application/json");
        assert_eq!(
            response.full_content_type(),
            "application/json; charset=utf-8"
        );

        let mut response = HttpResponse::ok("");
        response.set_content_type("application/octet-stream");
        assert_eq!(response.full_content_type(), "application/octet-stream");
    }

    #[test]
    fn test_set_header() {
        let response = HttpResponse::ok("x").set_header(
            http::header::HeaderName::from_static("x-custom"),
            HeaderValue::from_static("value"),
        );
        assert_eq!(response.headers().get("x-custom").unwrap(), "value");
    }
}
