//! HTTP request type.
//!
//! [`HttpRequest`] provides access to the request method, path, headers,
//! query parameters, and form-encoded POST data. Instances are created from
//! incoming axum request parts at the server boundary, or via the builder in
//! tests.

use http::{HeaderMap, Method};

use crate::querydict::QueryDict;

/// An incoming HTTP request.
///
/// The raw path is kept as received; route-matching normalization happens
/// inside the router, not here.
///
/// # Examples
///
/// ```
/// use trellis_http::HttpRequest;
///
/// let request = HttpRequest::builder()
///     .method(http::Method::GET)
///     .path("/user/42")
///     .query_string("page=1")
///     .build();
///
/// assert_eq!(request.method(), &http::Method::GET);
/// assert_eq!(request.path(), "/user/42");
/// assert_eq!(request.get().get("page"), Some("1"));
/// ```
#[derive(Debug, Clone)]
pub struct HttpRequest {
    method: Method,
    path: String,
    query_string: String,
    content_type: Option<String>,
    get: QueryDict,
    post: QueryDict,
    headers: HeaderMap,
    body: Vec<u8>,
}

impl HttpRequest {
    /// Creates a new [`HttpRequestBuilder`].
    pub fn builder() -> HttpRequestBuilder {
        HttpRequestBuilder::default()
    }

    /// Creates an `HttpRequest` from axum request parts and body bytes.
    ///
    /// Form-encoded bodies (`application/x-www-form-urlencoded`) are parsed
    /// into the POST dictionary; other body types are kept raw.
    pub fn from_axum(parts: http::request::Parts, body: Vec<u8>) -> Self {
        let path = parts.uri.path().to_string();
        let query_string = parts.uri.query().unwrap_or("").to_string();
        let get = QueryDict::parse(&query_string);

        let content_type = parts
            .headers
            .get(http::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(String::from);

        let post = if content_type
            .as_deref()
            .is_some_and(|ct| ct.starts_with("application/x-www-form-urlencoded"))
        {
            QueryDict::parse(&String::from_utf8_lossy(&body))
        } else {
            QueryDict::new()
        };

        Self {
            method: parts.method,
            path,
            query_string,
            content_type,
            get,
            post,
            headers: parts.headers,
            body,
        }
    }

    /// Returns the HTTP method.
    pub const fn method(&self) -> &Method {
        &self.method
    }

    /// Returns the raw request path (without query string).
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the raw query string (without the leading `?`).
    pub fn query_string(&self) -> &str {
        &self.query_string
    }

    /// Returns the content type of the request body, if set.
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    /// Returns the parsed query string parameters.
    pub const fn get(&self) -> &QueryDict {
        &self.get
    }

    /// Returns the parsed form-encoded POST parameters.
    pub const fn post(&self) -> &QueryDict {
        &self.post
    }

    /// Returns the request headers.
    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns the raw request body.
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Returns the value of the named cookie, if present.
    pub fn cookie(&self, name: &str) -> Option<String> {
        let header = self
            .headers
            .get(http::header::COOKIE)
            .and_then(|v| v.to_str().ok())?;

        for cookie in header.split(';') {
            let cookie = cookie.trim();
            if let Some(value) = cookie.strip_prefix(name) {
                if let Some(value) = value.strip_prefix('=') {
                    return Some(value.to_string());
                }
            }
        }
        None
    }
}

/// Builder for [`HttpRequest`], primarily for tests and handlers invoked
/// outside a live server.
#[derive(Debug, Default)]
pub struct HttpRequestBuilder {
    method: Option<Method>,
    path: Option<String>,
    query_string: Option<String>,
    content_type: Option<String>,
    headers: HeaderMap,
    body: Vec<u8>,
    form: Vec<(String, String)>,
}

impl HttpRequestBuilder {
    /// Sets the HTTP method (default: GET).
    #[must_use]
    pub fn method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    /// Sets the request path (default: `/`).
    #[must_use]
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Sets the query string (without the leading `?`).
    #[must_use]
    pub fn query_string(mut self, query_string: impl Into<String>) -> Self {
        self.query_string = Some(query_string.into());
        self
    }

    /// Sets the content type.
    #[must_use]
    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Adds a header. Invalid names or values are silently skipped.
    #[must_use]
    pub fn header(mut self, name: &str, value: &str) -> Self {
        if let (Ok(name), Ok(value)) = (
            http::header::HeaderName::try_from(name),
            http::header::HeaderValue::from_str(value),
        ) {
            self.headers.insert(name, value);
        }
        self
    }

    /// Sets the raw body.
    #[must_use]
    pub fn body(mut self, body: Vec<u8>) -> Self {
        self.body = body;
        self
    }

    /// Adds a form field to the POST dictionary.
    #[must_use]
    pub fn form_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.form.push((key.into(), value.into()));
        self
    }

    /// Builds the request.
    pub fn build(self) -> HttpRequest {
        let query_string = self.query_string.unwrap_or_default();
        let get = QueryDict::parse(&query_string);

        let mut post = QueryDict::new();
        for (key, value) in &self.form {
            post.append(key, value);
        }

        HttpRequest {
            method: self.method.unwrap_or(Method::GET),
            path: self.path.unwrap_or_else(|| "/".to_string()),
            query_string,
            content_type: self.content_type,
            get,
            post,
            headers: self.headers,
            body: self.body,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let request = HttpRequest::builder().build();
        assert_eq!(request.method(), &Method::GET);
        assert_eq!(request.path(), "/");
        assert!(request.get().is_empty());
        assert!(request.post().is_empty());
        assert!(request.body().is_empty());
    }

    #[test]
    fn test_builder_query_string_parsed() {
        let request = HttpRequest::builder()
            .query_string("a=1&b=two")
            .build();
        assert_eq!(request.get().get("a"), Some("1"));
        assert_eq!(request.get().get("b"), Some("two"));
    }

    #[test]
    fn test_builder_form_fields() {
        let request = HttpRequest::builder()
            .method(Method::POST)
            .form_field("name", "alice")
            .form_field("email", "a@example.com")
            .build();
        assert_eq!(request.post().get("name"), Some("alice"));
        assert_eq!(request.post().get("email"), Some("a@example.com"));
    }

    #[test]
    fn test_cookie_parsing() {
        let request = HttpRequest::builder()
            .header("cookie", "session=abc; csrf_token=xyz123")
            .build();
        assert_eq!(request.cookie("csrf_token"), Some("xyz123".to_string()));
        assert_eq!(request.cookie("session"), Some("abc".to_string()));
        assert_eq!(request.cookie("missing"), None);
    }

    #[test]
    fn test_from_axum_parses_form_body() {
        let (parts, ()) = http::Request::builder()
            .method(Method::POST)
            .uri("/contact?src=footer")
            .header("content-type", "application/x-www-form-urlencoded")
            .body(())
            .unwrap()
            .into_parts();

        let request = HttpRequest::from_axum(parts, b"name=bob&message=hi+there".to_vec());
        assert_eq!(request.path(), "/contact");
        assert_eq!(request.get().get("src"), Some("footer"));
        assert_eq!(request.post().get("name"), Some("bob"));
        assert_eq!(request.post().get("message"), Some("hi there"));
    }

    #[test]
    fn test_from_axum_non_form_body_kept_raw() {
        let (parts, ()) = http::Request::builder()
            .method(Method::POST)
            .uri("/api")
            .header("content-type", "application/json")
            .body(())
            .unwrap()
            .into_parts();

        let request = HttpRequest::from_axum(parts, b"{\"k\":1}".to_vec());
        assert!(request.post().is_empty());
        assert_eq!(request.body(), b"{\"k\":1}");
    }
}
