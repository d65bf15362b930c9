//! URL routing: the route table, pattern compilation, and dispatch.
//!
//! This module is the core of the framework:
//!
//! - [`pattern`]: `{name}` path templates compiled to anchored regexes
//! - [`normalize`]: request-path normalization (decoding, slash collapsing,
//!   mount-prefix stripping, traversal fallback)
//! - [`registry`]: the typed controller/method handler registry
//! - [`router`]: the per-method route table, registration API, and dispatch
//!
//! # Examples
//!
//! ```
//! use trellis_http::routing::router::{Handler, Router};
//! use trellis_http::{HttpRequest, HttpResponse};
//!
//! # tokio_test::block_on(async {
//! let mut router = Router::new();
//! router
//!     .get(
//!         "/user/{id}",
//!         Handler::inline(|_request, params| {
//!             let id = params.get("id").unwrap_or("?").to_string();
//!             Box::pin(async move { HttpResponse::ok(format!("user {id}")) })
//!         }),
//!     )
//!     .unwrap();
//!
//! let request = HttpRequest::builder().path("/user/42").build();
//! let response = router.dispatch(request).await.unwrap();
//! assert_eq!(response.content_str(), "user 42");
//! # });
//! ```

pub mod normalize;
pub mod pattern;
pub mod registry;
pub mod router;

pub use normalize::normalize_path;
pub use pattern::{PathParams, RoutePattern};
pub use registry::HandlerRegistry;
pub use router::{Handler, Route, RouteHandler, RouteMatch, Router};
