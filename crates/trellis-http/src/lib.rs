//! # trellis-http
//!
//! HTTP layer for the trellis framework. Provides [`HttpRequest`] and
//! [`HttpResponse`] types, [`QueryDict`] for GET/POST parameter access, and
//! the [`routing`] module: the regex-based route table, request-path
//! normalization, and handler dispatch.

use std::future::Future;
use std::pin::Pin;

pub mod querydict;
pub mod request;
pub mod response;
pub mod routing;

pub use querydict::QueryDict;
pub use request::HttpRequest;
pub use response::{HttpResponse, JsonResponse};
pub use routing::router::Router;

/// The boxed future type returned by route handlers.
pub type BoxFuture = Pin<Box<dyn Future<Output = HttpResponse> + Send>>;
