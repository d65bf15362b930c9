//! # trellis
//!
//! A minimal MVC web routing framework for Rust.
//!
//! This is the meta-crate that re-exports the sub-crates for convenient
//! access. Depend on `trellis` to get the whole framework, or on individual
//! crates for finer-grained control.
//!
//! # Examples
//!
//! ```no_run
//! use trellis::core::Settings;
//! use trellis::http::routing::{Handler, Router};
//! use trellis::http::HttpResponse;
//! use trellis::views::middleware::builtin::SecurityMiddleware;
//! use trellis::views::App;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), trellis::core::TrellisError> {
//!     let settings = Settings::default();
//!     trellis::core::logging::setup_logging(&settings);
//!
//!     let mut router = Router::new();
//!     router.get("/", Handler::inline(|_request, _params| {
//!         Box::pin(async { HttpResponse::ok("Hello, trellis!") })
//!     }))?;
//!
//!     App::new(settings)
//!         .router(router)
//!         .middleware(SecurityMiddleware::default())
//!         .run()
//!         .await
//! }
//! ```

/// Core types: settings, errors, logging, and text utilities.
pub use trellis_core as core;

/// HTTP layer: request, response, and the regex route table.
pub use trellis_http as http;

/// View layer: controllers, templates, CSRF, middleware, and the server.
pub use trellis_views as views;

pub use trellis_core::{Settings, TrellisError, TrellisResult};
pub use trellis_http::{HttpRequest, HttpResponse, JsonResponse};
pub use trellis_views::{App, Controller};
