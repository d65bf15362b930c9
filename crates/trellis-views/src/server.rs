//! HTTP server integration.
//!
//! [`App`] combines settings, the router, and the middleware pipeline into a
//! runnable axum-based server. Dispatch errors that no middleware converts
//! are turned into an error page here: detailed in debug mode, generic in
//! production.
//!
//! # Examples
//!
//! ```no_run
//! use trellis_core::Settings;
//! use trellis_http::routing::{Handler, Router};
//! use trellis_http::HttpResponse;
//! use trellis_views::middleware::builtin::SecurityMiddleware;
//! use trellis_views::App;
//!
//! # async fn example() -> Result<(), trellis_core::TrellisError> {
//! let mut router = Router::new();
//! router.get("/", Handler::inline(|_request, _params| {
//!     Box::pin(async { HttpResponse::ok("Hello!") })
//! }))?;
//!
//! let app = App::new(Settings::default())
//!     .router(router)
//!     .middleware(SecurityMiddleware::default());
//! app.run().await?;
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use axum::body::Body;
use axum::extract::Request;
use axum::response::IntoResponse;
use axum::routing::any;

use trellis_core::utils::escape_html;
use trellis_core::{Settings, TrellisError, TrellisResult};
use trellis_http::routing::Router;
use trellis_http::{HttpRequest, HttpResponse};

use crate::middleware::{Middleware, MiddlewarePipeline, PipelineHandler};

/// The application: settings, router, and middleware, ready to serve.
pub struct App {
    settings: Settings,
    router: Router,
    middleware: MiddlewarePipeline,
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("route_count", &self.router.route_count())
            .field("middleware_count", &self.middleware.len())
            .field("debug", &self.settings.debug)
            .finish()
    }
}

impl App {
    /// Creates an application with the given settings and an empty router.
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            router: Router::new(),
            middleware: MiddlewarePipeline::new(),
        }
    }

    /// Sets the router. The router's mount prefix is aligned with the
    /// settings' base path.
    #[must_use]
    pub fn router(mut self, mut router: Router) -> Self {
        router.set_mount_prefix(self.settings.url_prefix());
        self.router = router;
        self
    }

    /// Appends a middleware to the pipeline.
    #[must_use]
    pub fn middleware(mut self, middleware: impl Middleware + 'static) -> Self {
        self.middleware.add(middleware);
        self
    }

    /// Returns the application settings.
    pub const fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Returns the number of middleware in the pipeline.
    pub fn middleware_count(&self) -> usize {
        self.middleware.len()
    }

    /// Converts the application into an axum router serving every path and
    /// method through the pipeline and route table.
    pub fn into_axum_router(self) -> axum::Router {
        let router = Arc::new(self.router);
        let middleware = Arc::new(self.middleware);
        let debug = self.settings.debug;

        let handler = move |req: Request<Body>| {
            let router = router.clone();
            let middleware = middleware.clone();

            async move {
                let (parts, body) = req.into_parts();
                let body_bytes = axum::body::to_bytes(body, usize::MAX)
                    .await
                    .unwrap_or_default()
                    .to_vec();
                let request = HttpRequest::from_axum(parts, body_bytes);

                let dispatch: PipelineHandler = Box::new(move |request: HttpRequest| {
                    let router = router.clone();
                    Box::pin(async move { router.dispatch(request).await })
                });

                let response = match middleware.process(request, &dispatch).await {
                    Ok(response) => response,
                    Err(error) => {
                        tracing::error!(%error, "unhandled dispatch error");
                        error_response(debug, &error)
                    }
                };
                response.into_response()
            }
        };

        axum::Router::new()
            .route("/{*path}", any(handler.clone()))
            .route("/", any(handler))
    }

    /// Runs the server on the settings' bind address.
    ///
    /// # Errors
    ///
    /// Returns [`TrellisError::ImproperlyConfigured`] when the address
    /// cannot be bound, and [`TrellisError::InternalServerError`] on a
    /// server runtime failure.
    pub async fn run(self) -> TrellisResult<()> {
        let addr = self.settings.bind_address.clone();
        let debug = self.settings.debug;
        let router = self.into_axum_router();

        let listener = tokio::net::TcpListener::bind(&addr).await.map_err(|e| {
            TrellisError::ImproperlyConfigured(format!("Failed to bind to {addr}: {e}"))
        })?;

        if debug {
            tracing::info!("Starting development server at http://{addr}/");
        } else {
            tracing::info!(%addr, "server started");
        }

        axum::serve(listener, router)
            .await
            .map_err(|e| TrellisError::InternalServerError(format!("Server error: {e}")))?;
        Ok(())
    }
}

/// Builds the error page for an unconverted dispatch error.
///
/// Debug mode shows the error text; production shows a generic page that
/// leaks nothing.
fn error_response(debug: bool, error: &TrellisError) -> HttpResponse {
    let status = http::StatusCode::from_u16(error.status_code())
        .unwrap_or(http::StatusCode::INTERNAL_SERVER_ERROR);

    let body = if debug {
        format!(
            r#"<!DOCTYPE html>
<html lang="en">
<head><meta charset="utf-8"><title>Error {}</title></head>
<body style="font-family: monospace; padding: 2rem;">
    <h1>Error {}</h1>
    <pre>{}</pre>
    <p>You are seeing this page because debug mode is enabled.</p>
</body>
</html>
"#,
            status.as_u16(),
            status.as_u16(),
            escape_html(&error.to_string())
        )
    } else {
        format!(
            r#"<!DOCTYPE html>
<html lang="en">
<head><meta charset="utf-8"><title>{}</title></head>
<body style="font-family: sans-serif; text-align: center; padding: 4rem;">
    <h1>{}</h1>
    <p>Something went wrong. Please try again later.</p>
</body>
</html>
"#,
            status.as_u16(),
            status.as_u16()
        )
    };

    HttpResponse::new(status, body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use trellis_http::routing::Handler;

    #[test]
    fn test_app_builder() {
        let app = App::new(Settings::default());
        assert_eq!(app.middleware_count(), 0);
        assert!(app.settings().debug);
    }

    #[test]
    fn test_app_with_router_and_middleware() {
        use crate::middleware::builtin::{RequestLogMiddleware, SecurityMiddleware};

        let mut router = Router::new();
        router
            .get(
                "/",
                Handler::inline(|_request, _params| {
                    Box::pin(async { HttpResponse::ok("home") })
                }),
            )
            .unwrap();

        let app = App::new(Settings::default())
            .router(router)
            .middleware(SecurityMiddleware::default())
            .middleware(RequestLogMiddleware);
        assert_eq!(app.middleware_count(), 2);
    }

    #[test]
    fn test_debug_error_page_shows_detail() {
        let error = TrellisError::TemplateError("missing block".to_string());
        let response = error_response(true, &error);
        assert_eq!(response.status(), http::StatusCode::INTERNAL_SERVER_ERROR);
        assert!(response.content_str().contains("missing block"));
    }

    #[test]
    fn test_production_error_page_is_generic() {
        let error = TrellisError::TemplateError("secret path /etc/x".to_string());
        let response = error_response(false, &error);
        assert_eq!(response.status(), http::StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!response.content_str().contains("secret path"));
        assert!(response.content_str().contains("Something went wrong"));
    }

    #[test]
    fn test_error_page_status_follows_error() {
        let error = TrellisError::Forbidden("no".to_string());
        let response = error_response(false, &error);
        assert_eq!(response.status(), http::StatusCode::FORBIDDEN);
    }
}
