//! The route table and request dispatch.
//!
//! [`Router`] keeps an ordered route list per HTTP method. Registration
//! compiles the path template immediately, so malformed routes fail at
//! startup; dispatch normalizes the request path and scans the method's
//! routes in registration order, invoking the first match.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use http::Method;
use tracing::Instrument;

use trellis_core::{TrellisError, TrellisResult};

use crate::routing::normalize::normalize_path;
use crate::routing::pattern::{PathParams, RoutePattern};
use crate::routing::registry::HandlerRegistry;
use crate::{BoxFuture, HttpRequest, HttpResponse};

/// A typed route handler: a request plus extracted path parameters in, a
/// boxed response future out.
pub type RouteHandler = Arc<dyn Fn(HttpRequest, PathParams) -> BoxFuture + Send + Sync>;

/// What a route invokes when it matches.
///
/// `Inline` carries the handler closure directly. `Bound` names a
/// controller method to be resolved through the router's
/// [`HandlerRegistry`] at dispatch time.
#[derive(Clone)]
pub enum Handler {
    /// A handler closure attached directly to the route.
    Inline(RouteHandler),
    /// A `controller@method` reference resolved via the registry.
    Bound { controller: String, method: String },
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Inline(_) => f.write_str("Handler::Inline(..)"),
            Self::Bound { controller, method } => {
                write!(f, "Handler::Bound({controller}@{method})")
            }
        }
    }
}

impl Handler {
    /// Wraps a closure as an inline handler.
    pub fn inline<F>(f: F) -> Self
    where
        F: Fn(HttpRequest, PathParams) -> BoxFuture + Send + Sync + 'static,
    {
        Self::Inline(Arc::new(f))
    }

    /// Creates a registry-bound handler reference.
    pub fn bound(controller: impl Into<String>, method: impl Into<String>) -> Self {
        Self::Bound {
            controller: controller.into(),
            method: method.into(),
        }
    }

    /// Parses a `"Controller@method"` specification.
    ///
    /// # Errors
    ///
    /// Returns [`TrellisError::MalformedHandlerSpec`] when the string lacks
    /// an `@` separator or either side of it is empty.
    pub fn parse(spec: &str) -> TrellisResult<Self> {
        match spec.split_once('@') {
            Some((controller, method)) if !controller.is_empty() && !method.is_empty() => {
                Ok(Self::bound(controller, method))
            }
            _ => Err(TrellisError::MalformedHandlerSpec(spec.to_string())),
        }
    }
}

/// A registered route: a compiled pattern and the handler it invokes.
#[derive(Debug, Clone)]
pub struct Route {
    pattern: RoutePattern,
    handler: Handler,
}

impl Route {
    /// Returns the route's compiled pattern.
    pub const fn pattern(&self) -> &RoutePattern {
        &self.pattern
    }

    /// Returns the route's handler.
    pub const fn handler(&self) -> &Handler {
        &self.handler
    }
}

/// The result of resolving a path against the route table.
#[derive(Debug)]
pub struct RouteMatch<'a> {
    /// The handler of the matched route.
    pub handler: &'a Handler,
    /// Parameters captured from the path, in template declaration order.
    pub params: PathParams,
}

/// The built-in page served when no route matches and no custom not-found
/// handler is registered.
const FALLBACK_404_PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>404 - Page Not Found</title>
    <style>
        body {
            margin: 0;
            font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", sans-serif;
            background: linear-gradient(135deg, #667eea 0%, #764ba2 100%);
            color: #fff;
            display: flex;
            align-items: center;
            justify-content: center;
            min-height: 100vh;
            text-align: center;
        }
        h1 { font-size: 6rem; margin: 0; }
        p { font-size: 1.25rem; opacity: 0.85; }
        a { color: #fff; }
    </style>
</head>
<body>
    <div>
        <h1>404</h1>
        <p>The page you are looking for could not be found.</p>
        <p><a href="/">Return home</a></p>
    </div>
</body>
</html>
"#;

/// The regex-based URL router.
///
/// Routes are registered per HTTP method and matched in registration order;
/// the first matching route wins. Re-registering a path for the same method
/// replaces the earlier handler in place, keeping its original position.
///
/// Dispatch takes `&self`, so a built router can be shared behind an `Arc`
/// and serve any number of concurrent requests.
///
/// # Examples
///
/// ```
/// use trellis_http::routing::{Handler, Router};
/// use trellis_http::{HttpRequest, HttpResponse};
///
/// # tokio_test::block_on(async {
/// let mut router = Router::new();
/// router
///     .get("/", Handler::inline(|_request, _params| {
///         Box::pin(async { HttpResponse::ok("home") })
///     }))
///     .unwrap();
///
/// let response = router
///     .dispatch(HttpRequest::builder().path("/").build())
///     .await
///     .unwrap();
/// assert_eq!(response.content_str(), "home");
/// # });
/// ```
#[derive(Default)]
pub struct Router {
    routes: HashMap<Method, Vec<Route>>,
    registry: HandlerRegistry,
    not_found: Option<Handler>,
    mount_prefix: String,
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router")
            .field("route_count", &self.route_count())
            .field("registry", &self.registry)
            .field("mount_prefix", &self.mount_prefix)
            .finish_non_exhaustive()
    }
}

impl Router {
    /// Creates an empty router.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the mount prefix stripped from incoming paths, for applications
    /// served under a subdirectory.
    pub fn set_mount_prefix(&mut self, prefix: impl Into<String>) -> &mut Self {
        self.mount_prefix = prefix.into();
        self
    }

    /// Returns the handler registry for registering controller methods.
    pub fn registry_mut(&mut self) -> &mut HandlerRegistry {
        &mut self.registry
    }

    /// Registers a route for an arbitrary HTTP method.
    ///
    /// The path template is compiled immediately. If a route with the same
    /// compiled pattern already exists for this method, its handler is
    /// replaced and the route keeps its position in the table.
    ///
    /// # Errors
    ///
    /// Returns [`TrellisError::EmptyRoutePath`] for an empty path and
    /// [`TrellisError::ImproperlyConfigured`] when the template does not
    /// compile.
    pub fn register(
        &mut self,
        method: Method,
        path: &str,
        handler: Handler,
    ) -> TrellisResult<&mut Self> {
        let pattern = RoutePattern::compile(path)?;
        let routes = self.routes.entry(method).or_default();

        if let Some(existing) = routes
            .iter_mut()
            .find(|route| route.pattern.pattern_str() == pattern.pattern_str())
        {
            existing.handler = handler;
        } else {
            routes.push(Route { pattern, handler });
        }
        Ok(self)
    }

    /// Registers a GET route.
    ///
    /// # Errors
    ///
    /// See [`Router::register`].
    pub fn get(&mut self, path: &str, handler: Handler) -> TrellisResult<&mut Self> {
        self.register(Method::GET, path, handler)
    }

    /// Registers a POST route.
    ///
    /// # Errors
    ///
    /// See [`Router::register`].
    pub fn post(&mut self, path: &str, handler: Handler) -> TrellisResult<&mut Self> {
        self.register(Method::POST, path, handler)
    }

    /// Registers a PUT route.
    ///
    /// # Errors
    ///
    /// See [`Router::register`].
    pub fn put(&mut self, path: &str, handler: Handler) -> TrellisResult<&mut Self> {
        self.register(Method::PUT, path, handler)
    }

    /// Registers a DELETE route.
    ///
    /// # Errors
    ///
    /// See [`Router::register`].
    pub fn delete(&mut self, path: &str, handler: Handler) -> TrellisResult<&mut Self> {
        self.register(Method::DELETE, path, handler)
    }

    /// Registers a PATCH route.
    ///
    /// # Errors
    ///
    /// See [`Router::register`].
    pub fn patch(&mut self, path: &str, handler: Handler) -> TrellisResult<&mut Self> {
        self.register(Method::PATCH, path, handler)
    }

    /// Sets the handler invoked when no route matches.
    ///
    /// The handler's response status is forced to 404 regardless of what it
    /// returns.
    pub fn set_not_found(&mut self, handler: Handler) -> &mut Self {
        self.not_found = Some(handler);
        self
    }

    /// Returns the routes registered for the given method, in order.
    pub fn routes_for(&self, method: &Method) -> &[Route] {
        self.routes.get(method).map_or(&[], Vec::as_slice)
    }

    /// Returns the total number of registered routes across all methods.
    pub fn route_count(&self) -> usize {
        self.routes.values().map(Vec::len).sum()
    }

    /// Resolves a normalized path against the route table.
    ///
    /// Scans the method's routes in registration order and returns the
    /// first match, or `None` when nothing matches.
    pub fn resolve(&self, method: &Method, path: &str) -> Option<RouteMatch<'_>> {
        self.routes.get(method)?.iter().find_map(|route| {
            route.pattern.matches(path).map(|params| RouteMatch {
                handler: &route.handler,
                params,
            })
        })
    }

    /// Dispatches a request to its matching handler.
    ///
    /// The request path is normalized, the route table is consulted, and
    /// the matched handler is awaited. When no route matches, the
    /// registered not-found handler runs (with its status forced to 404) or
    /// the built-in 404 page is returned.
    ///
    /// # Errors
    ///
    /// Returns [`TrellisError::HandlerNotRegistered`] when a matched route
    /// names a `controller@method` absent from the registry. The caller at
    /// the server boundary turns this into a 500 response.
    pub async fn dispatch(&self, request: HttpRequest) -> TrellisResult<HttpResponse> {
        let path = normalize_path(request.path(), &self.mount_prefix);
        let span = trellis_core::logging::request_span(request.method().as_str(), &path);

        async move {
            if let Some(matched) = self.resolve(request.method(), &path) {
                tracing::debug!(params = matched.params.len(), "route matched");
                let handler = self.materialize(matched.handler)?;
                let params = matched.params;
                return Ok(handler(request, params).await);
            }

            tracing::debug!("no route matched");
            if let Some(not_found) = &self.not_found {
                let handler = self.materialize(not_found)?;
                let mut response = handler(request, PathParams::new()).await;
                response.set_status(http::StatusCode::NOT_FOUND);
                return Ok(response);
            }

            Ok(HttpResponse::not_found(FALLBACK_404_PAGE))
        }
        .instrument(span)
        .await
    }

    /// Resolves a [`Handler`] to an invocable closure, consulting the
    /// registry for bound handlers.
    fn materialize(&self, handler: &Handler) -> TrellisResult<RouteHandler> {
        match handler {
            Handler::Inline(f) => Ok(Arc::clone(f)),
            Handler::Bound { controller, method } => self
                .registry
                .lookup(controller, method)
                .ok_or_else(|| TrellisError::HandlerNotRegistered {
                    controller: controller.clone(),
                    method: method.clone(),
                }),
        }
    }
}
