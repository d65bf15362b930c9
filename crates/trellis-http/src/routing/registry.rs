//! Typed controller handler registry.
//!
//! Routes may name their handler as a `"Controller@method"` string. Instead
//! of resolving such names reflectively at dispatch time, applications
//! register each controller method as a typed closure up front; dispatch
//! then looks the handler up by its `controller@method` key.

use std::collections::HashMap;
use std::fmt;

use crate::routing::router::RouteHandler;

/// Maps `controller@method` names to typed handlers.
///
/// # Examples
///
/// ```
/// use trellis_http::routing::HandlerRegistry;
/// use trellis_http::HttpResponse;
/// use std::sync::Arc;
///
/// let mut registry = HandlerRegistry::new();
/// registry.register("Home", "index", Arc::new(|_request, _params| {
///     Box::pin(async { HttpResponse::ok("welcome") })
/// }));
///
/// assert!(registry.contains("Home", "index"));
/// assert!(!registry.contains("Home", "missing"));
/// ```
#[derive(Default)]
pub struct HandlerRegistry {
    handlers: HashMap<String, RouteHandler>,
}

impl fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        keys.sort_unstable();
        f.debug_struct("HandlerRegistry")
            .field("handlers", &keys)
            .finish()
    }
}

impl HandlerRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a handler under `controller@method`.
    ///
    /// Re-registering the same name replaces the previous handler.
    pub fn register(&mut self, controller: &str, method: &str, handler: RouteHandler) {
        self.handlers.insert(Self::key(controller, method), handler);
    }

    /// Looks up the handler for `controller@method`, if registered.
    pub fn lookup(&self, controller: &str, method: &str) -> Option<RouteHandler> {
        self.handlers.get(&Self::key(controller, method)).cloned()
    }

    /// Returns `true` if a handler is registered under `controller@method`.
    pub fn contains(&self, controller: &str, method: &str) -> bool {
        self.handlers.contains_key(&Self::key(controller, method))
    }

    /// Returns the number of registered handlers.
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Returns `true` if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    fn key(controller: &str, method: &str) -> String {
        format!("{controller}@{method}")
    }
}
