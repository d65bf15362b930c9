//! Core error types for the trellis framework.
//!
//! This module provides the [`TrellisError`] enum covering route
//! configuration errors, dispatch-time resolution errors, template errors,
//! and HTTP-level failures, plus the [`TrellisResult`] alias used across
//! the workspace.

use thiserror::Error;

/// The primary error type for the trellis framework.
///
/// The taxonomy follows three groups:
///
/// - **Configuration errors** (`EmptyRoutePath`, `MalformedHandlerSpec`,
///   `ImproperlyConfigured`) are raised during route registration or
///   application setup and are fatal to the process setting up routes.
/// - **Resolution errors** (`HandlerNotRegistered`) are raised at dispatch
///   time when a bound controller/method has no registry entry; the server
///   boundary converts them into a 500 response.
/// - **Request-scoped errors** (`Forbidden`, `BadRequest`, ...) map directly
///   to response status codes via [`TrellisError::status_code`].
///
/// A failed route match is *not* an error: it is the not-found dispatch
/// outcome and produces a 404 response without surfacing here.
#[derive(Error, Debug)]
pub enum TrellisError {
    // ── Configuration errors (fatal at setup) ────────────────────────

    /// A route was registered with an empty path template.
    #[error("Route path cannot be empty")]
    EmptyRoutePath,

    /// A string handler spec is missing the `Controller@method` separator.
    #[error("String handler must be in format \"Controller@method\": {0}")]
    MalformedHandlerSpec(String),

    /// The framework is improperly configured (bad pattern, bad settings).
    #[error("Improperly configured: {0}")]
    ImproperlyConfigured(String),

    // ── Resolution errors (500 at the boundary) ──────────────────────

    /// A bound handler referenced a controller/method pair with no
    /// registry entry.
    #[error("No handler registered for {controller}@{method}")]
    HandlerNotRegistered {
        /// The controller identifier named by the route.
        controller: String,
        /// The method identifier named by the route.
        method: String,
    },

    // ── Templates ────────────────────────────────────────────────────

    /// The requested view template was not found or failed to render.
    #[error("Template error: {0}")]
    TemplateError(String),

    // ── HTTP errors ──────────────────────────────────────────────────

    /// HTTP 400 Bad Request.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// HTTP 403 Forbidden (CSRF failures land here).
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// HTTP 404 Not Found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// HTTP 500 Internal Server Error.
    #[error("Internal server error: {0}")]
    InternalServerError(String),

    // ── Serialization ────────────────────────────────────────────────

    /// JSON serialization failed.
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    // ── IO ───────────────────────────────────────────────────────────

    /// An I/O error occurred.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl TrellisError {
    /// Returns the HTTP status code associated with this error.
    ///
    /// Configuration and resolution errors map to 500: they indicate a
    /// broken application, not a bad request.
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::BadRequest(_) => 400,
            Self::Forbidden(_) => 403,
            Self::NotFound(_) => 404,
            Self::EmptyRoutePath
            | Self::MalformedHandlerSpec(_)
            | Self::ImproperlyConfigured(_)
            | Self::HandlerNotRegistered { .. }
            | Self::TemplateError(_)
            | Self::InternalServerError(_)
            | Self::SerializationError(_)
            | Self::IoError(_) => 500,
        }
    }

    /// Returns `true` if this error was raised during route registration
    /// or application setup.
    pub const fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            Self::EmptyRoutePath | Self::MalformedHandlerSpec(_) | Self::ImproperlyConfigured(_)
        )
    }
}

/// A convenience type alias for `Result<T, TrellisError>`.
pub type TrellisResult<T> = Result<T, TrellisError>;
