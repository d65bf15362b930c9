//! View layer for the trellis framework.
//!
//! - [`controller`]: the [`Controller`] base with template rendering, JSON,
//!   redirect, and CSRF helpers
//! - [`csrf`]: token generation and the [`csrf::CsrfGuard`] middleware
//! - [`middleware`]: the [`Middleware`] trait and request/response pipeline
//! - [`server`]: [`App`], which combines settings, router, and middleware
//!   into a runnable HTTP server

pub mod controller;
pub mod csrf;
pub mod middleware;
pub mod server;

pub use controller::Controller;
pub use middleware::{Middleware, MiddlewarePipeline};
pub use server::App;
