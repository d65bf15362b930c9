//! # trellis-core
//!
//! Core types, settings, and error types for the trellis framework.
//! This crate has zero framework dependencies and provides the foundation
//! for all other crates.
//!
//! ## Modules
//!
//! - [`error`] - Error types and result aliases
//! - [`settings`] - Framework settings and TOML loading
//! - [`logging`] - Tracing-based logging integration
//! - [`utils`] - Text helpers (HTML escaping, input sanitization)

pub mod error;
pub mod logging;
pub mod settings;
pub mod utils;

// Re-export the most commonly used types at the crate root.
pub use error::{TrellisError, TrellisResult};
pub use settings::Settings;
