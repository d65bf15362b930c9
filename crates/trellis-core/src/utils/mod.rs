//! Utility helpers shared across the framework.

pub mod text;

pub use text::{escape_html, sanitize};
