//! Showcase application settings.
//!
//! Settings come from `showcase.toml` next to the binary when present, and
//! fall back to programmatic defaults otherwise.

use trellis_core::Settings;

/// Creates the showcase settings.
pub fn showcase_settings() -> Settings {
    Settings {
        debug: true,
        site_name: "Trellis Showcase".to_string(),
        base_path: String::new(),
        template_dir: format!("{}/templates", env!("CARGO_MANIFEST_DIR")),
        log_level: "info".to_string(),
        bind_address: "127.0.0.1:8000".to_string(),
    }
}

/// Loads settings from a TOML file, falling back to defaults on failure.
pub fn load_settings(path: &str) -> Settings {
    match Settings::from_toml_file(path) {
        Ok(settings) => settings,
        Err(e) => {
            tracing::warn!(%e, path, "failed to load settings file, using defaults");
            showcase_settings()
        }
    }
}
