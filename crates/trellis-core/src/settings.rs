//! Settings for the trellis framework.
//!
//! [`Settings`] holds all framework configuration with sensible defaults and
//! can be loaded from a TOML file or string. Applications construct a
//! `Settings` once at startup and pass it explicitly to the components that
//! need it; there is no global settings object.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{TrellisError, TrellisResult};

/// Framework configuration.
///
/// # Examples
///
/// ```
/// use trellis_core::Settings;
///
/// let settings = Settings::default();
/// assert!(settings.debug);
/// assert_eq!(settings.base_path, "");
///
/// let settings = Settings::from_toml_str(
///     r#"
///     debug = false
///     site_name = "My Site"
///     base_path = "/app"
///     "#,
/// ).unwrap();
/// assert!(!settings.debug);
/// assert_eq!(settings.site_name, "My Site");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Debug mode: detailed error pages and pretty log output.
    pub debug: bool,
    /// Site name exposed to every rendered view.
    pub site_name: String,
    /// Mount prefix when the application is served under a subdirectory
    /// (e.g. `/app`). Empty when mounted at the root. Stripped from incoming
    /// request paths before route matching and prepended to generated URLs.
    pub base_path: String,
    /// Directory containing view templates, as a tera glob-compatible root.
    pub template_dir: String,
    /// Log level filter (e.g. `info`, `debug`, `trellis_http=trace`).
    pub log_level: String,
    /// Address the development server binds to.
    pub bind_address: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            debug: true,
            site_name: "Trellis".to_string(),
            base_path: String::new(),
            template_dir: "templates".to_string(),
            log_level: "info".to_string(),
            bind_address: "127.0.0.1:8000".to_string(),
        }
    }
}

impl Settings {
    /// Parses settings from a TOML string. Missing keys take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`TrellisError::ImproperlyConfigured`] if the TOML is invalid.
    pub fn from_toml_str(toml_str: &str) -> TrellisResult<Self> {
        toml::from_str(toml_str)
            .map_err(|e| TrellisError::ImproperlyConfigured(format!("Invalid settings TOML: {e}")))
    }

    /// Loads settings from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or contains invalid TOML.
    pub fn from_toml_file(path: impl AsRef<Path>) -> TrellisResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Returns the mount prefix normalized for URL generation: empty when
    /// the application is mounted at the root, otherwise with a leading
    /// slash and no trailing slash.
    pub fn url_prefix(&self) -> String {
        let trimmed = self.base_path.trim_matches('/');
        if trimmed.is_empty() {
            String::new()
        } else {
            format!("/{trimmed}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert!(settings.debug);
        assert_eq!(settings.site_name, "Trellis");
        assert_eq!(settings.base_path, "");
        assert_eq!(settings.template_dir, "templates");
        assert_eq!(settings.bind_address, "127.0.0.1:8000");
    }

    #[test]
    fn test_from_toml_str_partial() {
        let settings = Settings::from_toml_str("site_name = \"Demo\"").unwrap();
        assert_eq!(settings.site_name, "Demo");
        // Unspecified keys fall back to defaults
        assert!(settings.debug);
    }

    #[test]
    fn test_from_toml_str_invalid() {
        let result = Settings::from_toml_str("debug = [not toml");
        assert!(result.is_err());
        assert!(result.unwrap_err().is_configuration_error());
    }

    #[test]
    fn test_url_prefix_root() {
        let settings = Settings::default();
        assert_eq!(settings.url_prefix(), "");
    }

    #[test]
    fn test_url_prefix_subdirectory() {
        let settings = Settings {
            base_path: "app/".to_string(),
            ..Settings::default()
        };
        assert_eq!(settings.url_prefix(), "/app");

        let settings = Settings {
            base_path: "/app".to_string(),
            ..Settings::default()
        };
        assert_eq!(settings.url_prefix(), "/app");
    }

    #[test]
    fn test_toml_round_trip() {
        let settings = Settings {
            debug: false,
            site_name: "Round Trip".to_string(),
            base_path: "/sub".to_string(),
            ..Settings::default()
        };
        let toml_str = toml::to_string(&settings).unwrap();
        let parsed = Settings::from_toml_str(&toml_str).unwrap();
        assert!(!parsed.debug);
        assert_eq!(parsed.site_name, "Round Trip");
        assert_eq!(parsed.base_path, "/sub");
    }
}
