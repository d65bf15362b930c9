//! Controller base.
//!
//! [`Controller`] bundles the template engine and site-wide context, and
//! provides the helpers handlers use to produce responses: template
//! rendering, JSON, redirects, CSRF tokens, and input sanitization.

use std::sync::Arc;

use chrono::Datelike;
use http::StatusCode;
use tera::Tera;

use trellis_core::{Settings, TrellisError, TrellisResult};
use trellis_http::{HttpRequest, HttpResponse, JsonResponse};

use crate::csrf;

/// Shared controller state: the template engine plus site context.
///
/// Cheap to clone; handlers typically capture a clone in their closures.
///
/// # Examples
///
/// ```
/// use trellis_views::Controller;
/// use tera::Tera;
///
/// let mut tera = Tera::default();
/// tera.add_raw_template("hello.html", "<h1>{{ site_name }}</h1>").unwrap();
///
/// let controller = Controller::with_templates(tera, "My Site", "");
/// let response = controller.render("hello.html", &tera::Context::new()).unwrap();
/// assert!(response.content_str().contains("My Site"));
/// ```
#[derive(Clone)]
pub struct Controller {
    templates: Arc<Tera>,
    site_name: String,
    base_path: String,
}

impl std::fmt::Debug for Controller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Controller")
            .field("site_name", &self.site_name)
            .field("base_path", &self.base_path)
            .finish_non_exhaustive()
    }
}

impl Controller {
    /// Creates a controller loading templates from the settings' template
    /// directory (`*.html` files, recursively).
    ///
    /// # Errors
    ///
    /// Returns [`TrellisError::TemplateError`] when the template directory
    /// cannot be loaded or a template fails to parse.
    pub fn from_settings(settings: &Settings) -> TrellisResult<Self> {
        let glob = format!("{}/**/*.html", settings.template_dir.trim_end_matches('/'));
        let templates = Tera::new(&glob)
            .map_err(|e| TrellisError::TemplateError(format!("failed to load templates: {e}")))?;

        Ok(Self {
            templates: Arc::new(templates),
            site_name: settings.site_name.clone(),
            base_path: settings.url_prefix(),
        })
    }

    /// Creates a controller from an already-built template engine.
    pub fn with_templates(
        templates: Tera,
        site_name: impl Into<String>,
        base_path: impl Into<String>,
    ) -> Self {
        Self {
            templates: Arc::new(templates),
            site_name: site_name.into(),
            base_path: base_path.into(),
        }
    }

    /// Returns the site-wide context every render starts from: `site_name`,
    /// `base_path`, and `current_year`.
    pub fn base_context(&self) -> tera::Context {
        let mut context = tera::Context::new();
        context.insert("site_name", &self.site_name);
        context.insert("base_path", &self.base_path);
        context.insert("current_year", &chrono::Utc::now().year());
        context
    }

    /// Renders a template to a 200 HTML response.
    ///
    /// The given context is merged over the base context, so handler values
    /// win on key collisions.
    ///
    /// # Errors
    ///
    /// Returns [`TrellisError::TemplateError`] when the template is missing
    /// or rendering fails.
    pub fn render(&self, template: &str, context: &tera::Context) -> TrellisResult<HttpResponse> {
        self.render_with_status(template, context, StatusCode::OK)
    }

    /// Renders a template with an explicit status code.
    ///
    /// # Errors
    ///
    /// See [`Controller::render`].
    pub fn render_with_status(
        &self,
        template: &str,
        context: &tera::Context,
        status: StatusCode,
    ) -> TrellisResult<HttpResponse> {
        let mut full = self.base_context();
        full.extend(context.clone());

        let body = self
            .templates
            .render(template, &full)
            .map_err(|e| TrellisError::TemplateError(format!("render {template:?}: {e}")))?;
        Ok(HttpResponse::new(status, body))
    }

    /// Builds a 200 JSON response from a serializable value.
    pub fn json<T: serde::Serialize>(&self, data: &T) -> HttpResponse {
        JsonResponse::new(data)
    }

    /// Builds a JSON response with an explicit status code.
    pub fn json_with_status<T: serde::Serialize>(
        &self,
        status: StatusCode,
        data: &T,
    ) -> HttpResponse {
        JsonResponse::with_status(status, data)
    }

    /// Builds a 302 redirect. App-relative URLs (leading `/`) get the mount
    /// prefix prepended; absolute URLs pass through unchanged.
    pub fn redirect(&self, url: &str) -> HttpResponse {
        HttpResponse::redirect(&self.resolve_url(url))
    }

    /// Builds a 301 permanent redirect, resolving the URL like
    /// [`Controller::redirect`].
    pub fn redirect_permanent(&self, url: &str) -> HttpResponse {
        HttpResponse::redirect_permanent(&self.resolve_url(url))
    }

    fn resolve_url(&self, url: &str) -> String {
        if url.starts_with('/') && !self.base_path.is_empty() {
            format!("{}{url}", self.base_path)
        } else {
            url.to_string()
        }
    }

    /// Returns the request's CSRF token, generating a fresh one when the
    /// request carries no CSRF cookie yet.
    pub fn csrf_token(&self, request: &HttpRequest) -> String {
        request
            .cookie(csrf::COOKIE_NAME)
            .unwrap_or_else(csrf::generate_token)
    }

    /// Renders the hidden form field carrying the CSRF token.
    pub fn csrf_field(&self, token: &str) -> String {
        format!(
            r#"<input type="hidden" name="{}" value="{}">"#,
            csrf::FORM_FIELD,
            trellis_core::utils::escape_html(token)
        )
    }

    /// Validates the request's submitted CSRF token against its cookie.
    pub fn validate_csrf(&self, request: &HttpRequest) -> bool {
        csrf::validate(request)
    }

    /// Trims and HTML-escapes untrusted input.
    pub fn sanitize(&self, input: &str) -> String {
        trellis_core::utils::sanitize(input)
    }
}
