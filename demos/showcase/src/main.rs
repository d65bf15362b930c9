//! # Trellis Showcase
//!
//! A small site demonstrating the trellis framework pipeline:
//!
//! - **Routes**: literal and parameterized paths, registry-bound and inline
//!   handlers, a custom not-found page
//! - **Controllers**: template rendering, JSON responses, CSRF, input
//!   sanitization
//! - **Middleware**: security headers, request logging, CSRF enforcement
//! - **Settings**: TOML file or programmatic defaults
//!
//! ## Running
//!
//! ```bash
//! cargo run --package showcase
//! ```

mod controllers;
mod settings;
mod urls;

use std::sync::Arc;

use trellis_core::TrellisResult;
use trellis_views::csrf::CsrfGuard;
use trellis_views::middleware::builtin::{RequestLogMiddleware, SecurityMiddleware};
use trellis_views::{App, Controller};

use controllers::SiteData;
use settings::{load_settings, showcase_settings};

#[tokio::main]
async fn main() -> TrellisResult<()> {
    let settings = if std::path::Path::new("showcase.toml").exists() {
        load_settings("showcase.toml")
    } else {
        showcase_settings()
    };
    trellis_core::logging::setup_logging(&settings);

    let controller = Controller::from_settings(&settings)?;
    let data = Arc::new(SiteData::sample());
    let router = urls::build_router(controller, data)?;

    tracing::info!(routes = router.route_count(), "showcase configured");

    App::new(settings)
        .router(router)
        .middleware(SecurityMiddleware::default())
        .middleware(RequestLogMiddleware)
        .middleware(CsrfGuard::new())
        .run()
        .await
}
