//! Showcase controllers.
//!
//! Each controller owns a [`Controller`] handle for rendering and response
//! helpers. Handlers are plain methods; `urls.rs` wraps them into route
//! handlers.

use std::sync::Arc;

use http::StatusCode;
use serde::Serialize;

use trellis_core::TrellisResult;
use trellis_http::routing::PathParams;
use trellis_http::{HttpRequest, HttpResponse};
use trellis_views::{csrf, Controller};

/// A demo user record.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: u32,
    pub name: String,
    pub email: String,
    pub joined: chrono::NaiveDate,
}

/// A demo product record.
#[derive(Debug, Clone, Serialize)]
pub struct Product {
    pub slug: String,
    pub name: String,
    pub price_cents: u32,
    pub description: String,
}

/// In-memory demo data standing in for a database.
#[derive(Debug)]
pub struct SiteData {
    users: Vec<User>,
    products: Vec<Product>,
}

impl SiteData {
    /// Builds the sample data set.
    pub fn sample() -> Self {
        Self {
            users: vec![
                User {
                    id: 1,
                    name: "Ada Lovelace".to_string(),
                    email: "ada@example.com".to_string(),
                    joined: chrono::NaiveDate::from_ymd_opt(2021, 3, 14).unwrap_or_default(),
                },
                User {
                    id: 2,
                    name: "Grace Hopper".to_string(),
                    email: "grace@example.com".to_string(),
                    joined: chrono::NaiveDate::from_ymd_opt(2022, 7, 1).unwrap_or_default(),
                },
                User {
                    id: 3,
                    name: "Alan Turing".to_string(),
                    email: "alan@example.com".to_string(),
                    joined: chrono::NaiveDate::from_ymd_opt(2023, 11, 28).unwrap_or_default(),
                },
            ],
            products: vec![
                Product {
                    slug: "garden-trowel".to_string(),
                    name: "Garden Trowel".to_string(),
                    price_cents: 1299,
                    description: "Stainless hand trowel with an ash handle.".to_string(),
                },
                Product {
                    slug: "climbing-rose".to_string(),
                    name: "Climbing Rose".to_string(),
                    price_cents: 2450,
                    description: "Bare-root climbing rose, flowers in its first summer."
                        .to_string(),
                },
            ],
        }
    }

    pub fn find_user(&self, id: u32) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }

    pub fn find_product(&self, slug: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.slug == slug)
    }

    pub fn user_count(&self) -> usize {
        self.users.len()
    }

    pub fn product_count(&self) -> usize {
        self.products.len()
    }
}

/// Static pages and the contact form.
pub struct HomeController {
    ctl: Controller,
    data: Arc<SiteData>,
}

impl HomeController {
    pub fn new(ctl: Controller, data: Arc<SiteData>) -> Self {
        Self { ctl, data }
    }

    pub fn index(&self, _request: &HttpRequest) -> TrellisResult<HttpResponse> {
        let mut context = tera::Context::new();
        context.insert("title", "Home");
        context.insert("user_count", &self.data.user_count());
        context.insert("product_count", &self.data.product_count());
        self.ctl.render("home.html", &context)
    }

    pub fn about(&self, _request: &HttpRequest) -> TrellisResult<HttpResponse> {
        let mut context = tera::Context::new();
        context.insert("title", "About");
        self.ctl.render("about.html", &context)
    }

    /// GET: renders the contact form with a CSRF token, and pins that token
    /// as the CSRF cookie so the later POST validates.
    pub fn contact_form(&self, request: &HttpRequest) -> TrellisResult<HttpResponse> {
        let token = self.ctl.csrf_token(request);

        let mut context = tera::Context::new();
        context.insert("title", "Contact");
        context.insert("csrf_field", &self.ctl.csrf_field(&token));

        let mut response = self.ctl.render("contact.html", &context)?;
        csrf::attach_cookie(&mut response, &token);
        Ok(response)
    }

    /// POST: accepts the contact submission and answers with JSON. CSRF is
    /// enforced by the middleware before this runs.
    pub fn contact_submit(&self, request: &HttpRequest) -> HttpResponse {
        let name = self.ctl.sanitize(request.post().get("name").unwrap_or(""));
        let email = self.ctl.sanitize(request.post().get("email").unwrap_or(""));
        let message = self
            .ctl
            .sanitize(request.post().get("message").unwrap_or(""));

        let mut errors = Vec::new();
        if name.is_empty() {
            errors.push("Name is required");
        }
        if email.is_empty() || !is_valid_email(&email) {
            errors.push("Valid email is required");
        }
        if message.is_empty() {
            errors.push("Message is required");
        }

        if !errors.is_empty() {
            return self.ctl.json_with_status(
                StatusCode::BAD_REQUEST,
                &serde_json::json!({"success": false, "errors": errors}),
            );
        }

        self.ctl.json(&serde_json::json!({
            "success": true,
            "message": "Thank you for your message! We will get back to you soon.",
        }))
    }
}

/// Minimal address-shape check: one `@`, a non-empty local part, and a
/// domain with a dot that neither starts nor ends it.
fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !domain.contains('@')
}

/// User profile pages.
pub struct UserController {
    ctl: Controller,
    data: Arc<SiteData>,
}

impl UserController {
    pub fn new(ctl: Controller, data: Arc<SiteData>) -> Self {
        Self { ctl, data }
    }

    pub fn show(&self, _request: &HttpRequest, params: &PathParams) -> TrellisResult<HttpResponse> {
        let id = params.get("id").and_then(|v| v.parse::<u32>().ok());

        match id.and_then(|id| self.data.find_user(id)) {
            Some(user) => {
                let mut context = tera::Context::new();
                context.insert("title", &user.name);
                context.insert("user", user);
                self.ctl.render("user.html", &context)
            }
            None => {
                let mut context = tera::Context::new();
                context.insert("title", "Not Found");
                self.ctl
                    .render_with_status("404.html", &context, StatusCode::NOT_FOUND)
            }
        }
    }
}

/// Product pages, plus a JSON lookup for API clients.
pub struct ProductController {
    ctl: Controller,
    data: Arc<SiteData>,
}

impl ProductController {
    pub fn new(ctl: Controller, data: Arc<SiteData>) -> Self {
        Self { ctl, data }
    }

    pub fn show(&self, _request: &HttpRequest, params: &PathParams) -> TrellisResult<HttpResponse> {
        let slug = params.get("slug").unwrap_or("");
        match self.data.find_product(slug) {
            Some(product) => {
                let mut context = tera::Context::new();
                context.insert("title", &product.name);
                context.insert("product", product);
                context.insert("price", &format_price(product.price_cents));
                self.ctl.render("product.html", &context)
            }
            None => {
                let mut context = tera::Context::new();
                context.insert("title", "Not Found");
                self.ctl
                    .render_with_status("404.html", &context, StatusCode::NOT_FOUND)
            }
        }
    }

    pub fn show_json(&self, _request: &HttpRequest, params: &PathParams) -> HttpResponse {
        let slug = params.get("slug").unwrap_or("");
        match self.data.find_product(slug) {
            Some(product) => self.ctl.json(product),
            None => self.ctl.json_with_status(
                StatusCode::NOT_FOUND,
                &serde_json::json!({"error": format!("No product with slug {slug:?}")}),
            ),
        }
    }
}

fn format_price(cents: u32) -> String {
    format!("${}.{:02}", cents / 100, cents % 100)
}

/// The site-wide not-found page.
pub struct ErrorController {
    ctl: Controller,
}

impl ErrorController {
    pub fn new(ctl: Controller) -> Self {
        Self { ctl }
    }

    pub fn not_found(&self, _request: &HttpRequest) -> TrellisResult<HttpResponse> {
        let mut context = tera::Context::new();
        context.insert("title", "Not Found");
        self.ctl
            .render_with_status("404.html", &context, StatusCode::NOT_FOUND)
    }
}
