//! Route configuration for the showcase.
//!
//! Controller methods are registered in the handler registry under
//! `Controller@method` names, and routes reference them by those names. The
//! product route shows the inline-closure alternative.

use std::sync::Arc;

use trellis_core::TrellisResult;
use trellis_http::routing::{Handler, Router};
use trellis_http::{HttpRequest, HttpResponse};
use trellis_views::Controller;

use crate::controllers::{
    ErrorController, HomeController, ProductController, SiteData, UserController,
};

/// Converts a fallible handler result into a response, logging failures.
fn or_500(result: TrellisResult<HttpResponse>) -> HttpResponse {
    result.unwrap_or_else(|error| {
        tracing::error!(%error, "handler failed");
        HttpResponse::server_error("Internal Server Error")
    })
}

/// Builds the showcase route table.
pub fn build_router(ctl: Controller, data: Arc<SiteData>) -> TrellisResult<Router> {
    let mut router = Router::new();

    let home = Arc::new(HomeController::new(ctl.clone(), Arc::clone(&data)));
    let users = Arc::new(UserController::new(ctl.clone(), Arc::clone(&data)));
    let products = Arc::new(ProductController::new(ctl.clone(), Arc::clone(&data)));
    let errors = Arc::new(ErrorController::new(ctl));

    {
        let registry = router.registry_mut();

        let c = Arc::clone(&home);
        registry.register(
            "Home",
            "index",
            Arc::new(move |request: HttpRequest, _params| {
                let c = Arc::clone(&c);
                Box::pin(async move { or_500(c.index(&request)) })
            }),
        );

        let c = Arc::clone(&home);
        registry.register(
            "Home",
            "about",
            Arc::new(move |request: HttpRequest, _params| {
                let c = Arc::clone(&c);
                Box::pin(async move { or_500(c.about(&request)) })
            }),
        );

        let c = Arc::clone(&home);
        registry.register(
            "Home",
            "contact_form",
            Arc::new(move |request: HttpRequest, _params| {
                let c = Arc::clone(&c);
                Box::pin(async move { or_500(c.contact_form(&request)) })
            }),
        );

        let c = Arc::clone(&home);
        registry.register(
            "Home",
            "contact_submit",
            Arc::new(move |request: HttpRequest, _params| {
                let c = Arc::clone(&c);
                Box::pin(async move { c.contact_submit(&request) })
            }),
        );

        let c = Arc::clone(&users);
        registry.register(
            "User",
            "show",
            Arc::new(move |request: HttpRequest, params| {
                let c = Arc::clone(&c);
                Box::pin(async move { or_500(c.show(&request, &params)) })
            }),
        );
    }

    let page = Arc::clone(&products);
    router
        .get("/", Handler::parse("Home@index")?)?
        .get("/about", Handler::parse("Home@about")?)?
        .get("/contact", Handler::parse("Home@contact_form")?)?
        .post("/contact", Handler::parse("Home@contact_submit")?)?
        .get("/user/{id}", Handler::parse("User@show")?)?
        .get(
            "/product/{slug}",
            Handler::inline(move |request, params| {
                let c = Arc::clone(&page);
                Box::pin(async move { or_500(c.show(&request, &params)) })
            }),
        )?
        .get(
            "/api/product/{slug}",
            Handler::inline(move |request, params| {
                let c = Arc::clone(&products);
                Box::pin(async move { c.show_json(&request, &params) })
            }),
        )?;

    router.set_not_found(Handler::inline(move |request, _params| {
        let c = Arc::clone(&errors);
        Box::pin(async move { or_500(c.not_found(&request)) })
    }));

    Ok(router)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::test_controller;
    use http::Method;

    fn showcase_router() -> Router {
        build_router(test_controller(), Arc::new(SiteData::sample())).unwrap()
    }

    fn request(method: Method, path: &str) -> HttpRequest {
        HttpRequest::builder().method(method).path(path).build()
    }

    #[tokio::test]
    async fn test_home_route() {
        let router = showcase_router();
        let response = router.dispatch(request(Method::GET, "/")).await.unwrap();
        assert_eq!(response.status(), http::StatusCode::OK);
        assert!(response.content_str().contains("users"));
    }

    #[tokio::test]
    async fn test_user_route_extracts_id() {
        let router = showcase_router();
        let response = router
            .dispatch(request(Method::GET, "/user/1"))
            .await
            .unwrap();
        assert!(response.content_str().contains("Ada Lovelace"));
    }

    #[tokio::test]
    async fn test_product_route_renders_html_page() {
        let router = showcase_router();
        let response = router
            .dispatch(request(Method::GET, "/product/climbing-rose"))
            .await
            .unwrap();
        assert_eq!(response.content_type(), "text/html");
        let body = response.content_str();
        assert!(body.contains("Climbing Rose"));
        assert!(body.contains("$24.50"));
    }

    #[tokio::test]
    async fn test_product_api_route_returns_json() {
        let router = showcase_router();
        let response = router
            .dispatch(request(Method::GET, "/api/product/climbing-rose"))
            .await
            .unwrap();
        assert_eq!(response.content_type(), "application/json");
    }

    #[tokio::test]
    async fn test_unrouted_path_uses_custom_404() {
        let router = showcase_router();
        let response = router
            .dispatch(request(Method::GET, "/no/such/page"))
            .await
            .unwrap();
        assert_eq!(response.status(), http::StatusCode::NOT_FOUND);
        assert!(response.content_str().contains("Not Found"));
    }

    #[tokio::test]
    async fn test_contact_flow_tokens_match() {
        let router = showcase_router();
        let form = router
            .dispatch(request(Method::GET, "/contact"))
            .await
            .unwrap();

        let cookie = form
            .headers()
            .get(http::header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .unwrap()
            .to_string();
        let token = cookie
            .strip_prefix("csrf_token=")
            .and_then(|rest| rest.split(';').next())
            .unwrap();

        let submit = HttpRequest::builder()
            .method(Method::POST)
            .path("/contact")
            .header("cookie", &format!("csrf_token={token}"))
            .form_field("csrf_token", token.to_string())
            .form_field("name", "Ada")
            .form_field("email", "ada@example.com")
            .form_field("message", "hello")
            .build();
        let response = router.dispatch(submit).await.unwrap();
        assert_eq!(response.status(), http::StatusCode::OK);
    }
}
