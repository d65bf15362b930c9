//! Middleware framework.
//!
//! [`Middleware`] components run around the router: requests pass through
//! them in registration order, responses in reverse order (the onion model).
//! A middleware can short-circuit the pipeline by answering the request
//! itself, and can intercept dispatch errors before the server's default
//! error page takes over.

pub mod builtin;

use std::future::Future;
use std::pin::Pin;

use async_trait::async_trait;

use trellis_core::{TrellisError, TrellisResult};
use trellis_http::{HttpRequest, HttpResponse};

/// The inner handler a pipeline wraps, usually router dispatch.
pub type PipelineHandler = Box<
    dyn Fn(HttpRequest) -> Pin<Box<dyn Future<Output = TrellisResult<HttpResponse>> + Send>>
        + Send
        + Sync,
>;

/// A middleware component.
///
/// # Examples
///
/// ```
/// use async_trait::async_trait;
/// use trellis_views::middleware::Middleware;
/// use trellis_http::{HttpRequest, HttpResponse};
/// use trellis_core::TrellisError;
///
/// struct RequestCounter;
///
/// #[async_trait]
/// impl Middleware for RequestCounter {
///     async fn process_request(&self, _request: &mut HttpRequest) -> Option<HttpResponse> {
///         None // let the request continue
///     }
///
///     async fn process_response(
///         &self,
///         _request: &HttpRequest,
///         response: HttpResponse,
///     ) -> HttpResponse {
///         response
///     }
///
///     async fn process_exception(
///         &self,
///         _request: &HttpRequest,
///         _error: &TrellisError,
///     ) -> Option<HttpResponse> {
///         None
///     }
/// }
/// ```
#[async_trait]
pub trait Middleware: Send + Sync {
    /// Inspects or modifies the request before it reaches the router.
    ///
    /// Return `Some(response)` to short-circuit the pipeline and skip
    /// dispatch; return `None` to let the request continue.
    async fn process_request(&self, request: &mut HttpRequest) -> Option<HttpResponse>;

    /// Inspects or modifies the response on its way out.
    ///
    /// Called in reverse registration order.
    async fn process_response(
        &self,
        request: &HttpRequest,
        response: HttpResponse,
    ) -> HttpResponse;

    /// Handles a dispatch error.
    ///
    /// Return `Some(response)` to replace the error with a response; return
    /// `None` to let the error propagate to the server's error page.
    async fn process_exception(
        &self,
        request: &HttpRequest,
        error: &TrellisError,
    ) -> Option<HttpResponse>;
}

/// An ordered chain of middleware around a handler.
///
/// Requests run through `process_request` in order; responses run through
/// `process_response` in reverse order. When the inner handler fails,
/// `process_exception` runs in reverse order and the first middleware to
/// return a response converts the failure; otherwise the error propagates.
#[derive(Default)]
pub struct MiddlewarePipeline {
    middlewares: Vec<Box<dyn Middleware>>,
}

impl std::fmt::Debug for MiddlewarePipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MiddlewarePipeline")
            .field("middleware_count", &self.middlewares.len())
            .finish()
    }
}

impl MiddlewarePipeline {
    /// Creates an empty pipeline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a middleware to the pipeline.
    pub fn add(&mut self, middleware: impl Middleware + 'static) {
        self.middlewares.push(Box::new(middleware));
    }

    /// Returns the number of middleware components.
    pub fn len(&self) -> usize {
        self.middlewares.len()
    }

    /// Returns `true` if the pipeline is empty.
    pub fn is_empty(&self) -> bool {
        self.middlewares.is_empty()
    }

    /// Runs a request through the pipeline and handler.
    ///
    /// # Errors
    ///
    /// Propagates the handler's error when no middleware converts it via
    /// `process_exception`.
    pub async fn process(
        &self,
        mut request: HttpRequest,
        handler: &PipelineHandler,
    ) -> TrellisResult<HttpResponse> {
        // Phase 1: process_request, forward order. On short-circuit, only
        // the middleware that already ran see the response.
        for (i, mw) in self.middlewares.iter().enumerate() {
            if let Some(response) = mw.process_request(&mut request).await {
                let mut response = response;
                for j in (0..=i).rev() {
                    response = self.middlewares[j]
                        .process_response(&request, response)
                        .await;
                }
                return Ok(response);
            }
        }

        // Phase 2: the handler, with error interception
        let response = match handler(request.clone()).await {
            Ok(response) => response,
            Err(error) => {
                let mut converted = None;
                for mw in self.middlewares.iter().rev() {
                    if let Some(response) = mw.process_exception(&request, &error).await {
                        converted = Some(response);
                        break;
                    }
                }
                match converted {
                    Some(response) => response,
                    None => return Err(error),
                }
            }
        };

        // Phase 3: process_response, reverse order
        let mut response = response;
        for mw in self.middlewares.iter().rev() {
            response = mw.process_response(&request, response).await;
        }
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    struct Recorder {
        name: &'static str,
        log: Arc<Mutex<Vec<String>>>,
        block: bool,
    }

    #[async_trait]
    impl Middleware for Recorder {
        async fn process_request(&self, _request: &mut HttpRequest) -> Option<HttpResponse> {
            self.log.lock().unwrap().push(format!("req:{}", self.name));
            if self.block {
                Some(HttpResponse::forbidden("blocked"))
            } else {
                None
            }
        }

        async fn process_response(
            &self,
            _request: &HttpRequest,
            response: HttpResponse,
        ) -> HttpResponse {
            self.log.lock().unwrap().push(format!("resp:{}", self.name));
            response
        }

        async fn process_exception(
            &self,
            _request: &HttpRequest,
            _error: &TrellisError,
        ) -> Option<HttpResponse> {
            None
        }
    }

    fn ok_handler() -> PipelineHandler {
        Box::new(|_request| Box::pin(async { Ok(HttpResponse::ok("handled")) }))
    }

    fn failing_handler() -> PipelineHandler {
        Box::new(|_request| {
            Box::pin(async { Err(TrellisError::InternalServerError("boom".to_string())) })
        })
    }

    #[tokio::test]
    async fn test_onion_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut pipeline = MiddlewarePipeline::new();
        pipeline.add(Recorder {
            name: "outer",
            log: Arc::clone(&log),
            block: false,
        });
        pipeline.add(Recorder {
            name: "inner",
            log: Arc::clone(&log),
            block: false,
        });

        let request = HttpRequest::builder().build();
        let response = pipeline.process(request, &ok_handler()).await.unwrap();
        assert_eq!(response.content_str(), "handled");

        let log = log.lock().unwrap();
        assert_eq!(
            *log,
            vec!["req:outer", "req:inner", "resp:inner", "resp:outer"]
        );
    }

    #[tokio::test]
    async fn test_short_circuit_skips_handler_and_later_middleware() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut pipeline = MiddlewarePipeline::new();
        pipeline.add(Recorder {
            name: "first",
            log: Arc::clone(&log),
            block: true,
        });
        pipeline.add(Recorder {
            name: "second",
            log: Arc::clone(&log),
            block: false,
        });

        let request = HttpRequest::builder().build();
        let response = pipeline.process(request, &ok_handler()).await.unwrap();
        assert_eq!(response.status(), http::StatusCode::FORBIDDEN);

        let log = log.lock().unwrap();
        assert_eq!(*log, vec!["req:first", "resp:first"]);
    }

    #[tokio::test]
    async fn test_unconverted_error_propagates() {
        let pipeline = MiddlewarePipeline::new();
        let request = HttpRequest::builder().build();
        let result = pipeline.process(request, &failing_handler()).await;
        assert!(matches!(
            result,
            Err(TrellisError::InternalServerError(_))
        ));
    }

    struct ErrorCatcher;

    #[async_trait]
    impl Middleware for ErrorCatcher {
        async fn process_request(&self, _request: &mut HttpRequest) -> Option<HttpResponse> {
            None
        }

        async fn process_response(
            &self,
            _request: &HttpRequest,
            response: HttpResponse,
        ) -> HttpResponse {
            response
        }

        async fn process_exception(
            &self,
            _request: &HttpRequest,
            error: &TrellisError,
        ) -> Option<HttpResponse> {
            Some(HttpResponse::server_error(format!("caught: {error}")))
        }
    }

    #[tokio::test]
    async fn test_exception_converted_to_response() {
        let mut pipeline = MiddlewarePipeline::new();
        pipeline.add(ErrorCatcher);

        let request = HttpRequest::builder().build();
        let response = pipeline.process(request, &failing_handler()).await.unwrap();
        assert_eq!(response.status(), http::StatusCode::INTERNAL_SERVER_ERROR);
        assert!(response.content_str().contains("caught"));
    }
}
