//! Request logging middleware.
//!
//! # Responsibilities
//! - Create the correlation context for every inbound request
//! - Emit the incoming/completed record pair around the inner service
//! - Echo the correlation id on the response
//!
//! # Design Decisions
//! - The whole inner call runs inside the correlation scope, so records from
//!   nested stages carry the request's id without re-deriving it
//! - Delegation is wrapped in `catch_unwind`: the "pre" record always pairs
//!   with a "post" record or an error-path record, never neither
//! - A panicking handler becomes a 500 response that still carries the
//!   correlation header; the panic itself is the error capture stage's job

use std::convert::Infallible;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::pin::Pin;
use std::task::{Context, Poll};

use axum::{
    body::Body,
    http::{
        header::{HeaderMap, HeaderName, HeaderValue},
        Request, StatusCode,
    },
    response::{IntoResponse, Response},
};
use futures_util::FutureExt;
use serde_json::{json, Map, Value};
use tower::{Layer, Service};

use crate::correlation::{self, CorrelationContext, CORRELATION_HEADER};
use crate::logger::Logger;

static CORRELATION_HEADER_NAME: HeaderName = HeaderName::from_static(CORRELATION_HEADER);

/// Layer wiring the request logging stage into a service stack.
#[derive(Clone)]
pub struct RequestLogLayer {
    logger: Logger,
    verbose: bool,
}

impl RequestLogLayer {
    /// Create the stage with summary logging only.
    pub fn new(logger: Logger) -> Self {
        Self {
            logger,
            verbose: false,
        }
    }

    /// Also log the request headers on the incoming record. Header values
    /// pass through the redaction policy like everything else.
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }
}

impl<S> Layer<S> for RequestLogLayer {
    type Service = RequestLogService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RequestLogService {
            inner,
            logger: self.logger.clone(),
            verbose: self.verbose,
        }
    }
}

/// Service emitting the per-request record pair.
#[derive(Clone)]
pub struct RequestLogService<S> {
    inner: S,
    logger: Logger,
    verbose: bool,
}

impl<S> Service<Request<Body>> for RequestLogService<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
    S::Error: std::fmt::Display,
{
    type Response = Response;
    type Error = S::Error;
    type Future =
        Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut request: Request<Body>) -> Self::Future {
        let supplied = request
            .headers()
            .get(&CORRELATION_HEADER_NAME)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);
        let context = CorrelationContext::begin(
            request.method().as_str(),
            request.uri().path(),
            supplied.as_deref(),
        );
        request.extensions_mut().insert(context.clone());

        let logger = self.logger.clone();
        let verbose = self.verbose;
        let mut inner = self.inner.clone();

        Box::pin(correlation::scope(context.clone(), async move {
            let mut incoming = Map::new();
            incoming.insert("method".to_string(), json!(context.method()));
            incoming.insert("path".to_string(), json!(context.path()));
            if verbose {
                incoming.insert("headers".to_string(), headers_json(request.headers()));
            }
            logger.info("Incoming request", Value::Object(incoming));

            let outcome = AssertUnwindSafe(inner.call(request)).catch_unwind().await;
            match outcome {
                Ok(Ok(mut response)) => {
                    logger.info(
                        "Request completed",
                        json!({
                            "status": response.status().as_u16(),
                            "duration_ms": context.elapsed_ms(),
                        }),
                    );
                    set_correlation_header(&mut response, context.id());
                    Ok(response)
                }
                Ok(Err(error)) => {
                    logger.error(
                        "Request failed",
                        json!({
                            "error": error.to_string(),
                            "duration_ms": context.elapsed_ms(),
                        }),
                    );
                    Err(error)
                }
                Err(_panic) => {
                    // The panic hook has already captured the failure; this
                    // record closes the incoming/outgoing pair.
                    logger.error(
                        "Request aborted by panic",
                        json!({ "duration_ms": context.elapsed_ms() }),
                    );
                    let mut response = StatusCode::INTERNAL_SERVER_ERROR.into_response();
                    set_correlation_header(&mut response, context.id());
                    Ok(response)
                }
            }
        }))
    }
}

fn set_correlation_header(response: &mut Response, id: &str) {
    if let Ok(value) = HeaderValue::from_str(id) {
        response.headers_mut().insert(&CORRELATION_HEADER_NAME, value);
    }
}

/// Header map rendered the shape redaction expects: name → list of values.
fn headers_json(headers: &HeaderMap) -> Value {
    let mut map = Map::new();
    for name in headers.keys() {
        let values: Vec<Value> = headers
            .get_all(name)
            .iter()
            .map(|value| Value::String(String::from_utf8_lossy(value.as_bytes()).into_owned()))
            .collect();
        map.insert(name.as_str().to_string(), Value::Array(values));
    }
    Value::Object(map)
}

/// Extractor for the request's correlation context.
impl<S> axum::extract::FromRequestParts<S> for CorrelationContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        Ok(parts.extensions.get::<CorrelationContext>().cloned().unwrap_or_else(
            || CorrelationContext::begin(parts.method.as_str(), parts.uri.path(), None),
        ))
    }
}
