// SPDX-License-Identifier: MIT
//! HTTP surface: routes, handler state and the request-lifecycle span layer.
//!
//! Every request, matched or not, runs inside a server span created by
//! [`TraceLayer`] before any handler code. The span is named after the matched
//! route, continues the caller's trace when a `traceparent` header is present,
//! and is closed with the response status and latency once the response is sent.

pub mod handlers;
pub mod propagation;

use std::time::Duration;

use axum::body::Body;
use axum::extract::MatchedPath;
use axum::http::{Request, Response};
use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;
use tracing::{field, Span};
use tracing_opentelemetry::OpenTelemetrySpanExt;

use crate::instruments::Instruments;

/// Application state injected into handlers.
#[derive(Clone, Debug)]
pub struct AppState {
    pub instruments: Instruments,
}

impl AppState {
    pub fn new(instruments: Instruments) -> Self {
        Self { instruments }
    }
}

/// Build the router with all routes and the tracing layer.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/airlines", get(handlers::airlines))
        .route("/airlines/", get(handlers::airlines))
        .route("/airlines/{err}", get(handlers::airlines_with_err))
        .route("/flights/{airline}", get(handlers::flights))
        .route("/flights/{airline}/{err}", get(handlers::flights_with_err))
        .with_state(state)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(make_request_span)
                .on_response(record_response)
                // AppError::into_response already reports 5xx on the span.
                .on_failure(()),
        )
}

fn make_request_span(request: &Request<Body>) -> Span {
    let method = request.method();
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(MatchedPath::as_str);
    let name = match route {
        Some(route) => format!("{method} {route}"),
        None => method.to_string(),
    };

    let span = tracing::info_span!(
        "http_request",
        otel.name = %name,
        otel.kind = "server",
        otel.status_code = field::Empty,
        http.request.method = %method,
        http.route = route,
        url.path = %request.uri().path(),
        http.response.status_code = field::Empty,
        latency_ms = field::Empty,
    );
    let _ = span.set_parent(propagation::extract_context(request.headers()));
    span
}

fn record_response(response: &Response<Body>, latency: Duration, span: &Span) {
    let status = response.status();
    let latency_ms = latency.as_millis() as u64;
    span.record("http.response.status_code", status.as_u16());
    span.record("latency_ms", latency_ms);
    if status.is_server_error() {
        span.record("otel.status_code", "ERROR");
    }
    tracing::debug!(status = status.as_u16(), latency_ms, "response sent");
}
