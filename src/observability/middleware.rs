use axum::{
    extract::{MatchedPath, Request},
    http::{HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};
use opentelemetry::trace::{Status, TraceContextExt};
use std::{sync::Arc, time::Instant};
use tracing::{error, info, Instrument, Span};
use tracing_opentelemetry::OpenTelemetrySpanExt;
use uuid::Uuid;

use super::Metrics;

pub static REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

/// Wraps every request in a server span, records HTTP metrics against the
/// matched route template and echoes an `x-request-id` on the response.
/// A well-formed incoming request id is reused, otherwise one is generated.
pub async fn observability_middleware(
    metrics: Arc<Metrics>,
    request: Request,
    next: Next,
) -> Response {
    let started = Instant::now();
    let method = request.method().to_string();
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|path| path.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());

    let request_id = request
        .headers()
        .get(&REQUEST_ID_HEADER)
        .filter(|value| !value.is_empty() && value.len() <= 128)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let span_name = format!("{} {}", method, route);
    let span = tracing::info_span!(
        target: "storefront_rs::http",
        "http_request",
        otel.name = %span_name,
        otel.kind = "server",
        http.method = %method,
        http.route = %route,
        http.target = %request.uri(),
        request_id = %request_id,
        http.status_code = tracing::field::Empty,
        http.response_time_ms = tracing::field::Empty,
    );

    async move {
        let in_flight = InFlight::enter(metrics.clone(), &method, &route);
        let mut response = next.run(request).await;
        drop(in_flight);

        let status = response.status().as_u16();
        let elapsed = started.elapsed();
        metrics.record_http_request(&method, &route, status, elapsed.as_secs_f64());
        finish_span(status, elapsed.as_millis());

        if let Ok(value) = HeaderValue::from_str(&request_id) {
            response.headers_mut().insert(REQUEST_ID_HEADER.clone(), value);
        }

        if status >= 500 {
            error!(status, duration_ms = elapsed.as_millis(), "Request failed");
        } else {
            info!(status, duration_ms = elapsed.as_millis(), "Request completed");
        }
        response
    }
    .instrument(span)
    .await
}

/// Counts a request in `http_requests_in_flight` until dropped, including
/// when the request future is cancelled mid-flight.
struct InFlight {
    metrics: Arc<Metrics>,
    method: String,
    route: String,
}

impl InFlight {
    fn enter(metrics: Arc<Metrics>, method: &str, route: &str) -> Self {
        metrics.increment_in_flight(method, route);
        Self {
            metrics,
            method: method.to_string(),
            route: route.to_string(),
        }
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.metrics.decrement_in_flight(&self.method, &self.route);
    }
}

fn finish_span(status: u16, duration_ms: u128) {
    let span = Span::current();
    span.record("http.status_code", status);
    span.record("http.response_time_ms", duration_ms);

    let otel_status = if status >= 500 {
        Status::error("HTTP server error")
    } else {
        Status::Ok
    };
    span.context().span().set_status(otel_status);
}
