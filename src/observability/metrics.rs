use prometheus::{
    core::Collector, Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGauge,
    IntGaugeVec, Opts, Registry, TextEncoder,
};
use std::time::Duration;
use thiserror::Error;
use tracing::info;

const HTTP_BUCKETS: &[f64] = &[0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0];
const STORAGE_BUCKETS: &[f64] = &[0.0005, 0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0];

#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("Failed to register metric: {0}")]
    Registration(#[from] prometheus::Error),
    #[error("Failed to encode metrics: {0}")]
    Encoding(String),
}

/// Prometheus collectors for HTTP traffic, collection file access and the
/// catalog change stream. Each instance owns its registry, so tests can build
/// as many as they like.
#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    http_requests: IntCounterVec,
    http_duration: HistogramVec,
    http_in_flight: IntGaugeVec,
    storage_operations: IntCounterVec,
    storage_duration: HistogramVec,
    events_published: IntCounterVec,
    subscribers: IntGauge,
}

fn register<C>(registry: &Registry, collector: C) -> Result<C, MetricsError>
where
    C: Collector + Clone + 'static,
{
    registry.register(Box::new(collector.clone()))?;
    Ok(collector)
}

impl Metrics {
    pub fn new() -> Result<Self, MetricsError> {
        let registry = Registry::new();

        let metrics = Metrics {
            http_requests: register(
                &registry,
                IntCounterVec::new(
                    Opts::new("http_requests_total", "Total number of HTTP requests processed"),
                    &["method", "endpoint", "status_code"],
                )?,
            )?,
            http_duration: register(
                &registry,
                HistogramVec::new(
                    HistogramOpts::new(
                        "http_request_duration_seconds",
                        "HTTP request duration in seconds",
                    )
                    .buckets(HTTP_BUCKETS.to_vec()),
                    &["method", "endpoint"],
                )?,
            )?,
            http_in_flight: register(
                &registry,
                IntGaugeVec::new(
                    Opts::new(
                        "http_requests_in_flight",
                        "Number of HTTP requests currently being processed",
                    ),
                    &["method", "endpoint"],
                )?,
            )?,
            storage_operations: register(
                &registry,
                IntCounterVec::new(
                    Opts::new(
                        "storage_operations_total",
                        "Total number of collection file loads and saves",
                    ),
                    &["operation", "collection", "status"],
                )?,
            )?,
            storage_duration: register(
                &registry,
                HistogramVec::new(
                    HistogramOpts::new(
                        "storage_operation_duration_seconds",
                        "Collection file load and save duration in seconds",
                    )
                    .buckets(STORAGE_BUCKETS.to_vec()),
                    &["operation", "collection"],
                )?,
            )?,
            events_published: register(
                &registry,
                IntCounterVec::new(
                    Opts::new(
                        "catalog_events_published_total",
                        "Total number of catalog change events published",
                    ),
                    &["event"],
                )?,
            )?,
            subscribers: register(
                &registry,
                IntGauge::new(
                    "catalog_event_subscribers",
                    "Number of live catalog event subscriptions",
                )?,
            )?,
            registry,
        };

        info!("Prometheus metrics initialized");
        Ok(metrics)
    }

    /// Encode all metrics in Prometheus text format
    pub fn encode(&self) -> Result<String, MetricsError> {
        let mut buffer = Vec::new();
        TextEncoder::new()
            .encode(&self.registry.gather(), &mut buffer)
            .map_err(|e| MetricsError::Encoding(e.to_string()))?;

        String::from_utf8(buffer).map_err(|e| MetricsError::Encoding(e.to_string()))
    }

    pub fn record_http_request(
        &self,
        method: &str,
        endpoint: &str,
        status_code: u16,
        duration_seconds: f64,
    ) {
        let status = status_code.to_string();
        self.http_requests
            .with_label_values(&[method, endpoint, &status])
            .inc();
        self.http_duration
            .with_label_values(&[method, endpoint])
            .observe(duration_seconds);
    }

    pub fn increment_in_flight(&self, method: &str, endpoint: &str) {
        self.http_in_flight.with_label_values(&[method, endpoint]).inc();
    }

    pub fn decrement_in_flight(&self, method: &str, endpoint: &str) {
        self.http_in_flight.with_label_values(&[method, endpoint]).dec();
    }

    /// Record one load or save of a collection file
    pub fn record_storage_operation(
        &self,
        operation: &str,
        collection: &str,
        success: bool,
        elapsed: Duration,
    ) {
        let status = if success { "success" } else { "error" };
        self.storage_operations
            .with_label_values(&[operation, collection, status])
            .inc();
        self.storage_duration
            .with_label_values(&[operation, collection])
            .observe(elapsed.as_secs_f64());
    }

    pub fn record_event_published(&self, event: &str) {
        self.events_published.with_label_values(&[event]).inc();
    }

    pub fn set_subscribers(&self, count: usize) {
        self.subscribers.set(count as i64);
    }
}
