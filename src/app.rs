use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{limit::RequestBodyLimitLayer, timeout::TimeoutLayer};
use tracing::info;

use crate::config::{Config, ServerConfig};
use crate::handlers::{
    admin::{self, AdminState},
    cart_routes, cors_layer, health_check, metrics_handler, not_found_handler, product_events,
    product_routes, request_validation_middleware, security_headers_middleware, ApiState,
};
use crate::observability::{observability_middleware, Metrics, MetricsError};
use crate::repositories::{JsonFileCartRepository, JsonFileProductRepository};
use crate::services::{CartService, CatalogService, ChangeBroadcaster};

/// Long-lived service objects shared by every request
#[derive(Clone)]
pub struct AppComponents {
    pub metrics: Arc<Metrics>,
    pub broadcaster: ChangeBroadcaster,
    pub catalog_service: Arc<CatalogService>,
    pub cart_service: Arc<CartService>,
}

impl AppComponents {
    /// Wire repositories, services and the broadcaster from configuration
    pub fn from_config(config: &Config) -> Result<Self, MetricsError> {
        let metrics = Arc::new(Metrics::new()?);
        let broadcaster =
            ChangeBroadcaster::with_metrics(config.events.channel_capacity, metrics.clone());

        let product_repository = Arc::new(JsonFileProductRepository::with_metrics(
            config.storage.products_path(),
            metrics.clone(),
        ));
        let cart_repository = Arc::new(JsonFileCartRepository::with_metrics(
            config.storage.carts_path(),
            metrics.clone(),
        ));
        info!(
            products = %config.storage.products_path().display(),
            carts = %config.storage.carts_path().display(),
            "Repositories initialized"
        );

        let catalog_service = Arc::new(CatalogService::new(
            product_repository,
            broadcaster.clone(),
        ));
        let cart_service = Arc::new(CartService::new(cart_repository));

        Ok(Self {
            metrics,
            broadcaster,
            catalog_service,
            cart_service,
        })
    }
}

/// Build the application router
pub fn create_app(components: &AppComponents, server: &ServerConfig) -> Router {
    let metrics_for_middleware = components.metrics.clone();

    let api_state = ApiState {
        catalog_service: components.catalog_service.clone(),
        cart_service: components.cart_service.clone(),
    };

    let admin_state = AdminState {
        catalog_service: components.catalog_service.clone(),
    };

    Router::new()
        // Health and change stream endpoints (with broadcaster state)
        .route("/health/status", get(health_check))
        .route("/ws/products", get(product_events))
        .with_state(components.broadcaster.clone())
        .route("/metrics", get(metrics_handler))
        .with_state(components.metrics.clone())
        // Catalog and cart endpoints (with API state)
        .merge(product_routes().merge(cart_routes()).with_state(api_state))
        // Admin endpoints (with admin state)
        .route("/api/admin/seed", post(admin::seed_catalog))
        .with_state(admin_state)
        .fallback(not_found_handler)
        // Add middleware layers (the last added runs first)
        .layer(RequestBodyLimitLayer::new(server.max_request_size))
        .layer(TimeoutLayer::new(server.request_timeout()))
        .layer(middleware::from_fn(move |req, next| {
            observability_middleware(metrics_for_middleware.clone(), req, next)
        }))
        .layer(middleware::from_fn(request_validation_middleware))
        .layer(cors_layer())
        .layer(middleware::from_fn(security_headers_middleware))
}
