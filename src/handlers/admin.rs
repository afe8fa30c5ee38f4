use axum::{extract::State, response::Json};
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info, instrument};

use super::{service_error_to_response, ApiError};
use crate::services::CatalogService;

/// Admin state containing services
#[derive(Clone)]
pub struct AdminState {
    pub catalog_service: Arc<CatalogService>,
}

/// Response for seeding operations
#[derive(Debug, Serialize)]
pub struct SeedResponse {
    pub message: String,
    pub products_created: usize,
    pub timestamp: String,
}

/// Load the sample catalog when the catalog is empty
#[instrument(name = "seed_catalog", skip(state))]
pub async fn seed_catalog(State(state): State<AdminState>) -> Result<Json<SeedResponse>, ApiError> {
    info!("Seeding catalog with sample products");

    match state.catalog_service.seed_catalog().await {
        Ok(seeded) => {
            let message = if seeded.is_empty() {
                "Catalog already contains products, nothing seeded".to_string()
            } else {
                format!("Seeded {} sample products", seeded.len())
            };
            Ok(Json(SeedResponse {
                message,
                products_created: seeded.len(),
                timestamp: chrono::Utc::now().to_rfc3339(),
            }))
        }
        Err(err) => {
            error!("Failed to seed catalog: {}", err);
            Err(service_error_to_response(err))
        }
    }
}
