pub mod admin;
pub mod cart;
pub mod events;
pub mod health;
pub mod metrics;
pub mod middleware;
pub mod products;

use axum::{extract::rejection::JsonRejection, http::StatusCode, response::Json};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::models::{ServiceError, ValidationError};
use crate::services::{CartService, CatalogService};

pub use admin::*;
pub use cart::*;
pub use events::*;
pub use health::*;
pub use metrics::*;
pub use middleware::*;
pub use products::*;

/// Error half of every JSON handler result
pub type ApiError = (StatusCode, Json<Value>);

/// Shared application state containing all services
#[derive(Clone)]
pub struct ApiState {
    pub catalog_service: Arc<CatalogService>,
    pub cart_service: Arc<CartService>,
}

/// Map a service error to a status code and a JSON error body.
///
/// Server-side failures are logged with their detail and answered with a
/// generic message.
pub(crate) fn service_error_to_response(err: ServiceError) -> ApiError {
    let (status, message) = match &err {
        err if err.is_not_found() => (StatusCode::NOT_FOUND, err.to_string()),
        ServiceError::Validation(_) => (StatusCode::BAD_REQUEST, err.to_string()),
        _ => {
            crate::error_with_trace!(error = %err, "Failure while handling request");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            )
        }
    };

    error_body(status, message)
}

/// Map a rejected JSON body to a validation error response
pub(crate) fn json_rejection_to_response(rejection: JsonRejection) -> ApiError {
    service_error_to_response(
        ValidationError::MalformedBody {
            message: rejection.body_text(),
        }
        .into(),
    )
}

/// Parse a record id taken from the path. Text that cannot name a stored
/// record is answered like an id that is absent.
pub(crate) fn parse_record_id(raw: &str, record: &str) -> Result<u64, ApiError> {
    raw.parse::<u64>().map_err(|_| {
        error_body(
            StatusCode::NOT_FOUND,
            format!("{} not found: {}", record, raw),
        )
    })
}

pub(crate) fn error_body(status: StatusCode, message: String) -> ApiError {
    (
        status,
        Json(json!({
            "error": message,
            "timestamp": chrono::Utc::now().to_rfc3339(),
        })),
    )
}
