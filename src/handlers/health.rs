use axum::{extract::State, response::Json};
use serde_json::{json, Value};
use tracing::instrument;

use crate::services::ChangeBroadcaster;

/// Health check endpoint handler
#[instrument(name = "health_check", skip(broadcaster))]
pub async fn health_check(State(broadcaster): State<ChangeBroadcaster>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "subscribers": broadcaster.subscriber_count(),
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}
