use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use tracing::{error, instrument};

use super::{parse_record_id, service_error_to_response, ApiError, ApiState};
use crate::models::{Cart, LineItem};

/// Cart routes
pub fn cart_routes() -> Router<ApiState> {
    Router::new()
        .route("/api/carts", post(create_cart))
        .route("/api/carts/:cart_id", get(list_cart_items))
        .route(
            "/api/carts/:cart_id/product/:product_id",
            post(add_product_to_cart),
        )
}

/// Create an empty cart
#[instrument(name = "create_cart", skip(state))]
pub async fn create_cart(
    State(state): State<ApiState>,
) -> Result<(StatusCode, Json<Cart>), ApiError> {
    match state.cart_service.create_cart().await {
        Ok(cart) => Ok((StatusCode::CREATED, Json(cart))),
        Err(err) => {
            error!("Failed to create cart: {}", err);
            Err(service_error_to_response(err))
        }
    }
}

/// List the line items of a cart
#[instrument(name = "list_cart_items", skip(state), fields(cart_id = %cart_id))]
pub async fn list_cart_items(
    State(state): State<ApiState>,
    Path(cart_id): Path<String>,
) -> Result<Json<Vec<LineItem>>, ApiError> {
    let id = parse_record_id(&cart_id, "Cart")?;

    state
        .cart_service
        .list_items(id)
        .await
        .map(Json)
        .map_err(service_error_to_response)
}

/// Add one unit of a product to a cart
#[instrument(name = "add_product_to_cart", skip(state), fields(
    cart_id = %cart_id,
    product_id = %product_id,
))]
pub async fn add_product_to_cart(
    State(state): State<ApiState>,
    Path((cart_id, product_id)): Path<(String, String)>,
) -> Result<Json<Cart>, ApiError> {
    let cart = parse_record_id(&cart_id, "Cart")?;
    let product = parse_record_id(&product_id, "Product")?;

    match state.cart_service.add_product(cart, product).await {
        Ok(updated) => Ok(Json(updated)),
        Err(err) => {
            error!("Failed to add product {} to cart {}: {}", product, cart, err);
            Err(service_error_to_response(err))
        }
    }
}
