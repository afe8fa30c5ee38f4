use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};
use serde_json::{json, Value};
use tracing::{error, info, instrument};

use super::{
    json_rejection_to_response, parse_record_id, service_error_to_response, ApiError, ApiState,
};
use crate::models::{Product, ProductDraft};

/// Product catalog routes
pub fn product_routes() -> Router<ApiState> {
    Router::new()
        .route("/api/products", get(list_products).post(create_product))
        .route(
            "/api/products/:product_id",
            get(get_product).put(update_product).delete(delete_product),
        )
}

/// List every product
#[instrument(name = "list_products", skip(state))]
pub async fn list_products(State(state): State<ApiState>) -> Result<Json<Vec<Product>>, ApiError> {
    match state.catalog_service.list_products().await {
        Ok(products) => Ok(Json(products)),
        Err(err) => {
            error!("Failed to list products: {}", err);
            Err(service_error_to_response(err))
        }
    }
}

/// Get a specific product by id
#[instrument(name = "get_product", skip(state), fields(product_id = %product_id))]
pub async fn get_product(
    State(state): State<ApiState>,
    Path(product_id): Path<String>,
) -> Result<Json<Product>, ApiError> {
    let id = parse_record_id(&product_id, "Product")?;

    state
        .catalog_service
        .get_product(id)
        .await
        .map(Json)
        .map_err(service_error_to_response)
}

/// Add a product to the catalog
#[instrument(name = "create_product", skip(state, body))]
pub async fn create_product(
    State(state): State<ApiState>,
    body: Result<Json<ProductDraft>, JsonRejection>,
) -> Result<(StatusCode, Json<Product>), ApiError> {
    let Json(draft) = body.map_err(json_rejection_to_response)?;

    match state.catalog_service.add_product(draft).await {
        Ok(product) => {
            crate::info_with_trace!(product_id = product.id, "Product created");
            Ok((StatusCode::CREATED, Json(product)))
        }
        Err(err) => {
            error!("Failed to create product: {}", err);
            Err(service_error_to_response(err))
        }
    }
}

/// Partially update a product
#[instrument(name = "update_product", skip(state, body), fields(product_id = %product_id))]
pub async fn update_product(
    State(state): State<ApiState>,
    Path(product_id): Path<String>,
    body: Result<Json<ProductDraft>, JsonRejection>,
) -> Result<Json<Product>, ApiError> {
    let id = parse_record_id(&product_id, "Product")?;
    let Json(draft) = body.map_err(json_rejection_to_response)?;

    match state.catalog_service.update_product(id, draft).await {
        Ok(product) => Ok(Json(product)),
        Err(err) => {
            error!("Failed to update product {}: {}", id, err);
            Err(service_error_to_response(err))
        }
    }
}

/// Remove a product from the catalog
#[instrument(name = "delete_product", skip(state), fields(product_id = %product_id))]
pub async fn delete_product(
    State(state): State<ApiState>,
    Path(product_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_record_id(&product_id, "Product")?;

    match state.catalog_service.remove_product(id).await {
        Ok(()) => {
            info!(product_id = id, "Product deleted");
            Ok(Json(json!({
                "message": "Product deleted",
                "id": id,
            })))
        }
        Err(err) => {
            error!("Failed to delete product {}: {}", id, err);
            Err(service_error_to_response(err))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::{JsonFileCartRepository, JsonFileProductRepository};
    use crate::services::{CartService, CatalogService, ChangeBroadcaster};
    use axum::{
        body::Body,
        http::{header, Method, Request},
        response::Response,
    };
    use std::sync::Arc;
    use tempfile::TempDir;
    use tower::ServiceExt;

    fn create_test_app(dir: &TempDir) -> Router {
        let state = ApiState {
            catalog_service: Arc::new(CatalogService::new(
                Arc::new(JsonFileProductRepository::new(dir.path().join("products.json"))),
                ChangeBroadcaster::default(),
            )),
            cart_service: Arc::new(CartService::new(Arc::new(JsonFileCartRepository::new(
                dir.path().join("carts.json"),
            )))),
        };
        product_routes().with_state(state)
    }

    fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn empty_request(method: Method, uri: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    async fn body_json(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn valid_product() -> Value {
        json!({
            "title": "A",
            "description": "d",
            "code": "c",
            "price": "100",
            "category": "x"
        })
    }

    #[tokio::test]
    async fn test_create_then_get_product() {
        let dir = TempDir::new().unwrap();
        let app = create_test_app(&dir);

        let response = app
            .clone()
            .oneshot(json_request(Method::POST, "/api/products", valid_product()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(
            body_json(response).await,
            json!({
                "id": 1,
                "title": "A",
                "description": "d",
                "code": "c",
                "price": 100,
                "status": true,
                "category": "x",
                "thumbnails": []
            })
        );

        let response = app
            .oneshot(empty_request(Method::GET, "/api/products/1"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["title"], "A");
    }

    #[tokio::test]
    async fn test_list_products_empty() {
        let dir = TempDir::new().unwrap();
        let app = create_test_app(&dir);

        let response = app
            .oneshot(empty_request(Method::GET, "/api/products"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, json!([]));
    }

    #[tokio::test]
    async fn test_create_product_missing_fields() {
        let dir = TempDir::new().unwrap();
        let app = create_test_app(&dir);

        let response = app
            .oneshot(json_request(
                Method::POST,
                "/api/products",
                json!({"title": "A", "code": "c"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert_eq!(
            body["error"],
            "Validation error: Missing required fields: description, price, category"
        );
    }

    #[tokio::test]
    async fn test_create_product_malformed_json() {
        let dir = TempDir::new().unwrap();
        let app = create_test_app(&dir);

        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/products")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{\"title\": "))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_create_product_wrongly_typed_price() {
        let dir = TempDir::new().unwrap();
        let app = create_test_app(&dir);

        let mut body = valid_product();
        body["price"] = json!(true);

        let response = app
            .oneshot(json_request(Method::POST, "/api/products", body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_update_ignores_id_in_body() {
        let dir = TempDir::new().unwrap();
        let app = create_test_app(&dir);

        app.clone()
            .oneshot(json_request(Method::POST, "/api/products", valid_product()))
            .await
            .unwrap();

        let response = app
            .clone()
            .oneshot(json_request(
                Method::PUT,
                "/api/products/1",
                json!({"id": 50, "title": "B"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["id"], 1);
        assert_eq!(body["title"], "B");

        let response = app
            .oneshot(empty_request(Method::GET, "/api/products/50"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_update_missing_product() {
        let dir = TempDir::new().unwrap();
        let app = create_test_app(&dir);

        let response = app
            .oneshot(json_request(
                Method::PUT,
                "/api/products/3",
                json!({"title": "B"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_delete_product() {
        let dir = TempDir::new().unwrap();
        let app = create_test_app(&dir);

        app.clone()
            .oneshot(json_request(Method::POST, "/api/products", valid_product()))
            .await
            .unwrap();

        let response = app
            .clone()
            .oneshot(empty_request(Method::DELETE, "/api/products/1"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["id"], 1);

        let response = app
            .oneshot(empty_request(Method::DELETE, "/api/products/1"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_non_numeric_id_is_not_found() {
        let dir = TempDir::new().unwrap();
        let app = create_test_app(&dir);

        let response = app
            .oneshot(empty_request(Method::GET, "/api/products/abc"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
