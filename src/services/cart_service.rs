use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::instrument;

use crate::models::{next_id, Cart, LineItem, ServiceError, ServiceResult};
use crate::repositories::CartRepository;

/// Service for managing shopping carts
pub struct CartService {
    cart_repository: Arc<dyn CartRepository>,
    // Held across every load-modify-save of the cart collection
    write_lock: Mutex<()>,
}

impl CartService {
    /// Create a new CartService
    pub fn new(cart_repository: Arc<dyn CartRepository>) -> Self {
        Self {
            cart_repository,
            write_lock: Mutex::new(()),
        }
    }

    /// Create and persist an empty cart
    #[instrument(skip(self))]
    pub async fn create_cart(&self) -> ServiceResult<Cart> {
        let _guard = self.write_lock.lock().await;

        let mut carts = self.cart_repository.find_all().await?;
        let id = next_id(&carts).ok_or(ServiceError::IdsExhausted { collection: "carts" })?;
        let cart = Cart::new(id);
        carts.push(cart.clone());
        self.cart_repository.save_all(&carts).await?;

        crate::info_with_trace!(cart_id = cart.id, "Cart created");
        Ok(cart)
    }

    /// Line items of a cart
    #[instrument(skip(self), fields(cart_id = cart_id))]
    pub async fn list_items(&self, cart_id: u64) -> ServiceResult<Vec<LineItem>> {
        self.cart_repository
            .find_all()
            .await?
            .into_iter()
            .find(|cart| cart.id == cart_id)
            .map(|cart| cart.products)
            .ok_or(ServiceError::CartNotFound { id: cart_id })
    }

    /// Add one unit of `product_id` to a cart. The product id is not checked
    /// against the catalog.
    #[instrument(skip(self), fields(cart_id = cart_id, product_id = product_id))]
    pub async fn add_product(&self, cart_id: u64, product_id: u64) -> ServiceResult<Cart> {
        let _guard = self.write_lock.lock().await;

        let mut carts = self.cart_repository.find_all().await?;
        let cart = carts
            .iter_mut()
            .find(|cart| cart.id == cart_id)
            .ok_or(ServiceError::CartNotFound { id: cart_id })?;

        let quantity = cart.add_product(product_id);
        let updated = cart.clone();
        self.cart_repository.save_all(&carts).await?;

        crate::info_with_trace!(
            cart_id = cart_id,
            product_id = product_id,
            quantity = quantity,
            cart_units = updated.total_quantity(),
            "Product added to cart"
        );
        Ok(updated)
    }
}
