use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, instrument};

use crate::models::{
    next_id, sample_catalog, CatalogEvent, Product, ProductDraft, ServiceError, ServiceResult,
};
use crate::repositories::ProductRepository;
use crate::services::ChangeBroadcaster;

/// Service for managing the product catalog
pub struct CatalogService {
    repository: Arc<dyn ProductRepository>,
    broadcaster: ChangeBroadcaster,
    // Held across every load-modify-save of the catalog collection
    write_lock: Mutex<()>,
}

impl CatalogService {
    /// Create a new CatalogService publishing changes through `broadcaster`
    pub fn new(repository: Arc<dyn ProductRepository>, broadcaster: ChangeBroadcaster) -> Self {
        Self {
            repository,
            broadcaster,
            write_lock: Mutex::new(()),
        }
    }

    pub fn broadcaster(&self) -> &ChangeBroadcaster {
        &self.broadcaster
    }

    /// List every product in stored order
    #[instrument(skip(self))]
    pub async fn list_products(&self) -> ServiceResult<Vec<Product>> {
        let products = self.repository.find_all().await?;
        crate::info_with_trace!("Found {} products", products.len());
        Ok(products)
    }

    /// Get a specific product by id
    #[instrument(skip(self), fields(product_id = id))]
    pub async fn get_product(&self, id: u64) -> ServiceResult<Product> {
        self.repository
            .find_all()
            .await?
            .into_iter()
            .find(|product| product.id == id)
            .ok_or(ServiceError::ProductNotFound { id })
    }

    /// Validate and add a new product, then announce it
    #[instrument(skip(self, draft))]
    pub async fn add_product(&self, draft: ProductDraft) -> ServiceResult<Product> {
        let _guard = self.write_lock.lock().await;

        let mut products = self.repository.find_all().await?;
        let product = Product::create(draft, allocate_id(&products)?)?;
        products.push(product.clone());
        self.repository.save_all(&products).await?;

        crate::info_with_trace!(product_id = product.id, code = %product.code, "Product added");
        self.broadcaster
            .publish(CatalogEvent::product_added(product.clone()));

        Ok(product)
    }

    /// Merge the present draft fields into an existing product, then announce it
    #[instrument(skip(self, draft), fields(product_id = id))]
    pub async fn update_product(&self, id: u64, draft: ProductDraft) -> ServiceResult<Product> {
        let _guard = self.write_lock.lock().await;

        let mut products = self.repository.find_all().await?;
        let slot = products
            .iter_mut()
            .find(|product| product.id == id)
            .ok_or(ServiceError::ProductNotFound { id })?;

        let updated = slot.merged_with(draft)?;
        *slot = updated.clone();
        self.repository.save_all(&products).await?;

        crate::info_with_trace!(product_id = id, "Product updated");
        self.broadcaster
            .publish(CatalogEvent::product_updated(updated.clone()));

        Ok(updated)
    }

    /// Remove a product, then announce its id
    #[instrument(skip(self), fields(product_id = id))]
    pub async fn remove_product(&self, id: u64) -> ServiceResult<()> {
        let _guard = self.write_lock.lock().await;

        let mut products = self.repository.find_all().await?;
        let before = products.len();
        products.retain(|product| product.id != id);
        if products.len() == before {
            return Err(ServiceError::ProductNotFound { id });
        }
        self.repository.save_all(&products).await?;

        crate::info_with_trace!(product_id = id, "Product removed");
        self.broadcaster.publish(CatalogEvent::product_deleted(id));

        Ok(())
    }

    /// Load the sample catalog if the catalog is empty. Returns the products
    /// that were added, which is empty when the catalog already had entries.
    #[instrument(skip(self))]
    pub async fn seed_catalog(&self) -> ServiceResult<Vec<Product>> {
        let _guard = self.write_lock.lock().await;

        let mut products = self.repository.find_all().await?;
        if !products.is_empty() {
            info!(existing = products.len(), "Catalog not empty, skipping seed");
            return Ok(Vec::new());
        }

        let mut seeded = Vec::new();
        for draft in sample_catalog() {
            let product = Product::create(draft, allocate_id(&products)?)?;
            products.push(product.clone());
            seeded.push(product);
        }
        self.repository.save_all(&products).await?;

        for product in &seeded {
            self.broadcaster
                .publish(CatalogEvent::product_added(product.clone()));
        }

        crate::info_with_trace!("Seeded catalog with {} products", seeded.len());
        Ok(seeded)
    }
}

fn allocate_id(products: &[Product]) -> ServiceResult<u64> {
    next_id(products).ok_or(ServiceError::IdsExhausted {
        collection: "products",
    })
}
