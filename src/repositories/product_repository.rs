use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::instrument;

use crate::models::{Product, StorageResult};
use crate::observability::Metrics;

use super::FlatFileStore;

/// Trait defining the interface for product catalog persistence.
///
/// The catalog is read and written as a whole collection; callers are
/// responsible for serializing read-modify-write sequences.
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Load every product, in stored order
    async fn find_all(&self) -> StorageResult<Vec<Product>>;

    /// Replace the stored catalog with `products`
    async fn save_all(&self, products: &[Product]) -> StorageResult<()>;
}

/// JSON flat-file implementation of the ProductRepository trait
pub struct JsonFileProductRepository {
    store: FlatFileStore<Product>,
}

impl JsonFileProductRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            store: FlatFileStore::new(path, "products"),
        }
    }

    pub fn with_metrics(path: impl Into<PathBuf>, metrics: Arc<Metrics>) -> Self {
        Self {
            store: FlatFileStore::new(path, "products").with_metrics(metrics),
        }
    }
}

#[async_trait]
impl ProductRepository for JsonFileProductRepository {
    #[instrument(skip(self))]
    async fn find_all(&self) -> StorageResult<Vec<Product>> {
        self.store.load().await
    }

    #[instrument(skip(self, products), fields(count = products.len()))]
    async fn save_all(&self, products: &[Product]) -> StorageResult<()> {
        self.store.save(products).await
    }
}
