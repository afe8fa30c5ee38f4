use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::instrument;

use crate::models::{Cart, StorageResult};
use crate::observability::Metrics;

use super::FlatFileStore;

/// Trait defining the interface for cart persistence
#[async_trait]
pub trait CartRepository: Send + Sync {
    /// Load every cart, in stored order
    async fn find_all(&self) -> StorageResult<Vec<Cart>>;

    /// Replace the stored carts with `carts`
    async fn save_all(&self, carts: &[Cart]) -> StorageResult<()>;
}

/// JSON flat-file implementation of the CartRepository trait
pub struct JsonFileCartRepository {
    store: FlatFileStore<Cart>,
}

impl JsonFileCartRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            store: FlatFileStore::new(path, "carts"),
        }
    }

    pub fn with_metrics(path: impl Into<PathBuf>, metrics: Arc<Metrics>) -> Self {
        Self {
            store: FlatFileStore::new(path, "carts").with_metrics(metrics),
        }
    }
}

#[async_trait]
impl CartRepository for JsonFileCartRepository {
    #[instrument(skip(self))]
    async fn find_all(&self) -> StorageResult<Vec<Cart>> {
        self.store.load().await
    }

    #[instrument(skip(self, carts), fields(count = carts.len()))]
    async fn save_all(&self, carts: &[Cart]) -> StorageResult<()> {
        self.store.save(carts).await
    }
}
