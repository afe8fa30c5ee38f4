use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Product;

/// Kinds of catalog change pushed to connected observers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CatalogEventKind {
    ProductAdded,
    ProductUpdated,
    ProductDeleted,
}

impl CatalogEventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CatalogEventKind::ProductAdded => "product_added",
            CatalogEventKind::ProductUpdated => "product_updated",
            CatalogEventKind::ProductDeleted => "product_deleted",
        }
    }
}

impl std::fmt::Display for CatalogEventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Event payload: the full record for additions and updates, the bare id for deletions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EventPayload {
    Product(Product),
    ProductId(u64),
}

/// A catalog change as delivered to subscribers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEvent {
    pub event: CatalogEventKind,
    pub payload: EventPayload,
    pub timestamp: DateTime<Utc>,
}

impl CatalogEvent {
    pub fn new(event: CatalogEventKind, payload: EventPayload) -> Self {
        Self {
            event,
            payload,
            timestamp: Utc::now(),
        }
    }

    pub fn product_added(product: Product) -> Self {
        Self::new(CatalogEventKind::ProductAdded, EventPayload::Product(product))
    }

    pub fn product_updated(product: Product) -> Self {
        Self::new(CatalogEventKind::ProductUpdated, EventPayload::Product(product))
    }

    pub fn product_deleted(id: u64) -> Self {
        Self::new(CatalogEventKind::ProductDeleted, EventPayload::ProductId(id))
    }

    /// Id of the product the event is about
    pub fn product_id(&self) -> u64 {
        match &self.payload {
            EventPayload::Product(product) => product.id,
            EventPayload::ProductId(id) => *id,
        }
    }
}
