use dashmap::DashMap;
use std::fmt;
use std::sync::{Arc, Weak};
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::models::CatalogEvent;
use crate::observability::Metrics;

/// Default per-subscriber queue depth
pub const DEFAULT_CHANNEL_CAPACITY: usize = 64;

/// Identifier handed out for each subscription
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(Uuid);

impl SubscriptionId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

struct Registry {
    subscribers: DashMap<SubscriptionId, mpsc::Sender<CatalogEvent>>,
    metrics: Option<Arc<Metrics>>,
}

impl Registry {
    fn remove(&self, id: &SubscriptionId) -> bool {
        let removed = self.subscribers.remove(id).is_some();
        if removed {
            self.report_count();
        }
        removed
    }

    fn report_count(&self) {
        if let Some(metrics) = &self.metrics {
            metrics.set_subscribers(self.subscribers.len());
        }
    }
}

/// Fan-out of catalog change events to any number of live subscribers.
///
/// Each subscriber gets its own bounded queue. Publishing never waits: a
/// subscriber whose queue is full misses that event, and a subscriber whose
/// receiving side is gone is pruned. Delivery to one subscriber never
/// affects another.
#[derive(Clone)]
pub struct ChangeBroadcaster {
    registry: Arc<Registry>,
    capacity: usize,
}

impl ChangeBroadcaster {
    pub fn new(capacity: usize) -> Self {
        Self::build(capacity, None)
    }

    /// Create a broadcaster that reports published events and subscriber counts
    pub fn with_metrics(capacity: usize, metrics: Arc<Metrics>) -> Self {
        Self::build(capacity, Some(metrics))
    }

    fn build(capacity: usize, metrics: Option<Arc<Metrics>>) -> Self {
        Self {
            registry: Arc::new(Registry {
                subscribers: DashMap::new(),
                metrics,
            }),
            capacity: capacity.max(1),
        }
    }

    /// Register a new subscriber. Events published from now on are queued
    /// for it until the returned subscription is dropped or unsubscribed.
    pub fn subscribe(&self) -> Subscription {
        let (sender, receiver) = mpsc::channel(self.capacity);
        let id = SubscriptionId::new();

        self.registry.subscribers.insert(id, sender);
        self.registry.report_count();
        debug!(subscription_id = %id, "Subscriber registered");

        Subscription {
            id,
            receiver,
            registry: Arc::downgrade(&self.registry),
        }
    }

    /// Remove a subscription. Returns false if it was already gone.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let removed = self.registry.remove(&id);
        if removed {
            debug!(subscription_id = %id, "Subscriber removed");
        }
        removed
    }

    /// Deliver `event` to every current subscriber and return how many
    /// queued it. Zero subscribers is not an error.
    pub fn publish(&self, event: CatalogEvent) -> usize {
        let mut delivered = 0;
        let mut closed = Vec::new();

        for entry in self.registry.subscribers.iter() {
            match entry.value().try_send(event.clone()) {
                Ok(()) => delivered += 1,
                Err(TrySendError::Full(_)) => {
                    warn!(
                        subscription_id = %entry.key(),
                        event = %event.event,
                        "Subscriber queue full, dropping event"
                    );
                }
                Err(TrySendError::Closed(_)) => closed.push(*entry.key()),
            }
        }

        // Removal takes a shard write lock, so it cannot happen while iterating
        for id in closed {
            self.registry.remove(&id);
            debug!(subscription_id = %id, "Pruned closed subscriber");
        }

        if let Some(metrics) = &self.registry.metrics {
            metrics.record_event_published(event.event.as_str());
        }

        debug!(
            event = %event.event,
            product_id = event.product_id(),
            delivered = delivered,
            "Catalog event published"
        );
        delivered
    }

    pub fn subscriber_count(&self) -> usize {
        self.registry.subscribers.len()
    }
}

impl Default for ChangeBroadcaster {
    fn default() -> Self {
        Self::new(DEFAULT_CHANNEL_CAPACITY)
    }
}

/// Receiving side of one subscription. Dropping it unsubscribes.
pub struct Subscription {
    id: SubscriptionId,
    receiver: mpsc::Receiver<CatalogEvent>,
    registry: Weak<Registry>,
}

impl Subscription {
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Wait for the next event. Returns None once the subscription has been
    /// removed and its queue is drained.
    pub async fn recv(&mut self) -> Option<CatalogEvent> {
        self.receiver.recv().await
    }

    /// Take the next queued event without waiting
    pub fn try_recv(&mut self) -> Option<CatalogEvent> {
        self.receiver.try_recv().ok()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.remove(&self.id);
        }
    }
}
