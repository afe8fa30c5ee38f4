// Services module - business logic layer

pub mod broadcaster;
pub mod cart_service;
pub mod catalog_service;

pub use broadcaster::{ChangeBroadcaster, Subscription, SubscriptionId};
pub use cart_service::CartService;
pub use catalog_service::CatalogService;
