// Re-export all model types
pub use self::cart::*;
pub use self::errors::*;
pub use self::events::*;
pub use self::identity::*;
pub use self::product::*;

mod cart;
mod errors;
mod events;
mod identity;
mod product;
