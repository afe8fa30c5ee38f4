pub mod cart_repository;
pub mod flat_file;
pub mod product_repository;

#[cfg(test)]
mod tests;

pub use cart_repository::{CartRepository, JsonFileCartRepository};
pub use flat_file::FlatFileStore;
pub use product_repository::{JsonFileProductRepository, ProductRepository};
