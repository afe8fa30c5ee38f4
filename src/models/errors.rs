use std::path::PathBuf;

use thiserror::Error;

/// Service-level errors that can occur in business logic
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Product not found: {id}")]
    ProductNotFound { id: u64 },

    #[error("Cart not found: {id}")]
    CartNotFound { id: u64 },

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("No identifiers left in the {collection} collection")]
    IdsExhausted { collection: &'static str },

    #[error("Storage error: {source}")]
    Storage {
        #[from]
        source: StorageError,
    },
}

impl ServiceError {
    /// True for errors caused by the caller referencing an id that does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            ServiceError::ProductNotFound { .. } | ServiceError::CartNotFound { .. }
        )
    }
}

/// Flat-file storage errors
///
/// A missing or empty collection file is not an error: the store normalizes
/// both to an empty collection before any of these can be produced.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization error: {source}")]
    Serialization {
        #[from]
        source: serde_json::Error,
    },
}

/// Validation errors for input data
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Missing required fields: {}", fields.join(", "))]
    MissingFields { fields: Vec<String> },

    #[error("Field 'price' must be a positive number, got {value}")]
    InvalidPrice { value: String },

    #[error("Malformed request body: {message}")]
    MalformedBody { message: String },
}

/// Result type alias for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Result type alias for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Result type alias for validation operations
pub type ValidationResult<T> = Result<T, ValidationError>;
