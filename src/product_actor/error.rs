use thiserror::Error;

use crate::actor_framework::FrameworkError;

/// Errors that can occur during product operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ProductError {
    #[error("Product not found: {0}")]
    NotFound(String),
    #[error("Product already exists: {0}")]
    AlreadyExists(String),
    #[error("Insufficient stock: requested {requested}, available {available}")]
    InsufficientStock { requested: u32, available: u32 },
    #[error("Invalid quantity: {0}")]
    InvalidQuantity(u32),
    #[error("Invalid price: {0}")]
    InvalidPrice(f64),
    #[error("Product database error: {0}")]
    DatabaseError(String),
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl From<FrameworkError<ProductError>> for ProductError {
    fn from(err: FrameworkError<ProductError>) -> Self {
        match err {
            FrameworkError::Entity(e) => e,
            FrameworkError::NotFound(name) => ProductError::NotFound(name),
            FrameworkError::AlreadyExists(name) => ProductError::AlreadyExists(name),
            FrameworkError::Storage(msg) => ProductError::DatabaseError(msg),
            e @ (FrameworkError::ActorClosed | FrameworkError::ActorDropped) => {
                ProductError::ActorCommunicationError(e.to_string())
            }
        }
    }
}
