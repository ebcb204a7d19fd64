use thiserror::Error;

use crate::actor_framework::FrameworkError;

/// Errors that can occur during order operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum OrderError {
    #[error("Order not found: {0}")]
    NotFound(String),
    #[error("Order already exists: {0}")]
    AlreadyExists(String),
    #[error("Invalid quantity: {0}")]
    InvalidQuantity(u32),
    #[error("Insufficient stock for {product}: requested {requested}, available {available}")]
    InsufficientStock {
        product: String,
        requested: u32,
        available: u32,
    },
    #[error("Order validation error: {0}")]
    ValidationError(String),
    #[error("Order {0} cannot be deleted")]
    Immutable(String),
    #[error("Order database error: {0}")]
    DatabaseError(String),
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl From<FrameworkError<OrderError>> for OrderError {
    fn from(err: FrameworkError<OrderError>) -> Self {
        match err {
            FrameworkError::Entity(e) => e,
            FrameworkError::NotFound(id) => OrderError::NotFound(id),
            FrameworkError::AlreadyExists(id) => OrderError::AlreadyExists(id),
            FrameworkError::Storage(msg) => OrderError::DatabaseError(msg),
            e @ (FrameworkError::ActorClosed | FrameworkError::ActorDropped) => {
                OrderError::ActorCommunicationError(e.to_string())
            }
        }
    }
}
