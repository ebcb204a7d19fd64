//! Assistant error types.

use thiserror::Error;

use crate::product_actor::ProductError;

/// Result type for provider operations.
pub type ProviderResult<T> = Result<T, ProviderError>;

/// Errors that can occur while calling the language model.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// HTTP request failed.
    #[error("Request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// Non-success status from the API.
    #[error("API error ({status}): {message}")]
    ApiError { status: u16, message: String },

    /// The response carried no usable text.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Missing API key for provider: {0}")]
    MissingApiKey(String),
}

impl ProviderError {
    pub fn api_error(status: u16, message: impl Into<String>) -> Self {
        Self::ApiError {
            status,
            message: message.into(),
        }
    }

    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::InvalidResponse(message.into())
    }
}

/// Errors surfaced to the person asking the assistant.
#[derive(Debug, Error)]
pub enum AssistantError {
    #[error("Could not read stock: {0}")]
    Stock(#[from] ProductError),

    #[error(transparent)]
    Provider(#[from] ProviderError),
}
