//! Event client error types

use contracts::ContractError;
use thiserror::Error;

/// Event client specific error
#[derive(Debug, Error)]
pub enum ClientError {
    /// Client could not be created for a service entry
    #[error("failed to create client '{name}': {message}")]
    CreateFailed { name: String, message: String },

    /// Two endpoints share a name
    #[error("duplicate client name '{name}'")]
    DuplicateClient { name: String },

    /// Service entry has no network endpoint
    #[error("service '{name}' has no port configured")]
    NotAnEndpoint { name: String },

    /// Wrapped ContractError
    #[error(transparent)]
    Contract(#[from] ContractError),
}

impl ClientError {
    /// Create client creation error
    pub fn create_failed(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::CreateFailed {
            name: name.into(),
            message: message.into(),
        }
    }
}

/// Result alias
pub type Result<T> = std::result::Result<T, ClientError>;
