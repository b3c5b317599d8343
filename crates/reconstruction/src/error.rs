//! Reconstruction error types

use contracts::ContractError;
use thiserror::Error;

/// Reconstruction specific error
#[derive(Debug, Error)]
pub enum ReconstructionError {
    /// Settings rejected before any request is sent
    #[error("invalid reconstruction config: {0}")]
    InvalidConfig(String),

    /// Wrapped ContractError
    #[error(transparent)]
    Contract(#[from] ContractError),
}

/// Result alias
pub type Result<T> = std::result::Result<T, ReconstructionError>;
