//! Dispatcher error types

use contracts::ContractError;
use thiserror::Error;

/// Dispatcher-specific errors
#[derive(Debug, Error)]
pub enum DispatcherError {
    /// Display sink could not be created for a window
    #[error("failed to create sink for window '{window}': {message}")]
    SinkCreation { window: String, message: String },

    /// A listening loop ended with a fatal error
    #[error("loop '{client}{path}' failed: {source}")]
    LoopFailed {
        client: String,
        path: String,
        #[source]
        source: ContractError,
    },

    /// A listening loop panicked
    #[error("loop panicked: {message}")]
    LoopPanicked { message: String },

    /// Startup error from the shared taxonomy (e.g. unknown client)
    #[error(transparent)]
    Contract(#[from] ContractError),
}

impl DispatcherError {
    /// Create a sink creation error
    pub fn sink_creation(window: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SinkCreation {
            window: window.into(),
            message: message.into(),
        }
    }

    /// Wrap a fatal loop error
    pub fn loop_failed(client: impl Into<String>, path: impl Into<String>, source: ContractError) -> Self {
        Self::LoopFailed {
            client: client.into(),
            path: path.into(),
            source,
        }
    }

    /// True for errors raised before any loop started
    pub fn is_startup(&self) -> bool {
        match self {
            Self::SinkCreation { .. } => true,
            Self::Contract(e) => e.is_configuration(),
            _ => false,
        }
    }
}
