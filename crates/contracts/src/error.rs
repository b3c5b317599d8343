//! Layered error definitions
//!
//! Categorized by source: config / decode / transport / calibration / display

use thiserror::Error;

/// Unified error type
#[derive(Debug, Error)]
pub enum ContractError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    /// Subscription references a client that is not in the registry
    #[error("unknown client '{name}' referenced by subscription '{path}'")]
    UnknownClient { name: String, path: String },

    // ===== Decode Errors =====
    /// Encoded frame could not be decoded
    #[error("decode error for '{source_name}': {message}")]
    Decode {
        source_name: String,
        message: String,
    },

    /// Message-type tag does not map to a known message
    #[error("unknown message type '{tag}'")]
    UnknownMessageType { tag: String },

    // ===== Transport Errors =====
    /// Subscription stream or request/reply failed
    #[error("transport error on client '{client}': {message}")]
    Transport { client: String, message: String },

    // ===== Calibration Errors =====
    /// Calibration reply empty or malformed
    #[error("calibration error: {message}")]
    Calibration { message: String },

    // ===== Display Errors =====
    /// Display collaborator rejected a frame or geometry
    #[error("display '{surface}' error: {message}")]
    Display { surface: String, message: String },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl ContractError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create decode error
    pub fn decode(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            source_name: source_name.into(),
            message: message.into(),
        }
    }

    /// Create transport error
    pub fn transport(client: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Transport {
            client: client.into(),
            message: message.into(),
        }
    }

    /// Create calibration error
    pub fn calibration(message: impl Into<String>) -> Self {
        Self::Calibration {
            message: message.into(),
        }
    }

    /// Create display error
    pub fn display(surface: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Display {
            surface: surface.into(),
            message: message.into(),
        }
    }

    /// Whether the error only affects the current event.
    ///
    /// Per-event errors are logged and skipped; anything else ends the owning loop.
    pub fn is_per_event(&self) -> bool {
        matches!(
            self,
            Self::Decode { .. } | Self::UnknownMessageType { .. } | Self::Display { .. }
        )
    }

    /// Whether the error belongs to the configuration family (fatal at startup)
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::ConfigParse { .. } | Self::ConfigValidation { .. } | Self::UnknownClient { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_per_event_classification() {
        assert!(ContractError::decode("oak0/rgb", "bad header").is_per_event());
        assert!(ContractError::UnknownMessageType { tag: "x".into() }.is_per_event());
        assert!(!ContractError::transport("oak0", "closed").is_per_event());
        assert!(!ContractError::calibration("empty").is_per_event());
    }

    #[test]
    fn test_configuration_classification() {
        let err = ContractError::UnknownClient {
            name: "oak9".into(),
            path: "/rgb".into(),
        };
        assert!(err.is_configuration());
        assert!(err.to_string().contains("oak9"));
        assert!(!ContractError::decode("a", "b").is_configuration());
    }
}
