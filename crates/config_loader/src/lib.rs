//! # Config Loader
//!
//! Loads service configuration documents.
//!
//! Responsibilities:
//! - Parse JSON/TOML configuration files (single entry or list)
//! - Validate field rules and cross references
//! - Produce a `ServiceConfigList`
//!
//! # Example
//!
//! ```no_run
//! use config_loader::ConfigLoader;
//! use std::path::Path;
//!
//! let configs = ConfigLoader::load_from_path(Path::new("service_config.json")).unwrap();
//! println!("subscriptions: {}", configs.subscriptions().count());
//! ```

mod parser;
mod validator;

pub use contracts::ServiceConfigList;
pub use parser::ConfigFormat;

use contracts::ContractError;
use std::path::Path;
use tracing::debug;

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from file path
    ///
    /// Detects format from the file extension (.json / .toml).
    ///
    /// # Errors
    /// - File read failure
    /// - Unsupported format
    /// - Parse failure
    /// - Validation failure
    pub fn load_from_path(path: &Path) -> Result<ServiceConfigList, ContractError> {
        let format = Self::detect_format(path)?;
        let content = Self::read_file(path)?;
        debug!(path = %path.display(), ?format, "parsing service config");
        Self::load_from_str(&content, format)
    }

    /// Load configuration from string
    ///
    /// # Errors
    /// - Parse failure
    /// - Validation failure
    pub fn load_from_str(
        content: &str,
        format: ConfigFormat,
    ) -> Result<ServiceConfigList, ContractError> {
        let configs = parser::parse(content, format)?;
        validator::validate(&configs)?;
        Ok(configs)
    }

    /// Serialize to JSON string
    pub fn to_json(configs: &ServiceConfigList) -> Result<String, ContractError> {
        serde_json::to_string_pretty(configs)
            .map_err(|e| ContractError::config_parse(format!("JSON serialize error: {e}")))
    }
}

impl ConfigLoader {
    fn detect_format(path: &Path) -> Result<ConfigFormat, ContractError> {
        let ext = path.extension().and_then(|e| e.to_str()).ok_or_else(|| {
            ContractError::config_parse("cannot determine file format from extension")
        })?;

        ConfigFormat::from_extension(ext).ok_or_else(|| {
            ContractError::config_parse(format!("unsupported config format: .{ext}"))
        })
    }

    fn read_file(path: &Path) -> Result<String, ContractError> {
        std::fs::read_to_string(path).map_err(|e| {
            ContractError::config_parse(format!("cannot read {}: {e}", path.display()))
        })
    }
}
