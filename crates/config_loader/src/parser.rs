//! Configuration parsing
//!
//! JSON is the camera service's native format; TOML is accepted as well.

use contracts::{ConfigDocument, ContractError, ServiceConfigList};

/// Configuration file format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// JSON format
    Json,
    /// TOML format
    Toml,
}

impl ConfigFormat {
    /// Infer format from file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "json" => Some(Self::Json),
            "toml" => Some(Self::Toml),
            _ => None,
        }
    }
}

/// Parse a JSON document
pub fn parse_json(content: &str) -> Result<ServiceConfigList, ContractError> {
    serde_json::from_str::<ConfigDocument>(content)
        .map(ConfigDocument::into_list)
        .map_err(|e| ContractError::ConfigParse {
            message: format!("JSON parse error: {e}"),
            source: Some(Box::new(e)),
        })
}

/// Parse a TOML document
pub fn parse_toml(content: &str) -> Result<ServiceConfigList, ContractError> {
    toml::from_str::<ConfigDocument>(content)
        .map(ConfigDocument::into_list)
        .map_err(|e| ContractError::ConfigParse {
            message: format!("TOML parse error: {e}"),
            source: Some(Box::new(e)),
        })
}

/// Parse by format
pub fn parse(content: &str, format: ConfigFormat) -> Result<ServiceConfigList, ContractError> {
    match format {
        ConfigFormat::Json => parse_json(content),
        ConfigFormat::Toml => parse_toml(content),
    }
}
