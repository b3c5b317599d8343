//! Uri - topic address of a subscription or event
//!
//! The query string is a `k=v&k=v` list carrying the owning service name and the
//! message-type tag, e.g. `type=farm_ng.oak.proto.OakFrame&service_name=oak0`.

use serde::{Deserialize, Serialize};
use std::fmt;
use validator::Validate;

use crate::ContractError;

/// Query keys accepted as the owning service name
const SERVICE_KEYS: [&str; 2] = ["service_name", "service"];

/// Query keys accepted as the message-type tag
const TYPE_KEYS: [&str; 2] = ["type", "message_type"];

/// Topic URI
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct Uri {
    /// Scheme (the service uses `protobuf`)
    #[serde(default = "default_scheme")]
    pub scheme: String,

    /// Authority (host of the publisher, usually empty)
    #[serde(default)]
    pub authority: String,

    /// Topic path, e.g. `/rgb` or `/disparity`
    #[validate(length(min = 1, message = "uri path cannot be empty"))]
    pub path: String,

    /// Query string
    #[serde(default)]
    pub query: String,
}

fn default_scheme() -> String {
    "protobuf".to_string()
}

impl Uri {
    /// Create a URI with the default scheme
    pub fn new(path: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            scheme: default_scheme(),
            authority: String::new(),
            path: path.into(),
            query: query.into(),
        }
    }

    /// Iterate over `(key, value)` pairs of the query string
    ///
    /// Parameters without `=` yield an empty value.
    pub fn query_pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.query
            .split('&')
            .filter(|p| !p.is_empty())
            .map(|p| p.split_once('=').unwrap_or((p, "")))
    }

    /// Look up a query parameter
    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query_pairs().find(|(k, _)| *k == key).map(|(_, v)| v)
    }

    /// Owning service name (`service_name=` or `service=`)
    pub fn service_name(&self) -> Option<&str> {
        SERVICE_KEYS
            .iter()
            .find_map(|k| self.query_value(k))
            .filter(|v| !v.is_empty())
    }

    /// Raw message-type tag (`type=` or `message_type=`)
    pub fn message_type(&self) -> Option<&str> {
        TYPE_KEYS
            .iter()
            .find_map(|k| self.query_value(k))
            .filter(|v| !v.is_empty())
    }

    /// Parse the message-type tag into a [`MessageKind`]
    pub fn message_kind(&self) -> Result<MessageKind, ContractError> {
        let tag = self
            .message_type()
            .ok_or_else(|| ContractError::UnknownMessageType {
                tag: String::new(),
            })?;
        MessageKind::from_type_tag(tag)
    }
}

impl fmt::Display for Uri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}{}", self.scheme, self.authority, self.path)?;
        if !self.query.is_empty() {
            write!(f, "?{}", self.query)?;
        }
        Ok(())
    }
}

/// Closed set of message types carried by the camera service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    /// Encoded image or disparity frame
    OakFrame,
    /// Per-camera calibration list
    OakCalibration,
}

impl MessageKind {
    /// Map a fully qualified type tag to a kind.
    ///
    /// Only the final dotted segment is significant, so both
    /// `farm_ng.oak.proto.OakFrame` and `OakFrame` resolve.
    pub fn from_type_tag(tag: &str) -> Result<Self, ContractError> {
        let short = tag.rsplit('.').next().unwrap_or(tag);
        match short {
            "OakFrame" => Ok(Self::OakFrame),
            "OakCalibration" => Ok(Self::OakCalibration),
            _ => Err(ContractError::UnknownMessageType {
                tag: tag.to_string(),
            }),
        }
    }

    /// Fully qualified tag used on the wire
    pub fn type_tag(&self) -> &'static str {
        match self {
            Self::OakFrame => "farm_ng.oak.proto.OakFrame",
            Self::OakCalibration => "farm_ng.oak.proto.OakCalibration",
        }
    }
}
