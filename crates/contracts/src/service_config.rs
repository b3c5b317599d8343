//! Service configuration - Config Loader output
//!
//! A document is either one service entry or a list of them. Entries with a port
//! are endpoints (one client each); entries without a port declare the
//! subscriptions served by the endpoints they name.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::Uri;

/// One topic a listening loop consumes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct SubscribeRequest {
    /// Topic path and query (query names the owning service)
    #[validate(nested)]
    pub uri: Uri,

    /// Process every Nth event (applied by the publisher)
    #[serde(default = "default_every_n")]
    #[validate(range(min = 1, message = "every_n must be >= 1"))]
    pub every_n: u32,
}

fn default_every_n() -> u32 {
    1
}

impl SubscribeRequest {
    /// Create a request for `path` on `service`
    pub fn new(service: &str, path: impl Into<String>, every_n: u32) -> Self {
        Self {
            uri: Uri::new(path, format!("service_name={service}")),
            every_n,
        }
    }

    /// Owning service name from the query
    pub fn service_name(&self) -> Option<&str> {
        self.uri.service_name()
    }

    /// Topic path
    pub fn path(&self) -> &str {
        &self.uri.path
    }
}

/// Per-service configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct ServiceConfig {
    /// Service name (client name when an endpoint)
    #[validate(length(min = 1, message = "service name cannot be empty"))]
    pub name: String,

    /// Network host
    #[serde(default = "default_host")]
    pub host: String,

    /// Network port; absent (or 0) for subscription-only entries
    #[serde(default)]
    pub port: Option<u16>,

    /// Subscriptions declared by this entry
    #[serde(default)]
    #[validate(nested)]
    pub subscriptions: Vec<SubscribeRequest>,

    /// Log level hint for the service
    #[serde(default)]
    pub log_level: Option<String>,
}

fn default_host() -> String {
    "localhost".to_string()
}

impl ServiceConfig {
    /// Whether this entry describes a network endpoint
    ///
    /// Port 0 counts as no port.
    pub fn is_endpoint(&self) -> bool {
        self.port.is_some_and(|p| p != 0)
    }

    /// Endpoint entry with no subscriptions
    pub fn endpoint(name: impl Into<String>, port: u16) -> Self {
        Self {
            name: name.into(),
            host: default_host(),
            port: Some(port),
            subscriptions: Vec::new(),
            log_level: None,
        }
    }

    /// Subscription-only entry
    pub fn subscriber(name: impl Into<String>, subscriptions: Vec<SubscribeRequest>) -> Self {
        Self {
            name: name.into(),
            host: default_host(),
            port: None,
            subscriptions,
            log_level: None,
        }
    }
}

/// List of service configurations
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct ServiceConfigList {
    #[validate(nested)]
    pub configs: Vec<ServiceConfig>,
}

impl ServiceConfigList {
    /// Endpoint entries (one client each)
    pub fn endpoints(&self) -> impl Iterator<Item = &ServiceConfig> {
        self.configs.iter().filter(|c| c.is_endpoint())
    }

    /// Subscriptions declared by non-endpoint entries, in declaration order
    pub fn subscriptions(&self) -> impl Iterator<Item = &SubscribeRequest> {
        self.configs
            .iter()
            .filter(|c| !c.is_endpoint())
            .flat_map(|c| c.subscriptions.iter())
    }

    /// Find an entry by name
    pub fn get(&self, name: &str) -> Option<&ServiceConfig> {
        self.configs.iter().find(|c| c.name == name)
    }
}

/// Configuration file document: a single entry or a list
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfigDocument {
    List(ServiceConfigList),
    Single(ServiceConfig),
}

impl ConfigDocument {
    /// Normalise into a list
    pub fn into_list(self) -> ServiceConfigList {
        match self {
            Self::List(list) => list,
            Self::Single(config) => ServiceConfigList {
                configs: vec![config],
            },
        }
    }
}
