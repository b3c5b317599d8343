//! Client registry
//!
//! Built once from configuration before any listening loop starts, read-only
//! afterwards. Loops hold `Arc` clones of the clients they resolved, so no
//! locking is needed.

use std::collections::HashMap;
use std::sync::Arc;

use contracts::{ContractError, ServiceConfig, ServiceConfigList, SubscribeRequest};
use tracing::{debug, instrument};

use crate::error::{ClientError, Result};

/// Immutable name -> client map
#[derive(Debug)]
pub struct ClientRegistry<C> {
    clients: HashMap<String, Arc<C>>,
}

impl<C> ClientRegistry<C> {
    /// Create one client per endpoint entry of `configs`
    ///
    /// Entries without a port are skipped; they only declare subscriptions.
    #[instrument(
        name = "client_registry_from_configs",
        skip(configs, connect),
        fields(entries = configs.configs.len())
    )]
    pub fn from_configs<F>(configs: &ServiceConfigList, mut connect: F) -> Result<Self>
    where
        F: FnMut(&ServiceConfig) -> Result<C>,
    {
        let mut clients = HashMap::new();
        for config in configs.endpoints() {
            let client = connect(config)?;
            if clients.insert(config.name.clone(), Arc::new(client)).is_some() {
                return Err(ClientError::DuplicateClient {
                    name: config.name.clone(),
                });
            }
            debug!(client = %config.name, host = %config.host, port = ?config.port, "client registered");
        }
        Ok(Self { clients })
    }

    /// Build from already constructed clients
    pub fn from_clients(clients: impl IntoIterator<Item = (String, C)>) -> Result<Self> {
        let mut map = HashMap::new();
        for (name, client) in clients {
            if map.contains_key(&name) {
                return Err(ClientError::DuplicateClient { name });
            }
            map.insert(name, Arc::new(client));
        }
        Ok(Self { clients: map })
    }

    /// Look up a client by name
    pub fn get(&self, name: &str) -> Option<&Arc<C>> {
        self.clients.get(name)
    }

    /// Resolve the owning client of a subscription
    ///
    /// # Errors
    /// `UnknownClient` if the query names no service or an unregistered one.
    pub fn resolve(&self, request: &SubscribeRequest) -> std::result::Result<Arc<C>, ContractError> {
        let name = request.service_name().unwrap_or_default();
        self.clients
            .get(name)
            .cloned()
            .ok_or_else(|| ContractError::UnknownClient {
                name: name.to_string(),
                path: request.path().to_string(),
            })
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.clients.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}
