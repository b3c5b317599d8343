//! Mock event client
//!
//! Scripted in-memory client for tests, with failure injection.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use contracts::{ContractError, DecodedMessage, OakCalibration, SubscribeRequest};
use tracing::instrument;

use crate::client::{EventClient, CALIBRATION_PATH};
use crate::stream::{EventItem, EventStream};

/// Mock client configuration
#[derive(Debug, Default, Clone)]
pub struct MockConfig {
    /// Paths whose subscribe call fails
    pub fail_subscribe: Vec<String>,
    /// Reply to `/calibration` (None = transport error)
    pub calibration: Option<OakCalibration>,
}

/// Mock event client
///
/// Each subscribed path replays its script once and then ends.
/// Unscripted paths yield an empty stream.
pub struct MockEventClient {
    name: String,
    config: MockConfig,
    scripts: Mutex<HashMap<String, Vec<Result<EventItem, ContractError>>>>,
    subscribe_calls: AtomicUsize,
    request_calls: AtomicUsize,
}

impl MockEventClient {
    /// Create a mock client with default config
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_config(name, MockConfig::default())
    }

    /// Create a mock client with config
    pub fn with_config(name: impl Into<String>, config: MockConfig) -> Self {
        Self {
            name: name.into(),
            config,
            scripts: Mutex::new(HashMap::new()),
            subscribe_calls: AtomicUsize::new(0),
            request_calls: AtomicUsize::new(0),
        }
    }

    /// Script the items delivered on `path`
    pub fn with_script(
        self,
        path: impl Into<String>,
        items: Vec<Result<EventItem, ContractError>>,
    ) -> Self {
        self.scripts
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(path.into(), items);
        self
    }

    /// Number of subscribe calls so far
    pub fn subscribe_count(&self) -> usize {
        self.subscribe_calls.load(Ordering::SeqCst)
    }

    /// Number of request/reply calls so far
    pub fn request_count(&self) -> usize {
        self.request_calls.load(Ordering::SeqCst)
    }

    fn take_script(&self, path: &str) -> Vec<Result<EventItem, ContractError>> {
        self.scripts
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .remove(path)
            .unwrap_or_default()
    }
}

impl EventClient for MockEventClient {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(name = "mock_client_subscribe", skip(self, request), fields(client = %self.name, path = %request.path()))]
    async fn subscribe(&self, request: &SubscribeRequest) -> Result<EventStream, ContractError> {
        self.subscribe_calls.fetch_add(1, Ordering::SeqCst);
        let path = request.path();

        if self.config.fail_subscribe.iter().any(|p| p == path) {
            return Err(ContractError::transport(&self.name, "mock subscribe failure"));
        }

        let items = self.take_script(path);
        Ok(EventStream::from_items(&self.name, path, items))
    }

    #[instrument(name = "mock_client_request_reply", skip(self), fields(client = %self.name))]
    async fn request_reply(&self, path: &str) -> Result<DecodedMessage, ContractError> {
        self.request_calls.fetch_add(1, Ordering::SeqCst);

        match (path, &self.config.calibration) {
            (CALIBRATION_PATH, Some(calibration)) => {
                Ok(DecodedMessage::Calibration(calibration.clone()))
            }
            _ => Err(ContractError::transport(
                &self.name,
                format!("no reply configured for '{path}'"),
            )),
        }
    }
}
