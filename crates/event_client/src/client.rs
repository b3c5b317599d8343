//! Event client abstraction
//!
//! Defines the interface to a camera service, supporting real transports and
//! in-process implementations behind the same API.

use contracts::{ContractError, DecodedMessage, SubscribeRequest};

use crate::stream::EventStream;

/// Request path answered with the device calibration
pub const CALIBRATION_PATH: &str = "/calibration";

/// Event client trait
///
/// One instance per named service endpoint. Instances are shared read-only
/// between listening loops.
#[trait_variant::make(EventClient: Send)]
pub trait LocalEventClient {
    /// Service name this client is bound to
    fn name(&self) -> &str;

    /// Subscribe to a topic
    ///
    /// Returns a lazy stream of `(event, message)` pairs in arrival order.
    /// Decimation (`every_n`) is applied by the publisher.
    ///
    /// # Errors
    /// Transport error if the subscription cannot be opened.
    async fn subscribe(&self, request: &SubscribeRequest) -> Result<EventStream, ContractError>;

    /// Send an empty request to `path` and await a single reply
    ///
    /// # Errors
    /// Transport error if the request fails or the path is not served.
    async fn request_reply(&self, path: &str) -> Result<DecodedMessage, ContractError>;
}
