//! # Event Client
//!
//! Pub/sub client collaborator.
//!
//! Responsibilities:
//! - Define the `EventClient` interface (`subscribe`, `request_reply`)
//! - Hold one client per endpoint in an immutable `ClientRegistry`
//! - Provide an in-memory scripted client for tests
//! - Provide a synthetic camera service for running without hardware
//!
//! The network transport itself lives outside this workspace; any transport
//! plugs in by implementing `EventClient`.

pub mod client;
pub mod error;
pub mod mock_client;
pub mod registry;
pub mod stream;
pub mod synthetic;

pub use client::{EventClient, LocalEventClient, CALIBRATION_PATH};
pub use error::{ClientError, Result};
pub use mock_client::{MockConfig, MockEventClient};
pub use registry::ClientRegistry;
pub use stream::{frame_event, EventItem, EventSender, EventStream};
pub use synthetic::{SyntheticConfig, SyntheticEventClient};
