//! Event envelope
//!
//! Metadata wrapper received alongside every decoded message.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{ContractError, MessageKind, Uri};

/// Clock name used by the camera service for its driver stamps
pub const MONOTONIC_CLOCK: &str = "monotonic";

/// Semantic role of a timestamp
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StampSemantics {
    /// Driver received the frame from the sensor
    DriverReceive,
    /// Driver finished writing the frame
    DriverWrite,
    /// Service sent the event
    ServiceSend,
    /// Client received the event
    ClientReceive,
}

impl StampSemantics {
    /// Wire name (`driver/receive`, ...)
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DriverReceive => "driver/receive",
            Self::DriverWrite => "driver/write",
            Self::ServiceSend => "service/send",
            Self::ClientReceive => "client/receive",
        }
    }
}

impl fmt::Display for StampSemantics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single tagged timestamp
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Timestamp {
    /// Seconds on `clock_name`
    pub stamp: f64,

    /// Clock the stamp was taken on
    pub clock_name: String,

    /// Semantic role
    pub semantics: StampSemantics,
}

impl Timestamp {
    pub fn monotonic(stamp: f64, semantics: StampSemantics) -> Self {
        Self {
            stamp,
            clock_name: MONOTONIC_CLOCK.to_string(),
            semantics,
        }
    }
}

/// Event envelope
///
/// Immutable once received.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Topic and message-type of the payload
    pub uri: Uri,

    /// Ordered timestamps
    #[serde(default)]
    pub timestamps: Vec<Timestamp>,

    /// Publisher-side sequence number
    #[serde(default)]
    pub sequence: u64,
}

impl Event {
    pub fn new(uri: Uri, timestamps: Vec<Timestamp>, sequence: u64) -> Self {
        Self {
            uri,
            timestamps,
            sequence,
        }
    }

    /// Find a stamp by semantic role and clock name
    pub fn stamp(&self, semantics: StampSemantics, clock_name: &str) -> Option<f64> {
        self.timestamps
            .iter()
            .find(|t| t.semantics == semantics && t.clock_name == clock_name)
            .map(|t| t.stamp)
    }

    /// Monotonic driver-receive stamp, or the first stamp if that one is absent
    pub fn receive_stamp(&self) -> Option<f64> {
        self.stamp(StampSemantics::DriverReceive, MONOTONIC_CLOCK)
            .or_else(|| self.timestamps.first().map(|t| t.stamp))
    }

    /// Message kind from the URI query
    pub fn message_kind(&self) -> Result<MessageKind, ContractError> {
        self.uri.message_kind()
    }

    /// Topic path of the event
    pub fn path(&self) -> &str {
        &self.uri.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event_with(timestamps: Vec<Timestamp>) -> Event {
        Event::new(
            Uri::new("/rgb", "type=farm_ng.oak.proto.OakFrame&service_name=oak0"),
            timestamps,
            7,
        )
    }

    #[test]
    fn test_stamp_lookup_by_semantics_and_clock() {
        let event = event_with(vec![
            Timestamp::monotonic(1.0, StampSemantics::ServiceSend),
            Timestamp::monotonic(0.5, StampSemantics::DriverReceive),
            Timestamp {
                stamp: 99.0,
                clock_name: "wall".into(),
                semantics: StampSemantics::DriverReceive,
            },
        ]);
        assert_eq!(
            event.stamp(StampSemantics::DriverReceive, MONOTONIC_CLOCK),
            Some(0.5)
        );
        assert_eq!(event.stamp(StampSemantics::DriverReceive, "wall"), Some(99.0));
        assert_eq!(event.stamp(StampSemantics::ClientReceive, MONOTONIC_CLOCK), None);
        assert_eq!(event.receive_stamp(), Some(0.5));
    }

    #[test]
    fn test_receive_stamp_falls_back_to_first() {
        let event = event_with(vec![
            Timestamp::monotonic(3.0, StampSemantics::ServiceSend),
            Timestamp::monotonic(4.0, StampSemantics::ClientReceive),
        ]);
        assert_eq!(event.receive_stamp(), Some(3.0));
        assert_eq!(event_with(Vec::new()).receive_stamp(), None);
    }

    #[test]
    fn test_semantics_wire_names() {
        assert_eq!(StampSemantics::DriverReceive.to_string(), "driver/receive");
        assert_eq!(StampSemantics::ServiceSend.as_str(), "service/send");
    }
}
