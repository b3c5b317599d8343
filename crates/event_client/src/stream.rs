//! Subscription event streams

use bytes::Bytes;
use contracts::{
    ContractError, DecodedMessage, Event, FrameMeta, MessageKind, OakFrame, StampSemantics,
    Timestamp, Uri,
};
use tokio::sync::mpsc;

/// One delivery on a subscription
pub type EventItem = (Event, DecodedMessage);

/// Producer half of an [`EventStream`]
pub type EventSender = mpsc::Sender<Result<EventItem, ContractError>>;

/// Stream of events for one subscription
///
/// Yields items in arrival order. `None` means the publisher closed the stream;
/// an `Err` item is a transport failure.
pub struct EventStream {
    client: String,
    path: String,
    rx: mpsc::Receiver<Result<EventItem, ContractError>>,
}

impl EventStream {
    /// Create a connected sender/stream pair
    pub fn channel(
        client: impl Into<String>,
        path: impl Into<String>,
        capacity: usize,
    ) -> (EventSender, Self) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (
            tx,
            Self {
                client: client.into(),
                path: path.into(),
                rx,
            },
        )
    }

    /// Stream that yields `items` and then ends
    pub fn from_items(
        client: impl Into<String>,
        path: impl Into<String>,
        items: Vec<Result<EventItem, ContractError>>,
    ) -> Self {
        let (tx, stream) = Self::channel(client, path, items.len());
        for item in items {
            // capacity equals the item count
            let _ = tx.try_send(item);
        }
        stream
    }

    /// Await the next item
    pub async fn next(&mut self) -> Option<Result<EventItem, ContractError>> {
        self.rx.recv().await
    }

    /// Client the stream belongs to
    pub fn client(&self) -> &str {
        &self.client
    }

    /// Subscribed path
    pub fn path(&self) -> &str {
        &self.path
    }
}

/// Build a frame delivery the way the camera service tags it
pub fn frame_event(
    service: &str,
    path: &str,
    sequence: u64,
    stamp: f64,
    image_data: Bytes,
) -> EventItem {
    let uri = Uri::new(
        path,
        format!(
            "type={}&pb=farm_ng/oak/oak.proto&service_name={service}",
            MessageKind::OakFrame.type_tag()
        ),
    );
    let event = Event::new(
        uri,
        vec![
            Timestamp::monotonic(stamp, StampSemantics::DriverReceive),
            Timestamp::monotonic(stamp, StampSemantics::ServiceSend),
        ],
        sequence,
    );
    let frame = OakFrame {
        meta: FrameMeta {
            sequence_num: sequence,
            timestamp: stamp,
            ..Default::default()
        },
        image_data,
    };
    (event, DecodedMessage::Frame(frame))
}
