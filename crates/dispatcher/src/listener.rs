//! Listening loop - one per subscription

use std::sync::Arc;

use contracts::{ContractError, SubscribeRequest};
use event_client::EventClient;
use observability::{record_decode_failure, record_event_received};
use tracing::{debug, instrument, warn};

use crate::error::DispatcherError;
use crate::handler::FrameHandler;
use crate::metrics::LoopMetricsSnapshot;

/// Why a loop stopped without error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopEnd {
    /// Publisher closed the stream
    StreamClosed,
    /// Configured event limit reached
    LimitReached,
}

/// Summary of a loop that ended cleanly
#[derive(Debug, Clone)]
pub struct LoopReport {
    pub client: String,
    pub path: String,
    pub window: String,
    pub end: LoopEnd,
    pub metrics: LoopMetricsSnapshot,
}

/// Await events on one subscription and hand them to `handler` in arrival order
///
/// Per-event errors are logged and skipped. A failed subscribe or a transport
/// error on the stream ends the loop with `LoopFailed`.
#[instrument(
    name = "listen",
    skip(client, request, handler),
    fields(client = %handler.client(), path = %handler.path(), every_n = request.every_n)
)]
pub async fn listen<C: EventClient>(
    client: Arc<C>,
    request: SubscribeRequest,
    mut handler: FrameHandler,
    max_events: Option<u64>,
) -> Result<LoopReport, DispatcherError> {
    let fail = |handler: &FrameHandler, e: ContractError| {
        DispatcherError::loop_failed(handler.client(), handler.path(), e)
    };

    let mut stream = client
        .subscribe(&request)
        .await
        .map_err(|e| fail(&handler, e))?;
    debug!("subscription opened");

    let metrics = Arc::clone(handler.metrics());
    let end = loop {
        if max_events.is_some_and(|max| metrics.events() >= max) {
            break LoopEnd::LimitReached;
        }

        let Some(item) = stream.next().await else {
            break LoopEnd::StreamClosed;
        };
        let (event, message) = item.map_err(|e| fail(&handler, e))?;
        metrics.inc_events();
        record_event_received(handler.client(), handler.path());

        match handler.handle(&event, message) {
            Ok(()) => {}
            Err(e) if e.is_per_event() => {
                match e {
                    ContractError::Display { .. } => metrics.inc_display_failures(),
                    _ => {
                        metrics.inc_decode_failures();
                        record_decode_failure(handler.client(), handler.path());
                    }
                }
                warn!(
                    client = %handler.client(),
                    path = %handler.path(),
                    seq = event.sequence,
                    error = %e,
                    "event skipped"
                );
            }
            Err(e) => return Err(fail(&handler, e)),
        }
    };

    debug!(?end, events = metrics.events(), "loop finished");
    Ok(LoopReport {
        client: handler.client().to_string(),
        path: handler.path().to_string(),
        window: handler.window().to_string(),
        end,
        metrics: metrics.snapshot(),
    })
}
