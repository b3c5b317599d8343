//! Per-loop event handler
//!
//! Routes one decoded event to its display path. The route is chosen by an
//! exhaustive match on the message kind parsed from the event tag, so a tag
//! nobody handles is an error instead of a silent no-op.

use std::sync::Arc;

use contracts::{ContractError, DecodedMessage, Event, FrameSink, MessageKind, OakCalibration, OakFrame};
use frame_codec::{colorize_disparity, decode_frame};
use observability::record_frame_displayed;
use tracing::{debug, info};

use crate::metrics::LoopMetrics;

/// Display route of a subscription
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameRoute {
    /// Decoded frame shown as-is
    Generic,
    /// Decoded frame scaled and false-colored before display
    Disparity,
}

impl FrameRoute {
    /// Disparity topics end in `disparity`
    pub fn for_path(path: &str) -> Self {
        if path.ends_with("disparity") {
            Self::Disparity
        } else {
            Self::Generic
        }
    }
}

/// Window name of a subscription
pub fn window_name(client: &str, path: &str) -> String {
    format!("{client}{path}")
}

/// Handler owned by exactly one listening loop, together with its sink
pub struct FrameHandler {
    client: String,
    path: String,
    window: String,
    route: FrameRoute,
    sink: Box<dyn FrameSink>,
    metrics: Arc<LoopMetrics>,
}

impl FrameHandler {
    pub fn new(client: &str, path: &str, sink: Box<dyn FrameSink>) -> Self {
        Self {
            client: client.to_string(),
            path: path.to_string(),
            window: window_name(client, path),
            route: FrameRoute::for_path(path),
            sink,
            metrics: Arc::new(LoopMetrics::new()),
        }
    }

    pub fn client(&self) -> &str {
        &self.client
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn window(&self) -> &str {
        &self.window
    }

    pub fn route(&self) -> FrameRoute {
        self.route
    }

    pub fn metrics(&self) -> &Arc<LoopMetrics> {
        &self.metrics
    }

    /// Handle one event
    ///
    /// # Errors
    /// Per-event errors (decode, unknown tag, display); the loop logs them
    /// and moves on to the next event.
    pub fn handle(&mut self, event: &Event, message: DecodedMessage) -> Result<(), ContractError> {
        match (event.message_kind()?, message) {
            (MessageKind::OakFrame, DecodedMessage::Frame(frame)) => self.show_frame(event, &frame),
            (MessageKind::OakCalibration, DecodedMessage::Calibration(calibration)) => {
                self.log_calibration(&calibration);
                Ok(())
            }
            (kind, other) => Err(ContractError::decode(
                &self.window,
                format!("tagged {kind:?} but carried {:?}", other.kind()),
            )),
        }
    }

    fn show_frame(&mut self, event: &Event, frame: &OakFrame) -> Result<(), ContractError> {
        let image = decode_frame(&self.window, &frame.image_data)?;
        let image = match self.route {
            FrameRoute::Generic => image,
            FrameRoute::Disparity => colorize_disparity(&image),
        };

        debug!(
            window = %self.window,
            seq = frame.meta.sequence_num,
            stamp = ?event.receive_stamp(),
            exposure = frame.meta.exposure_time,
            sensitivity = frame.meta.sensitivity,
            lens_pos = frame.meta.lens_pos,
            width = image.width,
            height = image.height,
            "frame decoded"
        );

        self.sink.show(&self.window, &image)?;
        self.metrics.inc_displayed();
        record_frame_displayed(&self.window);
        Ok(())
    }

    fn log_calibration(&self, calibration: &OakCalibration) {
        for camera in &calibration.camera_data {
            info!(
                window = %self.window,
                camera = camera.camera_number,
                width = camera.width,
                height = camera.height,
                intrinsics = ?camera.intrinsic_matrix,
                "calibration received"
            );
        }
    }
}
