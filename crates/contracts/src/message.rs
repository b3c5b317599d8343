//! Decoded messages delivered by the camera service

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::MessageKind;

/// Decoded message
///
/// The variant is chosen by the transport from the event's message-type tag.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum DecodedMessage {
    /// Encoded frame (image or disparity)
    Frame(OakFrame),

    /// Calibration reply
    Calibration(OakCalibration),
}

impl DecodedMessage {
    /// Kind matching this variant
    pub fn kind(&self) -> MessageKind {
        match self {
            Self::Frame(_) => MessageKind::OakFrame,
            Self::Calibration(_) => MessageKind::OakCalibration,
        }
    }
}

/// Camera frame
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OakFrame {
    /// Capture metadata
    #[serde(default)]
    pub meta: FrameMeta,

    /// Encoded image bytes (PNG/JPEG, format self-describing)
    pub image_data: Bytes,
}

/// Frame capture metadata
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameMeta {
    /// Device-side frame counter
    pub sequence_num: u64,

    /// Device timestamp (seconds)
    pub timestamp: f64,

    /// Exposure time (microseconds)
    pub exposure_time: u32,

    /// ISO sensitivity
    pub sensitivity: u32,

    /// Lens position (0..255)
    pub lens_pos: u32,
}

/// Calibration reply: one entry per camera of the device
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OakCalibration {
    pub camera_data: Vec<CameraData>,
}

/// Per-camera intrinsics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraData {
    /// Board socket number
    pub camera_number: u32,

    /// Image width the intrinsics refer to
    pub width: u32,

    /// Image height the intrinsics refer to
    pub height: u32,

    /// Row-major 3x3 intrinsic matrix (nine entries)
    pub intrinsic_matrix: Vec<f64>,

    /// Lens distortion coefficients (unused by the reconstruction)
    #[serde(default)]
    pub distortion_coeff: Vec<f64>,
}
