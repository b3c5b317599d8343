//! Calibration resolution
//!
//! One request/reply exchange per pipeline; the resulting camera matrix is
//! owned by the pipeline for its whole lifetime.

use contracts::{ContractError, DecodedMessage};
use event_client::EventClient;
use nalgebra::Matrix3;
use tracing::{debug, instrument};

/// Pinhole camera matrix
///
/// ```text
/// | fx  0  cx |
/// |  0 fy  cy |
/// |  0  0   1 |
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraMatrix(Matrix3<f64>);

impl CameraMatrix {
    /// Build from explicit focal lengths and principal point
    pub fn new(fx: f64, fy: f64, cx: f64, cy: f64) -> Result<Self, ContractError> {
        if !(fx.is_finite() && fx > 0.0 && fy.is_finite() && fy > 0.0) {
            return Err(ContractError::calibration(format!(
                "focal lengths must be positive and finite (fx={fx}, fy={fy})"
            )));
        }
        if !(cx.is_finite() && cy.is_finite()) {
            return Err(ContractError::calibration(format!(
                "principal point must be finite (cx={cx}, cy={cy})"
            )));
        }
        #[rustfmt::skip]
        let m = Matrix3::new(
            fx, 0.0, cx,
            0.0, fy, cy,
            0.0, 0.0, 1.0,
        );
        Ok(Self(m))
    }

    /// Build from a nine-entry row-major intrinsic matrix
    ///
    /// Only (0,0), (1,1), (0,2) and (1,2) are read; the rest is fixed.
    pub fn from_intrinsics(entries: &[f64]) -> Result<Self, ContractError> {
        if entries.len() != 9 {
            return Err(ContractError::calibration(format!(
                "intrinsic matrix has {} entries, expected 9",
                entries.len()
            )));
        }
        Self::new(entries[0], entries[4], entries[2], entries[5])
    }

    pub fn fx(&self) -> f64 {
        self.0[(0, 0)]
    }

    pub fn fy(&self) -> f64 {
        self.0[(1, 1)]
    }

    pub fn cx(&self) -> f64 {
        self.0[(0, 2)]
    }

    pub fn cy(&self) -> f64 {
        self.0[(1, 2)]
    }

    /// Underlying 3x3 matrix
    pub fn matrix(&self) -> &Matrix3<f64> {
        &self.0
    }
}

/// Request the device calibration and build the camera matrix of `camera_index`
///
/// Index 0 is the reference (right) camera of the stereo pair.
///
/// # Errors
/// `Calibration` if the request fails, the reply is not a calibration
/// message, has no camera entries, or carries an unusable matrix.
#[instrument(name = "resolve_calibration", skip(client), fields(client = client.name()))]
pub async fn resolve_calibration<C: EventClient>(
    client: &C,
    path: &str,
    camera_index: usize,
) -> Result<CameraMatrix, ContractError> {
    let reply = client
        .request_reply(path)
        .await
        .map_err(|e| ContractError::calibration(format!("request to '{path}' failed: {e}")))?;

    let kind = reply.kind();
    let DecodedMessage::Calibration(calibration) = reply else {
        return Err(ContractError::calibration(format!(
            "reply from '{path}' is {kind:?}, not a calibration"
        )));
    };

    if calibration.camera_data.is_empty() {
        return Err(ContractError::calibration("reply has no camera entries"));
    }

    let camera = calibration.camera_data.get(camera_index).ok_or_else(|| {
        ContractError::calibration(format!(
            "camera index {camera_index} out of range ({} cameras)",
            calibration.camera_data.len()
        ))
    })?;

    let matrix = CameraMatrix::from_intrinsics(&camera.intrinsic_matrix)?;
    debug!(
        camera = camera.camera_number,
        fx = matrix.fx(),
        fy = matrix.fy(),
        cx = matrix.cx(),
        cy = matrix.cy(),
        "camera matrix resolved"
    );
    Ok(matrix)
}
