//! Disparity to depth conversion

use contracts::{DepthGrid, DisparityGrid};

/// Stereo baseline of the camera pair (meters)
pub const STEREO_BASELINE_M: f64 = 0.075;

/// Depth of one pixel: `baseline * focal / disparity`
///
/// Zero, negative and non-finite disparities are rejected before the division
/// and yield `None`.
#[inline]
pub fn depth_from_disparity(disparity: f64, baseline: f64, focal: f64) -> Option<f64> {
    if !disparity.is_finite() || disparity <= 0.0 {
        return None;
    }
    let depth = baseline * focal / disparity;
    depth.is_finite().then_some(depth)
}

/// Elementwise depth of a disparity grid, same shape
pub fn depth_grid(disparity: &DisparityGrid, baseline: f64, focal: f64) -> DepthGrid {
    disparity.map(|&d| depth_from_disparity(f64::from(d), baseline, focal))
}
