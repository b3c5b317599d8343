//! Disparity false-color for display
//!
//! Visual only: the reconstruction path reads raw decoded disparity and never
//! goes through this module.

use std::sync::LazyLock;

use bytes::Bytes;
use contracts::{PixelFormat, PixelGrid};

use crate::decoder::channel_values;

/// Gain applied to disparity before the color lookup
pub const DISPARITY_DISPLAY_SCALE: u64 = 3;

static JET_LUT: LazyLock<[[u8; 3]; 256]> = LazyLock::new(build_jet);

/// 256-entry jet color table (RGB), blue for 0 through red for 255
pub fn jet_lut() -> &'static [[u8; 3]; 256] {
    &JET_LUT
}

/// Scale channel 0 by [`DISPARITY_DISPLAY_SCALE`] and map it through the jet table.
///
/// The product is taken in 8-bit arithmetic and wraps modulo 256, so 100
/// lands on entry 44. Output is RGB8 of the same size.
pub fn colorize_disparity(frame: &PixelGrid) -> PixelGrid {
    let lut = jet_lut();
    let data: Vec<u8> = channel_values(frame, 0)
        .into_iter()
        .flat_map(|d| lut[scale_index(d)])
        .collect();

    PixelGrid {
        width: frame.width,
        height: frame.height,
        format: PixelFormat::Rgb8,
        data: Bytes::from(data),
    }
}

#[inline]
fn scale_index(disparity: f32) -> usize {
    // NaN and negative samples read as 0
    let sample = if disparity > 0.0 { disparity as u64 } else { 0 };
    (sample.wrapping_mul(DISPARITY_DISPLAY_SCALE) % 256) as usize
}

fn build_jet() -> [[u8; 3]; 256] {
    let mut lut = [[0u8; 3]; 256];
    for (i, entry) in lut.iter_mut().enumerate() {
        let x = i as f32 / 255.0;
        let channel = |center: f32| {
            let v = (1.5 - (4.0 * x - center).abs()).clamp(0.0, 1.0);
            (v * 255.0).round() as u8
        };
        *entry = [channel(3.0), channel(2.0), channel(1.0)];
    }
    lut
}
