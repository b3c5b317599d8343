//! # Frame Codec
//!
//! Turns encoded camera frames into pixel grids.
//!
//! Responsibilities:
//! - Decode self-describing image buffers (PNG/JPEG) into `PixelGrid`
//! - Extract the numeric disparity channel for reconstruction
//! - Scale and false-color disparity frames for display only
//! - Encode grids back to PNG (used by the synthetic camera service)
//!
//! ## Usage Example
//!
//! ```ignore
//! use frame_codec::{colorize_disparity, decode_frame};
//!
//! let image = decode_frame("oak0/disparity", &frame.image_data)?;
//! let shown = colorize_disparity(&image);
//! ```

mod colormap;
mod decoder;
mod encoder;

pub use colormap::{colorize_disparity, jet_lut, DISPARITY_DISPLAY_SCALE};
pub use decoder::{channel_values, decode_disparity, decode_frame};
pub use encoder::encode_png;
