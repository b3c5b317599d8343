//! Frame decoding
//!
//! Decoding is a pure function of the input bytes. A malformed buffer is an
//! error; callers never get a blank frame in its place.

use bytes::Bytes;
use contracts::{ContractError, DisparityGrid, Grid, PixelFormat, PixelGrid};
use image::DynamicImage;
use tracing::trace;

/// Decode an encoded image buffer into a pixel grid
///
/// `source` names the stream for error messages (e.g. `oak0/rgb`).
pub fn decode_frame(source: &str, encoded: &[u8]) -> Result<PixelGrid, ContractError> {
    if encoded.is_empty() {
        return Err(ContractError::decode(source, "empty image buffer"));
    }

    let image = image::load_from_memory(encoded)
        .map_err(|e| ContractError::decode(source, e.to_string()))?;

    let grid = to_pixel_grid(image);
    trace!(
        source,
        width = grid.width,
        height = grid.height,
        format = ?grid.format,
        "frame decoded"
    );
    Ok(grid)
}

/// Decode a disparity buffer into a height x width float grid (channel 0)
pub fn decode_disparity(source: &str, encoded: &[u8]) -> Result<DisparityGrid, ContractError> {
    let frame = decode_frame(source, encoded)?;
    let values = channel_values(&frame, 0);
    Grid::from_vec(frame.width as usize, frame.height as usize, values)
        .ok_or_else(|| ContractError::decode(source, "truncated pixel data"))
}

/// All samples of one channel in row-major order
///
/// Out-of-range channels yield an empty vector; truncated data stops at the
/// last complete sample.
pub fn channel_values(frame: &PixelGrid, channel: usize) -> Vec<f32> {
    (0..frame.height)
        .flat_map(|y| (0..frame.width).map(move |x| (x, y)))
        .map_while(|(x, y)| frame.sample(x, y, channel))
        .collect()
}

fn to_pixel_grid(image: DynamicImage) -> PixelGrid {
    let (width, height) = (image.width(), image.height());

    let (format, data) = match image {
        DynamicImage::ImageLuma8(buf) => (PixelFormat::Gray8, Bytes::from(buf.into_raw())),
        DynamicImage::ImageLumaA8(buf) => (PixelFormat::GrayAlpha8, Bytes::from(buf.into_raw())),
        DynamicImage::ImageRgb8(buf) => (PixelFormat::Rgb8, Bytes::from(buf.into_raw())),
        DynamicImage::ImageRgba8(buf) => (PixelFormat::Rgba8, Bytes::from(buf.into_raw())),
        DynamicImage::ImageLuma16(buf) => (PixelFormat::Gray16, pod_to_bytes(buf.as_raw())),
        DynamicImage::ImageLumaA16(buf) => (PixelFormat::GrayAlpha16, pod_to_bytes(buf.as_raw())),
        DynamicImage::ImageRgb16(buf) => (PixelFormat::Rgb16, pod_to_bytes(buf.as_raw())),
        DynamicImage::ImageRgba16(buf) => (PixelFormat::Rgba16, pod_to_bytes(buf.as_raw())),
        DynamicImage::ImageRgb32F(buf) => (PixelFormat::Rgb32F, pod_to_bytes(buf.as_raw())),
        DynamicImage::ImageRgba32F(buf) => (PixelFormat::Rgba32F, pod_to_bytes(buf.as_raw())),
        other => (PixelFormat::Rgba8, Bytes::from(other.to_rgba8().into_raw())),
    };

    PixelGrid {
        width,
        height,
        format,
        data,
    }
}

#[inline]
fn pod_to_bytes<T: bytemuck::Pod>(samples: &[T]) -> Bytes {
    Bytes::copy_from_slice(bytemuck::cast_slice(samples))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encode_png;
    use rand::Rng;

    fn gray8(width: u32, height: u32, values: Vec<u8>) -> PixelGrid {
        PixelGrid {
            width,
            height,
            format: PixelFormat::Gray8,
            data: Bytes::from(values),
        }
    }

    #[test]
    fn test_decode_gray_png() {
        let png = encode_png(&gray8(2, 2, vec![50, 0, 100, 25])).unwrap();
        let frame = decode_frame("oak0/disparity", &png).unwrap();
        assert_eq!(frame.format, PixelFormat::Gray8);
        assert_eq!((frame.width, frame.height), (2, 2));
        assert_eq!(frame.data.as_ref(), &[50, 0, 100, 25]);
    }

    #[test]
    fn test_decode_is_deterministic() {
        let mut rng = rand::rng();
        let values: Vec<u8> = (0..64 * 48 * 3).map(|_| rng.random()).collect();
        let source = PixelGrid {
            width: 64,
            height: 48,
            format: PixelFormat::Rgb8,
            data: Bytes::from(values),
        };
        let png = encode_png(&source).unwrap();

        let first = decode_frame("oak0/rgb", &png).unwrap();
        let second = decode_frame("oak0/rgb", &png).unwrap();
        assert_eq!(first, second);
        assert_eq!(first, source);
    }

    #[test]
    fn test_malformed_buffer_is_error() {
        let err = decode_frame("oak0/rgb", b"definitely not an image").unwrap_err();
        assert!(matches!(err, ContractError::Decode { .. }));
        assert!(err.to_string().contains("oak0/rgb"));
    }

    #[test]
    fn test_truncated_png_is_error() {
        let png = encode_png(&gray8(8, 8, vec![7; 64])).unwrap();
        let truncated = &png[..png.len() / 2];
        assert!(decode_frame("oak0/left", truncated).is_err());
    }

    #[test]
    fn test_empty_buffer_is_error() {
        assert!(decode_frame("oak0/rgb", &[]).is_err());
    }

    #[test]
    fn test_decode_disparity_selects_channel_zero() {
        let rgb = PixelGrid {
            width: 2,
            height: 1,
            format: PixelFormat::Rgb8,
            data: Bytes::from_static(&[40, 1, 2, 80, 3, 4]),
        };
        let png = encode_png(&rgb).unwrap();
        let disparity = decode_disparity("oak0/disparity", &png).unwrap();
        assert_eq!((disparity.width, disparity.height), (2, 1));
        assert_eq!(disparity.data, vec![40.0, 80.0]);
    }

    #[test]
    fn test_decode_disparity_16bit() {
        let values: [u16; 2] = [1200, 65535];
        let grid = PixelGrid {
            width: 2,
            height: 1,
            format: PixelFormat::Gray16,
            data: Bytes::from(values.iter().flat_map(|v| v.to_ne_bytes()).collect::<Vec<_>>()),
        };
        let png = encode_png(&grid).unwrap();
        let disparity = decode_disparity("oak0/disparity", &png).unwrap();
        assert_eq!(disparity.data, vec![1200.0, 65535.0]);
    }

    #[test]
    fn test_channel_values_out_of_range() {
        assert!(channel_values(&gray8(1, 1, vec![9]), 1).is_empty());
    }

    #[test]
    fn test_channel_values_selects_channel() {
        let rgb = PixelGrid {
            width: 2,
            height: 1,
            format: PixelFormat::Rgb8,
            data: Bytes::from(vec![1, 2, 3, 4, 5, 6]),
        };
        assert_eq!(channel_values(&rgb, 0), vec![1.0, 4.0]);
        assert_eq!(channel_values(&rgb, 2), vec![3.0, 6.0]);
    }

    #[test]
    fn test_channel_values_stops_at_truncation() {
        assert_eq!(channel_values(&gray8(2, 2, vec![7, 8, 9]), 0), vec![7.0, 8.0, 9.0]);
    }
}
