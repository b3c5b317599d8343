//! PNG encoding of pixel grids

use std::io::Cursor;

use bytes::Bytes;
use contracts::{ContractError, PixelFormat, PixelGrid};
use image::{DynamicImage, ImageBuffer, ImageFormat};

const ENCODER: &str = "png-encoder";

/// Encode a grid as PNG
///
/// 32-bit float layouts have no PNG representation and are rejected.
pub fn encode_png(grid: &PixelGrid) -> Result<Bytes, ContractError> {
    if grid.data.len() != grid.expected_len() {
        return Err(ContractError::decode(
            ENCODER,
            format!(
                "pixel data is {} bytes, expected {}",
                grid.data.len(),
                grid.expected_len()
            ),
        ));
    }

    let image = to_dynamic(grid)?;
    let mut out = Cursor::new(Vec::new());
    image
        .write_to(&mut out, ImageFormat::Png)
        .map_err(|e| ContractError::decode(ENCODER, e.to_string()))?;
    Ok(Bytes::from(out.into_inner()))
}

fn to_dynamic(grid: &PixelGrid) -> Result<DynamicImage, ContractError> {
    let (w, h) = (grid.width, grid.height);
    let bytes = grid.data.to_vec();
    let image = match grid.format {
        PixelFormat::Gray8 => ImageBuffer::from_raw(w, h, bytes).map(DynamicImage::ImageLuma8),
        PixelFormat::GrayAlpha8 => {
            ImageBuffer::from_raw(w, h, bytes).map(DynamicImage::ImageLumaA8)
        }
        PixelFormat::Rgb8 => ImageBuffer::from_raw(w, h, bytes).map(DynamicImage::ImageRgb8),
        PixelFormat::Rgba8 => ImageBuffer::from_raw(w, h, bytes).map(DynamicImage::ImageRgba8),
        PixelFormat::Gray16 => {
            ImageBuffer::from_raw(w, h, to_u16(&bytes)).map(DynamicImage::ImageLuma16)
        }
        PixelFormat::GrayAlpha16 => {
            ImageBuffer::from_raw(w, h, to_u16(&bytes)).map(DynamicImage::ImageLumaA16)
        }
        PixelFormat::Rgb16 => {
            ImageBuffer::from_raw(w, h, to_u16(&bytes)).map(DynamicImage::ImageRgb16)
        }
        PixelFormat::Rgba16 => {
            ImageBuffer::from_raw(w, h, to_u16(&bytes)).map(DynamicImage::ImageRgba16)
        }
        PixelFormat::Rgb32F | PixelFormat::Rgba32F => {
            return Err(ContractError::decode(
                ENCODER,
                format!("{:?} cannot be stored as PNG", grid.format),
            ))
        }
    };
    image.ok_or_else(|| ContractError::decode(ENCODER, "buffer does not match dimensions"))
}

fn to_u16(bytes: &[u8]) -> Vec<u16> {
    bytes
        .chunks_exact(2)
        .map(|c| u16::from_ne_bytes([c[0], c[1]]))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_png_signature() {
        let grid = PixelGrid {
            width: 1,
            height: 1,
            format: PixelFormat::Rgb8,
            data: Bytes::from_static(&[255, 0, 0]),
        };
        let png = encode_png(&grid).unwrap();
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
    }

    #[test]
    fn test_length_mismatch_rejected() {
        let grid = PixelGrid {
            width: 2,
            height: 2,
            format: PixelFormat::Gray8,
            data: Bytes::from_static(&[1, 2, 3]),
        };
        assert!(encode_png(&grid).is_err());
    }

    #[test]
    fn test_float_rejected() {
        let grid = PixelGrid {
            width: 1,
            height: 1,
            format: PixelFormat::Rgb32F,
            data: Bytes::from(vec![0u8; 12]),
        };
        assert!(encode_png(&grid).is_err());
    }
}
