//! Pixel grids, scalar grids and point clouds

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Pixel layout of a decoded image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PixelFormat {
    Gray8,
    GrayAlpha8,
    Rgb8,
    Rgba8,
    Gray16,
    GrayAlpha16,
    Rgb16,
    Rgba16,
    Rgb32F,
    Rgba32F,
}

impl PixelFormat {
    /// Channels per pixel
    pub fn channels(&self) -> usize {
        match self {
            Self::Gray8 | Self::Gray16 => 1,
            Self::GrayAlpha8 | Self::GrayAlpha16 => 2,
            Self::Rgb8 | Self::Rgb16 | Self::Rgb32F => 3,
            Self::Rgba8 | Self::Rgba16 | Self::Rgba32F => 4,
        }
    }

    /// Bytes per channel sample
    pub fn bytes_per_sample(&self) -> usize {
        match self {
            Self::Gray8 | Self::GrayAlpha8 | Self::Rgb8 | Self::Rgba8 => 1,
            Self::Gray16 | Self::GrayAlpha16 | Self::Rgb16 | Self::Rgba16 => 2,
            Self::Rgb32F | Self::Rgba32F => 4,
        }
    }

    /// Bytes per pixel
    pub fn bytes_per_pixel(&self) -> usize {
        self.channels() * self.bytes_per_sample()
    }
}

/// Decoded image: row-major, interleaved channels, native-endian samples
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PixelGrid {
    /// Width in pixels
    pub width: u32,

    /// Height in pixels
    pub height: u32,

    /// Pixel layout
    pub format: PixelFormat,

    /// Raw sample bytes
    pub data: Bytes,
}

impl PixelGrid {
    /// Number of pixels
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Expected length of `data`
    pub fn expected_len(&self) -> usize {
        self.pixel_count() * self.format.bytes_per_pixel()
    }

    /// Read one channel sample as f32.
    ///
    /// Returns `None` when the coordinate or channel is out of range.
    pub fn sample(&self, x: u32, y: u32, channel: usize) -> Option<f32> {
        if x >= self.width || y >= self.height || channel >= self.format.channels() {
            return None;
        }
        let bps = self.format.bytes_per_sample();
        let pixel = y as usize * self.width as usize + x as usize;
        let offset = pixel * self.format.bytes_per_pixel() + channel * bps;
        let raw = self.data.get(offset..offset + bps)?;
        Some(match bps {
            1 => raw[0] as f32,
            2 => u16::from_ne_bytes([raw[0], raw[1]]) as f32,
            _ => f32::from_ne_bytes([raw[0], raw[1], raw[2], raw[3]]),
        })
    }
}

/// Row-major height x width grid of scalars
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grid<T> {
    pub width: usize,
    pub height: usize,
    pub data: Vec<T>,
}

impl<T> Grid<T> {
    /// Build from row-major data; `None` if the length does not match
    pub fn from_vec(width: usize, height: usize, data: Vec<T>) -> Option<Self> {
        (data.len() == width * height).then_some(Self {
            width,
            height,
            data,
        })
    }

    /// Iterate `(u, v, value)` in row-major order
    pub fn iter_indexed(&self) -> impl Iterator<Item = (usize, usize, &T)> {
        let width = self.width.max(1);
        self.data
            .iter()
            .enumerate()
            .map(move |(i, value)| (i % width, i / width, value))
    }

    /// Elementwise map preserving shape
    pub fn map<U>(&self, f: impl FnMut(&T) -> U) -> Grid<U> {
        Grid {
            width: self.width,
            height: self.height,
            data: self.data.iter().map(f).collect(),
        }
    }
}

impl<T: Clone> Grid<T> {
    /// Build from a list of rows; `None` if rows are ragged
    pub fn from_rows(rows: &[Vec<T>]) -> Option<Self> {
        let height = rows.len();
        let width = rows.first().map_or(0, Vec::len);
        if rows.iter().any(|r| r.len() != width) {
            return None;
        }
        Self::from_vec(width, height, rows.concat())
    }
}

/// Disparity in pixels, channel 0 of the decoded frame
pub type DisparityGrid = Grid<f32>;

/// Depth in meters; `None` marks an invalid pixel
pub type DepthGrid = Grid<Option<f64>>;

/// 3D point in camera coordinates (meters)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point3 {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// Point cloud geometry
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PointCloud {
    pub points: Vec<Point3>,
}

impl PointCloud {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Replace the point set in place, keeping the allocation
    pub fn replace(&mut self, points: impl IntoIterator<Item = Point3>) {
        self.points.clear();
        self.points.extend(points);
    }

    /// Axis-aligned bounds `(min, max)`, `None` when empty
    pub fn bounds(&self) -> Option<(Point3, Point3)> {
        let first = *self.points.first()?;
        Some(self.points.iter().fold((first, first), |(lo, hi), p| {
            (
                Point3::new(lo.x.min(p.x), lo.y.min(p.y), lo.z.min(p.z)),
                Point3::new(hi.x.max(p.x), hi.y.max(p.y), hi.z.max(p.z)),
            )
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_gray16() {
        let values: [u16; 4] = [1, 2, 300, 65535];
        let data: Vec<u8> = values.iter().flat_map(|v| v.to_ne_bytes()).collect();
        let grid = PixelGrid {
            width: 2,
            height: 2,
            format: PixelFormat::Gray16,
            data: Bytes::from(data),
        };
        assert_eq!(grid.expected_len(), 8);
        assert_eq!(grid.sample(0, 1, 0), Some(300.0));
        assert_eq!(grid.sample(1, 1, 0), Some(65535.0));
        assert_eq!(grid.sample(2, 0, 0), None);
        assert_eq!(grid.sample(0, 0, 1), None);
    }

    #[test]
    fn test_sample_rgb8_channels() {
        let grid = PixelGrid {
            width: 1,
            height: 1,
            format: PixelFormat::Rgb8,
            data: Bytes::from_static(&[10, 20, 30]),
        };
        assert_eq!(grid.sample(0, 0, 0), Some(10.0));
        assert_eq!(grid.sample(0, 0, 2), Some(30.0));
    }

    #[test]
    fn test_grid_from_rows() {
        let grid = Grid::from_rows(&[vec![50.0f32, 0.0], vec![100.0, 25.0]]).unwrap();
        assert_eq!((grid.width, grid.height), (2, 2));
        assert_eq!(grid.data[3], 25.0);
        let indexed: Vec<_> = grid.iter_indexed().map(|(u, v, _)| (u, v)).collect();
        assert_eq!(indexed, vec![(0, 0), (1, 0), (0, 1), (1, 1)]);
        assert!(Grid::from_rows(&[vec![1.0f32], vec![1.0, 2.0]]).is_none());
    }

    #[test]
    fn test_point_cloud_replace_and_bounds() {
        let mut cloud = PointCloud::new();
        assert!(cloud.bounds().is_none());
        cloud.replace(vec![Point3::new(1.0, -1.0, 2.0), Point3::new(-2.0, 3.0, 0.5)]);
        let (lo, hi) = cloud.bounds().unwrap();
        assert_eq!(lo, Point3::new(-2.0, -1.0, 0.5));
        assert_eq!(hi, Point3::new(1.0, 3.0, 2.0));
        cloud.replace(Vec::new());
        assert!(cloud.is_empty());
    }
}
