//! Unprojection and range filtering

use contracts::{DepthGrid, Point3, PointCloud};

use crate::calibration::CameraMatrix;

/// Inclusive depth interval of kept points (meters)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DepthRange {
    pub min: f64,
    pub max: f64,
}

impl DepthRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Both bounds inclusive
    #[inline]
    pub fn contains(&self, depth: f64) -> bool {
        depth >= self.min && depth <= self.max
    }
}

impl Default for DepthRange {
    fn default() -> Self {
        Self::new(0.2, 7.5)
    }
}

/// Per-frame point accounting
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CloudCounts {
    /// Points written to the cloud
    pub kept: usize,
    /// Valid depth outside the range
    pub discarded: usize,
    /// Pixels without a valid depth
    pub invalid: usize,
}

/// Camera-frame point of pixel (u, v) at depth `depth`
#[inline]
pub fn unproject(u: usize, v: usize, depth: f64, camera: &CameraMatrix) -> Point3 {
    let x = (u as f64 - camera.cx()) * depth / camera.fx();
    let y = (v as f64 - camera.cy()) * depth / camera.fy();
    Point3::new(x, y, depth)
}

/// Rebuild `cloud` from a depth grid
///
/// Invalid pixels and points whose depth falls outside `range` are dropped as
/// whole points; the surviving points are written contiguously in row-major
/// order, reusing the cloud's allocation.
pub fn build_point_cloud(
    depth: &DepthGrid,
    camera: &CameraMatrix,
    range: DepthRange,
    cloud: &mut PointCloud,
) -> CloudCounts {
    let mut counts = CloudCounts::default();

    cloud.replace(depth.iter_indexed().filter_map(|(u, v, d)| {
        let Some(d) = *d else {
            counts.invalid += 1;
            return None;
        };
        let point = unproject(u, v, d, camera);
        if range.contains(point.z) {
            Some(point)
        } else {
            counts.discarded += 1;
            None
        }
    }));

    counts.kept = cloud.len();
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::Grid;

    fn camera() -> CameraMatrix {
        CameraMatrix::new(500.0, 500.0, 320.0, 240.0).unwrap()
    }

    #[test]
    fn test_unproject() {
        let p = unproject(420, 140, 2.0, &camera());
        assert!((p.x - 0.4).abs() < 1e-12);
        assert!((p.y + 0.4).abs() < 1e-12);
        assert_eq!(p.z, 2.0);
    }

    #[test]
    fn test_range_filter_inclusive() {
        let depth = Grid::from_vec(4, 1, vec![Some(0.2), Some(0.1999), Some(7.5), Some(7.5001)])
            .unwrap();
        let mut cloud = PointCloud::new();
        let counts = build_point_cloud(&depth, &camera(), DepthRange::default(), &mut cloud);

        let zs: Vec<f64> = cloud.points.iter().map(|p| p.z).collect();
        assert_eq!(zs, vec![0.2, 7.5]);
        assert_eq!(counts, CloudCounts { kept: 2, discarded: 2, invalid: 0 });
    }

    #[test]
    fn test_invalid_pixels_are_compacted_out() {
        let depth = Grid::from_vec(3, 1, vec![Some(1.0), None, Some(2.0)]).unwrap();
        let mut cloud = PointCloud::new();
        let counts = build_point_cloud(&depth, &camera(), DepthRange::default(), &mut cloud);

        assert_eq!(cloud.len(), 2);
        assert!(cloud.points.iter().all(|p| p.z > 0.0));
        assert_eq!(counts.invalid, 1);
    }

    #[test]
    fn test_rebuild_replaces_previous_points() {
        let mut cloud = PointCloud::new();
        let full = Grid::from_vec(2, 1, vec![Some(1.0), Some(1.5)]).unwrap();
        build_point_cloud(&full, &camera(), DepthRange::default(), &mut cloud);
        assert_eq!(cloud.len(), 2);

        let none = Grid::from_vec(2, 1, vec![None, Some(9.0)]).unwrap();
        let counts = build_point_cloud(&none, &camera(), DepthRange::default(), &mut cloud);
        assert!(cloud.is_empty());
        assert_eq!(counts, CloudCounts { kept: 0, discarded: 1, invalid: 1 });
    }
}
