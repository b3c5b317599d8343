//! # Reconstruction
//!
//! Disparity 到点云的重建管线。
//!
//! 负责：
//! - 一次性请求设备标定并构造相机矩阵
//! - 视差 → 深度（无效视差在除法前剔除）
//! - 像素反投影与 [0.2, 7.5] m 闭区间深度过滤
//! - 两状态可视化（首个非空点云注册几何体，之后只做更新）
//!
//! ## 使用示例
//!
//! ```ignore
//! use reconstruction::{run_reconstruction, ReconstructionConfig};
//!
//! let (stats, surface) =
//!     run_reconstruction(&client, ReconstructionConfig::default(), surface).await?;
//! println!("{} frames, points {}", stats.frames, stats.points);
//! ```

mod calibration;
mod cloud;
mod depth;
mod error;
mod pipeline;
mod visualizer;

pub use calibration::{resolve_calibration, CameraMatrix};
pub use cloud::{build_point_cloud, unproject, CloudCounts, DepthRange};
pub use depth::{depth_from_disparity, depth_grid, STEREO_BASELINE_M};
pub use error::{ReconstructionError, Result};
pub use pipeline::{
    run_reconstruction, ReconstructionConfig, ReconstructionPipeline, ReconstructionStats,
};
pub use visualizer::{FrameOutcome, Visualizer, VisualizerState};
