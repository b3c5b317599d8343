//! Display collaborator interfaces
//!
//! Neither trait is assumed reentrant: each implementation is owned by exactly
//! one listening loop and called only from it.

use crate::{ContractError, PixelGrid, PointCloud};

/// Image display surface (one window per loop)
pub trait FrameSink: Send {
    /// Sink name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Show an image in `window`
    ///
    /// # Errors
    /// Returns a display error; callers log it and continue with the next event.
    fn show(&mut self, window: &str, image: &PixelGrid) -> Result<(), ContractError>;
}

/// Incremental point-cloud display surface
pub trait PointCloudSurface: Send {
    /// Surface name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Register geometry for the first time
    fn add_geometry(&mut self, cloud: &PointCloud) -> Result<(), ContractError>;

    /// Update previously registered geometry
    fn update_geometry(&mut self, cloud: &PointCloud) -> Result<(), ContractError>;

    /// Process window events and redraw
    fn render(&mut self) -> Result<(), ContractError>;
}
