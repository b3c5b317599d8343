//! Point cloud visualization state
//!
//! The display surface cannot render updates for geometry it has never seen,
//! so the first non-empty cloud is registered and everything after it is an
//! update against that same geometry.

use contracts::{ContractError, PointCloud, PointCloudSurface};
use tracing::{debug, trace};

/// Visualizer lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisualizerState {
    /// No geometry registered yet
    Uninitialized,
    /// Geometry registered; frames are updates
    Streaming,
}

/// What a frame did to the display surface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// Empty cloud before registration, nothing sent
    Deferred,
    /// Geometry registered for the first time
    Registered,
    /// Registered geometry updated
    Updated,
}

/// Owns one display surface and the point cloud shown on it
///
/// The cloud object lives as long as the visualizer and is mutated in place
/// every frame.
pub struct Visualizer<S> {
    surface: S,
    cloud: PointCloud,
    state: VisualizerState,
}

impl<S: PointCloudSurface> Visualizer<S> {
    pub fn new(surface: S) -> Self {
        Self {
            surface,
            cloud: PointCloud::new(),
            state: VisualizerState::Uninitialized,
        }
    }

    pub fn state(&self) -> VisualizerState {
        self.state
    }

    pub fn cloud(&self) -> &PointCloud {
        &self.cloud
    }

    /// Cloud to rebuild before calling [`Visualizer::present`]
    pub fn cloud_mut(&mut self) -> &mut PointCloud {
        &mut self.cloud
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn into_surface(self) -> S {
        self.surface
    }

    /// Push the current cloud to the surface and redraw
    ///
    /// A failed registration leaves the state `Uninitialized`, so the next
    /// non-empty frame tries again.
    pub fn present(&mut self) -> Result<FrameOutcome, ContractError> {
        let outcome = match self.state {
            VisualizerState::Uninitialized if self.cloud.is_empty() => FrameOutcome::Deferred,
            VisualizerState::Uninitialized => {
                self.surface.add_geometry(&self.cloud)?;
                self.state = VisualizerState::Streaming;
                debug!(
                    surface = self.surface.name(),
                    points = self.cloud.len(),
                    "point cloud geometry registered"
                );
                FrameOutcome::Registered
            }
            VisualizerState::Streaming => {
                self.surface.update_geometry(&self.cloud)?;
                FrameOutcome::Updated
            }
        };

        self.surface.render()?;
        trace!(surface = self.surface.name(), ?outcome, points = self.cloud.len(), "frame presented");
        Ok(outcome)
    }
}
