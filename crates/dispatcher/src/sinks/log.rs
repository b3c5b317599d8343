//! Log sinks - display surfaces that report through tracing

use contracts::{ContractError, FrameSink, PixelGrid, PointCloud, PointCloudSurface};
use tracing::{debug, info, instrument};

/// Frame sink that logs a summary of each shown image
pub struct LogFrameSink {
    name: String,
    shown: u64,
}

impl LogFrameSink {
    /// Create a new LogFrameSink with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            shown: 0,
        }
    }

    /// Frames shown so far
    pub fn shown(&self) -> u64 {
        self.shown
    }
}

impl FrameSink for LogFrameSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(name = "log_frame_sink_show", skip(self, image), fields(sink = %self.name))]
    fn show(&mut self, window: &str, image: &PixelGrid) -> Result<(), ContractError> {
        if image.data.len() != image.expected_len() {
            return Err(ContractError::display(
                &self.name,
                format!(
                    "image buffer is {} bytes, expected {}",
                    image.data.len(),
                    image.expected_len()
                ),
            ));
        }
        self.shown += 1;
        debug!(
            window,
            width = image.width,
            height = image.height,
            format = ?image.format,
            shown = self.shown,
            "frame shown"
        );
        Ok(())
    }
}

/// Point cloud surface that logs geometry changes
pub struct LogSurface {
    name: String,
    registered: bool,
    updates: u64,
}

impl LogSurface {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            registered: false,
            updates: 0,
        }
    }

    pub fn is_registered(&self) -> bool {
        self.registered
    }

    pub fn updates(&self) -> u64 {
        self.updates
    }
}

impl PointCloudSurface for LogSurface {
    fn name(&self) -> &str {
        &self.name
    }

    fn add_geometry(&mut self, cloud: &PointCloud) -> Result<(), ContractError> {
        if self.registered {
            return Err(ContractError::display(&self.name, "geometry already registered"));
        }
        self.registered = true;
        info!(surface = %self.name, points = cloud.len(), bounds = ?cloud.bounds(), "geometry added");
        Ok(())
    }

    fn update_geometry(&mut self, cloud: &PointCloud) -> Result<(), ContractError> {
        if !self.registered {
            return Err(ContractError::display(&self.name, "update before geometry was added"));
        }
        self.updates += 1;
        debug!(surface = %self.name, points = cloud.len(), bounds = ?cloud.bounds(), "geometry updated");
        Ok(())
    }

    fn render(&mut self) -> Result<(), ContractError> {
        Ok(())
    }
}
