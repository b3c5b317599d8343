//! Disparity reconstruction pipeline
//!
//! decode -> depth -> unproject -> range filter -> visualizer, once per
//! delivered disparity event. The camera matrix is resolved before the
//! pipeline exists, so the first event always sees it.

use contracts::{ContractError, DecodedMessage, MessageKind, PointCloudSurface, SubscribeRequest};
use event_client::{EventClient, CALIBRATION_PATH};
use frame_codec::decode_disparity;
use observability::{record_decode_failure, record_event_received, record_point_cloud, RunningStats, StatsSummary};
use tracing::{debug, info, instrument, warn};

use crate::calibration::{resolve_calibration, CameraMatrix};
use crate::cloud::{build_point_cloud, CloudCounts, DepthRange};
use crate::depth::{depth_grid, STEREO_BASELINE_M};
use crate::error::{ReconstructionError, Result};
use crate::visualizer::{FrameOutcome, Visualizer, VisualizerState};

/// Reconstruction settings
#[derive(Debug, Clone)]
pub struct ReconstructionConfig {
    /// Disparity topic
    pub disparity_path: String,
    /// Calibration request path
    pub calibration_path: String,
    /// Publisher-side decimation
    pub every_n: u32,
    /// Stereo baseline (meters)
    pub baseline: f64,
    /// Kept depth interval
    pub depth_range: DepthRange,
    /// Calibration entry used for the camera matrix
    pub camera_index: usize,
    /// Stop after this many processed frames (None = until the stream ends)
    pub max_frames: Option<u64>,
}

impl Default for ReconstructionConfig {
    fn default() -> Self {
        Self {
            disparity_path: "/disparity".to_string(),
            calibration_path: CALIBRATION_PATH.to_string(),
            every_n: 5,
            baseline: STEREO_BASELINE_M,
            depth_range: DepthRange::default(),
            camera_index: 0,
            max_frames: None,
        }
    }
}

impl ReconstructionConfig {
    pub fn validate(&self) -> Result<()> {
        if self.every_n == 0 {
            return Err(ReconstructionError::InvalidConfig("every_n must be >= 1".into()));
        }
        if !(self.baseline.is_finite() && self.baseline > 0.0) {
            return Err(ReconstructionError::InvalidConfig(format!(
                "baseline must be positive, got {}",
                self.baseline
            )));
        }
        let range = self.depth_range;
        if !(range.min.is_finite() && range.max.is_finite() && range.min <= range.max) {
            return Err(ReconstructionError::InvalidConfig(format!(
                "depth range [{}, {}] is empty",
                range.min, range.max
            )));
        }
        Ok(())
    }
}

/// Run summary
#[derive(Debug, Clone, Default)]
pub struct ReconstructionStats {
    /// Frames that reached the visualizer
    pub frames: u64,
    /// Events skipped because they could not be decoded or displayed
    pub skipped: u64,
    /// Kept points per frame
    pub points: StatsSummary,
    /// Points dropped by the range filter, all frames
    pub discarded_total: u64,
    /// Final visualizer state
    pub registered: bool,
}

/// Pipeline owning the camera matrix and the visualizer
pub struct ReconstructionPipeline<S> {
    config: ReconstructionConfig,
    camera: CameraMatrix,
    visualizer: Visualizer<S>,
    frames: u64,
    skipped: u64,
    discarded_total: u64,
    point_stats: RunningStats,
}

impl<S: PointCloudSurface> ReconstructionPipeline<S> {
    /// Pipeline with an already resolved camera matrix
    pub fn new(config: ReconstructionConfig, camera: CameraMatrix, surface: S) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            camera,
            visualizer: Visualizer::new(surface),
            frames: 0,
            skipped: 0,
            discarded_total: 0,
            point_stats: RunningStats::default(),
        })
    }

    /// Resolve calibration once through `client`, then build the pipeline
    ///
    /// # Errors
    /// Fatal `Calibration` error if the reply is empty or malformed.
    pub async fn connect<C: EventClient>(
        client: &C,
        config: ReconstructionConfig,
        surface: S,
    ) -> Result<Self> {
        config.validate()?;
        let camera =
            resolve_calibration(client, &config.calibration_path, config.camera_index).await?;
        Self::new(config, camera, surface)
    }

    pub fn camera(&self) -> &CameraMatrix {
        &self.camera
    }

    pub fn visualizer(&self) -> &Visualizer<S> {
        &self.visualizer
    }

    pub fn into_surface(self) -> S {
        self.visualizer.into_surface()
    }

    /// Process one encoded disparity buffer
    ///
    /// Uses the raw decoded values; the display colormap never runs here.
    pub fn process_disparity(
        &mut self,
        source: &str,
        encoded: &[u8],
    ) -> std::result::Result<(FrameOutcome, CloudCounts), ContractError> {
        let disparity = decode_disparity(source, encoded)?;
        let depth = depth_grid(&disparity, self.config.baseline, self.camera.fx());
        let counts = build_point_cloud(
            &depth,
            &self.camera,
            self.config.depth_range,
            self.visualizer.cloud_mut(),
        );
        let outcome = self.visualizer.present()?;

        self.frames += 1;
        self.discarded_total += counts.discarded as u64;
        self.point_stats.push(counts.kept as f64);
        record_point_cloud(counts.kept, counts.discarded);

        Ok((outcome, counts))
    }

    /// Subscribe to the disparity topic of `client` and process until the
    /// stream ends or `max_frames` is reached
    ///
    /// # Errors
    /// A subscription or transport failure ends the run; per-event decode and
    /// display failures are logged and skipped.
    #[instrument(
        name = "reconstruction_run",
        skip(self, client),
        fields(client = client.name(), path = %self.config.disparity_path, every_n = self.config.every_n)
    )]
    pub async fn run<C: EventClient>(&mut self, client: &C) -> Result<ReconstructionStats> {
        let request =
            SubscribeRequest::new(client.name(), &self.config.disparity_path, self.config.every_n);
        let mut stream = client.subscribe(&request).await?;
        info!("reconstruction started");

        while !self.limit_reached() {
            let Some(item) = stream.next().await else {
                debug!("disparity stream closed");
                break;
            };
            let (event, message) = item?;
            record_event_received(stream.client(), stream.path());

            let result = match (event.message_kind(), message) {
                (Ok(MessageKind::OakFrame), DecodedMessage::Frame(frame)) => {
                    self.process_disparity(stream.path(), &frame.image_data)
                }
                (Ok(kind), other) => Err(ContractError::decode(
                    stream.path(),
                    format!("tagged {kind:?} but carried {:?}", other.kind()),
                )),
                (Err(e), _) => Err(e),
            };

            match result {
                Ok((outcome, counts)) => {
                    debug!(seq = event.sequence, ?outcome, kept = counts.kept, discarded = counts.discarded, "disparity frame processed");
                }
                Err(e) if e.is_per_event() => {
                    self.skipped += 1;
                    record_decode_failure(stream.client(), stream.path());
                    warn!(seq = event.sequence, error = %e, "disparity event skipped");
                }
                Err(e) => return Err(e.into()),
            }
        }

        let stats = self.stats();
        info!(frames = stats.frames, skipped = stats.skipped, points = %stats.points, "reconstruction finished");
        Ok(stats)
    }

    /// Snapshot of the run so far
    pub fn stats(&self) -> ReconstructionStats {
        ReconstructionStats {
            frames: self.frames,
            skipped: self.skipped,
            points: self.point_stats.summary(),
            discarded_total: self.discarded_total,
            registered: self.visualizer.state() == VisualizerState::Streaming,
        }
    }

    fn limit_reached(&self) -> bool {
        self.config.max_frames.is_some_and(|max| self.frames >= max)
    }
}

/// Resolve calibration, run the pipeline against `client`, and hand back the
/// surface with the run summary
pub async fn run_reconstruction<C, S>(
    client: &C,
    config: ReconstructionConfig,
    surface: S,
) -> Result<(ReconstructionStats, S)>
where
    C: EventClient,
    S: PointCloudSurface,
{
    let mut pipeline = ReconstructionPipeline::connect(client, config, surface).await?;
    let stats = pipeline.run(client).await?;
    Ok((stats, pipeline.into_surface()))
}
