//! CLI argument definitions using clap.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// OAK Streamer - multi-camera event streaming and point cloud reconstruction
#[derive(Parser, Debug)]
#[command(
    name = "oak-streamer",
    author,
    version,
    about = "Stream frames from OAK camera services and reconstruct point clouds",
    long_about = "Subscribes to the topics listed in a service configuration, decodes the\n\
                  delivered frames and shows each subscription in its own window.\n\n\
                  The `pointcloud` command turns a disparity topic into a live point cloud\n\
                  using the device calibration."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "OAK_STREAMER_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "compact",
        global = true,
        env = "OAK_STREAMER_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    /// Prometheus metrics port (0 = disabled)
    #[arg(long, default_value = "0", global = true, env = "OAK_STREAMER_METRICS_PORT")]
    pub metrics_port: u16,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Display every configured subscription in its own window
    Stream(StreamArgs),

    /// Reconstruct a point cloud from a disparity topic
    Pointcloud(PointcloudArgs),

    /// Validate a service configuration file without running
    Validate(ValidateArgs),
}

/// Synthetic camera service settings
#[derive(Args, Debug, Clone)]
pub struct SourceArgs {
    /// Source frame rate of each topic before decimation (Hz)
    #[arg(long, default_value = "10.0", env = "OAK_STREAMER_FRAME_RATE")]
    pub frame_rate: f64,
}

/// Arguments for the `stream` command
#[derive(Args, Debug, Clone)]
pub struct StreamArgs {
    /// Path to the service configuration (JSON or TOML)
    #[arg(long, env = "OAK_STREAMER_SERVICE_CONFIG")]
    pub service_config: PathBuf,

    /// What a failed loop does to the others
    #[arg(long, value_enum, default_value = "fail-fast")]
    pub failure_policy: FailurePolicyArg,

    /// Stop each loop after N events
    #[arg(long, env = "OAK_STREAMER_MAX_EVENTS")]
    pub max_events: Option<u64>,

    #[command(flatten)]
    pub source: SourceArgs,
}

/// Arguments for the `pointcloud` command
#[derive(Args, Debug, Clone)]
pub struct PointcloudArgs {
    /// Path to the service configuration (JSON or TOML)
    #[arg(long, env = "OAK_STREAMER_SERVICE_CONFIG")]
    pub service_config: PathBuf,

    /// Camera service to use (default: first service with a port)
    #[arg(long)]
    pub service: Option<String>,

    /// Disparity topic
    #[arg(long, default_value = "/disparity")]
    pub path: String,

    /// Process every Nth disparity frame
    #[arg(long, default_value = "5", value_parser = clap::value_parser!(u32).range(1..))]
    pub every_n: u32,

    /// Calibration entry used for the camera matrix
    #[arg(long, default_value = "0")]
    pub camera_index: usize,

    /// Stop after N processed frames
    #[arg(long, env = "OAK_STREAMER_MAX_FRAMES")]
    pub max_frames: Option<u64>,

    #[command(flatten)]
    pub source: SourceArgs,
}

/// Arguments for the `validate` command
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Path to the service configuration to validate
    #[arg(long, env = "OAK_STREAMER_SERVICE_CONFIG")]
    pub service_config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    Pretty,
    /// Compact single-line format
    #[default]
    Compact,
}

impl From<LogFormat> for observability::LogFormat {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Json => Self::Json,
            LogFormat::Pretty => Self::Pretty,
            LogFormat::Compact => Self::Compact,
        }
    }
}

/// Loop failure policy
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FailurePolicyArg {
    /// First failed loop stops the run
    #[default]
    FailFast,
    /// Failed loops are reported, the others keep running
    Isolate,
}

impl From<FailurePolicyArg> for dispatcher::FailurePolicy {
    fn from(policy: FailurePolicyArg) -> Self {
        match policy {
            FailurePolicyArg::FailFast => Self::FailFast,
            FailurePolicyArg::Isolate => Self::Isolate,
        }
    }
}
