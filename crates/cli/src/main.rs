//! # OAK Streamer CLI
//!
//! 命令行接口入口点。
//!
//! 提供：
//! - 配置加载与验证
//! - 多相机事件流显示
//! - 视差点云重建
//! - 优雅关闭处理

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;
use observability::{level_from_verbosity, ObservabilityConfig};
use tracing::info;

use cli::{Cli, Commands};
use commands::{run_pointcloud, run_stream, run_validate};

// 所有监听循环在同一线程上协作调度
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    observability::init_with_config(ObservabilityConfig {
        log_format: cli.log_format.into(),
        metrics_port: (cli.metrics_port != 0).then_some(cli.metrics_port),
        default_log_level: level_from_verbosity(cli.verbose, cli.quiet).to_string(),
    })?;

    info!(version = env!("CARGO_PKG_VERSION"), "OAK Streamer starting");

    let result = match &cli.command {
        Commands::Stream(args) => run_stream(args).await,
        Commands::Pointcloud(args) => run_pointcloud(args).await,
        Commands::Validate(args) => run_validate(args),
    };

    if let Err(ref e) = result {
        tracing::error!(error = %format!("{e:#}"), "Command failed");
    }

    result
}
