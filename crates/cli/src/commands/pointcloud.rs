//! `pointcloud` command implementation.

use anyhow::{Context, Result};
use contracts::ServiceConfig;
use dispatcher::{window_name, LogSurface};
use event_client::SyntheticEventClient;
use reconstruction::{run_reconstruction, ReconstructionConfig, ReconstructionStats};
use tracing::{info, warn};

use super::{load_configs, shutdown_signal, synthetic_config};
use crate::cli::PointcloudArgs;

/// Execute the `pointcloud` command
pub async fn run_pointcloud(args: &PointcloudArgs) -> Result<()> {
    let configs = load_configs(&args.service_config)?;

    let service: &ServiceConfig = match &args.service {
        Some(name) => configs
            .get(name)
            .filter(|c| c.is_endpoint())
            .with_context(|| format!("Service '{name}' is not configured with a port"))?,
        None => configs
            .endpoints()
            .next()
            .context("No camera service with a port configured")?,
    };

    let client = SyntheticEventClient::from_service(service, synthetic_config(&args.source))
        .context("Failed to create camera client")?;

    let config = ReconstructionConfig {
        disparity_path: args.path.clone(),
        every_n: args.every_n,
        camera_index: args.camera_index,
        max_frames: args.max_frames,
        ..Default::default()
    };
    let surface = LogSurface::new(window_name(&service.name, &args.path));

    info!(
        service = %service.name,
        path = %args.path,
        every_n = args.every_n,
        "Point cloud reconstruction started"
    );

    tokio::select! {
        result = run_reconstruction(&client, config, surface) => {
            let (stats, _surface) = result.context("Reconstruction failed")?;
            print_stats(&stats);
        }
        _ = shutdown_signal() => {
            warn!("Received shutdown signal, stopping reconstruction...");
        }
    }

    info!("OAK Streamer finished");
    Ok(())
}

fn print_stats(stats: &ReconstructionStats) {
    println!("\n=== Point Cloud Summary ===\n");
    println!("  Frames processed: {}", stats.frames);
    println!("  Events skipped:   {}", stats.skipped);
    println!("  Points per frame: {}", stats.points);
    println!("  Points discarded: {}", stats.discarded_total);
    println!("  Geometry registered: {}", stats.registered);
    println!();
}
