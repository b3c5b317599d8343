//! `stream` command implementation.

use std::sync::Arc;

use anyhow::{Context, Result};
use dispatcher::{DispatchReport, DispatcherBuilder};
use event_client::{ClientRegistry, SyntheticEventClient};
use tracing::{info, warn};

use super::{load_configs, shutdown_signal, synthetic_config};
use crate::cli::StreamArgs;

/// Execute the `stream` command
pub async fn run_stream(args: &StreamArgs) -> Result<()> {
    let configs = load_configs(&args.service_config)?;

    let source = synthetic_config(&args.source);
    let registry = ClientRegistry::from_configs(&configs, |service| {
        SyntheticEventClient::from_service(service, source.clone())
    })
    .context("Failed to create camera clients")?;

    let subscriptions: Vec<_> = configs.subscriptions().cloned().collect();
    if subscriptions.is_empty() {
        warn!("No subscriptions configured - nothing to display");
    }

    let dispatcher = DispatcherBuilder::new(Arc::new(registry), subscriptions)
        .failure_policy(args.failure_policy.into())
        .max_events_per_loop(args.max_events)
        .build()
        .context("Failed to start dispatcher")?;

    info!(
        loops = dispatcher.loop_count(),
        policy = ?args.failure_policy,
        "Streaming started"
    );

    tokio::select! {
        result = dispatcher.run() => {
            let report = result.context("Streaming failed")?;
            print_report(&report);
            if !report.is_clean() {
                anyhow::bail!("{} loop(s) failed", report.failed.len());
            }
        }
        _ = shutdown_signal() => {
            warn!("Received shutdown signal, stopping loops...");
        }
    }

    info!("OAK Streamer finished");
    Ok(())
}

fn print_report(report: &DispatchReport) {
    println!("\n=== Stream Summary ===\n");
    for loop_report in &report.completed {
        let m = loop_report.metrics;
        println!(
            "  {:<24} events={:<6} displayed={:<6} decode_failures={:<4} ({:?})",
            loop_report.window, m.events, m.displayed, m.decode_failures, loop_report.end
        );
    }
    for failure in &report.failed {
        println!("  FAILED: {failure}");
    }
    println!();
}
