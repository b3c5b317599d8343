//! Command implementations.

mod pointcloud;
mod stream;
mod validate;

pub use pointcloud::run_pointcloud;
pub use stream::run_stream;
pub use validate::run_validate;

use std::path::Path;

use anyhow::{Context, Result};
use contracts::ServiceConfigList;
use event_client::SyntheticConfig;
use tracing::{info, warn};

use crate::cli::SourceArgs;

/// Load and validate the service configuration
fn load_configs(path: &Path) -> Result<ServiceConfigList> {
    if !path.exists() {
        anyhow::bail!("Configuration file not found: {}", path.display());
    }
    let configs = config_loader::ConfigLoader::load_from_path(path)
        .with_context(|| format!("Failed to load config from {}", path.display()))?;

    info!(
        path = %path.display(),
        services = configs.configs.len(),
        endpoints = configs.endpoints().count(),
        subscriptions = configs.subscriptions().count(),
        "Configuration loaded"
    );
    Ok(configs)
}

fn synthetic_config(source: &SourceArgs) -> SyntheticConfig {
    SyntheticConfig {
        frame_rate_hz: source.frame_rate,
        ..Default::default()
    }
}

/// Setup Ctrl+C and SIGTERM signal handlers
///
/// A handler that cannot be installed never fires.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
