pub mod analysis;
pub mod config;
pub mod core;
pub mod error;
pub mod fetcher;
pub mod indicators;
pub mod models;

use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::DashboardConfig;
use crate::core::orchestrator::Orchestrator;
use crate::core::scheduler::{self, LatestUpdates};

/// Installs the global subscriber. `RUST_LOG` overrides the default `info` level.
/// Safe to call more than once; later calls are ignored.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false))
        .try_init();
}

/// Polls the providers on `refresh_cron` until Ctrl-C.
pub async fn run(config: DashboardConfig) -> anyhow::Result<()> {
    let specs = config.load_indicators()?;
    info!("Starting dashboard refresh for {} indicators ({})", specs.len(), config.refresh_cron);

    let orchestrator = Arc::new(Mutex::new(Orchestrator::from_config(&config)));
    let latest = Arc::new(LatestUpdates::new());
    let mut sched = scheduler::init(orchestrator, specs, latest.clone(), &config.refresh_cron).await?;

    tokio::signal::ctrl_c().await?;
    info!("Shutting down with {} indicators published", latest.snapshot().len());
    sched.shutdown().await?;
    Ok(())
}
