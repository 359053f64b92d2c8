use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use faultline_config::{FaultlineConfig, LogLevel};
use faultline_db::{bootstrap, MySqlConnector};
use faultline_resilience::ShutdownCoordinator;
use faultline_worker::Supervisor;

mod cli;
use cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_level);

    let config = cli.into_config().context("invalid configuration")?;
    config.validate_all().context("invalid configuration")?;

    banner(&config);

    if config.database.create_missing {
        bootstrap::ensure_database(&config.database)
            .await
            .context("database bootstrap failed")?;
    }

    let shutdown = Arc::new(ShutdownCoordinator::new());
    spawn_signal_listener(Arc::clone(&shutdown));

    let supervisor = Supervisor::new(
        MySqlConnector::new(config.database.clone()),
        config.load.clone(),
        shutdown,
    );
    supervisor.run().await;

    info!("MySQL HA test client finished");
    Ok(())
}

fn banner(config: &FaultlineConfig) {
    info!(
        workers = config.load.workers,
        target = %config.database.masked_url(),
        "starting MySQL HA test client"
    );
    info!(
        short_query_interval = ?config.load.short_query_interval,
        long_query_chance = config.load.long_query_chance,
        long_query_duration = ?config.load.long_query_duration,
        "query mix"
    );
}

fn init_tracing(level: Option<LogLevel>) {
    // An explicit --log-level wins; otherwise RUST_LOG, then info.
    let filter = match level {
        Some(level) => EnvFilter::new(level.as_str()),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn spawn_signal_listener(shutdown: Arc<ShutdownCoordinator>) {
    tokio::spawn(async move {
        wait_for_stop_signal().await;
        shutdown.trigger();
    });
}

/// Interrupt and termination signals both route to the coordinator.
#[cfg(unix)]
async fn wait_for_stop_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    let ctrl_c = tokio::signal::ctrl_c();
    match signal(SignalKind::terminate()) {
        Ok(mut term) => {
            tokio::select! {
                _ = ctrl_c => {}
                _ = term.recv() => {}
            }
        }
        Err(err) => {
            tracing::warn!(error = %err, "failed to install SIGTERM handler");
            let _ = ctrl_c.await;
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_stop_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
