//! Buzz host binary entrypoint wiring the link, the controller, and the ledger.

use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod dao;
mod dto;
mod error;
mod link;
mod services;
mod state;

use config::AppConfig;
use dao::round_ledger::sqlite::SqliteRoundLedger;
use link::DeviceLink;
use services::event_loop::run_event_loop;
use services::round_service::RoundController;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::load();

    // Storage failures are fatal by contract: the ledger opens once and any
    // error propagates instead of being retried.
    let ledger = SqliteRoundLedger::open(&config.storage.path).with_context(|| {
        format!("opening round ledger at {}", config.storage.path.display())
    })?;

    let mut link = DeviceLink::open(&config.link.device, config.link.settle)
        .await
        .with_context(|| format!("opening link device {}", config.link.device.display()))?;

    let mut controller = RoundController::start(Arc::new(ledger))
        .await
        .context("creating the startup round")?;

    run_event_loop(&mut controller, &mut link, shutdown_signal())
        .await
        .context("processing link events")?;

    // Dropping the link and the ledger here releases the device and the
    // database file on every exit path.
    Ok(())
}

/// Configure tracing subscribers so status events reach the operator console.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Wait for Ctrl+C or SIGTERM so the loop can wind down cleanly.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let mut term = signal(SignalKind::terminate()).expect("install SIGTERM handler");
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {},
            _ = term.recv() => {},
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
