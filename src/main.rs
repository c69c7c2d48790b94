//! Pollen Watcher - Binary Entrypoint
//! Boots the refresh coordinator for one county and logs reader values on
//! every finished refresh, until Ctrl-C.
//!
//! See `README.md` for quickstart and configuration.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use pollen_risk_watcher::{
    build_readers, CountyRiskReader, PollenReader, PollensClient, RefreshCoordinator,
    RefreshPhase, WatcherConfig,
};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("pollen_risk_watcher=info,refresh=info,pollens=info,warn")
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

fn log_snapshot(pollens: &[PollenReader], aggregates: &[CountyRiskReader]) {
    for reader in aggregates {
        match reader.value() {
            Ok(value) => tracing::info!(id = %reader.id(), %value, "county risk"),
            Err(e) => tracing::debug!(id = %reader.id(), "no county value: {e}"),
        }
    }
    for reader in pollens {
        match reader.value() {
            Ok(value) => tracing::info!(id = %reader.id(), %value, "pollen level"),
            Err(e) => tracing::debug!(id = %reader.id(), "no value: {e}"),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env in local/dev; no-op elsewhere.
    let _ = dotenvy::dotenv();
    init_tracing();

    let config = WatcherConfig::load().context("loading watcher config")?;
    let county = config.county_code().context("invalid county code")?;

    // The transport session lives here; the client shares its pool.
    let session = reqwest::Client::builder()
        .user_agent(concat!("pollen-risk-watcher/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("building HTTP session")?;

    let client = PollensClient::new(session).with_timeout(config.timeout());
    let coordinator = RefreshCoordinator::new(Arc::new(client), county.clone(), config.interval());

    coordinator
        .start()
        .await
        .with_context(|| format!("initial refresh for county {county}"))?;

    let (pollens, aggregates) = build_readers(&coordinator, &config);
    tracing::info!(
        county = %county,
        readers = pollens.len() + aggregates.len(),
        interval_hours = config.scan_interval_hours,
        "watcher started"
    );
    log_snapshot(&pollens, &aggregates);

    // Report values after every finished refresh.
    let mut updates = coordinator.subscribe();
    let reporter_coord = coordinator.clone();
    let reporter = tokio::spawn(async move {
        while updates.changed().await.is_ok() {
            let phase = *updates.borrow_and_update();
            match phase {
                RefreshPhase::Refreshing | RefreshPhase::Idle => continue,
                RefreshPhase::Failed => {
                    if let Some(failure) = reporter_coord.state().last_error {
                        tracing::warn!(
                            error = %failure.message,
                            "refresh failed; keeping previous snapshot"
                        );
                    }
                }
                RefreshPhase::Ready => log_snapshot(&pollens, &aggregates),
            }
        }
    });

    tokio::signal::ctrl_c().await.context("waiting for ctrl-c")?;
    tracing::info!("shutdown signal received");
    coordinator.stop();
    reporter.abort();
    Ok(())
}
