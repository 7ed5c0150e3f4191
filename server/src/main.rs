//! Court Usage Server – loads the booking tables once and serves
//! heatmaps for any court / grouping / year selection over HTTP.

mod server;

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use courtmap_common::config::{self, Config};
use courtmap_processing::loader;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    // ── load config ──────────────────────────────────────────────────
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| Config::default_path().to_string());
    let config = config::load(&PathBuf::from(&config_path)).context("Config load failed")?;

    info!(
        "Court Usage Server starting (listen={}, assets={})",
        config.listen_addr,
        config.assets_dir.display()
    );

    // ── load tables (read-only from here on) ─────────────────────────
    let courts = config.court_table()?;
    let assets_dir = config.assets_dir.clone();
    let store = tokio::task::spawn_blocking(move || loader::load_store(&assets_dir, courts))
        .await
        .context("Asset loader panicked")?
        .context("Asset load failed")?;

    // ── ctrl-c ───────────────────────────────────────────────────────
    let shutdown = Arc::new(AtomicBool::new(false));
    let shutdown_flag = shutdown.clone();
    ctrlc::set_handler(move || {
        shutdown_flag.store(true, Ordering::Relaxed);
        info!("Shutdown signal received");
    })
    .context("Cannot set Ctrl-C handler")?;

    // ── serve ────────────────────────────────────────────────────────
    let state = server::AppState::new(store, config);
    server::run(state, shutdown)
        .await
        .context("HTTP server failed")?;

    info!("Court Usage Server stopped");
    Ok(())
}
