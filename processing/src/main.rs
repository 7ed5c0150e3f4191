//! Court usage export – renders every court / grouping / year selection
//! to PNG and JSON files.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, Result};
use tracing::{error, info};

use courtmap_common::booking::Grouping;
use courtmap_common::config::{self, Config};
use courtmap_common::court::Court;
use courtmap_processing::{loader, render, MatrixAssembler, Selection};

static SHUTDOWN: AtomicBool = AtomicBool::new(false);

fn main() -> Result<()> {
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
        "Court usage export starting (assets={}, out={})",
        config.assets_dir.display(),
        config.output_dir.display()
    );

    // ── load tables ──────────────────────────────────────────────────
    let courts = config.court_table()?;
    let store = loader::load_store(&config.assets_dir, courts).context("Asset load failed")?;
    let assembler = MatrixAssembler::new(&store);

    std::fs::create_dir_all(&config.output_dir).with_context(|| {
        format!("Cannot create output directory {}", config.output_dir.display())
    })?;

    // ── ctrl-c ───────────────────────────────────────────────────────
    ctrlc::set_handler(move || {
        SHUTDOWN.store(true, Ordering::Relaxed);
        info!("Shutdown signal received");
    })
    .context("Cannot set Ctrl-C handler")?;

    // ── export every selection ───────────────────────────────────────
    let mut written = 0usize;
    let mut failed = 0usize;
    'outer: for court in Court::ALL {
        for grouping in Grouping::ALL {
            for year in config.year_selectors() {
                if SHUTDOWN.load(Ordering::Relaxed) {
                    break 'outer;
                }
                let selection = Selection {
                    court,
                    grouping,
                    year,
                };
                match export(&assembler, selection, &config) {
                    Ok(()) => written += 1,
                    Err(e) => {
                        error!("{court} / {grouping} / {year}: {e:#}");
                        failed += 1;
                    }
                }
            }
        }
    }

    info!("Export finished: {written} written, {failed} failed");
    if failed > 0 {
        anyhow::bail!("{failed} selection(s) could not be exported");
    }
    Ok(())
}

fn export(assembler: &MatrixAssembler<'_>, selection: Selection, config: &Config) -> Result<()> {
    let bundle = assembler.assemble(selection)?;
    let display = config.default_display;

    let stem = format!(
        "{}_{}_{}",
        selection.court.dataset_key(),
        selection.grouping,
        selection.year
    );
    let png_path = config.output_dir.join(format!("{stem}.png"));
    render::save_png(&bundle, &display, &png_path)?;

    let json_path = config.output_dir.join(format!("{stem}.json"));
    let json = serde_json::to_string_pretty(&bundle.to_response(display))?;
    std::fs::write(&json_path, json)
        .with_context(|| format!("Cannot write {}", json_path.display()))?;

    info!("Exported {stem}");
    Ok(())
}
