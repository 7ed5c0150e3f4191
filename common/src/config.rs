//! Configuration parsing – reads a `KEY=VALUE` file (`courtmap.conf`).
//!
//! Shared by the HTTP server and the export tool; each ignores fields it
//! does not need.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::booking::{Grouping, YearSelector};
use crate::court::{Court, CourtTable};
use crate::protocol::DisplayOptions;

#[derive(Debug, Clone)]
pub struct Config {
    // ── data ─────────────────────────────────────────────────────────
    /// Directory holding blank templates, colour-scale table and datasets.
    pub assets_dir: PathBuf,
    /// Optional TOML court table replacing the standard one.
    pub courts_file: Option<PathBuf>,

    // ── selectors ────────────────────────────────────────────────────
    /// Years offered in the year selector (besides "All").
    pub years: Vec<i32>,
    pub default_year: YearSelector,
    pub default_grouping: Grouping,
    pub default_court: Court,
    pub default_display: DisplayOptions,

    // ── server ───────────────────────────────────────────────────────
    pub listen_addr: String,

    // ── export ───────────────────────────────────────────────────────
    pub output_dir: PathBuf,
}

impl Config {
    /// Default config path.
    pub fn default_path() -> &'static str {
        "/etc/courtmap/courtmap.conf"
    }

    /// The court table in effect: `COURTS_FILE` if set, else the standard one.
    pub fn court_table(&self) -> Result<CourtTable> {
        match &self.courts_file {
            Some(path) => CourtTable::load(path),
            None => Ok(CourtTable::standard()),
        }
    }

    /// Every year selector offered to the operator, "All" first.
    pub fn year_selectors(&self) -> Vec<YearSelector> {
        std::iter::once(YearSelector::All)
            .chain(self.years.iter().copied().map(YearSelector::Year))
            .collect()
    }
}

impl Default for Config {
    fn default() -> Self {
        from_map(&HashMap::new())
    }
}

/// Parse a `KEY=VALUE` configuration file.
///
/// Lines starting with `#` are comments.  Values may be optionally
/// double-quoted.  Unknown keys are silently ignored; malformed values
/// fall back to their defaults with a warning.
pub fn load(path: &Path) -> Result<Config> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Cannot read config: {}", path.display()))?;

    let config = from_map(&parse_conf(&text));
    info!("Loaded config from {}", path.display());
    Ok(config)
}

fn from_map(map: &HashMap<String, String>) -> Config {
    let get = |key: &str| -> Option<String> { map.get(key).cloned().filter(|v| !v.is_empty()) };
    fn parsed<T: std::str::FromStr>(key: &str, raw: Option<String>, default: T) -> T {
        match raw {
            Some(v) => v.parse().unwrap_or_else(|_| {
                warn!("Ignoring invalid {key}={v}");
                default
            }),
            None => default,
        }
    }

    let years: Vec<i32> = get("YEARS")
        .map(|s| {
            s.split(',')
                .filter_map(|y| match y.trim().parse() {
                    Ok(year) => Some(year),
                    Err(_) => {
                        warn!("Ignoring invalid YEARS entry '{}'", y.trim());
                        None
                    }
                })
                .collect()
        })
        .unwrap_or_else(|| vec![2022, 2023, 2024, 2025]);

    // The default year must be one the selector offers.
    let default_year = parsed("DEFAULT_YEAR", get("DEFAULT_YEAR"), YearSelector::Year(2025));
    let default_year = match default_year {
        YearSelector::Year(y) if !years.contains(&y) => {
            let fallback = years
                .iter()
                .copied()
                .max()
                .map_or(YearSelector::All, YearSelector::Year);
            warn!("DEFAULT_YEAR={y} is not in YEARS, using {fallback}");
            fallback
        }
        year => year,
    };

    let cell_totals = get("CELL_TOTALS")
        .map(|v| v.eq_ignore_ascii_case("on") || v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false);

    Config {
        assets_dir: PathBuf::from(get("ASSETS_DIR").unwrap_or_else(|| "Assets".into())),
        courts_file: get("COURTS_FILE").map(PathBuf::from),
        years,
        default_year,
        default_grouping: parsed("DEFAULT_GROUP_BY", get("DEFAULT_GROUP_BY"), Grouping::Day),
        default_court: parsed("DEFAULT_COURT", get("DEFAULT_COURT"), Court::LawnTennis1),
        default_display: DisplayOptions {
            height: parsed("GRAPH_HEIGHT", get("GRAPH_HEIGHT"), 10),
            width: parsed("GRAPH_WIDTH", get("GRAPH_WIDTH"), 10),
            cell_totals,
        },
        listen_addr: get("LISTEN_ADDR").unwrap_or_else(|| "0.0.0.0:8501".into()),
        output_dir: PathBuf::from(get("OUTPUT_DIR").unwrap_or_else(|| "out".into())),
    }
}

/// Parse `KEY=VALUE` lines into a map, stripping optional double-quotes.
fn parse_conf(text: &str) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some((key, val)) = line.split_once('=') {
            let key = key.trim();
            let val = val.trim().trim_matches('"');
            map.insert(key.to_string(), val.to_string());
        }
    }
    map
}

// ─── tests ───────────────────────────────────────────────────────────────
