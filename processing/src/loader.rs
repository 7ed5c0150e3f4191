//! Reads the dashboard's asset tables into a [`DataStore`].
//!
//! Tables are Parquet (preferred) or CSV files in the assets directory,
//! queried through an in-memory DuckDB connection:
//!
//! - `blank_{60|52}_{day|month}_df` – `Time Slot` plus one zero column per
//!   weekday/month short name
//! - `colormap_max_df` – `Year` (`All` or a year) plus one column per
//!   `<dataset key>_<Day|Month>`
//! - `<dataset key>_df` – one row per booking: `Year`, `Time Slot`, `Day`,
//!   `Month`

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{Month, Weekday};
use duckdb::Connection;
use tracing::{debug, info};

use courtmap_common::booking::{BookingRecord, Grouping, Period, YearSelector};
use courtmap_common::court::{Court, CourtTable, SlotClass};

use crate::color_scale::ColorScaleTable;
use crate::store::{CourtDataset, DataStore};
use crate::template::BlankTemplate;

const SLOT_COLUMN: &str = "Time Slot";
const YEAR_COLUMN: &str = "Year";
const SCALE_TABLE: &str = "colormap_max_df";

/// Load every table needed by `courts` and run the store's referential
/// checks. Any failure here is fatal for the process.
pub fn load_store(assets_dir: &Path, courts: CourtTable) -> Result<DataStore> {
    let conn = Connection::open_in_memory().context("Cannot open DuckDB")?;

    let classes: BTreeSet<SlotClass> = courts.iter().map(|(_, p)| p.class).collect();
    let mut templates = Vec::new();
    for class in classes {
        for grouping in Grouping::ALL {
            let stem = format!("{}_df", class.template_key(grouping));
            let path = find_table(assets_dir, &stem)?;
            templates.push(load_template(&conn, &path, class, grouping)?);
        }
    }

    let color_scale = load_color_scale(&conn, &find_table(assets_dir, SCALE_TABLE)?)?;

    let mut datasets = Vec::new();
    for court in Court::ALL {
        let path = find_table(assets_dir, &format!("{}_df", court.dataset_key()))?;
        datasets.push(load_dataset(&conn, &path, court)?);
    }

    let bookings: usize = datasets.iter().map(|d| d.records.len()).sum();
    let store = DataStore::new(courts, templates, color_scale, datasets);
    store
        .validate()
        .with_context(|| format!("Inconsistent tables in {}", assets_dir.display()))?;

    info!(
        "Loaded assets from {} ({} bookings across {} courts)",
        assets_dir.display(),
        bookings,
        Court::ALL.len()
    );
    Ok(store)
}

/// `<stem>.parquet`, else `<stem>.csv`.
fn find_table(dir: &Path, stem: &str) -> Result<PathBuf> {
    ["parquet", "csv"]
        .iter()
        .map(|ext| dir.join(format!("{stem}.{ext}")))
        .find(|p| p.is_file())
        .with_context(|| format!("No {stem}.parquet or {stem}.csv in {}", dir.display()))
}

/// DuckDB table function reading `path`.
fn table_source(path: &Path) -> Result<String> {
    let literal = path
        .to_str()
        .with_context(|| format!("Non-UTF-8 path: {}", path.display()))?
        .replace('\'', "''");
    match path.extension().and_then(|e| e.to_str()) {
        Some("parquet") => Ok(format!("read_parquet('{literal}')")),
        Some("csv") => Ok(format!("read_csv_auto('{literal}', header = true)")),
        _ => anyhow::bail!("Unsupported table format: {}", path.display()),
    }
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Column names of a table, skipping pandas index artefacts (`__index_level_0__`).
fn column_names(conn: &Connection, source: &str) -> Result<Vec<String>> {
    let mut stmt = conn.prepare(&format!("DESCRIBE SELECT * FROM {source}"))?;
    let names = stmt
        .query_map([], |row| row.get::<_, String>(0))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(names.into_iter().filter(|n| !n.starts_with("__")).collect())
}

fn load_template(
    conn: &Connection,
    path: &Path,
    class: SlotClass,
    grouping: Grouping,
) -> Result<BlankTemplate> {
    let source = table_source(path)?;

    let mut periods = Vec::new();
    for name in column_names(conn, &source)? {
        if name == SLOT_COLUMN {
            continue;
        }
        let period = Period::parse(grouping, &name).with_context(|| {
            format!("{}: '{name}' is not a {grouping} column", path.display())
        })?;
        periods.push(period);
    }

    let mut stmt = conn.prepare(&format!(
        "SELECT DISTINCT CAST({} AS INTEGER) FROM {source}",
        quote_ident(SLOT_COLUMN)
    ))?;
    let slots = stmt
        .query_map([], |row| row.get::<_, i32>(0))?
        .map(|slot| -> Result<u32> { Ok(u32::try_from(slot?)?) })
        .collect::<Result<Vec<u32>>>()
        .with_context(|| format!("Bad time slot in {}", path.display()))?;

    let template = BlankTemplate::new(class, grouping, slots, periods)
        .with_context(|| format!("Invalid blank template {}", path.display()))?;
    debug!(
        "Template {}: {} rows × {} columns",
        template.key(),
        template.row_count(),
        template.periods().len()
    );
    Ok(template)
}

fn load_color_scale(conn: &Connection, path: &Path) -> Result<ColorScaleTable> {
    let source = table_source(path)?;
    let mut table = ColorScaleTable::new();

    for column in column_names(conn, &source)? {
        if column == YEAR_COLUMN {
            continue;
        }
        let mut stmt = conn.prepare(&format!(
            "SELECT CAST({} AS VARCHAR), CAST({} AS BIGINT) FROM {source}",
            quote_ident(YEAR_COLUMN),
            quote_ident(&column)
        ))?;
        let rows = stmt
            .query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, Option<i64>>(1)?))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        for (year, value) in rows {
            let Some(value) = value else { continue };
            let year = parse_year(&year)
                .with_context(|| format!("{}: bad Year '{year}'", path.display()))?;
            let value = u32::try_from(value).with_context(|| {
                format!("{}: {column}/{year} = {value} is not a count", path.display())
            })?;
            table.insert(year, column.clone(), value);
        }
    }

    info!("Colour-scale table: {} entries", table.len());
    Ok(table)
}

fn load_dataset(conn: &Connection, path: &Path, court: Court) -> Result<CourtDataset> {
    let source = table_source(path)?;
    let mut stmt = conn.prepare(&format!(
        "SELECT CAST({} AS VARCHAR), CAST({} AS INTEGER), CAST(\"Day\" AS VARCHAR), \
         CAST(\"Month\" AS VARCHAR) FROM {source}",
        quote_ident(YEAR_COLUMN),
        quote_ident(SLOT_COLUMN),
    ))?;
    let rows = stmt
        .query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, i32>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
            ))
        })?
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("Cannot read {}", path.display()))?;

    let records = rows
        .into_iter()
        .map(|(year, slot, day, month)| -> Result<BookingRecord> {
            let year = match parse_year(&year) {
                Some(YearSelector::Year(y)) => y,
                _ => anyhow::bail!("bad Year '{year}'"),
            };
            Ok(BookingRecord {
                year,
                time_slot: u32::try_from(slot).context("negative time slot")?,
                day: day
                    .trim()
                    .parse::<Weekday>()
                    .map_err(|_| anyhow::anyhow!("bad Day '{day}'"))?,
                month: month
                    .trim()
                    .parse::<Month>()
                    .map_err(|_| anyhow::anyhow!("bad Month '{month}'"))?,
            })
        })
        .collect::<Result<Vec<_>>>()
        .with_context(|| format!("Invalid booking in {}", path.display()))?;

    debug!("{court}: {} bookings", records.len());
    Ok(CourtDataset { court, records })
}

/// `All`, `2024`, or a float-typed `2024.0`.
fn parse_year(raw: &str) -> Option<YearSelector> {
    let raw = raw.trim();
    if let Ok(year) = raw.parse::<YearSelector>() {
        return Some(year);
    }
    let y: f64 = raw.parse().ok()?;
    (y.fract() == 0.0 && y.abs() < i32::MAX as f64).then(|| YearSelector::Year(y as i32))
}

#[cfg(test)]
mod tests {
    use super::*;
    use courtmap_common::error::HeatmapError;

    fn assets_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join("courtmap_loader_test").join(name);
        if dir.exists() {
            std::fs::remove_dir_all(&dir).unwrap();
        }
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn write_template(dir: &Path, class: SlotClass, grouping: Grouping, periods: &[&str]) {
        let mut csv = format!("Time Slot,{}\n", periods.join(","));
        for slot in 0..class.row_count() {
            csv.push_str(&slot.to_string());
            for _ in periods {
                csv.push_str(",0");
            }
            csv.push('\n');
        }
        let path = dir.join(format!("{}_df.csv", class.template_key(grouping)));
        std::fs::write(path, csv).unwrap();
    }

    /// A complete asset set: every court has one booking in 2024 except
    /// the first lawn court, which has three.
    fn write_assets(dir: &Path, with_all_row: bool) {
        let days = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];
        let months = ["Jan", "Feb", "Mar", "Apr", "May", "Jun"];
        for class in [SlotClass::Step60, SlotClass::Step52] {
            write_template(dir, class, Grouping::Day, &days);
            write_template(dir, class, Grouping::Month, &months);
        }

        let columns: Vec<String> = Court::ALL
            .iter()
            .flat_map(|c| Grouping::ALL.map(|g| c.scale_column(g)))
            .collect();
        let mut scale = format!("Year,{}\n", columns.join(","));
        if with_all_row {
            scale.push_str(&format!("All{}\n", ",40".repeat(columns.len())));
        }
        scale.push_str(&format!("2024{}\n", ",25".repeat(columns.len())));
        std::fs::write(dir.join("colormap_max_df.csv"), scale).unwrap();

        for court in Court::ALL {
            let mut csv = String::from("Year,Time Slot,Day,Month\n2024,3,Tue,Jan\n");
            if court == Court::LawnTennis1 {
                csv.push_str("2024,3,Tue,Feb\n2023,5,Wed,Feb\n");
            }
            std::fs::write(dir.join(format!("{}_df.csv", court.dataset_key())), csv).unwrap();
        }
    }

    #[test]
    fn test_load_csv_assets() {
        let dir = assets_dir("complete");
        write_assets(&dir, true);
        let store = load_store(&dir, CourtTable::standard()).unwrap();

        let lawn = store.dataset(Court::LawnTennis1).unwrap();
        assert_eq!(lawn.records.len(), 3);
        assert_eq!(lawn.records[0].day, Weekday::Tue);
        assert_eq!(lawn.records[2].year, 2023);

        let t = store.template(Court::LawnTennis1, Grouping::Month).unwrap();
        assert_eq!(t.row_count(), 52);
        assert_eq!(t.periods().len(), 6);

        let scale = store.color_scale();
        assert_eq!(
            scale.resolve(Court::SquashD, Grouping::Day, YearSelector::Year(2024)).unwrap(),
            25
        );
        assert_eq!(
            scale.resolve(Court::SquashD, Grouping::Day, YearSelector::Year(2022)).unwrap(),
            40
        );
    }

    #[test]
    fn test_missing_all_row_fails_validation() {
        let dir = assets_dir("no_all_row");
        write_assets(&dir, false);
        let err = load_store(&dir, CourtTable::standard()).unwrap_err();
        let heatmap = err.downcast_ref::<HeatmapError>().unwrap();
        assert!(matches!(heatmap, HeatmapError::MissingScaleFallback { .. }));
    }

    #[test]
    fn test_missing_table() {
        let dir = assets_dir("missing");
        write_assets(&dir, true);
        std::fs::remove_file(dir.join("Sports_Hall_df.csv")).unwrap();
        let err = load_store(&dir, CourtTable::standard()).unwrap_err();
        assert!(format!("{err:#}").contains("Sports_Hall_df"));
    }

    #[test]
    fn test_bad_template_column() {
        let dir = assets_dir("bad_column");
        write_assets(&dir, true);
        write_template(&dir, SlotClass::Step52, Grouping::Day, &["Mon", "Tue", "Jan"]);
        assert!(load_store(&dir, CourtTable::standard()).is_err());
    }

    #[test]
    fn test_parse_year() {
        assert_eq!(parse_year("All"), Some(YearSelector::All));
        assert_eq!(parse_year(" 2024 "), Some(YearSelector::Year(2024)));
        assert_eq!(parse_year("2024.0"), Some(YearSelector::Year(2024)));
        assert_eq!(parse_year("2024.5"), None);
        assert_eq!(parse_year("n/a"), None);
    }
}
