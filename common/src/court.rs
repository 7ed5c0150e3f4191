//! Court identities and the table mapping each court to its slot grid.
//!
//! The table is explicit: every court the dashboard offers must have a
//! profile, and a court without one is a configuration error rather than
//! falling back to some other court's grid.
//!
//! An alternative table can be supplied as TOML:
//!
//! ```toml
//! [[court]]
//! name = "Real Tennis Court"
//! class = "step60"
//! start = "08:00"
//! slot_minutes = 60
//! ```

use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result};
use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::booking::Grouping;
use crate::error::HeatmapError;

// ── courts ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Court {
    RealTennis,
    LawnTennis1,
    LawnTennis2,
    RacketsAndPadel,
    SportsHall,
    SquashC,
    SquashD,
    SquashEGlass,
    SquashF,
}

impl Court {
    /// Every supported court, in menu order.
    pub const ALL: [Court; 9] = [
        Court::RealTennis,
        Court::LawnTennis1,
        Court::LawnTennis2,
        Court::RacketsAndPadel,
        Court::SportsHall,
        Court::SquashC,
        Court::SquashD,
        Court::SquashEGlass,
        Court::SquashF,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::RealTennis => "Real Tennis Court",
            Self::LawnTennis1 => "Lawn Tennis Court 1",
            Self::LawnTennis2 => "Lawn Tennis Court 2",
            Self::RacketsAndPadel => "Rackets & Padel Court",
            Self::SportsHall => "Sports Hall",
            Self::SquashC => "Squash C Court",
            Self::SquashD => "Squash D Court",
            Self::SquashEGlass => "Squash E (Glass) Court",
            Self::SquashF => "Squash F Court",
        }
    }

    /// File-safe key: spaces become `_`, parentheses are dropped and `&`
    /// becomes `and`.
    pub fn dataset_key(&self) -> String {
        self.display_name()
            .replace(' ', "_")
            .replace(['(', ')'], "")
            .replace('&', "and")
    }

    /// Column name in the colour-scale table, e.g. `Sports_Hall_Month`.
    pub fn scale_column(&self, grouping: Grouping) -> String {
        format!("{}_{}", self.dataset_key(), grouping.as_str())
    }
}

impl fmt::Display for Court {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for Court {
    type Err = HeatmapError;

    /// Accepts a display name or a dataset key.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Court::ALL
            .into_iter()
            .find(|c| c.display_name() == s || c.dataset_key() == s)
            .ok_or_else(|| HeatmapError::InvalidParameter {
                name: "court",
                value: s.to_string(),
            })
    }
}

impl Serialize for Court {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.display_name())
    }
}

impl<'de> Deserialize<'de> for Court {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

// ── slot classes ─────────────────────────────────────────────────────────

/// Canonical time-grid shape shared by a family of courts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlotClass {
    Step60,
    Step52,
}

impl SlotClass {
    /// Number of time-slot rows in this class's blank templates.
    pub fn row_count(&self) -> usize {
        match self {
            Self::Step60 => 60,
            Self::Step52 => 52,
        }
    }

    /// Blank-template key for a grouping, e.g. `blank_52_day`.
    pub fn template_key(&self, grouping: Grouping) -> String {
        format!("blank_{}_{}", self.row_count(), grouping.file_suffix())
    }
}

// ── profiles ─────────────────────────────────────────────────────────────

/// How a court's rows are shaped and labelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CourtProfile {
    pub class: SlotClass,
    /// First slot start, in minutes after midnight.
    pub start_minutes: u32,
    pub slot_minutes: u32,
}

impl CourtProfile {
    pub const fn new(class: SlotClass, start_hour: u32, slot_minutes: u32) -> Self {
        Self {
            class,
            start_minutes: start_hour * 60,
            slot_minutes,
        }
    }
}

/// Explicit court → profile lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct CourtTable {
    profiles: HashMap<Court, CourtProfile>,
}

impl CourtTable {
    /// Build a table from explicit entries. Coverage is not checked here;
    /// see [`CourtTable::validate`].
    pub fn from_entries(entries: impl IntoIterator<Item = (Court, CourtProfile)>) -> Self {
        Self {
            profiles: entries.into_iter().collect(),
        }
    }

    /// The club's standard table.
    pub fn standard() -> Self {
        Self::from_entries(Court::ALL.into_iter().map(|court| {
            let profile = match court {
                Court::RealTennis => CourtProfile::new(SlotClass::Step60, 8, 60),
                Court::LawnTennis1 | Court::LawnTennis2 => {
                    CourtProfile::new(SlotClass::Step52, 9, 15)
                }
                Court::RacketsAndPadel
                | Court::SportsHall
                | Court::SquashC
                | Court::SquashD
                | Court::SquashEGlass
                | Court::SquashF => CourtProfile::new(SlotClass::Step60, 8, 15),
            };
            (court, profile)
        }))
    }

    /// Mapped courts and their profiles, in menu order.
    pub fn iter(&self) -> impl Iterator<Item = (Court, &CourtProfile)> + '_ {
        Court::ALL
            .into_iter()
            .filter_map(|court| self.profiles.get(&court).map(|p| (court, p)))
    }

    pub fn profile(&self, court: Court) -> Result<&CourtProfile, HeatmapError> {
        self.profiles
            .get(&court)
            .ok_or_else(|| HeatmapError::UnmappedCourt {
                court: court.display_name().to_string(),
            })
    }

    /// Every supported court must be mapped.
    pub fn validate(&self) -> Result<(), HeatmapError> {
        for court in Court::ALL {
            self.profile(court)?;
        }
        Ok(())
    }

    /// Parse a TOML court table. The result must cover every court.
    pub fn from_toml(text: &str) -> Result<Self> {
        let file: CourtFile = toml::from_str(text).context("Invalid court table")?;
        let mut profiles = HashMap::new();
        for entry in file.court {
            let start = NaiveTime::parse_from_str(&entry.start, "%H:%M")
                .with_context(|| format!("Bad start time for {}: {}", entry.name, entry.start))?;
            if entry.slot_minutes == 0 {
                anyhow::bail!("{}: slot_minutes must be positive", entry.name);
            }
            let profile = CourtProfile {
                class: entry.class,
                start_minutes: start.num_seconds_from_midnight() / 60,
                slot_minutes: entry.slot_minutes,
            };
            if profiles.insert(entry.name, profile).is_some() {
                anyhow::bail!("{} is listed more than once", entry.name);
            }
        }
        let table = Self { profiles };
        table.validate()?;
        Ok(table)
    }

    /// Load a TOML court table from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Cannot read court table: {}", path.display()))?;
        let table =
            Self::from_toml(&text).with_context(|| format!("In {}", path.display()))?;
        info!("Loaded court table from {}", path.display());
        Ok(table)
    }
}

#[derive(Debug, Deserialize)]
struct CourtFile {
    #[serde(default)]
    court: Vec<CourtEntry>,
}

#[derive(Debug, Deserialize)]
struct CourtEntry {
    name: Court,
    class: SlotClass,
    start: String,
    slot_minutes: u32,
}
