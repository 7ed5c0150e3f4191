//! Colour-scale ceilings per (year, dataset, grouping).

use std::collections::HashMap;

use courtmap_common::booking::{Grouping, YearSelector};
use courtmap_common::court::Court;
use courtmap_common::error::HeatmapError;

/// Top of the colour scale for each year and `<dataset>_<Grouping>` column.
///
/// The "All" row is the fallback for years without their own entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColorScaleTable {
    entries: HashMap<(YearSelector, String), u32>,
}

impl ColorScaleTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, year: YearSelector, column: impl Into<String>, max: u32) {
        self.entries.insert((year, column.into()), max);
    }

    pub fn get(&self, year: YearSelector, column: &str) -> Option<u32> {
        self.entries.get(&(year, column.to_string())).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether an "All" entry exists for the court and grouping.
    pub fn has_fallback(&self, court: Court, grouping: Grouping) -> bool {
        self.get(YearSelector::All, &court.scale_column(grouping))
            .is_some()
    }

    /// Ceiling for a selection: the exact year's entry, else the "All" entry.
    ///
    /// Cells may exceed the ceiling; renderers clamp.
    pub fn resolve(
        &self,
        court: Court,
        grouping: Grouping,
        year: YearSelector,
    ) -> Result<u32, HeatmapError> {
        let column = court.scale_column(grouping);
        self.get(year, &column)
            .or_else(|| self.get(YearSelector::All, &column))
            .ok_or_else(|| HeatmapError::MissingScaleFallback {
                court: court.display_name().to_string(),
                grouping: grouping.to_string(),
                year: year.to_string(),
                column,
            })
    }
}
