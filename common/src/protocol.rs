//! HTTP wire types shared by the server and the export tool.

use serde::{Deserialize, Serialize};

use crate::booking::{Grouping, YearSelector};
use crate::court::Court;

/// Rendering hints the pipeline carries through without interpreting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayOptions {
    /// Figure height in inches.
    pub height: u32,
    /// Figure width in inches.
    pub width: u32,
    /// Whether cell counts should be printed on the heatmap.
    pub cell_totals: bool,
}

impl Default for DisplayOptions {
    fn default() -> Self {
        Self {
            height: 10,
            width: 10,
            cell_totals: false,
        }
    }
}

/// Query string of `/api/heatmap`; absent fields take configured defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HeatmapQuery {
    pub court: Option<String>,
    pub group_by: Option<String>,
    pub year: Option<String>,
    pub height: Option<u32>,
    pub width: Option<u32>,
    /// `On`/`Off` (or `true`/`false`).
    pub cell_totals: Option<String>,
}

/// Everything a client needs to draw one heatmap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatmapResponse {
    pub title: String,
    pub court: Court,
    pub group_by: Grouping,
    pub year: YearSelector,
    /// `HH:MM` start times, top to bottom.
    pub row_labels: Vec<String>,
    /// Weekday or month short names, left to right.
    pub col_labels: Vec<String>,
    /// Row-major booking counts.
    pub counts: Vec<Vec<u32>>,
    pub color_scale_max: u32,
    pub display: DisplayOptions,
}

/// Selector choices and their defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionsResponse {
    pub courts: Vec<Court>,
    pub group_by: Vec<Grouping>,
    pub years: Vec<YearSelector>,
    pub default_court: Court,
    pub default_group_by: Grouping,
    pub default_year: YearSelector,
    pub default_display: DisplayOptions,
}

/// Health-check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub uptime_secs: u64,
}

/// Body returned when a selection cannot be rendered.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub kind: String,
}
