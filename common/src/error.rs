//! Failure taxonomy for heatmap assembly.
//!
//! Configuration errors mean the static tables disagree with each other;
//! data-integrity errors mean a dataset drifted away from its template.
//! Neither is retried. An empty selection is not an error at all.

use thiserror::Error;

/// Broad class of a [`HeatmapError`], used for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    DataIntegrity,
    InvalidParameter,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Configuration => "configuration",
            Self::DataIntegrity => "data_integrity",
            Self::InvalidParameter => "invalid_parameter",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HeatmapError {
    #[error("{court}: court has no entry in the court table")]
    UnmappedCourt { court: String },

    #[error("{court}: no booking dataset loaded")]
    MissingDataset { court: String },

    #[error("{court} / {grouping}: blank template '{template}' is not loaded")]
    MissingTemplate {
        court: String,
        grouping: String,
        template: String,
    },

    #[error("blank template '{template}' has {actual} rows, its class defines {expected}")]
    TemplateRowCount {
        template: String,
        expected: usize,
        actual: usize,
    },

    #[error("blank template '{template}' is missing the {period} column")]
    IncompleteTemplate { template: String, period: String },

    #[error("{court}: {rows} rows of {slot_minutes} min from minute {start} overflow the label clock")]
    LabelOverflow {
        court: String,
        rows: usize,
        start: u32,
        slot_minutes: u32,
    },

    #[error("{court}: generated {labels} time labels for a {rows}-row template")]
    LabelMismatch {
        court: String,
        labels: usize,
        rows: usize,
    },

    #[error("{court} / {grouping} / {year}: colour scale has no entry for '{column}' and no 'All' fallback")]
    MissingScaleFallback {
        court: String,
        grouping: String,
        year: String,
        column: String,
    },

    #[error("{court} / {grouping} / {year}: slot {slot} × {period} has no cell in template '{template}'")]
    UnknownCell {
        court: String,
        grouping: String,
        year: String,
        template: String,
        slot: u32,
        period: String,
    },

    #[error("invalid {name}: '{value}'")]
    InvalidParameter { name: &'static str, value: String },
}

impl HeatmapError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnknownCell { .. } => ErrorKind::DataIntegrity,
            Self::InvalidParameter { .. } => ErrorKind::InvalidParameter,
            _ => ErrorKind::Configuration,
        }
    }
}
