//! Court usage heatmap pipeline.
//!
//! Turns a court's booking records into a zero-filled, canonically
//! ordered count matrix plus the labels and colour ceiling needed to draw
//! it:
//!
//! ```text
//! filter (year) → aggregate (slot × period) → align (blank template)
//!                      labels ─┐      colour scale ─┤
//!                              └──── assembler ─────┘→ HeatmapBundle
//! ```

pub mod aggregate;
pub mod assembler;
pub mod color_scale;
pub mod filter;
mod font;
pub mod labels;
pub mod loader;
pub mod matrix;
pub mod render;
pub mod store;
pub mod template;

pub use assembler::{HeatmapBundle, MatrixAssembler, Selection};
pub use store::{CourtDataset, DataStore};
