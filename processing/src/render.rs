//! Heatmap raster rendering.
//!
//! One filled rectangle per cell on a `gist_heat` scale from 0 to the
//! bundle's colour ceiling, separated by thin grid lines, on a dark
//! background with the title above the grid, start times to its left and
//! period names below it. Cell totals are printed when the display
//! options ask for them.

use std::io::Cursor;
use std::path::Path;

use anyhow::{Context, Result};
use image::{ImageBuffer, ImageFormat, Rgb, RgbImage};
use tracing::debug;

use courtmap_common::protocol::DisplayOptions;

use crate::assembler::HeatmapBundle;
use crate::font::{draw_text, text_height, text_width};

/// Pixels per inch of the display size hints.
pub const DPI: u32 = 100;

/// Size hints outside this range are clamped.
pub const SIZE_RANGE: std::ops::RangeInclusive<u32> = 8..=20;

const BACKGROUND: Rgb<u8> = Rgb([0, 0, 0]);
const GRID_LINE: Rgb<u8> = Rgb([0x44, 0x44, 0x44]);
const LABEL: Rgb<u8> = Rgb([255, 255, 255]);
const DARK_TEXT: Rgb<u8> = Rgb([0, 0, 0]);

/// Cell colours brighter than this (HSV value) get dark totals.
const BRIGHT_CELL: f32 = 0.8;

/// Pixel geometry of the cell grid inside the image.
#[derive(Debug, Clone, Copy)]
struct Layout {
    left: u32,
    top: u32,
    width: u32,
    height: u32,
    rows: u32,
    cols: u32,
    pad: u32,
    label_scale: u32,
}

impl Layout {
    fn new(bundle: &HeatmapBundle, img_w: u32, img_h: u32) -> Self {
        let label_scale = (img_w.min(img_h) / 500).max(1);
        let pad = 3 * label_scale;
        let label_w = bundle
            .row_labels
            .iter()
            .map(|l| text_width(l, label_scale))
            .max()
            .unwrap_or(0);

        let left = pad + label_w + pad;
        let top = pad + text_height(label_scale + 1) + pad;
        let bottom = pad + text_height(label_scale) + pad;
        let rows = bundle.matrix.row_count() as u32;
        let cols = bundle.matrix.col_count() as u32;
        Self {
            left,
            top,
            width: img_w.saturating_sub(left + pad).max(cols),
            height: img_h.saturating_sub(top + bottom).max(rows),
            rows,
            cols,
            pad,
            label_scale,
        }
    }

    /// Inner pixel box `(x0, y0, x1, y1)` of a cell, end-exclusive. The
    /// last pixel row and column of each cell are left as grid line.
    fn cell(&self, row: u32, col: u32) -> (u32, u32, u32, u32) {
        let x0 = self.left + col * self.width / self.cols;
        let x1 = self.left + (col + 1) * self.width / self.cols;
        let y0 = self.top + row * self.height / self.rows;
        let y1 = self.top + (row + 1) * self.height / self.rows;
        (
            x0,
            y0,
            x1.saturating_sub(1).max(x0 + 1),
            y1.saturating_sub(1).max(y0 + 1),
        )
    }
}

/// Draw `bundle` at the size given by `display`.
pub fn render(bundle: &HeatmapBundle, display: &DisplayOptions) -> RgbImage {
    let img_w = display.width.clamp(*SIZE_RANGE.start(), *SIZE_RANGE.end()) * DPI;
    let img_h = display.height.clamp(*SIZE_RANGE.start(), *SIZE_RANGE.end()) * DPI;
    let mut img = ImageBuffer::from_pixel(img_w, img_h, BACKGROUND);

    let matrix = &bundle.matrix;
    if matrix.row_count() == 0 || matrix.col_count() == 0 {
        return img;
    }
    let layout = Layout::new(bundle, img_w, img_h);

    // Grid lines show through between cells.
    for y in layout.top..(layout.top + layout.height).min(img_h) {
        for x in layout.left..(layout.left + layout.width).min(img_w) {
            img.put_pixel(x, y, GRID_LINE);
        }
    }

    let vmax = bundle.color_scale_max as f32;
    for row in 0..layout.rows {
        for col in 0..layout.cols {
            let value = matrix.get(row as usize, col as usize).unwrap_or(0);
            let normed = if vmax > 0.0 { value as f32 / vmax } else { 0.0 };
            let pixel = gist_heat(normed);

            let (x0, y0, x1, y1) = layout.cell(row, col);
            for y in y0..y1.min(img_h) {
                for x in x0..x1.min(img_w) {
                    img.put_pixel(x, y, pixel);
                }
            }
            if display.cell_totals {
                draw_total(&mut img, &layout, row, col, value, pixel);
            }
        }
    }

    draw_labels(&mut img, bundle, &layout);

    // Bound outside `debug!`: the macro's expansion imports
    // `tracing::field::display`, which shadows the parameter name.
    let cell_totals = display.cell_totals;
    debug!(
        "Rendered {} ({}×{} cells, totals={}) at {img_w}×{img_h}",
        bundle.title(),
        layout.rows,
        layout.cols,
        cell_totals
    );
    img
}

/// Title centred above the grid, start times right-aligned to its left,
/// period names centred below each column.
fn draw_labels(img: &mut RgbImage, bundle: &HeatmapBundle, layout: &Layout) {
    let img_w = img.width();
    let scale = layout.label_scale;

    let title = bundle.title();
    let title_x = img_w.saturating_sub(text_width(&title, scale + 1)) / 2;
    draw_text(img, title_x, layout.pad, &title, scale + 1, LABEL);

    // Thin out start times when rows are shorter than the text.
    let row_h = (layout.height / layout.rows).max(1);
    let step = (text_height(scale) + 1).div_ceil(row_h).max(1) as usize;
    for (row, label) in bundle.row_labels.iter().enumerate().step_by(step) {
        let (_, y0, _, y1) = layout.cell(row as u32, 0);
        let y = (y0 + y1).saturating_sub(text_height(scale)) / 2;
        let x = (layout.left - layout.pad).saturating_sub(text_width(label, scale));
        draw_text(img, x, y, label, scale, LABEL);
    }

    let label_y = layout.top + layout.height + layout.pad;
    for (col, label) in bundle.col_labels.iter().enumerate() {
        let (x0, _, x1, _) = layout.cell(0, col as u32);
        let x = (x0 + x1).saturating_sub(text_width(label, scale)) / 2;
        draw_text(img, x, label_y, label, scale, LABEL);
    }
}

/// Print `value` centred in its cell, at the largest label scale that fits.
fn draw_total(
    img: &mut RgbImage,
    layout: &Layout,
    row: u32,
    col: u32,
    value: u32,
    cell: Rgb<u8>,
) {
    let text = value.to_string();
    let (x0, y0, x1, y1) = layout.cell(row, col);
    let (cell_w, cell_h) = (x1 - x0, y1 - y0);
    let Some(scale) = (1..=layout.label_scale)
        .rev()
        .find(|&s| text_width(&text, s) + 2 <= cell_w && text_height(s) + 2 <= cell_h)
    else {
        return;
    };
    let x = x0 + (cell_w - text_width(&text, scale)) / 2;
    let y = y0 + (cell_h - text_height(scale)) / 2;
    draw_text(img, x, y, &text, scale, total_color(cell));
}

/// Black on bright cells, white elsewhere, by the cell colour's HSV value.
fn total_color(cell: Rgb<u8>) -> Rgb<u8> {
    let value = cell.0.iter().copied().max().unwrap_or(0) as f32 / 255.0;
    if value > BRIGHT_CELL {
        DARK_TEXT
    } else {
        LABEL
    }
}

/// Render and encode as PNG.
pub fn render_png(bundle: &HeatmapBundle, display: &DisplayOptions) -> Result<Vec<u8>> {
    let img = render(bundle, display);
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageFormat::Png)
        .context("Cannot encode heatmap PNG")?;
    Ok(buf.into_inner())
}

/// Render and write a PNG file, creating parent directories.
pub fn save_png(bundle: &HeatmapBundle, display: &DisplayOptions, out_path: &Path) -> Result<()> {
    if let Some(parent) = out_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    render(bundle, display)
        .save_with_format(out_path, ImageFormat::Png)
        .with_context(|| format!("Cannot write heatmap to {}", out_path.display()))
}

/// matplotlib's `gist_heat`: black → red → orange → white. Values are
/// clamped to `0..=1`, so counts above the ceiling saturate.
fn gist_heat(val: f32) -> Rgb<u8> {
    let v = val.clamp(0.0, 1.0);
    let r = (255.0 * (1.5 * v).clamp(0.0, 1.0)) as u8;
    let g = (255.0 * (2.0 * v - 1.0).clamp(0.0, 1.0)) as u8;
    let b = (255.0 * (4.0 * v - 3.0).clamp(0.0, 1.0)) as u8;
    Rgb([r, g, b])
}
