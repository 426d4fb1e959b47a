//! Grid geometry shared between the layout optimizer and the CSS grid renderer.
//!
//! Every value here is part of the rendering contract: the reading site builds its
//! `grid-template-columns` / `grid-auto-rows` from the same numbers, so a mismatch
//! shows up as cards that overflow or leave holes. Pixel values are CSS pixels.

use serde::Serialize;

/// Column count of the grid. Fixed; footprints never exceed it.
pub const GRID_COLUMNS: usize = 10;

// ────────────────────────────────────────────────────────────────────────────
// Geometry
// ────────────────────────────────────────────────────────────────────────────

/// Pixel geometry used to estimate card heights.
///
/// `gap_px` is the spacing the height model assumes between rows and columns.
/// It is kept separate from whatever nominal `gap` the stylesheet declares.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GridGeometry {
    pub columns: usize,
    /// Width of one grid column track.
    pub col_width_px: f64,
    /// Average rendered width of one summary character.
    pub char_width_px: f64,
    pub line_height_px: f64,
    /// Card padding, applied once horizontally and once vertically.
    pub padding_px: f64,
    /// Height of the card header (source, title line) above the summary.
    pub header_height_px: f64,
    /// Height of one `grid-auto-rows` track.
    pub cell_height_px: f64,
    pub gap_px: f64,
}

impl GridGeometry {
    /// Vertical distance from the top of one row track to the top of the next.
    pub fn row_pitch_px(&self) -> f64 {
        self.cell_height_px + self.gap_px
    }
}

impl Default for GridGeometry {
    fn default() -> Self {
        default_grid_geometry()
    }
}

/// Returns the geometry the reading site ships with.
///
/// With these values a card with an empty summary is `32 + 24 = 56px` tall, which
/// quantizes to exactly the 5-row floor.
pub fn default_grid_geometry() -> GridGeometry {
    GridGeometry {
        columns: GRID_COLUMNS,
        col_width_px: 80.0,
        char_width_px: 8.0,
        line_height_px: 22.0,
        padding_px: 24.0,
        header_height_px: 32.0,
        cell_height_px: 10.0,
        gap_px: 16.0,
    }
}
