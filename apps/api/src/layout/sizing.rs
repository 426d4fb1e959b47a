//! Footprint sizing — maps an article to a `cols × rows` card size.
//!
//! Width comes from a hash of the article id so the same story always gets the same
//! card width, nudged wider for high-impact stories. Height comes from a simple
//! text-flow estimate of the summary at that width, quantized to grid rows.
//!
//! Sizing is pure: identical `(id, summary length, impact)` always yields the same
//! footprint. Server-rendered pages and their hydrated copies rely on this.

use crate::layout::geometry::GridGeometry;

pub const MIN_COLS: u8 = 3;
pub const MAX_COLS: u8 = 8;
pub const MIN_ROWS: u16 = 5;
pub const MAX_ROWS: u16 = 80;

/// Impact score at or above which a card is pushed to at least `WIDE_MIN_COLS`.
pub const HIGH_IMPACT_THRESHOLD: f64 = 7.0;
pub const WIDE_MIN_COLS: u8 = 6;

/// Extra rows added after quantization so the summary never clips.
const ROW_SAFETY_MARGIN: u16 = 2;

/// A card's size in grid units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Footprint {
    pub cols: u8,
    pub rows: u16,
}

impl Footprint {
    pub fn area(&self) -> usize {
        self.cols as usize * self.rows as usize
    }
}

/// 32-bit polynomial string hash (`h = h * 31 + unit`, wrapping at every step).
///
/// Operates on UTF-16 code units and wraps exactly like signed 32-bit integer
/// arithmetic, so it reproduces the values the reading site computes in the browser.
/// Published layouts depend on these exact values; do not swap in another hash.
pub fn string_hash(s: &str) -> i32 {
    s.encode_utf16().fold(0i32, |hash, unit| {
        hash.wrapping_shl(5)
            .wrapping_sub(hash)
            .wrapping_add(i32::from(unit))
    })
}

/// Base card width for an id, in `[MIN_COLS, MAX_COLS]`.
pub fn hashed_cols(id: &str) -> u8 {
    let span = u32::from(MAX_COLS - MIN_COLS + 1);
    // unsigned_abs keeps i32::MIN in range
    MIN_COLS + (string_hash(id).unsigned_abs() % span) as u8
}

/// Computes the footprint for one article.
pub fn calculate_footprint(
    id: &str,
    summary_len: usize,
    impact_score: f64,
    geometry: &GridGeometry,
) -> Footprint {
    let mut cols = hashed_cols(id);
    if impact_score >= HIGH_IMPACT_THRESHOLD {
        cols = cols.max(WIDE_MIN_COLS).min(MAX_COLS);
    }

    let rows = estimate_rows(cols, summary_len, geometry);
    Footprint { cols, rows }
}

/// Estimates how many grid rows a summary of `summary_len` characters needs at `cols` width.
pub fn estimate_rows(cols: u8, summary_len: usize, geometry: &GridGeometry) -> u16 {
    let cols_f = f64::from(cols);
    let available_width =
        cols_f * geometry.col_width_px - geometry.padding_px - (cols_f - 1.0) * geometry.gap_px;
    // Not rounded. The lower bound only matters for geometries too narrow for one character.
    let chars_per_line = (available_width / geometry.char_width_px).max(1.0);
    let estimated_lines = (summary_len as f64 / chars_per_line).ceil();

    let height_px = geometry.header_height_px
        + estimated_lines * geometry.line_height_px
        + geometry.padding_px;
    let rows = ((height_px + geometry.gap_px) / geometry.row_pitch_px()).ceil()
        + f64::from(ROW_SAFETY_MARGIN);

    rows.clamp(f64::from(MIN_ROWS), f64::from(MAX_ROWS)) as u16
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::geometry::default_grid_geometry;

    // ── string_hash ─────────────────────────────────────────────────────────

    #[test]
    fn test_hash_of_empty_string_is_zero() {
        assert_eq!(string_hash(""), 0);
    }

    #[test]
    fn test_hash_small_values() {
        assert_eq!(string_hash("a"), 97);
        assert_eq!(string_hash("ab"), 97 * 31 + 98);
        assert_eq!(string_hash("dup"), 99839);
    }

    #[test]
    fn test_hash_wraps_like_int32() {
        assert_eq!(string_hash("hello world"), 1794106052);
        assert_eq!(string_hash("story-9"), -1884252831);
        assert_eq!(string_hash("aaaaaaa"), -1236860927);
    }

    // ── hashed_cols ─────────────────────────────────────────────────────────

    #[test]
    fn test_hashed_cols_known_ids() {
        assert_eq!(hashed_cols("1"), 4);
        assert_eq!(hashed_cols("5"), 8);
        assert_eq!(hashed_cols("abcdefgh"), 3);
        // negative hash: |-1884252831| % 6 == 3
        assert_eq!(hashed_cols("story-9"), 6);
    }

    #[test]
    fn test_hashed_cols_always_in_range() {
        for i in 0..500 {
            let cols = hashed_cols(&format!("article-{i}"));
            assert!((MIN_COLS..=MAX_COLS).contains(&cols), "cols was {cols}");
        }
    }

    // ── calculate_footprint ─────────────────────────────────────────────────

    #[test]
    fn test_empty_summary_hits_row_floor() {
        let g = default_grid_geometry();
        let fp = calculate_footprint("dup", 0, 0.0, &g);
        assert_eq!(fp, Footprint { cols: 8, rows: 5 });
    }

    #[test]
    fn test_identical_ids_get_identical_footprints() {
        let g = default_grid_geometry();
        let a = calculate_footprint("dup", 0, 3.0, &g);
        let b = calculate_footprint("dup", 0, 3.0, &g);
        assert_eq!(a, b);
        assert_eq!(a.rows, MIN_ROWS);
        assert_eq!(a.cols, hashed_cols("dup"));
    }

    #[test]
    fn test_high_impact_widens_narrow_cards() {
        let g = default_grid_geometry();
        // "abcdefgh" hashes to 3 columns
        assert_eq!(calculate_footprint("abcdefgh", 0, 6.9, &g).cols, 3);
        assert_eq!(calculate_footprint("abcdefgh", 0, 7.0, &g).cols, 6);
    }

    #[test]
    fn test_high_impact_keeps_already_wide_cards() {
        let g = default_grid_geometry();
        // "5" hashes to 8 columns; the bias never exceeds MAX_COLS
        assert_eq!(calculate_footprint("5", 0, 9.5, &g).cols, 8);
    }

    #[test]
    fn test_rows_follow_text_flow_model() {
        let g = default_grid_geometry();
        // 3 cols: 184px wide, 23 chars/line, 9 lines, 254px, ceil(270/26)+2 = 13
        assert_eq!(estimate_rows(3, 200, &g), 13);
        // 8 cols: 504px wide, 63 chars/line, 4 lines, 144px, ceil(160/26)+2 = 9
        assert_eq!(estimate_rows(8, 200, &g), 9);
    }

    #[test]
    fn test_fractional_chars_per_line_is_not_rounded() {
        let g = GridGeometry {
            char_width_px: 7.0,
            ..default_grid_geometry()
        };
        // 184px / 7px = 26.29 chars/line, 209 chars -> 8 lines (9 if floored to 26)
        // 232px, ceil(248/26)+2 = 12
        assert_eq!(estimate_rows(3, 209, &g), 12);
    }

    #[test]
    fn test_rows_clamped_to_ceiling() {
        let g = default_grid_geometry();
        assert_eq!(estimate_rows(3, 5_000, &g), MAX_ROWS);
    }

    #[test]
    fn test_wider_cards_are_never_taller() {
        let g = default_grid_geometry();
        let narrow = estimate_rows(3, 600, &g);
        let wide = estimate_rows(8, 600, &g);
        assert!(wide <= narrow, "wide {wide} > narrow {narrow}");
    }
}
