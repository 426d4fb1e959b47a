//! Layout optimizer — turns a batch of articles into a packed, ordered page.
//!
//! # Phases
//! 0. Masthead: the award winners, headline first at row 0 and full width, the
//!    others starting on the row where the headline ends.
//! 1. Primary: everything else by combined score, first-fit from row 0.
//! 2. Backfill: three passes of gap detection, each gap offered to the best
//!    fitting article still unplaced.
//! 3. Flush: any article still unplaced is appended first-fit.
//!
//! The returned order is the commit order. The reading site renders cards in this
//! order into a dense auto-placed CSS grid, so the order is the layout.
//!
//! Every call builds its own grid and drops it on return; there is no shared state.

use std::collections::HashSet;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::layout::awards::{rank_by_combined, select_awards, AwardSelection};
use crate::layout::gaps::{detect_gaps, find_filler_for_gap, FillCandidate};
use crate::layout::geometry::{GridGeometry, GRID_COLUMNS};
use crate::layout::grid::{GridPacker, GridPosition};
use crate::layout::sizing::{calculate_footprint, Footprint};
use crate::models::article::Article;

const BACKFILL_PASSES: usize = 3;
/// Gaps smaller than this many cells are left for the renderer.
const MIN_GAP_AREA: usize = 6;

// ────────────────────────────────────────────────────────────────────────────
// Output types
// ────────────────────────────────────────────────────────────────────────────

/// Counters describing one optimizer run.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct LayoutStats {
    pub total_rows: usize,
    pub filled_cells: usize,
    /// `filled_cells / (total_rows * columns)`; 0 for an empty page.
    pub fill_ratio: f64,
    /// Masthead article ids, headline first.
    pub featured: Vec<String>,
    pub primary_placed: usize,
    pub gaps_filled: usize,
    pub fallback_placed: usize,
    /// Gaps of at least the backfill minimum still open after the last phase.
    pub remaining_gaps: usize,
}

/// Result of `optimize_layout`.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutOutcome {
    /// Articles in commit order with `cols`, `rows`, and `awards` filled in.
    pub articles: Vec<Article>,
    /// `positions[i]` is where `articles[i]` was committed.
    pub positions: Vec<GridPosition>,
    pub stats: LayoutStats,
}

// ────────────────────────────────────────────────────────────────────────────
// Public entry point
// ────────────────────────────────────────────────────────────────────────────

/// Lays out a batch of articles. Total: every input article appears exactly once
/// in the output, duplicates included.
pub fn optimize_layout(articles: &[Article], geometry: &GridGeometry) -> LayoutOutcome {
    let mut pass = LayoutPass::new(articles, geometry);
    pass.place_featured();
    pass.place_primary();
    pass.backfill_gaps();
    pass.flush_remaining();
    pass.finish()
}

// ────────────────────────────────────────────────────────────────────────────
// Per-call state
// ────────────────────────────────────────────────────────────────────────────

struct LayoutPass<'a> {
    articles: &'a [Article],
    footprints: Vec<Footprint>,
    selection: AwardSelection,
    /// Article indices by combined score, highest first.
    ranking: Vec<usize>,
    grid: GridPacker,
    placed: Vec<bool>,
    /// `(article index, position)` in commit order.
    commits: Vec<(usize, GridPosition)>,
    primary_placed: usize,
    gaps_filled: usize,
    fallback_placed: usize,
}

impl<'a> LayoutPass<'a> {
    fn new(articles: &'a [Article], geometry: &GridGeometry) -> Self {
        warn_on_duplicate_ids(articles);

        let mut footprints: Vec<Footprint> = articles
            .iter()
            .map(|a| calculate_footprint(&a.id, a.summary_len(), a.impact(), geometry))
            .collect();

        let selection = select_awards(articles);
        if let Some(headline) = selection.headline() {
            footprints[headline].cols = GRID_COLUMNS as u8;
        }

        Self {
            articles,
            footprints,
            selection,
            ranking: rank_by_combined(articles),
            grid: GridPacker::new(),
            placed: vec![false; articles.len()],
            commits: Vec::with_capacity(articles.len()),
            primary_placed: 0,
            gaps_filled: 0,
            fallback_placed: 0,
        }
    }

    /// Phase 0.
    fn place_featured(&mut self) {
        let featured = self.selection.featured.clone();
        let Some((&headline, rest)) = featured.split_first() else {
            return;
        };

        let position = self.grid.place(headline, self.footprints[headline], 0);
        self.commit(headline, position);
        let masthead_row = position.row + self.footprints[headline].rows as usize;

        for &idx in rest {
            let position = self.grid.place(idx, self.footprints[idx], masthead_row);
            self.commit(idx, position);
        }

        debug!(
            featured = featured.len(),
            masthead_row, "Layout: masthead placed"
        );
    }

    /// Phase 1.
    fn place_primary(&mut self) {
        for order in 0..self.ranking.len() {
            let idx = self.ranking[order];
            if self.placed[idx] {
                continue;
            }
            let position = self.grid.place(idx, self.footprints[idx], 0);
            self.commit(idx, position);
            self.primary_placed += 1;
        }
        debug!(
            placed = self.primary_placed,
            depth = self.grid.depth(),
            "Layout: primary placement done"
        );
    }

    /// Phase 2.
    fn backfill_gaps(&mut self) {
        for pass in 0..BACKFILL_PASSES {
            let gaps = detect_gaps(&self.grid, MIN_GAP_AREA);
            let mut filled_this_pass = 0usize;

            for gap in &gaps {
                let candidates = self.unplaced_candidates();
                if candidates.is_empty() {
                    break;
                }
                let Some(idx) = find_filler_for_gap(gap, &candidates) else {
                    continue;
                };

                let position = GridPosition {
                    col: gap.col,
                    row: gap.row,
                };
                if !self.grid.can_place(position.col, position.row, self.footprints[idx]) {
                    continue;
                }
                self.grid.mark_occupied(position, self.footprints[idx], idx);
                self.commit(idx, position);
                filled_this_pass += 1;
            }

            self.gaps_filled += filled_this_pass;
            debug!(
                pass,
                gaps = gaps.len(),
                filled = filled_this_pass,
                "Layout: backfill pass"
            );
        }
    }

    /// Phase 3.
    fn flush_remaining(&mut self) {
        for order in 0..self.ranking.len() {
            let idx = self.ranking[order];
            if self.placed[idx] {
                continue;
            }
            let position = self.grid.place(idx, self.footprints[idx], 0);
            self.commit(idx, position);
            self.fallback_placed += 1;
        }
        if self.fallback_placed > 0 {
            debug!(
                count = self.fallback_placed,
                "Layout: appended articles no gap could take"
            );
        }
    }

    fn commit(&mut self, idx: usize, position: GridPosition) {
        self.placed[idx] = true;
        self.commits.push((idx, position));
    }

    /// Unplaced articles in combined-score order.
    fn unplaced_candidates(&self) -> Vec<FillCandidate> {
        self.ranking
            .iter()
            .filter(|&&idx| !self.placed[idx])
            .map(|&idx| FillCandidate {
                index: idx,
                footprint: self.footprints[idx],
                zero_echo: self.articles[idx].zero_echo(),
            })
            .collect()
    }

    fn finish(self) -> LayoutOutcome {
        let total_rows = self.grid.depth();
        let filled_cells = self.grid.occupied_cells();
        let fill_ratio = if total_rows == 0 {
            0.0
        } else {
            filled_cells as f64 / (total_rows * GRID_COLUMNS) as f64
        };

        let stats = LayoutStats {
            total_rows,
            filled_cells,
            fill_ratio,
            featured: self
                .selection
                .featured
                .iter()
                .map(|&idx| self.articles[idx].id.clone())
                .collect(),
            primary_placed: self.primary_placed,
            gaps_filled: self.gaps_filled,
            fallback_placed: self.fallback_placed,
            remaining_gaps: detect_gaps(&self.grid, MIN_GAP_AREA).len(),
        };

        let mut articles = Vec::with_capacity(self.commits.len());
        let mut positions = Vec::with_capacity(self.commits.len());
        for &(idx, position) in &self.commits {
            let footprint = self.footprints[idx];
            let mut article = self.articles[idx].clone();
            article.cols = Some(footprint.cols);
            article.rows = Some(footprint.rows);
            article.awards = self.selection.awards[idx]
                .iter()
                .map(|award| award.label().to_string())
                .collect();
            articles.push(article);
            positions.push(position);
        }

        info!(
            articles = articles.len(),
            rows = stats.total_rows,
            fill_ratio = stats.fill_ratio,
            gaps_filled = stats.gaps_filled,
            fallback = stats.fallback_placed,
            "Layout computed"
        );

        LayoutOutcome {
            articles,
            positions,
            stats,
        }
    }
}

/// Duplicate ids still lay out independently, but the renderer keys cards by id.
fn warn_on_duplicate_ids(articles: &[Article]) {
    let mut seen = HashSet::with_capacity(articles.len());
    for article in articles {
        if !seen.insert(article.id.as_str()) {
            warn!(id = %article.id, "Duplicate article id in layout batch");
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
