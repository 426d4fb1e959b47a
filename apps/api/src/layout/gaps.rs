//! Gap detection and backfill matching.
//!
//! After primary placement the grid usually has holes: ragged card bottoms leave
//! empty rectangles between the masthead and the deepest row. `detect_gaps` finds
//! them and `find_filler_for_gap` picks the unplaced article that fits one best.

use crate::layout::geometry::GRID_COLUMNS;
use crate::layout::grid::GridPacker;
use crate::layout::sizing::Footprint;

/// Zero-echo scores closer than this count as a tie when choosing a filler.
const FILLER_ZERO_ECHO_TOLERANCE: f64 = 0.5;

/// An empty rectangle in a grid snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Gap {
    pub col: usize,
    pub row: usize,
    pub width: usize,
    pub height: usize,
    pub area: usize,
}

impl Gap {
    pub fn fits(&self, footprint: Footprint) -> bool {
        footprint.cols as usize <= self.width && footprint.rows as usize <= self.height
    }
}

/// Scans rows `0..depth` for empty rectangles with at least `min_area` cells.
///
/// Each unvisited empty cell, in reading order, seeds a rectangle: the empty run
/// to its right sets the width, then the rectangle extends downward while the run
/// below stays non-empty, narrowing to the shortest run seen. Every cell inside a
/// discovered rectangle is marked visited, so the returned gaps never share a
/// cell. Rectangles below `min_area` still consume their cells.
///
/// Gaps are returned largest first; equal areas keep reading order.
pub fn detect_gaps(grid: &GridPacker, min_area: usize) -> Vec<Gap> {
    let depth = grid.depth();
    let mut visited = vec![[false; GRID_COLUMNS]; depth];
    let mut gaps = Vec::new();

    for row in 0..depth {
        for col in 0..GRID_COLUMNS {
            if visited[row][col] || !grid.is_empty_cell(col, row) {
                continue;
            }

            let mut width = free_run(grid, &visited, col, row);
            let mut height = 1;
            while row + height < depth {
                let run = free_run(grid, &visited, col, row + height);
                if run == 0 {
                    break;
                }
                width = width.min(run);
                height += 1;
            }

            for cells in &mut visited[row..row + height] {
                for cell in &mut cells[col..col + width] {
                    *cell = true;
                }
            }

            let area = width * height;
            if area >= min_area {
                gaps.push(Gap {
                    col,
                    row,
                    width,
                    height,
                    area,
                });
            }
        }
    }

    gaps.sort_by(|a, b| b.area.cmp(&a.area));
    gaps
}

/// Length of the empty, unvisited run starting at `(col, row)` and going right.
fn free_run(grid: &GridPacker, visited: &[[bool; GRID_COLUMNS]], col: usize, row: usize) -> usize {
    (col..GRID_COLUMNS)
        .take_while(|&c| !visited[row][c] && grid.is_empty_cell(c, row))
        .count()
}

// ────────────────────────────────────────────────────────────────────────────
// Filler selection
// ────────────────────────────────────────────────────────────────────────────

/// An unplaced article offered to a gap.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FillCandidate {
    /// Index of the article in the batch.
    pub index: usize,
    pub footprint: Footprint,
    pub zero_echo: f64,
}

impl FillCandidate {
    fn efficiency(&self, gap: &Gap) -> f64 {
        self.footprint.area() as f64 / gap.area.max(1) as f64
    }
}

/// Picks the best candidate for `gap`, returning its batch index.
///
/// Only candidates that fit are considered. Lower zero-echo wins; scores within
/// `FILLER_ZERO_ECHO_TOLERANCE` are a tie, settled by whichever fills more of the
/// gap. Remaining ties go to the earlier candidate.
pub fn find_filler_for_gap(gap: &Gap, candidates: &[FillCandidate]) -> Option<usize> {
    let mut best: Option<&FillCandidate> = None;

    for candidate in candidates.iter().filter(|c| gap.fits(c.footprint)) {
        let replace = match best {
            None => true,
            Some(current) => {
                let delta = candidate.zero_echo - current.zero_echo;
                if delta.abs() < FILLER_ZERO_ECHO_TOLERANCE {
                    candidate.efficiency(gap) > current.efficiency(gap)
                } else {
                    delta < 0.0
                }
            }
        };
        if replace {
            best = Some(candidate);
        }
    }

    best.map(|c| c.index)
}
