//! Occupancy grid and first-fit placement.
//!
//! The grid has a fixed number of columns and grows downward on demand. Each cell
//! is either empty or owned by one article (identified by its index in the batch
//! being laid out). Placement never fails: anything that fits nowhere else fits in
//! the first row below everything already placed.

use serde::Serialize;

use crate::layout::geometry::GRID_COLUMNS;
use crate::layout::sizing::Footprint;

/// Rows added each time the grid needs to grow.
const GROWTH_ROWS: usize = 50;

/// Top-left cell of a committed footprint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct GridPosition {
    pub col: usize,
    pub row: usize,
}

#[derive(Debug, Clone)]
pub struct GridPacker {
    cells: Vec<[Option<usize>; GRID_COLUMNS]>,
    /// One past the deepest occupied row.
    depth: usize,
}

impl Default for GridPacker {
    fn default() -> Self {
        Self::new()
    }
}

impl GridPacker {
    pub fn new() -> Self {
        Self {
            cells: vec![[None; GRID_COLUMNS]; GROWTH_ROWS],
            depth: 0,
        }
    }

    /// Number of rows in use (one past the deepest occupied row).
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Owner of a cell. Cells below the allocated grid are empty.
    pub fn owner(&self, col: usize, row: usize) -> Option<usize> {
        self.cells.get(row).and_then(|r| r.get(col).copied().flatten())
    }

    pub fn is_empty_cell(&self, col: usize, row: usize) -> bool {
        col < GRID_COLUMNS && self.owner(col, row).is_none()
    }

    pub fn occupied_cells(&self) -> usize {
        self.cells[..self.depth]
            .iter()
            .map(|row| row.iter().filter(|c| c.is_some()).count())
            .sum()
    }

    /// True iff the footprint lies within the column bounds and covers only empty cells.
    pub fn can_place(&mut self, col: usize, row: usize, footprint: Footprint) -> bool {
        let cols = footprint.cols as usize;
        let rows = footprint.rows as usize;
        if cols == 0 || col + cols > GRID_COLUMNS {
            return false;
        }
        self.ensure_rows(row + rows);

        self.cells[row..row + rows]
            .iter()
            .all(|cells| cells[col..col + cols].iter().all(Option::is_none))
    }

    /// First-fit search in reading order, starting at `min_row`.
    ///
    /// Every row at or below `depth` is empty, so the scan is bounded by
    /// `max(min_row, depth)`, where column 0 always fits.
    pub fn find_position(&mut self, footprint: Footprint, min_row: usize) -> GridPosition {
        let cols = (footprint.cols as usize).clamp(1, GRID_COLUMNS);
        let floor = min_row.max(self.depth);

        for row in min_row..floor {
            for col in 0..=(GRID_COLUMNS - cols) {
                if self.can_place(col, row, footprint) {
                    return GridPosition { col, row };
                }
            }
        }

        GridPosition { col: 0, row: floor }
    }

    /// Marks every cell under the footprint as owned by `owner`.
    ///
    /// Columns beyond the grid edge are dropped rather than wrapped.
    pub fn mark_occupied(&mut self, position: GridPosition, footprint: Footprint, owner: usize) {
        let rows = footprint.rows as usize;
        let col_start = position.col.min(GRID_COLUMNS);
        let col_end = (position.col + footprint.cols as usize).min(GRID_COLUMNS);
        self.ensure_rows(position.row + rows);

        for cells in &mut self.cells[position.row..position.row + rows] {
            for cell in &mut cells[col_start..col_end] {
                *cell = Some(owner);
            }
        }
        self.depth = self.depth.max(position.row + rows);
    }

    /// Finds the first-fit position at or below `min_row`, commits it, and returns it.
    pub fn place(&mut self, owner: usize, footprint: Footprint, min_row: usize) -> GridPosition {
        let position = self.find_position(footprint, min_row);
        self.mark_occupied(position, footprint, owner);
        position
    }

    fn ensure_rows(&mut self, rows: usize) {
        while self.cells.len() < rows {
            let grown = self.cells.len() + GROWTH_ROWS;
            self.cells.resize(grown, [None; GRID_COLUMNS]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fp(cols: u8, rows: u16) -> Footprint {
        Footprint { cols, rows }
    }

    #[test]
    fn test_first_placement_at_origin() {
        let mut grid = GridPacker::new();
        let pos = grid.place(0, fp(4, 5), 0);
        assert_eq!(pos, GridPosition { col: 0, row: 0 });
        assert_eq!(grid.depth(), 5);
        assert_eq!(grid.occupied_cells(), 20);
    }

    #[test]
    fn test_first_fit_fills_row_left_to_right() {
        let mut grid = GridPacker::new();
        grid.place(0, fp(4, 5), 0);
        let pos = grid.place(1, fp(6, 5), 0);
        assert_eq!(pos, GridPosition { col: 4, row: 0 });
        // row 0 is full, so the next card starts under the first one
        let pos = grid.place(2, fp(3, 5), 0);
        assert_eq!(pos, GridPosition { col: 0, row: 5 });
    }

    #[test]
    fn test_first_fit_reaches_into_holes() {
        let mut grid = GridPacker::new();
        grid.place(0, fp(5, 20), 0);
        grid.place(1, fp(5, 6), 0);
        // right side is free from row 6 onward
        let pos = grid.place(2, fp(4, 8), 0);
        assert_eq!(pos, GridPosition { col: 5, row: 6 });
    }

    #[test]
    fn test_can_place_rejects_column_overflow() {
        let mut grid = GridPacker::new();
        assert!(grid.can_place(2, 0, fp(8, 5)));
        assert!(!grid.can_place(3, 0, fp(8, 5)));
    }

    #[test]
    fn test_can_place_rejects_overlap() {
        let mut grid = GridPacker::new();
        grid.mark_occupied(GridPosition { col: 3, row: 3 }, fp(2, 2), 0);
        assert!(!grid.can_place(0, 0, fp(4, 4)));
        assert!(grid.can_place(0, 0, fp(3, 10)));
    }

    #[test]
    fn test_min_row_is_respected() {
        let mut grid = GridPacker::new();
        let pos = grid.place(0, fp(3, 5), 12);
        assert_eq!(pos, GridPosition { col: 0, row: 12 });
        assert_eq!(grid.depth(), 17);
        // the space above min_row stays available for later first-fit
        let pos = grid.place(1, fp(3, 5), 0);
        assert_eq!(pos, GridPosition { col: 0, row: 0 });
    }

    #[test]
    fn test_grid_grows_past_initial_allocation() {
        let mut grid = GridPacker::new();
        for owner in 0..10 {
            grid.place(owner, fp(10, 80), 0);
        }
        assert_eq!(grid.depth(), 800);
        assert_eq!(grid.owner(9, 799), Some(9));
        assert_eq!(grid.owner(0, 800), None);
    }

    #[test]
    fn test_full_width_always_lands_below_depth() {
        let mut grid = GridPacker::new();
        grid.place(0, fp(3, 5), 0);
        grid.place(1, fp(3, 9), 0);
        let pos = grid.place(2, fp(10, 5), 0);
        assert_eq!(pos, GridPosition { col: 0, row: 9 });
    }
}
