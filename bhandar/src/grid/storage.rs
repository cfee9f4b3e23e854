//! Dense occupancy storage for the rack grid.

use crate::core::{BoxId, GridCell};

/// Row-major occupancy grid.
///
/// Out-of-bounds cells read as empty through [`OccupancyGrid::get`] and as
/// blocked through [`OccupancyGrid::is_blocked`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OccupancyGrid {
    rows: usize,
    cols: usize,
    cells: Vec<Option<BoxId>>,
}

impl OccupancyGrid {
    /// Create an empty grid
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            cells: vec![None; rows * cols],
        }
    }

    /// Number of rows
    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns
    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Total number of cells
    #[inline]
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    pub fn contains(&self, cell: GridCell) -> bool {
        cell.in_bounds(self.rows, self.cols)
    }

    #[inline]
    fn index(&self, cell: GridCell) -> Option<usize> {
        self.contains(cell).then(|| cell.row * self.cols + cell.col)
    }

    /// Box covering `cell`, if any
    #[inline]
    pub fn get(&self, cell: GridCell) -> Option<BoxId> {
        self.index(cell).and_then(|i| self.cells[i])
    }

    /// Whether `cell` is inside the grid and covered by a box
    #[inline]
    pub fn is_occupied(&self, cell: GridCell) -> bool {
        self.get(cell).is_some()
    }

    /// Whether the trolley may not enter `cell` (occupied or off-grid)
    #[inline]
    pub fn is_blocked(&self, cell: GridCell) -> bool {
        match self.index(cell) {
            Some(i) => self.cells[i].is_some(),
            None => true,
        }
    }

    /// Set a cell. Returns false if the cell is off-grid.
    pub fn set(&mut self, cell: GridCell, value: Option<BoxId>) -> bool {
        match self.index(cell) {
            Some(i) => {
                self.cells[i] = value;
                true
            }
            None => false,
        }
    }

    /// Number of occupied cells
    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    /// Iterate over all cells with their contents, row-major
    pub fn iter(&self) -> impl Iterator<Item = (GridCell, Option<BoxId>)> + '_ {
        let cols = self.cols;
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, &v)| (GridCell::new(i / cols, i % cols), v))
    }

    /// Nested row vectors, as written to snapshots
    pub fn to_rows(&self) -> Vec<Vec<Option<BoxId>>> {
        self.cells
            .chunks(self.cols.max(1))
            .map(|row| row.to_vec())
            .collect()
    }

    /// Clear every cell
    pub fn clear(&mut self) {
        self.cells.fill(None);
    }
}
