//! Grid cell addressing.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A cell on the rack grid, addressed by row and column.
///
/// Row 0 is the top of the rack; the default origin sits on the last row.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridCell {
    /// Row index (0 = top)
    pub row: usize,
    /// Column index (0 = left)
    pub col: usize,
}

impl GridCell {
    /// Create a new grid cell
    #[inline]
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Manhattan distance to another cell
    #[inline]
    pub fn manhattan_distance(&self, other: &GridCell) -> usize {
        self.row.abs_diff(other.row) + self.col.abs_diff(other.col)
    }

    /// Squared Euclidean distance to another cell.
    ///
    /// Orders candidates identically to the true Euclidean distance without
    /// leaving integer arithmetic.
    #[inline]
    pub fn distance_squared(&self, other: &GridCell) -> usize {
        let dr = self.row.abs_diff(other.row);
        let dc = self.col.abs_diff(other.col);
        dr * dr + dc * dc
    }

    /// Euclidean distance to another cell
    #[inline]
    pub fn distance(&self, other: &GridCell) -> f64 {
        (self.distance_squared(other) as f64).sqrt()
    }

    /// Whether the cell lies inside a `rows × cols` grid
    #[inline]
    pub fn in_bounds(&self, rows: usize, cols: usize) -> bool {
        self.row < rows && self.col < cols
    }

    /// The in-bounds 4-connected neighbours, in up, down, left, right order.
    pub fn neighbors_4(&self, rows: usize, cols: usize) -> impl Iterator<Item = GridCell> + use<> {
        let GridCell { row, col } = *self;
        let up = row.checked_sub(1).map(|r| GridCell::new(r, col));
        let down = (row + 1 < rows).then(|| GridCell::new(row + 1, col));
        let left = col.checked_sub(1).map(|c| GridCell::new(row, c));
        let right = (col + 1 < cols).then(|| GridCell::new(row, col + 1));
        [up, down, left, right].into_iter().flatten()
    }
}

impl From<(usize, usize)> for GridCell {
    fn from((row, col): (usize, usize)) -> Self {
        Self::new(row, col)
    }
}

impl fmt::Display for GridCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.row, self.col)
    }
}
