//! Box footprints.

use serde::{Deserialize, Serialize};

use super::GridCell;
use crate::error::{BhandarError, Result};

/// Rectangular extent of a box on the grid.
///
/// A footprint covers `width` rows and `length` columns starting at its
/// anchor (the top-left cell).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Footprint {
    /// Extent along columns
    pub length: u32,
    /// Extent along rows
    pub width: u32,
}

impl Footprint {
    /// Create a footprint, rejecting zero dimensions.
    pub fn new(length: u32, width: u32) -> Result<Self> {
        if length == 0 || width == 0 {
            return Err(BhandarError::InvalidInput(format!(
                "box dimensions must be positive, got {}x{}",
                length, width
            )));
        }
        Ok(Self { length, width })
    }

    /// Number of rows covered
    #[inline]
    pub fn rows(&self) -> usize {
        self.width as usize
    }

    /// Number of columns covered
    #[inline]
    pub fn cols(&self) -> usize {
        self.length as usize
    }

    /// Number of cells covered
    #[inline]
    pub fn area(&self) -> usize {
        self.rows() * self.cols()
    }

    /// Whether the footprint anchored at `anchor` stays inside a `rows × cols` grid
    #[inline]
    pub fn fits_at(&self, anchor: GridCell, rows: usize, cols: usize) -> bool {
        anchor.row.checked_add(self.rows()).is_some_and(|end| end <= rows)
            && anchor.col.checked_add(self.cols()).is_some_and(|end| end <= cols)
    }

    /// Cells covered when anchored at `anchor`, in row-major order.
    pub fn cells_at(&self, anchor: GridCell) -> impl Iterator<Item = GridCell> + use<> {
        let (rows, cols) = (self.rows(), self.cols());
        (anchor.row..anchor.row + rows)
            .flat_map(move |r| (anchor.col..anchor.col + cols).map(move |c| GridCell::new(r, c)))
    }
}
