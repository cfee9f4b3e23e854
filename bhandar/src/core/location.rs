//! Numbered rack locations.
//!
//! Every cell carries a 1-based number in row-major order. Operators refer to
//! cells as `pcode-N` (or just `N`); cell (0,0) is `pcode-1`.

use std::fmt;

use super::GridCell;
use crate::error::{BhandarError, Result};

const PREFIX: &str = "pcode-";

/// A parsed location code.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LocationCode(pub u32);

impl LocationCode {
    /// Parse `pcode-N` or a bare `N` (case-insensitive, surrounding whitespace ignored).
    pub fn parse(code: &str) -> Result<Self> {
        let lowered = code.trim().to_ascii_lowercase();
        let number = lowered.strip_prefix(PREFIX).unwrap_or(&lowered);

        match number.parse::<u32>() {
            Ok(n) if n > 0 => Ok(Self(n)),
            _ => Err(BhandarError::InvalidInput(format!(
                "invalid rack location code {:?}",
                code
            ))),
        }
    }

    /// The cell this code names in a `rows × cols` grid.
    pub fn to_cell(self, rows: usize, cols: usize) -> Result<GridCell> {
        let idx = self.0.checked_sub(1).ok_or_else(|| {
            BhandarError::InvalidInput("location codes start at 1".to_string())
        })? as usize;
        let cell = GridCell::new(idx / cols.max(1), idx % cols.max(1));
        if cell.in_bounds(rows, cols) {
            Ok(cell)
        } else {
            Err(BhandarError::InvalidInput(format!(
                "location {} is outside the {}x{} rack",
                self, rows, cols
            )))
        }
    }

    /// The code naming `cell` in a grid with `cols` columns.
    pub fn for_cell(cell: GridCell, cols: usize) -> Self {
        Self((cell.row * cols + cell.col + 1) as u32)
    }
}

impl fmt::Display for LocationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", PREFIX, self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_forms() {
        assert_eq!(LocationCode::parse("pcode-7").unwrap(), LocationCode(7));
        assert_eq!(LocationCode::parse(" PCODE-7 ").unwrap(), LocationCode(7));
        assert_eq!(LocationCode::parse("7").unwrap(), LocationCode(7));
    }

    #[test]
    fn test_parse_rejects() {
        for bad in ["pcode-0", "pcode--1", "pcode-x", "", "0"] {
            assert!(LocationCode::parse(bad).is_err(), "{:?}", bad);
        }
    }

    #[test]
    fn test_to_cell() {
        assert_eq!(
            LocationCode(1).to_cell(20, 20).unwrap(),
            GridCell::new(0, 0)
        );
        assert_eq!(
            LocationCode(21).to_cell(20, 20).unwrap(),
            GridCell::new(1, 0)
        );
        assert_eq!(
            LocationCode(400).to_cell(20, 20).unwrap(),
            GridCell::new(19, 19)
        );
        assert!(LocationCode(401).to_cell(20, 20).is_err());
        assert!(matches!(
            LocationCode(0).to_cell(20, 20),
            Err(BhandarError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_for_cell_inverse() {
        let cell = GridCell::new(3, 4);
        let code = LocationCode::for_cell(cell, 20);
        assert_eq!(code.to_cell(20, 20).unwrap(), cell);
        assert_eq!(code.to_string(), "pcode-65");
    }
}
