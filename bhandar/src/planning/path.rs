//! Planned trolley paths.

use std::collections::VecDeque;

use crate::core::GridCell;

/// Ordered cells from start to goal, excluding the start and including the goal.
///
/// An empty path means either start == goal or no route exists; callers that
/// need to tell these apart compare start and goal themselves.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GridPath {
    cells: Vec<GridCell>,
}

impl GridPath {
    pub fn new(cells: Vec<GridCell>) -> Self {
        Self { cells }
    }

    /// The empty path
    pub fn empty() -> Self {
        Self::default()
    }

    /// Length in grid steps
    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cells(&self) -> &[GridCell] {
        &self.cells
    }

    /// Final cell, if any
    pub fn goal(&self) -> Option<GridCell> {
        self.cells.last().copied()
    }

    /// Cells as a queue for step-by-step consumption
    pub fn into_steps(self) -> VecDeque<GridCell> {
        self.cells.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_path() {
        let path = GridPath::empty();
        assert!(path.is_empty());
        assert_eq!(path.len(), 0);
        assert_eq!(path.goal(), None);
    }

    #[test]
    fn test_into_steps_preserves_order() {
        let path = GridPath::new(vec![GridCell::new(0, 1), GridCell::new(0, 2)]);
        assert_eq!(path.goal(), Some(GridCell::new(0, 2)));
        let mut steps = path.into_steps();
        assert_eq!(steps.pop_front(), Some(GridCell::new(0, 1)));
        assert_eq!(steps.pop_front(), Some(GridCell::new(0, 2)));
        assert!(steps.is_empty());
    }
}
