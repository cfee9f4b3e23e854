//! A* search on the rack grid.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use tracing::trace;

use super::GridPath;
use crate::core::{BoxId, GridCell};
use crate::error::{BhandarError, Result};
use crate::grid::OccupancyGrid;

/// A node in the open set.
#[derive(Clone, Copy, Debug)]
struct AStarNode {
    cell: GridCell,
    f_cost: usize,
    /// Push sequence number; earlier discoveries win f-cost ties.
    seq: u64,
}

impl Eq for AStarNode {}

impl PartialEq for AStarNode {
    fn eq(&self, other: &Self) -> bool {
        self.f_cost == other.f_cost && self.seq == other.seq
    }
}

impl Ord for AStarNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering for min-heap behavior
        other
            .f_cost
            .cmp(&self.f_cost)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for AStarNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// 4-connected A* planner with a Manhattan heuristic.
#[derive(Clone, Copy, Debug, Default)]
pub struct AStarPlanner;

impl AStarPlanner {
    pub fn new() -> Self {
        Self
    }

    /// Shortest path from `start` to `goal` over the grid as given.
    ///
    /// Returns the empty path when `start == goal`, when either end lies
    /// off-grid, or when the goal is unreachable.
    pub fn shortest_path(&self, grid: &OccupancyGrid, start: GridCell, goal: GridCell) -> GridPath {
        if start == goal || !grid.contains(start) || !grid.contains(goal) {
            return GridPath::empty();
        }

        let (rows, cols) = (grid.rows(), grid.cols());
        let index = |c: GridCell| c.row * cols + c.col;

        let mut g_cost = vec![usize::MAX; rows * cols];
        let mut came_from: Vec<Option<GridCell>> = vec![None; rows * cols];
        let mut closed = vec![false; rows * cols];
        let mut open_set = BinaryHeap::new();
        let mut seq = 0u64;

        g_cost[index(start)] = 0;
        open_set.push(AStarNode {
            cell: start,
            f_cost: start.manhattan_distance(&goal),
            seq,
        });

        // The trolley may cross the box it stands on and the box it is heading for
        let start_box = grid.get(start);
        let goal_box = grid.get(goal);

        let mut nodes_expanded = 0usize;

        while let Some(AStarNode { cell: current, .. }) = open_set.pop() {
            let ci = index(current);
            if closed[ci] {
                continue;
            }
            closed[ci] = true;
            nodes_expanded += 1;

            if current == goal {
                let path = Self::reconstruct_path(&came_from, cols, start, goal);
                trace!(
                    "[AStar] {} -> {}: {} steps, {} nodes expanded",
                    start,
                    goal,
                    path.len(),
                    nodes_expanded
                );
                return path;
            }

            let tentative_g = g_cost[ci] + 1;
            for neighbor in current.neighbors_4(rows, cols) {
                if neighbor != goal && !Self::passable(grid, neighbor, start_box, goal_box) {
                    continue;
                }
                let ni = index(neighbor);
                if closed[ni] || tentative_g >= g_cost[ni] {
                    continue;
                }

                g_cost[ni] = tentative_g;
                came_from[ni] = Some(current);
                seq += 1;
                open_set.push(AStarNode {
                    cell: neighbor,
                    f_cost: tentative_g + neighbor.manhattan_distance(&goal),
                    seq,
                });
            }
        }

        trace!(
            "[AStar] {} -> {}: unreachable after {} nodes",
            start,
            goal,
            nodes_expanded
        );
        GridPath::empty()
    }

    /// Like [`shortest_path`](Self::shortest_path) but reports an unreachable
    /// goal as [`BhandarError::NoPath`]. `start == goal` yields an empty path.
    pub fn plan(&self, grid: &OccupancyGrid, start: GridCell, goal: GridCell) -> Result<GridPath> {
        let path = self.shortest_path(grid, start, goal);
        if path.is_empty() && start != goal {
            return Err(BhandarError::NoPath {
                from_row: start.row,
                from_col: start.col,
                to_row: goal.row,
                to_col: goal.col,
            });
        }
        Ok(path)
    }

    fn passable(
        grid: &OccupancyGrid,
        cell: GridCell,
        start_box: Option<BoxId>,
        goal_box: Option<BoxId>,
    ) -> bool {
        match grid.get(cell) {
            None => grid.contains(cell),
            Some(id) => Some(id) == start_box || Some(id) == goal_box,
        }
    }

    fn reconstruct_path(
        came_from: &[Option<GridCell>],
        cols: usize,
        start: GridCell,
        goal: GridCell,
    ) -> GridPath {
        let mut cells = Vec::new();
        let mut current = goal;
        while current != start {
            cells.push(current);
            match came_from[current.row * cols + current.col] {
                Some(prev) => current = prev,
                None => break,
            }
        }
        cells.reverse();
        GridPath::new(cells)
    }
}
