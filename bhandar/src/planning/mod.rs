//! Grid path planning for the trolley.
//!
//! The planner runs A* over the 4-connected rack grid with unit step cost and
//! a Manhattan heuristic. Occupied cells are obstacles, with two exceptions:
//! the start and goal cells are always enterable, and so are the other cells
//! of the box under the start or under the goal. The trolley stands on a box
//! it has just placed, and a retrieval goal is the anchor of the box being
//! picked.
//!
//! Paths are planned once against the grid as it is at call time and are
//! not re-validated while the trolley follows them.

mod astar;
mod path;

pub use astar::AStarPlanner;
pub use path::GridPath;
