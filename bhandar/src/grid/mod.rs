//! Rack grid storage and box bookkeeping.
//!
//! - [`OccupancyGrid`]: dense row-major cell array; each cell holds the id of
//!   the box covering it, or nothing
//! - [`Rack`]: the aggregate that owns the grid together with the box,
//!   position and store-order maps, and keeps them consistent

mod rack;
mod storage;

pub use rack::{BoxSpec, Rack, RackStats, StoredBox};
pub use storage::OccupancyGrid;
