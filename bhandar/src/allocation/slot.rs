//! Nearest-free-slot search.
//!
//! Every anchor at which the footprint fits inside the rack is checked with
//! [`Rack::can_place`]. The valid anchor closest (Euclidean) to the origin
//! wins; ties keep the first anchor in row-major scan order. The scan is
//! O(rows·cols·area) and runs once per store request.

use tracing::trace;

use crate::core::{Footprint, GridCell};
use crate::grid::Rack;

/// Finds free rectangular regions in a rack.
#[derive(Clone, Copy, Debug, Default)]
pub struct SlotAllocator;

impl SlotAllocator {
    pub fn new() -> Self {
        Self
    }

    /// Nearest anchor to `origin` where `footprint` can be placed, if any.
    pub fn find_nearest_free_slot(
        &self,
        rack: &Rack,
        footprint: Footprint,
        origin: GridCell,
    ) -> Option<GridCell> {
        let (rows, cols) = (rack.rows(), rack.cols());
        if footprint.rows() > rows || footprint.cols() > cols {
            return None;
        }

        let mut best: Option<(usize, GridCell)> = None;

        for row in 0..=rows - footprint.rows() {
            for col in 0..=cols - footprint.cols() {
                let anchor = GridCell::new(row, col);
                if !rack.can_place(footprint, anchor) {
                    continue;
                }
                let d2 = anchor.distance_squared(&origin);
                // Strict comparison keeps the earliest anchor on ties
                if best.is_none_or(|(best_d2, _)| d2 < best_d2) {
                    best = Some((d2, anchor));
                }
            }
        }

        trace!(
            "[Allocator] {}x{} from {} -> {:?}",
            footprint.length,
            footprint.width,
            origin,
            best.map(|(_, a)| a)
        );
        best.map(|(_, anchor)| anchor)
    }
}
