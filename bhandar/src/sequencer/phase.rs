//! Phases and tick results.

use crate::core::{BoxId, GridCell};
use crate::store::OperationKind;

/// Sequencer execution phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// No operation in flight.
    #[default]
    Idle,

    /// Travelling to the slot or box.
    MovingToTarget,

    /// Marking footprint cells before committing a placement.
    Placing,

    /// Marking footprint cells before committing a removal.
    Picking,

    /// Travelling back to origin.
    Returning,

    /// Direct relocation, no rack change.
    MovingToCell,
}

impl Phase {
    /// Whether an operation is in flight.
    pub fn is_active(&self) -> bool {
        !matches!(self, Phase::Idle)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Idle => "IDLE",
            Phase::MovingToTarget => "MOVING_TO_TARGET",
            Phase::Placing => "PLACING",
            Phase::Picking => "PICKING",
            Phase::Returning => "RETURNING",
            Phase::MovingToCell => "MOVING_TO_CELL",
        }
    }
}

/// Summary of a finished store or retrieve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperationOutcome {
    pub box_id: BoxId,
    pub kind: OperationKind,
    /// Outbound plus return steps
    pub distance: usize,
}

/// What one tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickEvent {
    /// Nothing to do.
    Idle,

    /// Agent advanced to a cell.
    Moved(GridCell),

    /// Footprint cell marked in progress.
    Marked(GridCell),

    /// Box committed to the rack.
    Placed(BoxId),

    /// Box removed from the rack.
    Picked(BoxId),

    /// Store or retrieve finished; the sequencer is idle again.
    Completed(OperationOutcome),

    /// Relocation finished at the given cell.
    Arrived(GridCell),
}
