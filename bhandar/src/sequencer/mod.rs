//! Tick-driven operation sequencer.
//!
//! ```text
//! Idle -> MovingToTarget -> Placing | Picking -> Returning -> Idle
//! Idle -> MovingToCell -> Idle
//! ```
//!
//! Each [`OperationSequencer::tick`] performs one unit of work: one path
//! cell or one footprint cell. The rack is mutated only when a
//! placing/picking phase finishes. Ledger and snapshot writes happen only
//! when the agent is back at origin, and their failures are logged rather
//! than returned.

mod engine;
mod phase;

pub use engine::OperationSequencer;
pub use phase::{OperationOutcome, Phase, TickEvent};
