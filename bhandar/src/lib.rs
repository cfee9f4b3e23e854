//! # Bhandar
//!
//! Allocation and transport engine for an automated storage & retrieval
//! system (ASRS): a rectangular rack grid holding boxes, and a single
//! trolley that travels the grid to store and retrieve them.
//!
//! ## Overview
//!
//! - **Rack** - occupancy grid plus box, position and store-order bookkeeping
//! - **Slot allocation** - nearest free anchor for a footprint
//! - **Path planning** - 4-connected A* around stored boxes
//! - **Retrieval policies** - LIFO, FIFO, model-filtered variants, by id
//! - **Sequencer** - tick-driven state machine moving the trolley out,
//!   committing the rack change, and bringing it back to origin
//!
//! Model catalog, operation log and maintenance counters live behind the
//! [`store::Ledger`] traits; the rack itself persists as a JSON snapshot.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use bhandar::{BhandarConfig, ModelId, RetrievalRequest};
//!
//! let config = BhandarConfig::default();
//! let mut seq = bhandar::open_session(&config)?;
//!
//! seq.request_store(ModelId(5))?;
//! let outcome = seq.run_until_idle(|_, _| {})?;
//!
//! seq.request_retrieve(RetrievalRequest::lifo())?;
//! seq.run_until_idle(|_, _| {})?;
//! ```
//!
//! ## Coordinates
//!
//! Cells are `(row, col)` with row 0 at the top. A box of length L and
//! width W covers W rows and L columns from its top-left anchor.

// Core value types
pub mod core;

// Rack grid and bookkeeping
pub mod grid;

pub mod allocation;
pub mod planning;
pub mod retrieval;
pub mod sequencer;

// Catalog, log and maintenance ledgers
pub mod store;

// Snapshots and reports
pub mod io;

pub mod config;
pub mod error;

use tracing::warn;

pub use allocation::SlotAllocator;
pub use config::BhandarConfig;
pub use crate::core::{BoxId, Footprint, GridCell, LocationCode, ModelId};
pub use error::{BhandarError, Result};
pub use grid::{BoxSpec, OccupancyGrid, Rack, RackStats, StoredBox};
pub use io::{JsonSnapshotFile, MemorySnapshots, RackSnapshot, SnapshotStore};
pub use planning::{AStarPlanner, GridPath};
pub use retrieval::{RetrievalMode, RetrievalPolicy, RetrievalRequest, RetrievalSelector};
pub use sequencer::{OperationOutcome, OperationSequencer, Phase, TickEvent};
pub use store::{Ledger, MemoryLedger, SqliteLedger};

/// Open the ledger and snapshot named in `config` and build a sequencer.
///
/// The rack is restored from the snapshot when one exists and matches the
/// configured dimensions; otherwise the session starts with an empty rack.
pub fn open_session(config: &BhandarConfig) -> Result<OperationSequencer> {
    config.validate()?;

    let ledger = SqliteLedger::open(&config.storage.database_path, config.maintenance.policy())?;
    let snapshots = JsonSnapshotFile::new(&config.storage.snapshot_path);
    let rack = restore_rack(&snapshots, config.rack.rows, config.rack.cols);

    OperationSequencer::new(rack, config.rack.origin(), Box::new(ledger), Box::new(snapshots))
}

/// Rack from a snapshot store, falling back to an empty rack.
pub fn restore_rack(snapshots: &dyn SnapshotStore, rows: usize, cols: usize) -> Rack {
    let snapshot = match snapshots.load() {
        Ok(Some(snapshot)) => snapshot,
        Ok(None) => return Rack::new(rows, cols),
        Err(e) => {
            warn!("Unreadable rack snapshot, starting empty: {}", e);
            return Rack::new(rows, cols);
        }
    };

    if snapshot.rows != rows || snapshot.cols != cols {
        warn!(
            "Snapshot is {}x{} but rack is configured {}x{}, starting empty",
            snapshot.rows, snapshot.cols, rows, cols
        );
        return Rack::new(rows, cols);
    }

    match Rack::from_snapshot(snapshot) {
        Ok(rack) => rack,
        Err(e) => {
            warn!("Inconsistent rack snapshot, starting empty: {}", e);
            Rack::new(rows, cols)
        }
    }
}
