//! Shared helpers for Bhandar integration tests.

#![allow(dead_code)]

use bhandar::store::{
    BoxModel, MaintenanceCounters, MaintenanceStatus, ModelCatalog, OperationLog, OperationRecord,
};
use bhandar::{
    BhandarError, BoxSpec, Footprint, GridCell, MemoryLedger, MemorySnapshots, ModelId,
    OperationOutcome, OperationSequencer, Rack, RackSnapshot, Result, SnapshotStore, TickEvent,
};

/// Sequencer over an empty rack with in-memory backends, origin bottom-left.
pub fn memory_sequencer(rows: usize, cols: usize) -> OperationSequencer {
    OperationSequencer::new(
        Rack::new(rows, cols),
        GridCell::new(rows - 1, 0),
        Box::new(MemoryLedger::default()),
        Box::new(MemorySnapshots::new()),
    )
    .unwrap()
}

pub fn spec(length: u32, width: u32) -> BoxSpec {
    BoxSpec::new(Footprint::new(length, width).unwrap(), None)
}

/// Tick to idle, collecting every event.
pub fn run(seq: &mut OperationSequencer) -> Vec<TickEvent> {
    let mut events = Vec::new();
    seq.run_until_idle(|_, event| events.push(*event)).unwrap();
    events
}

/// Tick to idle and return the completed outcome.
pub fn complete(seq: &mut OperationSequencer) -> OperationOutcome {
    match run(seq).last() {
        Some(TickEvent::Completed(outcome)) => *outcome,
        other => panic!("operation did not complete: {:?}", other),
    }
}

/// Store a box of the given size and run it to completion.
pub fn store(seq: &mut OperationSequencer, length: u32, width: u32) -> OperationOutcome {
    seq.request_store_box(spec(length, width)).unwrap();
    complete(seq)
}

fn disk_error() -> BhandarError {
    BhandarError::Io(std::io::Error::other("disk unavailable"))
}

/// Snapshot store whose writes always fail.
pub struct FailingSnapshots;

impl SnapshotStore for FailingSnapshots {
    fn save(&mut self, _snapshot: &RackSnapshot) -> Result<()> {
        Err(disk_error())
    }

    fn load(&self) -> Result<Option<RackSnapshot>> {
        Ok(None)
    }

    fn clear(&mut self) -> Result<()> {
        Err(disk_error())
    }
}

/// Working catalog, but the log and counters reject every write.
pub struct FailingLedger {
    catalog: MemoryLedger,
}

impl FailingLedger {
    pub fn new() -> Self {
        Self {
            catalog: MemoryLedger::default(),
        }
    }
}

impl ModelCatalog for FailingLedger {
    fn list_models(&self) -> Result<Vec<BoxModel>> {
        self.catalog.list_models()
    }

    fn find_model(&self, id: ModelId) -> Result<Option<BoxModel>> {
        self.catalog.find_model(id)
    }

    fn add_model(&mut self, name: &str, length: u32, width: u32) -> Result<ModelId> {
        self.catalog.add_model(name, length, width)
    }
}

impl OperationLog for FailingLedger {
    fn record(&mut self, _record: &OperationRecord) -> Result<()> {
        Err(disk_error())
    }

    fn entries(&self) -> Result<Vec<OperationRecord>> {
        Ok(Vec::new())
    }

    fn clear_log(&mut self) -> Result<()> {
        Err(disk_error())
    }
}

impl MaintenanceCounters for FailingLedger {
    fn increment_cycles(&mut self, _distance: usize) -> Result<u32> {
        Err(disk_error())
    }

    fn current_counters(&self) -> Result<MaintenanceStatus> {
        Err(disk_error())
    }

    fn reset_all(&mut self) -> Result<()> {
        Err(disk_error())
    }
}

/// Sequencer whose log, counters and snapshot writes all fail.
pub fn failing_sequencer(rows: usize, cols: usize) -> OperationSequencer {
    OperationSequencer::new(
        Rack::new(rows, cols),
        GridCell::new(rows - 1, 0),
        Box::new(FailingLedger::new()),
        Box::new(FailingSnapshots),
    )
    .unwrap()
}
