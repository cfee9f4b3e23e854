//! The operation sequencer.

use std::collections::VecDeque;

use tracing::{debug, error, info, warn};

use super::{OperationOutcome, Phase, TickEvent};
use crate::allocation::SlotAllocator;
use crate::core::{BoxId, GridCell, LocationCode, ModelId};
use crate::error::{BhandarError, Result};
use crate::grid::{BoxSpec, Rack};
use crate::io::{RackSnapshot, SnapshotStore};
use crate::planning::AStarPlanner;
use crate::retrieval::{RetrievalRequest, RetrievalSelector};
use crate::store::{
    Ledger, MaintenanceCounters, ModelCatalog, OperationKind, OperationLog, OperationRecord,
};

/// What the in-flight operation is for.
#[derive(Debug, Clone, Copy)]
enum Task {
    Store { spec: BoxSpec, anchor: GridCell },
    Retrieve { id: BoxId, anchor: GridCell, model: Option<ModelId> },
    Relocate { target: GridCell },
}

/// Ephemeral state of the operation in flight.
#[derive(Debug)]
struct Operation {
    task: Task,
    /// Remaining path cells of the current leg
    steps: VecDeque<GridCell>,
    /// Footprint cells still to mark
    pending_marks: VecDeque<GridCell>,
    outbound: usize,
    inbound: usize,
    /// Set once the rack has been changed
    committed: Option<BoxId>,
}

impl Operation {
    fn new(task: Task, steps: VecDeque<GridCell>) -> Self {
        let outbound = steps.len();
        Self {
            task,
            steps,
            pending_marks: VecDeque::new(),
            outbound,
            inbound: 0,
            committed: None,
        }
    }
}

/// Drives store, retrieve and relocation requests one tick at a time.
///
/// Only one operation may be in flight. Any request made while the phase is
/// not [`Phase::Idle`] fails with [`BhandarError::Busy`] and changes nothing.
pub struct OperationSequencer {
    rack: Rack,
    origin: GridCell,
    agent: GridCell,
    phase: Phase,
    operation: Option<Operation>,
    /// Footprint cells shown as in progress
    marked: Vec<GridCell>,

    planner: AStarPlanner,
    allocator: SlotAllocator,
    selector: RetrievalSelector,

    ledger: Box<dyn Ledger>,
    snapshots: Box<dyn SnapshotStore>,
}

impl OperationSequencer {
    /// Create a sequencer with the agent parked at `origin`.
    pub fn new(
        rack: Rack,
        origin: GridCell,
        ledger: Box<dyn Ledger>,
        snapshots: Box<dyn SnapshotStore>,
    ) -> Result<Self> {
        if !origin.in_bounds(rack.rows(), rack.cols()) {
            return Err(BhandarError::InvalidInput(format!(
                "origin {} is outside the {}x{} rack",
                origin,
                rack.rows(),
                rack.cols()
            )));
        }
        Ok(Self {
            rack,
            origin,
            agent: origin,
            phase: Phase::Idle,
            operation: None,
            marked: Vec::new(),
            planner: AStarPlanner::new(),
            allocator: SlotAllocator::new(),
            selector: RetrievalSelector::new(),
            ledger,
            snapshots,
        })
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn agent_position(&self) -> GridCell {
        self.agent
    }

    pub fn origin(&self) -> GridCell {
        self.origin
    }

    /// Read-only rack view for rendering
    pub fn rack(&self) -> &Rack {
        &self.rack
    }

    pub fn snapshot(&self) -> RackSnapshot {
        self.rack.to_snapshot()
    }

    /// Footprint cells marked in progress during placing/picking
    pub fn marked_cells(&self) -> &[GridCell] {
        &self.marked
    }

    /// Path cells left on the current leg
    pub fn remaining_steps(&self) -> impl Iterator<Item = GridCell> + '_ {
        self.operation.iter().flat_map(|op| op.steps.iter().copied())
    }

    /// Destination of the current leg, if moving
    pub fn current_goal(&self) -> Option<GridCell> {
        self.operation.as_ref().and_then(|op| op.steps.back().copied())
    }

    pub fn ledger(&self) -> &dyn Ledger {
        &*self.ledger
    }

    pub fn ledger_mut(&mut self) -> &mut dyn Ledger {
        &mut *self.ledger
    }

    // ========================================================================
    // Requests
    // ========================================================================

    /// Store a box of a catalog model.
    pub fn request_store(&mut self, model: ModelId) -> Result<()> {
        self.ensure_idle()?;
        let footprint = self.ledger.dimensions_of(model)?;
        self.request_store_box(BoxSpec::new(footprint, Some(model)))
    }

    /// Store a box with an explicit footprint.
    pub fn request_store_box(&mut self, spec: BoxSpec) -> Result<()> {
        self.ensure_idle()?;

        let anchor = self
            .allocator
            .find_nearest_free_slot(&self.rack, spec.footprint, self.agent)
            .ok_or(BhandarError::NoSpaceAvailable {
                length: spec.footprint.length,
                width: spec.footprint.width,
            })?;
        let path = self.planner.plan(self.rack.grid(), self.agent, anchor)?;

        info!(
            "[Sequencer] store {}x{} at {} ({} steps)",
            spec.footprint.length,
            spec.footprint.width,
            anchor,
            path.len()
        );
        self.begin(Task::Store { spec, anchor }, path.into_steps())
    }

    /// Retrieve a box chosen by `request`.
    pub fn request_retrieve(&mut self, request: RetrievalRequest) -> Result<()> {
        self.ensure_idle()?;

        let id = self.selector.select(&self.rack, &request)?;
        let (anchor, model) = match (self.rack.position(id), self.rack.get(id)) {
            (Some(anchor), Some(stored)) => (anchor, stored.model),
            _ => {
                return Err(BhandarError::Invariant(format!(
                    "selected box {} has no rack entry",
                    id
                )));
            }
        };
        let path = self.planner.plan(self.rack.grid(), self.agent, anchor)?;

        info!(
            "[Sequencer] retrieve {} via {} from {} ({} steps)",
            id,
            request,
            anchor,
            path.len()
        );
        self.begin(Task::Retrieve { id, anchor, model }, path.into_steps())
    }

    /// Move the agent to `target` without touching the rack.
    ///
    /// A target equal to the current position is nudged to a neighbouring
    /// cell (right, then left, then down, then up) so the move is never empty.
    pub fn request_move_to(&mut self, target: GridCell) -> Result<()> {
        self.ensure_idle()?;

        let (rows, cols) = (self.rack.rows(), self.rack.cols());
        if !target.in_bounds(rows, cols) {
            return Err(BhandarError::InvalidInput(format!(
                "{} is outside the {}x{} rack",
                target, rows, cols
            )));
        }

        let target = if target == self.agent {
            let nudged = Self::nudge(target, rows, cols).ok_or(BhandarError::NoPath {
                from_row: self.agent.row,
                from_col: self.agent.col,
                to_row: target.row,
                to_col: target.col,
            })?;
            warn!("[Sequencer] already at {}, nudging to {}", target, nudged);
            nudged
        } else {
            target
        };

        let path = self.planner.plan(self.rack.grid(), self.agent, target)?;
        info!("[Sequencer] move to {} ({} steps)", target, path.len());

        self.operation = Some(Operation::new(Task::Relocate { target }, path.into_steps()));
        self.phase = Phase::MovingToCell;
        Ok(())
    }

    /// Move the agent to a numbered location ("pcode-N" or "N").
    pub fn request_move_to_code(&mut self, code: &str) -> Result<()> {
        self.ensure_idle()?;
        let cell = LocationCode::parse(code)?.to_cell(self.rack.rows(), self.rack.cols())?;
        self.request_move_to(cell)
    }

    /// Empty the rack, park the agent at origin, and wipe log, counters and snapshot.
    pub fn reset(&mut self) -> Result<()> {
        self.ensure_idle()?;

        self.rack.clear();
        self.agent = self.origin;
        self.marked.clear();

        self.ledger.clear_log()?;
        self.ledger.reset_all()?;
        self.snapshots.clear()?;

        info!("[Sequencer] rack reset");
        Ok(())
    }

    // ========================================================================
    // Ticking
    // ========================================================================

    /// Advance the state machine by one unit of work.
    ///
    /// An internal fault abandons the operation, forces [`Phase::Idle`] and
    /// is returned as [`BhandarError::Invariant`].
    pub fn tick(&mut self) -> Result<TickEvent> {
        let result = match self.phase {
            Phase::Idle => Ok(TickEvent::Idle),
            Phase::MovingToTarget => self.tick_outbound(),
            Phase::Placing | Phase::Picking => self.tick_handling(),
            Phase::Returning => self.tick_returning(),
            Phase::MovingToCell => self.tick_relocating(),
        };

        if let Err(e) = &result {
            error!(
                "[Sequencer] fault during {}: {}, abandoning operation",
                self.phase.as_str(),
                e
            );
            self.abort();
        }
        result
    }

    /// Tick until idle, calling `on_tick` after every tick.
    ///
    /// Returns the outcome of a completed store/retrieve, or `None` for a
    /// relocation or when nothing was in flight.
    pub fn run_until_idle<F>(&mut self, mut on_tick: F) -> Result<Option<OperationOutcome>>
    where
        F: FnMut(&Self, &TickEvent),
    {
        let cells = self.rack.rows() * self.rack.cols();
        let budget = 4 * cells + 8;
        let mut outcome = None;

        for _ in 0..budget {
            if !self.phase.is_active() {
                return Ok(outcome);
            }
            let event = self.tick()?;
            if let TickEvent::Completed(done) = event {
                outcome = Some(done);
            }
            on_tick(&*self, &event);
        }

        if self.phase.is_active() {
            let phase = self.phase;
            self.abort();
            return Err(BhandarError::Invariant(format!(
                "operation still {} after {} ticks",
                phase.as_str(),
                budget
            )));
        }
        Ok(outcome)
    }

    fn tick_outbound(&mut self) -> Result<TickEvent> {
        let op = self.operation_mut()?;
        let cell = op.steps.pop_front().ok_or_else(|| {
            BhandarError::Invariant("outbound leg has no steps".to_string())
        })?;
        let arrived = op.steps.is_empty();
        self.agent = cell;
        if arrived {
            self.start_handling()?;
        }
        Ok(TickEvent::Moved(cell))
    }

    fn tick_handling(&mut self) -> Result<TickEvent> {
        let op = self.operation_mut()?;
        if let Some(cell) = op.pending_marks.pop_front() {
            self.marked.push(cell);
            return Ok(TickEvent::Marked(cell));
        }
        self.commit()
    }

    fn tick_returning(&mut self) -> Result<TickEvent> {
        let op = self.operation_mut()?;
        let cell = op.steps.pop_front().ok_or_else(|| {
            BhandarError::Invariant("return leg has no steps".to_string())
        })?;
        let home = op.steps.is_empty();
        self.agent = cell;
        if home {
            return self.finish().map(TickEvent::Completed);
        }
        Ok(TickEvent::Moved(cell))
    }

    fn tick_relocating(&mut self) -> Result<TickEvent> {
        let op = self.operation_mut()?;
        let cell = op.steps.pop_front().ok_or_else(|| {
            BhandarError::Invariant("relocation has no steps".to_string())
        })?;
        let arrived = op.steps.is_empty();
        self.agent = cell;
        if !arrived {
            return Ok(TickEvent::Moved(cell));
        }

        if let Some(Operation {
            task: Task::Relocate { target },
            ..
        }) = self.operation.take()
            && target != cell
        {
            warn!("[Sequencer] relocation ended at {} instead of {}", cell, target);
        }
        self.phase = Phase::Idle;
        info!("[Sequencer] arrived at {}", cell);
        Ok(TickEvent::Arrived(cell))
    }

    // ========================================================================
    // Phase boundaries
    // ========================================================================

    fn begin(&mut self, task: Task, steps: VecDeque<GridCell>) -> Result<()> {
        let empty = steps.is_empty();
        self.operation = Some(Operation::new(task, steps));
        self.marked.clear();
        self.phase = Phase::MovingToTarget;
        if empty {
            // Already at the target; go straight to the footprint phase.
            if let Err(e) = self.start_handling() {
                error!("[Sequencer] could not start handling: {}", e);
                self.abort();
                return Err(e);
            }
        }
        Ok(())
    }

    /// Enter placing/picking with the footprint cells queued for marking.
    fn start_handling(&mut self) -> Result<()> {
        let (phase, cells): (Phase, Vec<GridCell>) = match self.operation_ref()?.task {
            Task::Store { spec, anchor } => (Phase::Placing, spec.footprint.cells_at(anchor).collect()),
            Task::Retrieve { id, anchor, .. } => {
                let stored = self.rack.get(id).ok_or_else(|| {
                    BhandarError::Invariant(format!("box {} vanished before picking", id))
                })?;
                (Phase::Picking, stored.footprint.cells_at(anchor).collect())
            }
            Task::Relocate { .. } => {
                return Err(BhandarError::Invariant(
                    "relocation has no footprint phase".to_string(),
                ));
            }
        };
        self.operation_mut()?.pending_marks = cells.into();
        self.phase = phase;
        debug!("[Sequencer] {} at {}", phase.as_str(), self.agent);
        Ok(())
    }

    /// Apply the rack change and plan the way home.
    fn commit(&mut self) -> Result<TickEvent> {
        let task = self.operation_ref()?.task;
        let (id, event) = match task {
            Task::Store { spec, anchor } => {
                let id = self.rack.place(spec, anchor).map_err(|e| {
                    BhandarError::Invariant(format!("placement at {} failed: {}", anchor, e))
                })?;
                (id, TickEvent::Placed(id))
            }
            Task::Retrieve { id, .. } => {
                self.rack.remove(id).map_err(|e| {
                    BhandarError::Invariant(format!("removal of {} failed: {}", id, e))
                })?;
                (id, TickEvent::Picked(id))
            }
            Task::Relocate { .. } => {
                return Err(BhandarError::Invariant(
                    "relocation cannot commit".to_string(),
                ));
            }
        };
        self.marked.clear();

        let home = self
            .planner
            .shortest_path(self.rack.grid(), self.agent, self.origin);
        if home.is_empty() && self.agent != self.origin {
            warn!(
                "[Sequencer] no return path from {} to origin {}, staying put",
                self.agent, self.origin
            );
        }

        let op = self.operation_mut()?;
        op.committed = Some(id);
        op.inbound = home.len();
        op.steps = home.into_steps();
        if op.steps.is_empty() {
            return self.finish().map(TickEvent::Completed);
        }

        self.phase = Phase::Returning;
        Ok(event)
    }

    /// Close the operation: record it, charge cycles, save the snapshot.
    fn finish(&mut self) -> Result<OperationOutcome> {
        let op = self
            .operation
            .take()
            .ok_or_else(|| BhandarError::Invariant("no operation to finish".to_string()))?;
        self.phase = Phase::Idle;
        self.marked.clear();

        let (kind, model) = match op.task {
            Task::Store { spec, .. } => (OperationKind::Stored, spec.model),
            Task::Retrieve { model, .. } => (OperationKind::Retrieved, model),
            Task::Relocate { .. } => {
                return Err(BhandarError::Invariant(
                    "relocation has no outcome".to_string(),
                ));
            }
        };
        let box_id = op
            .committed
            .ok_or_else(|| BhandarError::Invariant("operation finished uncommitted".to_string()))?;
        let distance = op.outbound + op.inbound;

        let record = OperationRecord::now(box_id, model, kind, distance);
        if let Err(e) = self.ledger.record(&record) {
            warn!("[Sequencer] failed to log {} of {}: {}", kind, box_id, e);
        }
        match self.ledger.increment_cycles(distance) {
            Ok(cycles) => debug!("[Sequencer] charged {} maintenance cycles", cycles),
            Err(e) => warn!("[Sequencer] failed to update maintenance counters: {}", e),
        }
        if let Err(e) = self.snapshots.save(&self.rack.to_snapshot()) {
            warn!("[Sequencer] failed to save rack snapshot: {}", e);
        }

        info!("[Sequencer] {} {} (distance {})", kind, box_id, distance);
        Ok(OperationOutcome {
            box_id,
            kind,
            distance,
        })
    }

    fn abort(&mut self) {
        self.operation = None;
        self.marked.clear();
        self.phase = Phase::Idle;
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    fn ensure_idle(&self) -> Result<()> {
        if self.phase.is_active() {
            return Err(BhandarError::Busy(self.phase.as_str()));
        }
        Ok(())
    }

    fn operation_ref(&self) -> Result<&Operation> {
        self.operation.as_ref().ok_or_else(|| {
            BhandarError::Invariant(format!("{} without an operation", self.phase.as_str()))
        })
    }

    fn operation_mut(&mut self) -> Result<&mut Operation> {
        let phase = self.phase;
        self.operation.as_mut().ok_or_else(|| {
            BhandarError::Invariant(format!("{} without an operation", phase.as_str()))
        })
    }

    fn nudge(cell: GridCell, rows: usize, cols: usize) -> Option<GridCell> {
        if cell.col + 1 < cols {
            Some(GridCell::new(cell.row, cell.col + 1))
        } else if cell.col > 0 {
            Some(GridCell::new(cell.row, cell.col - 1))
        } else if cell.row + 1 < rows {
            Some(GridCell::new(cell.row + 1, cell.col))
        } else if cell.row > 0 {
            Some(GridCell::new(cell.row - 1, cell.col))
        } else {
            None
        }
    }
}
