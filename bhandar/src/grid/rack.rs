//! The rack aggregate: grid, boxes, positions and store order.
//!
//! The key sets of the box map, the position map and the order sequence are
//! identical at every quiescent point. [`Rack::check_invariants`] verifies
//! this together with footprint/grid agreement.

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, warn};

use super::OccupancyGrid;
use crate::core::{BoxId, Footprint, GridCell, ModelId};
use crate::error::{BhandarError, Result};
use crate::io::{RackSnapshot, SnapshotBox};

/// A box waiting to be stored. It has no identifier until placed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BoxSpec {
    /// Grid extent
    pub footprint: Footprint,
    /// Catalog model, if the box came from one
    pub model: Option<ModelId>,
}

impl BoxSpec {
    /// Create a box spec
    pub fn new(footprint: Footprint, model: Option<ModelId>) -> Self {
        Self { footprint, model }
    }
}

/// A box currently held in the rack.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StoredBox {
    /// Identifier assigned at placement
    pub id: BoxId,
    /// Grid extent
    pub footprint: Footprint,
    /// Catalog model, if any
    pub model: Option<ModelId>,
}

/// Occupancy statistics for display.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RackStats {
    /// Boxes currently stored
    pub boxes: usize,
    /// Cells covered by boxes
    pub occupied_cells: usize,
    /// All cells in the rack
    pub total_cells: usize,
}

impl RackStats {
    /// Fraction of cells occupied (0.0 to 1.0)
    pub fn utilisation(&self) -> f64 {
        if self.total_cells == 0 {
            0.0
        } else {
            self.occupied_cells as f64 / self.total_cells as f64
        }
    }
}

/// The rack: owns the occupancy grid and all box bookkeeping.
#[derive(Clone, Debug)]
pub struct Rack {
    grid: OccupancyGrid,
    boxes: BTreeMap<BoxId, StoredBox>,
    positions: BTreeMap<BoxId, GridCell>,
    /// Store order; sole basis for LIFO/FIFO.
    order: Vec<BoxId>,
    next_id: u32,
}

impl Rack {
    /// Create an empty rack
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            grid: OccupancyGrid::new(rows, cols),
            boxes: BTreeMap::new(),
            positions: BTreeMap::new(),
            order: Vec::new(),
            next_id: 1,
        }
    }

    pub fn rows(&self) -> usize {
        self.grid.rows()
    }

    pub fn cols(&self) -> usize {
        self.grid.cols()
    }

    /// Read-only view of the occupancy grid
    pub fn grid(&self) -> &OccupancyGrid {
        &self.grid
    }

    /// Whether `footprint` anchored at `anchor` lies inside the grid on empty cells.
    pub fn can_place(&self, footprint: Footprint, anchor: GridCell) -> bool {
        footprint.fits_at(anchor, self.rows(), self.cols())
            && footprint
                .cells_at(anchor)
                .all(|cell| !self.grid.is_occupied(cell))
    }

    /// Place a box with its top-left corner at `anchor` and assign it the next id.
    pub fn place(&mut self, spec: BoxSpec, anchor: GridCell) -> Result<BoxId> {
        if !self.can_place(spec.footprint, anchor) {
            return Err(BhandarError::InvalidPlacement(format!(
                "{}x{} box does not fit at {}",
                spec.footprint.length, spec.footprint.width, anchor
            )));
        }

        let id = BoxId(self.next_id);
        self.next_id += 1;

        for cell in spec.footprint.cells_at(anchor) {
            self.grid.set(cell, Some(id));
        }
        self.boxes.insert(
            id,
            StoredBox {
                id,
                footprint: spec.footprint,
                model: spec.model,
            },
        );
        self.positions.insert(id, anchor);
        self.order.push(id);

        debug!("[Rack] placed box {} at {}", id, anchor);
        Ok(id)
    }

    /// Remove a stored box, clearing exactly its footprint.
    pub fn remove(&mut self, id: BoxId) -> Result<StoredBox> {
        let stored = self
            .boxes
            .remove(&id)
            .ok_or_else(|| BhandarError::NotFound(format!("box {} is not in the rack", id)))?;
        let anchor = self.positions.remove(&id).ok_or_else(|| {
            BhandarError::Invariant(format!("box {} has no recorded position", id))
        })?;

        for cell in stored.footprint.cells_at(anchor) {
            self.grid.set(cell, None);
        }
        self.order.retain(|&o| o != id);

        debug!("[Rack] removed box {} from {}", id, anchor);
        Ok(stored)
    }

    /// Number of occupied cells
    pub fn occupied_count(&self) -> usize {
        self.grid.occupied_count()
    }

    /// Stored boxes of a model, in store order
    pub fn boxes_by_model(&self, model: ModelId) -> Vec<BoxId> {
        self.order
            .iter()
            .copied()
            .filter(|id| self.boxes.get(id).is_some_and(|b| b.model == Some(model)))
            .collect()
    }

    pub fn get(&self, id: BoxId) -> Option<&StoredBox> {
        self.boxes.get(&id)
    }

    /// Anchor of a stored box
    pub fn position(&self, id: BoxId) -> Option<GridCell> {
        self.positions.get(&id).copied()
    }

    pub fn contains(&self, id: BoxId) -> bool {
        self.positions.contains_key(&id)
    }

    /// Box covering `cell`, if any
    pub fn box_at(&self, cell: GridCell) -> Option<BoxId> {
        self.grid.get(cell)
    }

    /// Store-ordered ids of all boxes currently held
    pub fn order(&self) -> &[BoxId] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// The identifier the next placement will receive
    pub fn next_id(&self) -> BoxId {
        BoxId(self.next_id)
    }

    pub fn stats(&self) -> RackStats {
        RackStats {
            boxes: self.len(),
            occupied_cells: self.occupied_count(),
            total_cells: self.grid.cell_count(),
        }
    }

    /// Remove every box and restart identifiers at 1.
    pub fn clear(&mut self) {
        self.grid.clear();
        self.boxes.clear();
        self.positions.clear();
        self.order.clear();
        self.next_id = 1;
    }

    /// Verify the aggregate invariants.
    pub fn check_invariants(&self) -> Result<()> {
        let box_keys: BTreeSet<_> = self.boxes.keys().copied().collect();
        let pos_keys: BTreeSet<_> = self.positions.keys().copied().collect();
        let order_keys: BTreeSet<_> = self.order.iter().copied().collect();

        if order_keys.len() != self.order.len() {
            return Err(BhandarError::Invariant(
                "store order contains duplicates".to_string(),
            ));
        }
        if box_keys != pos_keys || box_keys != order_keys {
            return Err(BhandarError::Invariant(
                "box, position and order key sets differ".to_string(),
            ));
        }

        let mut expected = OccupancyGrid::new(self.rows(), self.cols());
        for (id, stored) in &self.boxes {
            let anchor = self.positions[id];
            if !stored.footprint.fits_at(anchor, self.rows(), self.cols()) {
                return Err(BhandarError::Invariant(format!(
                    "box {} extends past the rack edge",
                    id
                )));
            }
            for cell in stored.footprint.cells_at(anchor) {
                if expected.is_occupied(cell) {
                    return Err(BhandarError::Invariant(format!(
                        "box {} overlaps another box at {}",
                        id, cell
                    )));
                }
                expected.set(cell, Some(*id));
            }
        }
        if expected != self.grid {
            return Err(BhandarError::Invariant(
                "grid cells disagree with box footprints".to_string(),
            ));
        }

        if let Some(max) = box_keys.last()
            && max.0 >= self.next_id
        {
            return Err(BhandarError::Invariant(format!(
                "next id {} does not exceed stored id {}",
                self.next_id, max
            )));
        }
        Ok(())
    }

    // ========================================================================
    // Snapshots
    // ========================================================================

    /// Serializable copy of the rack
    pub fn to_snapshot(&self) -> RackSnapshot {
        RackSnapshot {
            rows: self.rows(),
            cols: self.cols(),
            grid: self.grid.to_rows(),
            boxes: self
                .boxes
                .iter()
                .map(|(id, b)| {
                    (
                        *id,
                        SnapshotBox {
                            length: b.footprint.length,
                            width: b.footprint.width,
                            model_id: b.model,
                        },
                    )
                })
                .collect(),
            positions: self
                .positions
                .iter()
                .map(|(id, cell)| (*id, [cell.row, cell.col]))
                .collect(),
            next_id: self.next_id,
            order: self.order.clone(),
        }
    }

    /// Rebuild a rack from a snapshot, rejecting any inconsistency.
    pub fn from_snapshot(snapshot: RackSnapshot) -> Result<Self> {
        let RackSnapshot {
            rows,
            cols,
            grid,
            boxes,
            positions,
            next_id,
            mut order,
        } = snapshot;

        if rows == 0 || cols == 0 {
            return Err(BhandarError::Snapshot(format!(
                "rack dimensions must be positive, got {}x{}",
                rows, cols
            )));
        }
        if grid.len() != rows || grid.iter().any(|r| r.len() != cols) {
            return Err(BhandarError::Snapshot(format!(
                "grid does not match declared {}x{} dimensions",
                rows, cols
            )));
        }

        if order.is_empty() && !boxes.is_empty() {
            warn!("[Rack] snapshot has no store order, falling back to id order");
            order = boxes.keys().copied().collect();
        }

        let mut rack = Rack::new(rows, cols);
        rack.next_id = next_id;
        rack.order = order;

        for (id, b) in boxes {
            let footprint = Footprint::new(b.length, b.width)
                .map_err(|e| BhandarError::Snapshot(format!("box {}: {}", id, e)))?;
            rack.boxes.insert(
                id,
                StoredBox {
                    id,
                    footprint,
                    model: b.model_id,
                },
            );
        }
        for (id, [row, col]) in positions {
            rack.positions.insert(id, GridCell::new(row, col));
        }
        for (r, row) in grid.iter().enumerate() {
            for (c, value) in row.iter().enumerate() {
                rack.grid.set(GridCell::new(r, c), *value);
            }
        }

        rack.check_invariants()
            .map_err(|e| BhandarError::Snapshot(e.to_string()))?;
        Ok(rack)
    }
}
