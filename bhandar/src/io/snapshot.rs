//! Rack snapshots.
//!
//! ## File Format
//!
//! A single pretty-printed JSON object:
//!
//! ```json
//! {
//!   "rows": 20,
//!   "cols": 20,
//!   "grid": [[null, 1, ...], ...],
//!   "boxes": { "1": { "length": 2, "width": 1, "model_id": 4 } },
//!   "positions": { "1": [19, 0] },
//!   "next_id": 2,
//!   "order": [1]
//! }
//! ```
//!
//! Files written under the older key names `box_positions`, `next_box_id`
//! and `box_order` load unchanged.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::core::{BoxId, ModelId};
use crate::error::Result;

/// Serialized form of a [`Rack`](crate::grid::Rack).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RackSnapshot {
    pub rows: usize,
    pub cols: usize,
    /// Row-major cell contents
    pub grid: Vec<Vec<Option<BoxId>>>,
    pub boxes: BTreeMap<BoxId, SnapshotBox>,
    /// Anchor `[row, col]` per box
    #[serde(alias = "box_positions")]
    pub positions: BTreeMap<BoxId, [usize; 2]>,
    #[serde(alias = "next_box_id")]
    pub next_id: u32,
    /// Store order; missing in some older files
    #[serde(alias = "box_order", default)]
    pub order: Vec<BoxId>,
}

/// Per-box entry of a snapshot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotBox {
    pub length: u32,
    pub width: u32,
    #[serde(default)]
    pub model_id: Option<ModelId>,
}

/// Somewhere a rack snapshot can be kept between sessions.
pub trait SnapshotStore {
    /// Replace the stored snapshot
    fn save(&mut self, snapshot: &RackSnapshot) -> Result<()>;

    /// The stored snapshot, or `None` if nothing has been saved
    fn load(&self) -> Result<Option<RackSnapshot>>;

    /// Forget the stored snapshot. Clearing an empty store is not an error.
    fn clear(&mut self) -> Result<()>;
}

/// Snapshot kept as a JSON file on disk.
#[derive(Clone, Debug)]
pub struct JsonSnapshotFile {
    path: PathBuf,
}

impl JsonSnapshotFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SnapshotStore for JsonSnapshotFile {
    fn save(&mut self, snapshot: &RackSnapshot) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            fs::create_dir_all(parent)?;
        }

        let file = File::create(&self.path)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, snapshot)?;
        writer.write_all(b"\n")?;
        writer.flush()?;

        debug!(
            "[Snapshot] saved {} boxes to {}",
            snapshot.boxes.len(),
            self.path.display()
        );
        Ok(())
    }

    fn load(&self) -> Result<Option<RackSnapshot>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let snapshot: RackSnapshot = serde_json::from_str(&content)?;
        info!(
            "[Snapshot] loaded {}x{} rack with {} boxes from {}",
            snapshot.rows,
            snapshot.cols,
            snapshot.boxes.len(),
            self.path.display()
        );
        Ok(Some(snapshot))
    }

    fn clear(&mut self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-memory snapshot slot.
#[derive(Clone, Debug, Default)]
pub struct MemorySnapshots {
    current: Option<RackSnapshot>,
    saves: usize,
}

impl MemorySnapshots {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of successful saves
    pub fn save_count(&self) -> usize {
        self.saves
    }
}

impl SnapshotStore for MemorySnapshots {
    fn save(&mut self, snapshot: &RackSnapshot) -> Result<()> {
        self.current = Some(snapshot.clone());
        self.saves += 1;
        Ok(())
    }

    fn load(&self) -> Result<Option<RackSnapshot>> {
        Ok(self.current.clone())
    }

    fn clear(&mut self) -> Result<()> {
        self.current = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Footprint, GridCell};
    use crate::error::BhandarError;
    use crate::grid::{BoxSpec, Rack};

    fn sample_rack() -> Rack {
        let mut rack = Rack::new(3, 4);
        let spec = BoxSpec::new(Footprint::new(2, 1).unwrap(), Some(ModelId(7)));
        rack.place(spec, GridCell::new(2, 0)).unwrap();
        rack.place(BoxSpec::new(Footprint::new(1, 1).unwrap(), None), GridCell::new(0, 3))
            .unwrap();
        rack
    }

    #[test]
    fn test_json_keys() {
        let json = serde_json::to_value(sample_rack().to_snapshot()).unwrap();
        assert_eq!(json["rows"], 3);
        assert_eq!(json["boxes"]["1"]["model_id"], 7);
        assert!(json["boxes"]["2"]["model_id"].is_null());
        assert_eq!(json["positions"]["1"], serde_json::json!([2, 0]));
        assert_eq!(json["next_id"], 3);
        assert_eq!(json["order"], serde_json::json!([1, 2]));
        assert_eq!(json["grid"][2][1], 1);
        assert!(json["grid"][0][0].is_null());
    }

    #[test]
    fn test_legacy_keys_accepted() {
        let legacy = r#"{
            "rows": 2,
            "cols": 2,
            "grid": [[null, null], [5, null]],
            "boxes": {"5": {"length": 1, "width": 1}},
            "box_positions": {"5": [1, 0]},
            "next_box_id": 6,
            "box_order": [5]
        }"#;
        let snapshot: RackSnapshot = serde_json::from_str(legacy).unwrap();
        assert_eq!(snapshot.next_id, 6);
        assert_eq!(snapshot.order, vec![BoxId(5)]);
        assert_eq!(snapshot.boxes[&BoxId(5)].model_id, None);

        let rack = Rack::from_snapshot(snapshot).unwrap();
        assert_eq!(rack.position(BoxId(5)), Some(GridCell::new(1, 0)));
    }

    #[test]
    fn test_file_round_trip_and_clear() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = JsonSnapshotFile::new(dir.path().join("nested").join("state.json"));
        assert!(store.load().unwrap().is_none());

        let snapshot = sample_rack().to_snapshot();
        store.save(&snapshot).unwrap();
        assert_eq!(store.load().unwrap(), Some(snapshot));

        store.clear().unwrap();
        assert!(store.load().unwrap().is_none());
        store.clear().unwrap();
    }

    #[test]
    fn test_corrupt_file_is_snapshot_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        fs::write(&path, "{ not json").unwrap();
        let store = JsonSnapshotFile::new(&path);
        assert!(matches!(store.load(), Err(BhandarError::Snapshot(_))));
    }

    #[test]
    fn test_memory_store() {
        let mut store = MemorySnapshots::new();
        assert!(store.load().unwrap().is_none());
        store.save(&sample_rack().to_snapshot()).unwrap();
        assert_eq!(store.save_count(), 1);
        assert!(store.load().unwrap().is_some());
        store.clear().unwrap();
        assert!(store.load().unwrap().is_none());
    }
}
