//! Model catalog, operation log and maintenance counters.
//!
//! These records are advisory: the rack is the source of truth, and the
//! sequencer never rolls back a grid change because a ledger write failed.
//!
//! Two ledgers implement all three traits:
//! - [`SqliteLedger`]: durable, one SQLite file per installation
//! - [`MemoryLedger`]: in-process, for tests and throwaway sessions

mod maintenance;
mod memory;
mod sqlite;

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};

use crate::core::{BoxId, Footprint, ModelId};
use crate::error::{BhandarError, Result};

pub use maintenance::{MaintenancePolicy, MaintenanceState, MaintenanceStatus, cycles_for_distance};
pub use memory::MemoryLedger;
pub use sqlite::SqliteLedger;

/// Number of models seeded into a fresh catalog.
pub const DEFAULT_MODEL_COUNT: u32 = 100;

/// A catalog entry describing a box size.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BoxModel {
    pub id: ModelId,
    pub name: String,
    pub length: u32,
    pub width: u32,
}

impl BoxModel {
    pub fn footprint(&self) -> Result<Footprint> {
        Footprint::new(self.length, self.width)
    }
}

/// Default catalog: models "1".."100" with square sides cycling 2,3,4,5,1.
pub fn default_models() -> impl Iterator<Item = (String, u32, u32)> {
    (1..=DEFAULT_MODEL_COUNT).map(|i| {
        let side = (i % 5) + 1;
        (i.to_string(), side, side)
    })
}

/// Kind of a completed operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OperationKind {
    Stored,
    Retrieved,
}

impl OperationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::Stored => "STORED",
            OperationKind::Retrieved => "RETRIEVED",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OperationKind {
    type Err = BhandarError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "STORED" => Ok(OperationKind::Stored),
            "RETRIEVED" => Ok(OperationKind::Retrieved),
            other => Err(BhandarError::InvalidInput(format!(
                "unknown operation kind {:?}",
                other
            ))),
        }
    }
}

/// One line of the operation log.
#[derive(Clone, Debug, PartialEq)]
pub struct OperationRecord {
    pub box_id: BoxId,
    pub model: Option<ModelId>,
    pub kind: OperationKind,
    /// Outbound plus return path length, in grid steps
    pub distance: usize,
    pub timestamp: DateTime<Utc>,
}

impl OperationRecord {
    /// Record stamped with the current time
    pub fn now(box_id: BoxId, model: Option<ModelId>, kind: OperationKind, distance: usize) -> Self {
        Self {
            box_id,
            model,
            kind,
            distance,
            timestamp: Utc::now(),
        }
    }
}

/// Catalog of box models.
pub trait ModelCatalog {
    /// All models ordered by (length, width, id)
    fn list_models(&self) -> Result<Vec<BoxModel>>;

    fn find_model(&self, id: ModelId) -> Result<Option<BoxModel>>;

    /// Add a model and return its new id.
    ///
    /// Empty names and zero dimensions are [`BhandarError::InvalidInput`];
    /// a duplicate name is [`BhandarError::AlreadyExists`].
    fn add_model(&mut self, name: &str, length: u32, width: u32) -> Result<ModelId>;

    /// Footprint of a model, or [`BhandarError::NotFound`]
    fn dimensions_of(&self, id: ModelId) -> Result<Footprint> {
        match self.find_model(id)? {
            Some(model) => model.footprint(),
            None => Err(BhandarError::NotFound(format!("{} is not in the catalog", id))),
        }
    }

    fn model_name(&self, id: ModelId) -> Result<Option<String>> {
        Ok(self.find_model(id)?.map(|m| m.name))
    }
}

/// Append-only history of completed operations.
pub trait OperationLog {
    fn record(&mut self, record: &OperationRecord) -> Result<()>;

    /// Records in insertion order
    fn entries(&self) -> Result<Vec<OperationRecord>>;

    fn clear_log(&mut self) -> Result<()>;
}

/// Wear counters driven by distance travelled.
pub trait MaintenanceCounters {
    /// Add the cycles for one operation and return how many were added
    fn increment_cycles(&mut self, distance: usize) -> Result<u32>;

    fn current_counters(&self) -> Result<MaintenanceStatus>;

    /// Zero all counters and restore the check interval
    fn reset_all(&mut self) -> Result<()>;
}

/// Everything the sequencer reports to after an operation.
pub trait Ledger: ModelCatalog + OperationLog + MaintenanceCounters {}

impl<T: ModelCatalog + OperationLog + MaintenanceCounters> Ledger for T {}

pub(crate) fn validate_model(name: &str, length: u32, width: u32) -> Result<()> {
    if name.trim().is_empty() {
        return Err(BhandarError::InvalidInput(
            "model name must not be empty".to_string(),
        ));
    }
    Footprint::new(length, width).map(|_| ())
}

/// Ordering used by [`ModelCatalog::list_models`]
pub(crate) fn sort_models(models: &mut [BoxModel]) {
    models.sort_by_key(|m| (m.length, m.width, m.id));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_models() {
        let models: Vec<_> = default_models().collect();
        assert_eq!(models.len(), 100);
        assert_eq!(models[0], ("1".to_string(), 2, 2));
        assert_eq!(models[3], ("4".to_string(), 5, 5));
        assert_eq!(models[4], ("5".to_string(), 1, 1));
    }

    #[test]
    fn test_operation_kind_strings() {
        assert_eq!(OperationKind::Stored.as_str(), "STORED");
        assert_eq!(
            "RETRIEVED".parse::<OperationKind>().unwrap(),
            OperationKind::Retrieved
        );
        assert!("MOVED".parse::<OperationKind>().is_err());
    }

    #[test]
    fn test_validate_model() {
        assert!(validate_model("crate", 2, 3).is_ok());
        assert!(matches!(
            validate_model("  ", 2, 3),
            Err(BhandarError::InvalidInput(_))
        ));
        assert!(matches!(
            validate_model("crate", 0, 3),
            Err(BhandarError::InvalidInput(_))
        ));
    }
}
