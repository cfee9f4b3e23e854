//! Persistence and export.
//!
//! - [`snapshot`]: JSON rack snapshots behind the [`SnapshotStore`] trait
//! - [`report`]: CSV report of every box the ledger has seen

pub mod report;
pub mod snapshot;

pub use report::{REPORT_HEADER, ReportRow, build_report, export_report, write_report};
pub use snapshot::{JsonSnapshotFile, MemorySnapshots, RackSnapshot, SnapshotBox, SnapshotStore};
