//! Session persistence: SQLite ledger, JSON snapshot and CSV report.

mod common;

use std::fs;
use std::path::Path;

use bhandar::io::{JsonSnapshotFile, REPORT_HEADER, SnapshotStore, export_report};
use bhandar::store::{MaintenanceCounters, ModelCatalog, OperationLog};
use bhandar::{BhandarConfig, BoxId, GridCell, ModelId, RetrievalRequest, open_session};
use common::complete;

fn config_in(dir: &Path) -> BhandarConfig {
    let mut config = BhandarConfig::default();
    config.rack.rows = 6;
    config.rack.cols = 6;
    config.storage.snapshot_path = dir.join("asrs_state.json");
    config.storage.database_path = dir.join("asrs_system.db");
    config.storage.report_dir = dir.join("reports");
    config
}

#[test]
fn test_session_restores_rack_and_ledger() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());

    {
        let mut seq = open_session(&config).unwrap();
        seq.request_store(ModelId(5)).unwrap();
        complete(&mut seq);
        seq.request_store(ModelId(1)).unwrap();
        complete(&mut seq);
    }
    assert!(config.storage.snapshot_path.exists());

    let mut seq = open_session(&config).unwrap();
    assert_eq!(seq.rack().order(), &[BoxId(1), BoxId(2)]);
    assert_eq!(seq.rack().next_id(), BoxId(3));
    assert_eq!(seq.agent_position(), GridCell::new(5, 0));
    assert_eq!(seq.ledger().entries().unwrap().len(), 2);
    assert_eq!(seq.ledger().current_counters().unwrap().cycles_total, 2);
    seq.rack().check_invariants().unwrap();

    seq.request_retrieve(RetrievalRequest::fifo()).unwrap();
    assert_eq!(complete(&mut seq).box_id, BoxId(1));

    let saved = JsonSnapshotFile::new(&config.storage.snapshot_path)
        .load()
        .unwrap()
        .unwrap();
    assert_eq!(saved.order, vec![BoxId(2)]);
}

#[test]
fn test_corrupt_snapshot_starts_empty() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());
    fs::write(&config.storage.snapshot_path, "{\"rows\": 6").unwrap();

    let seq = open_session(&config).unwrap();
    assert!(seq.rack().is_empty());
    assert_eq!(seq.rack().rows(), 6);
}

#[test]
fn test_snapshot_with_other_dimensions_is_ignored() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config_in(dir.path());
    {
        let mut seq = open_session(&config).unwrap();
        seq.request_store(ModelId(5)).unwrap();
        complete(&mut seq);
    }

    config.rack.rows = 8;
    let seq = open_session(&config).unwrap();
    assert!(seq.rack().is_empty());
    assert_eq!(seq.rack().rows(), 8);
}

#[test]
fn test_reset_clears_everything() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());

    let mut seq = open_session(&config).unwrap();
    seq.request_store(ModelId(5)).unwrap();
    complete(&mut seq);
    assert!(config.storage.snapshot_path.exists());

    seq.reset().unwrap();
    assert!(seq.rack().is_empty());
    assert!(!config.storage.snapshot_path.exists());
    assert!(seq.ledger().entries().unwrap().is_empty());
    assert_eq!(seq.ledger().current_counters().unwrap().cycles_until_check, 1000);
    // The catalog survives a reset
    assert_eq!(seq.ledger().list_models().unwrap().len(), 100);
}

#[test]
fn test_custom_model_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());

    let id = {
        let mut seq = open_session(&config).unwrap();
        seq.ledger_mut().add_model("tray", 3, 1).unwrap()
    };

    let mut seq = open_session(&config).unwrap();
    let fp = seq.ledger().dimensions_of(id).unwrap();
    assert_eq!((fp.length, fp.width), (3, 1));

    seq.request_store(id).unwrap();
    let outcome = complete(&mut seq);
    let stored = seq.rack().get(outcome.box_id).unwrap();
    assert_eq!(stored.model, Some(id));
}

#[test]
fn test_report_export() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());

    let mut seq = open_session(&config).unwrap();
    seq.request_store(ModelId(5)).unwrap();
    complete(&mut seq);
    seq.request_store(ModelId(10)).unwrap();
    complete(&mut seq);
    seq.request_retrieve(RetrievalRequest::lifo()).unwrap();
    complete(&mut seq);

    let entries = seq.ledger().entries().unwrap();
    let path = export_report(&config.storage.report_dir, &entries, seq.ledger()).unwrap();
    let content = fs::read_to_string(path).unwrap();
    let lines: Vec<_> = content.lines().collect();

    assert_eq!(lines[0], REPORT_HEADER);
    assert_eq!(lines.len(), 3);
    assert!(lines[1].starts_with("1,5,"));
    assert!(lines[1].ends_with(",stored"));
    assert!(lines[2].starts_with("2,10,"));
    assert!(lines[2].ends_with(",retrieved"));
}
