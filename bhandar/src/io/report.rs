//! CSV report of stored boxes.
//!
//! One row per box the operation log has seen stored, in box id order.
//! Model names come from the catalog; a model that is missing or was never
//! recorded reads "Unknown".

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, Utc};
use tracing::info;

use crate::core::BoxId;
use crate::error::Result;
use crate::store::{ModelCatalog, OperationKind, OperationRecord};

/// CSV header line
pub const REPORT_HEADER: &str = "Box ID,Model,Placement Date,Status";

const UNKNOWN_MODEL: &str = "Unknown";

/// One line of the report.
#[derive(Clone, Debug, PartialEq)]
pub struct ReportRow {
    pub box_id: BoxId,
    pub model: String,
    pub placed_at: DateTime<Utc>,
    /// `true` once a retrieval of the box was logged
    pub retrieved: bool,
}

impl ReportRow {
    pub fn status(&self) -> &'static str {
        if self.retrieved { "retrieved" } else { "stored" }
    }
}

/// Fold the operation log into report rows.
pub fn build_report<C>(entries: &[OperationRecord], catalog: &C) -> Result<Vec<ReportRow>>
where
    C: ModelCatalog + ?Sized,
{
    let mut rows: BTreeMap<BoxId, ReportRow> = BTreeMap::new();
    let mut names: BTreeMap<_, String> = BTreeMap::new();

    for entry in entries {
        match entry.kind {
            OperationKind::Stored => {
                let model = match entry.model {
                    Some(id) => {
                        if !names.contains_key(&id) {
                            let name = catalog
                                .model_name(id)?
                                .unwrap_or_else(|| UNKNOWN_MODEL.to_string());
                            names.insert(id, name);
                        }
                        names[&id].clone()
                    }
                    None => UNKNOWN_MODEL.to_string(),
                };
                rows.insert(
                    entry.box_id,
                    ReportRow {
                        box_id: entry.box_id,
                        model,
                        placed_at: entry.timestamp,
                        retrieved: false,
                    },
                );
            }
            OperationKind::Retrieved => {
                if let Some(row) = rows.get_mut(&entry.box_id) {
                    row.retrieved = true;
                }
            }
        }
    }
    Ok(rows.into_values().collect())
}

/// Write rows as CSV, header first.
pub fn write_report<W: Write>(writer: &mut W, rows: &[ReportRow]) -> Result<()> {
    writeln!(writer, "{}", REPORT_HEADER)?;
    for row in rows {
        writeln!(
            writer,
            "{},{},{},{}",
            row.box_id.0,
            csv_field(&row.model),
            row.placed_at.format("%Y-%m-%d %H:%M:%S"),
            row.status()
        )?;
    }
    Ok(())
}

/// Write `asrs_report_YYYYMMDD_HHMMSS.csv` into `dir` and return its path.
pub fn export_report<C>(dir: &Path, entries: &[OperationRecord], catalog: &C) -> Result<PathBuf>
where
    C: ModelCatalog + ?Sized,
{
    let rows = build_report(entries, catalog)?;

    fs::create_dir_all(dir)?;
    let stamp = Local::now().format("%Y%m%d_%H%M%S");
    let path = dir.join(format!("asrs_report_{}.csv", stamp));

    let mut writer = BufWriter::new(File::create(&path)?);
    write_report(&mut writer, &rows)?;
    writer.flush()?;

    info!("[Report] wrote {} rows to {}", rows.len(), path.display());
    Ok(path)
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ModelId;
    use crate::store::MemoryLedger;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    fn rec(id: u32, model: Option<u32>, kind: OperationKind, secs: i64) -> OperationRecord {
        OperationRecord {
            box_id: BoxId(id),
            model: model.map(ModelId),
            kind,
            distance: 4,
            timestamp: at(secs),
        }
    }

    #[test]
    fn test_build_report_statuses() {
        let ledger = MemoryLedger::default();
        let entries = vec![
            rec(2, Some(7), OperationKind::Stored, 10),
            rec(1, Some(3), OperationKind::Stored, 0),
            rec(1, Some(3), OperationKind::Retrieved, 20),
            rec(3, Some(999), OperationKind::Stored, 30),
            rec(4, None, OperationKind::Stored, 40),
        ];
        let rows = build_report(&entries, &ledger).unwrap();

        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0].box_id, BoxId(1));
        assert_eq!(rows[0].status(), "retrieved");
        assert_eq!(rows[0].model, "3");
        assert_eq!(rows[1].status(), "stored");
        assert_eq!(rows[1].placed_at, at(10));
        assert_eq!(rows[2].model, "Unknown");
        assert_eq!(rows[3].model, "Unknown");
    }

    #[test]
    fn test_write_report_csv() {
        let rows = vec![ReportRow {
            box_id: BoxId(5),
            model: "big, heavy".to_string(),
            placed_at: Utc.with_ymd_and_hms(2024, 5, 1, 8, 30, 0).unwrap(),
            retrieved: false,
        }];
        let mut out = Vec::new();
        write_report(&mut out, &rows).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[0], REPORT_HEADER);
        assert_eq!(lines[1], "5,\"big, heavy\",2024-05-01 08:30:00,stored");
    }

    #[test]
    fn test_export_report_file_name() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = MemoryLedger::default();
        let entries = vec![rec(1, Some(1), OperationKind::Stored, 0)];
        let path = export_report(dir.path(), &entries, &ledger).unwrap();

        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("asrs_report_"));
        assert!(name.ends_with(".csv"));
        assert_eq!(name.len(), "asrs_report_YYYYMMDD_HHMMSS.csv".len());

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 2);
    }
}
