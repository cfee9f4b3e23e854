//! SQLite-backed ledger.

use std::path::Path;

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, Row, params};
use tracing::{debug, info};

use super::{
    BoxModel, MaintenanceCounters, MaintenancePolicy, MaintenanceState, MaintenanceStatus,
    ModelCatalog, OperationKind, OperationLog, OperationRecord, cycles_for_distance,
    default_models, sort_models, validate_model,
};
use crate::core::{BoxId, ModelId};
use crate::error::{BhandarError, Result};

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS box_models (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        model_name TEXT UNIQUE NOT NULL,
        length INTEGER NOT NULL,
        width INTEGER NOT NULL
    );
    CREATE TABLE IF NOT EXISTS operations_log (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        box_id INTEGER NOT NULL,
        model_id INTEGER,
        operation TEXT NOT NULL,
        distance_traveled INTEGER NOT NULL,
        operation_date TEXT NOT NULL
    );
    CREATE TABLE IF NOT EXISTS maintenance_info (
        id INTEGER PRIMARY KEY CHECK (id = 1),
        cycles_today INTEGER NOT NULL,
        cycles_total INTEGER NOT NULL,
        cycles_till_check INTEGER NOT NULL,
        cycles_date TEXT NOT NULL
    );
";

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Ledger stored in a SQLite database.
pub struct SqliteLedger {
    conn: Connection,
    policy: MaintenancePolicy,
}

impl SqliteLedger {
    /// Open (creating if needed) the database at `path`.
    pub fn open(path: &Path, policy: MaintenancePolicy) -> Result<Self> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        conn.busy_timeout(std::time::Duration::from_secs(5))?;
        let ledger = Self::init(conn, policy)?;
        info!("[SqliteLedger] opened {}", path.display());
        Ok(ledger)
    }

    pub fn open_in_memory(policy: MaintenancePolicy) -> Result<Self> {
        Self::init(Connection::open_in_memory()?, policy)
    }

    fn init(conn: Connection, policy: MaintenancePolicy) -> Result<Self> {
        conn.execute_batch(SCHEMA)?;

        let fresh = MaintenanceState::fresh(&policy, MaintenanceState::today());
        conn.execute(
            "INSERT OR IGNORE INTO maintenance_info
                 (id, cycles_today, cycles_total, cycles_till_check, cycles_date)
             VALUES (1, 0, 0, ?1, ?2)",
            params![
                fresh.cycles_until_check,
                fresh.day.format(DATE_FORMAT).to_string()
            ],
        )?;

        let mut ledger = Self { conn, policy };
        ledger.seed_default_models()?;
        Ok(ledger)
    }

    fn seed_default_models(&mut self) -> Result<()> {
        let tx = self.conn.transaction()?;
        let mut added = 0usize;
        {
            let mut stmt = tx.prepare(
                "INSERT OR IGNORE INTO box_models (model_name, length, width) VALUES (?1, ?2, ?3)",
            )?;
            for (name, length, width) in default_models() {
                added += stmt.execute(params![name, length, width])?;
            }
        }
        tx.commit()?;
        if added > 0 {
            debug!("[SqliteLedger] seeded {} default models", added);
        }
        Ok(())
    }

    fn load_maintenance(&self) -> Result<MaintenanceState> {
        let state = self.conn.query_row(
            "SELECT cycles_today, cycles_total, cycles_till_check, cycles_date
             FROM maintenance_info WHERE id = 1",
            [],
            |row| {
                let date: String = row.get(3)?;
                let day = NaiveDate::parse_from_str(&date, DATE_FORMAT)
                    .map_err(|e| rusqlite::Error::FromSqlConversionFailure(3, Type::Text, Box::new(e)))?;
                Ok(MaintenanceState {
                    cycles_today: row.get(0)?,
                    cycles_total: row.get::<_, i64>(1)?.max(0) as u64,
                    cycles_until_check: row.get(2)?,
                    day,
                })
            },
        )?;
        Ok(state)
    }

    fn store_maintenance(&self, state: &MaintenanceState) -> Result<()> {
        let total = i64::try_from(state.cycles_total).unwrap_or(i64::MAX);
        self.conn.execute(
            "UPDATE maintenance_info
             SET cycles_today = ?1, cycles_total = ?2, cycles_till_check = ?3, cycles_date = ?4
             WHERE id = 1",
            params![
                state.cycles_today,
                total,
                state.cycles_until_check,
                state.day.format(DATE_FORMAT).to_string()
            ],
        )?;
        Ok(())
    }
}

fn model_from_row(row: &Row<'_>) -> rusqlite::Result<BoxModel> {
    Ok(BoxModel {
        id: ModelId(row.get(0)?),
        name: row.get(1)?,
        length: row.get(2)?,
        width: row.get(3)?,
    })
}

fn record_from_row(row: &Row<'_>) -> rusqlite::Result<OperationRecord> {
    let kind: String = row.get(2)?;
    let kind = kind
        .parse::<OperationKind>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(2, Type::Text, Box::new(e)))?;
    let distance: i64 = row.get(3)?;
    let stamp: String = row.get(4)?;
    let timestamp = DateTime::parse_from_rfc3339(&stamp)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(4, Type::Text, Box::new(e)))?
        .with_timezone(&Utc);
    Ok(OperationRecord {
        box_id: BoxId(row.get(0)?),
        model: row.get::<_, Option<u32>>(1)?.map(ModelId),
        kind,
        distance: usize::try_from(distance).unwrap_or(0),
        timestamp,
    })
}

impl ModelCatalog for SqliteLedger {
    fn list_models(&self) -> Result<Vec<BoxModel>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, model_name, length, width FROM box_models")?;
        let mut models = stmt
            .query_map([], model_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        sort_models(&mut models);
        Ok(models)
    }

    fn find_model(&self, id: ModelId) -> Result<Option<BoxModel>> {
        let model = self
            .conn
            .query_row(
                "SELECT id, model_name, length, width FROM box_models WHERE id = ?1",
                params![id.0],
                model_from_row,
            )
            .optional()?;
        Ok(model)
    }

    fn add_model(&mut self, name: &str, length: u32, width: u32) -> Result<ModelId> {
        validate_model(name, length, width)?;
        let exists = self
            .conn
            .query_row(
                "SELECT 1 FROM box_models WHERE model_name = ?1",
                params![name],
                |_| Ok(()),
            )
            .optional()?
            .is_some();
        if exists {
            return Err(BhandarError::AlreadyExists(format!("model {:?}", name)));
        }

        self.conn.execute(
            "INSERT INTO box_models (model_name, length, width) VALUES (?1, ?2, ?3)",
            params![name, length, width],
        )?;
        let id = u32::try_from(self.conn.last_insert_rowid())
            .map_err(|_| BhandarError::Invariant("model id out of range".to_string()))?;
        info!("[SqliteLedger] added model {:?} ({}x{})", name, length, width);
        Ok(ModelId(id))
    }
}

impl OperationLog for SqliteLedger {
    fn record(&mut self, record: &OperationRecord) -> Result<()> {
        let distance = i64::try_from(record.distance).unwrap_or(i64::MAX);
        self.conn.execute(
            "INSERT INTO operations_log (box_id, model_id, operation, distance_traveled, operation_date)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                record.box_id.0,
                record.model.map(|m| m.0),
                record.kind.as_str(),
                distance,
                record.timestamp.to_rfc3339()
            ],
        )?;
        Ok(())
    }

    fn entries(&self) -> Result<Vec<OperationRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT box_id, model_id, operation, distance_traveled, operation_date
             FROM operations_log ORDER BY id",
        )?;
        let records = stmt
            .query_map([], record_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(records)
    }

    fn clear_log(&mut self) -> Result<()> {
        self.conn.execute("DELETE FROM operations_log", [])?;
        Ok(())
    }
}

impl MaintenanceCounters for SqliteLedger {
    fn increment_cycles(&mut self, distance: usize) -> Result<u32> {
        let cycles = cycles_for_distance(distance, self.policy.distance_per_cycle);
        let mut state = self.load_maintenance()?;
        state.apply(cycles, MaintenanceState::today());
        self.store_maintenance(&state)?;
        Ok(cycles)
    }

    fn current_counters(&self) -> Result<MaintenanceStatus> {
        Ok(self.load_maintenance()?.status(MaintenanceState::today()))
    }

    fn reset_all(&mut self) -> Result<()> {
        let fresh = MaintenanceState::fresh(&self.policy, MaintenanceState::today());
        self.store_maintenance(&fresh)
    }
}
