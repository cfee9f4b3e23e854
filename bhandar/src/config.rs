//! Configuration loading for Bhandar

use crate::core::GridCell;
use crate::error::{BhandarError, Result};
use crate::store::MaintenancePolicy;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

/// Main configuration structure
#[derive(Clone, Debug, Default, Deserialize)]
pub struct BhandarConfig {
    #[serde(default)]
    pub rack: RackConfig,
    #[serde(default)]
    pub sequencer: SequencerConfig,
    #[serde(default)]
    pub maintenance: MaintenanceConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Rack geometry
#[derive(Clone, Debug, Deserialize)]
pub struct RackConfig {
    /// Grid rows (default: 20)
    #[serde(default = "default_rows")]
    pub rows: usize,

    /// Grid columns (default: 20)
    #[serde(default = "default_cols")]
    pub cols: usize,

    /// Origin row (default: bottom row)
    #[serde(default)]
    pub origin_row: Option<usize>,

    /// Origin column (default: 0)
    #[serde(default)]
    pub origin_col: usize,
}

/// Scheduler settings
#[derive(Clone, Debug, Deserialize)]
pub struct SequencerConfig {
    /// Delay between ticks in milliseconds (default: 150)
    #[serde(default = "default_tick_interval")]
    pub tick_interval_ms: u64,
}

/// Maintenance accounting
#[derive(Clone, Debug, Deserialize)]
pub struct MaintenanceConfig {
    /// Grid steps per counted cycle (default: 10)
    #[serde(default = "default_distance_per_cycle")]
    pub distance_per_cycle: u32,

    /// Cycles between maintenance checks (default: 1000)
    #[serde(default = "default_cycles_per_check")]
    pub cycles_per_check: u32,
}

/// File locations
#[derive(Clone, Debug, Deserialize)]
pub struct StorageConfig {
    /// Rack snapshot (JSON)
    #[serde(default = "default_snapshot_path")]
    pub snapshot_path: PathBuf,

    /// Catalog, log and counters (SQLite)
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,

    /// Directory for CSV reports
    #[serde(default = "default_report_dir")]
    pub report_dir: PathBuf,
}

impl Default for RackConfig {
    fn default() -> Self {
        Self {
            rows: default_rows(),
            cols: default_cols(),
            origin_row: None,
            origin_col: 0,
        }
    }
}

impl Default for SequencerConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval(),
        }
    }
}

impl Default for MaintenanceConfig {
    fn default() -> Self {
        Self {
            distance_per_cycle: default_distance_per_cycle(),
            cycles_per_check: default_cycles_per_check(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            snapshot_path: default_snapshot_path(),
            database_path: default_database_path(),
            report_dir: default_report_dir(),
        }
    }
}

// Default value functions
fn default_rows() -> usize {
    20
}
fn default_cols() -> usize {
    20
}
fn default_tick_interval() -> u64 {
    150
}
fn default_distance_per_cycle() -> u32 {
    10
}
fn default_cycles_per_check() -> u32 {
    1000
}
fn default_snapshot_path() -> PathBuf {
    PathBuf::from("asrs_state.json")
}
fn default_database_path() -> PathBuf {
    PathBuf::from("asrs_system.db")
}
fn default_report_dir() -> PathBuf {
    PathBuf::from(".")
}

impl RackConfig {
    /// Origin cell; bottom-left unless configured
    pub fn origin(&self) -> GridCell {
        GridCell::new(
            self.origin_row.unwrap_or(self.rows.saturating_sub(1)),
            self.origin_col,
        )
    }
}

impl SequencerConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}

impl MaintenanceConfig {
    pub fn policy(&self) -> MaintenancePolicy {
        MaintenancePolicy {
            distance_per_cycle: self.distance_per_cycle,
            cycles_per_check: self.cycles_per_check,
        }
    }
}

impl BhandarConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| BhandarError::Config(format!("Failed to read config file: {}", e)))?;
        let config: BhandarConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path`, or use defaults if the file does not exist
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            info!("Config {} not found, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Check values the engine cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.rack.rows == 0 || self.rack.cols == 0 {
            return Err(BhandarError::Config(format!(
                "rack must have at least one cell, got {}x{}",
                self.rack.rows, self.rack.cols
            )));
        }
        let origin = self.rack.origin();
        if !origin.in_bounds(self.rack.rows, self.rack.cols) {
            return Err(BhandarError::Config(format!(
                "origin {} is outside the {}x{} rack",
                origin, self.rack.rows, self.rack.cols
            )));
        }
        if self.maintenance.distance_per_cycle == 0 {
            return Err(BhandarError::Config(
                "distance_per_cycle must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = BhandarConfig::default();
        assert_eq!(config.rack.rows, 20);
        assert_eq!(config.rack.origin(), GridCell::new(19, 0));
        assert_eq!(config.sequencer.tick_interval(), Duration::from_millis(150));
        assert_eq!(config.maintenance.policy(), MaintenancePolicy::default());
        assert_eq!(config.storage.database_path, PathBuf::from("asrs_system.db"));
        config.validate().unwrap();
    }

    #[test]
    fn test_partial_toml() {
        let config: BhandarConfig = toml::from_str(
            r#"
            [rack]
            rows = 3
            cols = 4

            [storage]
            report_dir = "reports"
            "#,
        )
        .unwrap();
        assert_eq!(config.rack.origin(), GridCell::new(2, 0));
        assert_eq!(config.storage.report_dir, PathBuf::from("reports"));
        assert_eq!(config.storage.snapshot_path, PathBuf::from("asrs_state.json"));
        assert_eq!(config.maintenance.cycles_per_check, 1000);
    }

    #[test]
    fn test_validate_rejects_bad_origin() {
        let mut config = BhandarConfig::default();
        config.rack.origin_col = 20;
        assert!(matches!(config.validate(), Err(BhandarError::Config(_))));

        let mut config = BhandarConfig::default();
        config.maintenance.distance_per_cycle = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_or_default() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.toml");
        assert_eq!(BhandarConfig::load_or_default(&missing).unwrap().rack.cols, 20);

        let path = dir.path().join("bhandar.toml");
        std::fs::write(&path, "[rack]\nrows = 0\n").unwrap();
        assert!(matches!(
            BhandarConfig::load_or_default(&path),
            Err(BhandarError::Config(_))
        ));

        std::fs::write(&path, "[rack\n").unwrap();
        assert!(matches!(BhandarConfig::load(&path), Err(BhandarError::Config(_))));
    }
}
