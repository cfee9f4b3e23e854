//! In-memory ledger.

use tracing::debug;

use super::{
    BoxModel, MaintenanceCounters, MaintenancePolicy, MaintenanceState, MaintenanceStatus,
    ModelCatalog, OperationLog, OperationRecord, cycles_for_distance, default_models, sort_models,
    validate_model,
};
use crate::core::ModelId;
use crate::error::{BhandarError, Result};

/// Ledger held entirely in memory.
#[derive(Clone, Debug)]
pub struct MemoryLedger {
    models: Vec<BoxModel>,
    log: Vec<OperationRecord>,
    maintenance: MaintenanceState,
    policy: MaintenancePolicy,
}

impl MemoryLedger {
    /// Empty catalog
    pub fn new(policy: MaintenancePolicy) -> Self {
        Self {
            models: Vec::new(),
            log: Vec::new(),
            maintenance: MaintenanceState::fresh(&policy, MaintenanceState::today()),
            policy,
        }
    }

    /// Catalog seeded with the default models
    pub fn with_default_models(policy: MaintenancePolicy) -> Self {
        let mut ledger = Self::new(policy);
        for (id, (name, length, width)) in (1u32..).zip(default_models()) {
            ledger.models.push(BoxModel {
                id: ModelId(id),
                name,
                length,
                width,
            });
        }
        ledger
    }
}

impl Default for MemoryLedger {
    fn default() -> Self {
        Self::with_default_models(MaintenancePolicy::default())
    }
}

impl ModelCatalog for MemoryLedger {
    fn list_models(&self) -> Result<Vec<BoxModel>> {
        let mut models = self.models.clone();
        sort_models(&mut models);
        Ok(models)
    }

    fn find_model(&self, id: ModelId) -> Result<Option<BoxModel>> {
        Ok(self.models.iter().find(|m| m.id == id).cloned())
    }

    fn add_model(&mut self, name: &str, length: u32, width: u32) -> Result<ModelId> {
        validate_model(name, length, width)?;
        if self.models.iter().any(|m| m.name == name) {
            return Err(BhandarError::AlreadyExists(format!("model {:?}", name)));
        }
        let id = ModelId(self.models.iter().map(|m| m.id.0).max().unwrap_or(0) + 1);
        self.models.push(BoxModel {
            id,
            name: name.to_string(),
            length,
            width,
        });
        debug!("[MemoryLedger] added {} ({}x{})", id, length, width);
        Ok(id)
    }
}

impl OperationLog for MemoryLedger {
    fn record(&mut self, record: &OperationRecord) -> Result<()> {
        self.log.push(record.clone());
        Ok(())
    }

    fn entries(&self) -> Result<Vec<OperationRecord>> {
        Ok(self.log.clone())
    }

    fn clear_log(&mut self) -> Result<()> {
        self.log.clear();
        Ok(())
    }
}

impl MaintenanceCounters for MemoryLedger {
    fn increment_cycles(&mut self, distance: usize) -> Result<u32> {
        let cycles = cycles_for_distance(distance, self.policy.distance_per_cycle);
        self.maintenance.apply(cycles, MaintenanceState::today());
        Ok(cycles)
    }

    fn current_counters(&self) -> Result<MaintenanceStatus> {
        Ok(self.maintenance.status(MaintenanceState::today()))
    }

    fn reset_all(&mut self) -> Result<()> {
        self.maintenance = MaintenanceState::fresh(&self.policy, MaintenanceState::today());
        Ok(())
    }
}
