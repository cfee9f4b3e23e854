//! Resolves a retrieval request to a stored box.

use tracing::debug;

use super::{RetrievalPolicy, RetrievalRequest};
use crate::core::{BoxId, ModelId};
use crate::error::{BhandarError, Result};
use crate::grid::Rack;

/// Chooses which stored box a request refers to.
#[derive(Clone, Copy, Debug, Default)]
pub struct RetrievalSelector;

impl RetrievalSelector {
    pub fn new() -> Self {
        Self
    }

    /// Resolve `request` against the rack.
    ///
    /// LIFO/FIFO that match nothing are [`BhandarError::NoBoxAvailable`]; a
    /// by-id request for an absent box is [`BhandarError::NotFound`].
    pub fn select(&self, rack: &Rack, request: &RetrievalRequest) -> Result<BoxId> {
        let selected = match (request.policy, request.model) {
            (RetrievalPolicy::ById(id), _) => return self.by_id(rack, id),
            (RetrievalPolicy::Lifo, None) => self.lifo(rack),
            (RetrievalPolicy::Fifo, None) => self.fifo(rack),
            (RetrievalPolicy::Lifo, Some(model)) => self.lifo_by_model(rack, model),
            (RetrievalPolicy::Fifo, Some(model)) => self.fifo_by_model(rack, model),
        };
        debug!("[Selector] {} -> {:?}", request, selected);
        selected.ok_or_else(|| BhandarError::NoBoxAvailable(request.to_string()))
    }

    pub fn lifo(&self, rack: &Rack) -> Option<BoxId> {
        rack.order().last().copied()
    }

    pub fn fifo(&self, rack: &Rack) -> Option<BoxId> {
        rack.order().first().copied()
    }

    /// Most recent box of `model`
    pub fn lifo_by_model(&self, rack: &Rack, model: ModelId) -> Option<BoxId> {
        rack.order()
            .iter()
            .rev()
            .copied()
            .find(|&id| Self::is_model(rack, id, model))
    }

    /// Earliest box of `model`
    pub fn fifo_by_model(&self, rack: &Rack, model: ModelId) -> Option<BoxId> {
        rack.order()
            .iter()
            .copied()
            .find(|&id| Self::is_model(rack, id, model))
    }

    pub fn by_id(&self, rack: &Rack, id: BoxId) -> Result<BoxId> {
        if id.0 == 0 {
            return Err(BhandarError::InvalidInput(
                "box id must be a positive integer".to_string(),
            ));
        }
        if rack.contains(id) {
            Ok(id)
        } else {
            Err(BhandarError::NotFound(format!("box {} is not in the rack", id)))
        }
    }

    fn is_model(rack: &Rack, id: BoxId, model: ModelId) -> bool {
        rack.get(id).is_some_and(|b| b.model == Some(model))
    }
}
