//! Retrieval requests.

use std::fmt;
use std::str::FromStr;

use crate::core::{BoxId, ModelId};
use crate::error::{BhandarError, Result};

/// How to choose the box to retrieve.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RetrievalPolicy {
    /// Most recently stored box
    Lifo,
    /// Earliest stored box
    Fifo,
    /// A specific box
    ById(BoxId),
}

/// Policy kind without its argument, as chosen in a UI or on the command line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum RetrievalMode {
    #[default]
    Lifo,
    Fifo,
    ById,
}

impl RetrievalMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            RetrievalMode::Lifo => "LIFO",
            RetrievalMode::Fifo => "FIFO",
            RetrievalMode::ById => "BY ID",
        }
    }
}

impl FromStr for RetrievalMode {
    type Err = BhandarError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lifo" => Ok(RetrievalMode::Lifo),
            "fifo" => Ok(RetrievalMode::Fifo),
            "by-id" | "by_id" | "by id" | "id" => Ok(RetrievalMode::ById),
            other => Err(BhandarError::InvalidInput(format!(
                "unknown retrieval mode {:?}",
                other
            ))),
        }
    }
}

/// A retrieval request: a policy plus an optional model filter.
///
/// The model filter applies to LIFO and FIFO only; a by-id request names its
/// box directly.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetrievalRequest {
    pub policy: RetrievalPolicy,
    pub model: Option<ModelId>,
}

impl RetrievalRequest {
    pub fn lifo() -> Self {
        Self {
            policy: RetrievalPolicy::Lifo,
            model: None,
        }
    }

    pub fn fifo() -> Self {
        Self {
            policy: RetrievalPolicy::Fifo,
            model: None,
        }
    }

    pub fn by_id(id: BoxId) -> Self {
        Self {
            policy: RetrievalPolicy::ById(id),
            model: None,
        }
    }

    /// By-id request from operator text. Anything but a positive integer is
    /// [`BhandarError::InvalidInput`].
    pub fn by_raw_id(raw: &str) -> Result<Self> {
        Ok(Self::by_id(raw.parse()?))
    }

    /// Build a request from a mode, an optional model filter and, for
    /// [`RetrievalMode::ById`], the raw identifier text.
    pub fn from_parts(mode: RetrievalMode, model: Option<ModelId>, raw_id: Option<&str>) -> Result<Self> {
        let request = match mode {
            RetrievalMode::Lifo => Self::lifo(),
            RetrievalMode::Fifo => Self::fifo(),
            RetrievalMode::ById => {
                let raw = raw_id.ok_or_else(|| {
                    BhandarError::InvalidInput("by-id retrieval needs a box id".to_string())
                })?;
                return Self::by_raw_id(raw);
            }
        };
        Ok(match model {
            Some(m) => request.with_model(m),
            None => request,
        })
    }

    /// Restrict LIFO/FIFO selection to one model
    pub fn with_model(mut self, model: ModelId) -> Self {
        self.model = Some(model);
        self
    }

    pub fn mode(&self) -> RetrievalMode {
        match self.policy {
            RetrievalPolicy::Lifo => RetrievalMode::Lifo,
            RetrievalPolicy::Fifo => RetrievalMode::Fifo,
            RetrievalPolicy::ById(_) => RetrievalMode::ById,
        }
    }
}

impl fmt::Display for RetrievalRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.policy, self.model) {
            (RetrievalPolicy::ById(id), _) => write!(f, "BY ID ({})", id),
            (_, None) => write!(f, "{} (All Models)", self.mode().as_str()),
            (_, Some(model)) => write!(f, "{} ({})", self.mode().as_str(), model),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_parse() {
        assert_eq!("LIFO".parse::<RetrievalMode>().unwrap(), RetrievalMode::Lifo);
        assert_eq!("fifo".parse::<RetrievalMode>().unwrap(), RetrievalMode::Fifo);
        assert_eq!("by-id".parse::<RetrievalMode>().unwrap(), RetrievalMode::ById);
        assert!("random".parse::<RetrievalMode>().is_err());
    }

    #[test]
    fn test_by_raw_id_validation() {
        assert_eq!(
            RetrievalRequest::by_raw_id("5").unwrap().policy,
            RetrievalPolicy::ById(BoxId(5))
        );
        assert!(matches!(
            RetrievalRequest::by_raw_id("five"),
            Err(BhandarError::InvalidInput(_))
        ));
        assert!(matches!(
            RetrievalRequest::by_raw_id("0"),
            Err(BhandarError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_from_parts() {
        let r = RetrievalRequest::from_parts(RetrievalMode::Fifo, Some(ModelId(3)), None).unwrap();
        assert_eq!(r.policy, RetrievalPolicy::Fifo);
        assert_eq!(r.model, Some(ModelId(3)));

        assert!(RetrievalRequest::from_parts(RetrievalMode::ById, None, None).is_err());

        let r = RetrievalRequest::from_parts(RetrievalMode::ById, Some(ModelId(3)), Some("8")).unwrap();
        assert_eq!(r.policy, RetrievalPolicy::ById(BoxId(8)));
        assert_eq!(r.model, None);
    }

    #[test]
    fn test_display() {
        assert_eq!(RetrievalRequest::lifo().to_string(), "LIFO (All Models)");
        assert_eq!(
            RetrievalRequest::fifo().with_model(ModelId(2)).to_string(),
            "FIFO (model 2)"
        );
        assert_eq!(RetrievalRequest::by_id(BoxId(4)).to_string(), "BY ID (#4)");
    }
}
