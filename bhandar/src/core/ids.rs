//! Identifiers for boxes and catalog models.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::BhandarError;

/// Identifier of a stored box.
///
/// Assigned by the rack at placement time, starting at 1 and never reused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BoxId(pub u32);

/// Identifier of a box model in the catalog.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModelId(pub u32);

fn parse_positive(kind: &str, s: &str) -> Result<u32, BhandarError> {
    let trimmed = s.trim();
    match trimmed.parse::<u32>() {
        Ok(0) | Err(_) => Err(BhandarError::InvalidInput(format!(
            "{} must be a positive integer, got {:?}",
            kind, s
        ))),
        Ok(v) => Ok(v),
    }
}

impl FromStr for BoxId {
    type Err = BhandarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_positive("box id", s).map(BoxId)
    }
}

impl FromStr for ModelId {
    type Err = BhandarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_positive("model id", s).map(ModelId)
    }
}

impl fmt::Display for BoxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "model {}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_box_id() {
        assert_eq!("7".parse::<BoxId>().unwrap(), BoxId(7));
        assert_eq!(" 12 ".parse::<BoxId>().unwrap(), BoxId(12));
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for bad in ["", "0", "-3", "abc", "1.5"] {
            assert!(
                matches!(bad.parse::<BoxId>(), Err(BhandarError::InvalidInput(_))),
                "{:?} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_serde_transparent() {
        let json = serde_json::to_string(&BoxId(4)).unwrap();
        assert_eq!(json, "4");
        let id: ModelId = serde_json::from_str("9").unwrap();
        assert_eq!(id, ModelId(9));
    }
}
