//! Error types for Bhandar

use thiserror::Error;

/// Bhandar error type
#[derive(Error, Debug)]
pub enum BhandarError {
    /// Footprint is out of bounds or overlaps a stored box.
    #[error("Invalid placement: {0}")]
    InvalidPlacement(String),

    /// The allocator found no free region for the footprint.
    #[error("No space available for a {length}x{width} box")]
    NoSpaceAvailable {
        /// Footprint length (columns)
        length: u32,
        /// Footprint width (rows)
        width: u32,
    },

    /// Identifier or model is not present.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Malformed identifier, code or dimension.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The retrieval policy resolved to no box.
    #[error("No box available for {0}")]
    NoBoxAvailable(String),

    /// An operation is already in flight.
    #[error("Sequencer busy: {0} in progress")]
    Busy(&'static str),

    /// The planner found no route between two cells.
    #[error("No path from ({from_row},{from_col}) to ({to_row},{to_col})")]
    NoPath {
        /// Start row
        from_row: usize,
        /// Start column
        from_col: usize,
        /// Goal row
        to_row: usize,
        /// Goal column
        to_col: usize,
    },

    /// Internal invariant fault. The in-flight operation is abandoned.
    #[error("Invariant violated: {0}")]
    Invariant(String),

    /// A catalog entry with the same name exists.
    #[error("Already exists: {0}")]
    AlreadyExists(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Snapshot error: {0}")]
    Snapshot(String),
}

impl BhandarError {
    /// Whether this error leaves the engine untouched and may be shown to the user.
    ///
    /// Internal faults and storage failures are not recoverable in this sense.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            BhandarError::InvalidPlacement(_)
                | BhandarError::NoSpaceAvailable { .. }
                | BhandarError::NotFound(_)
                | BhandarError::InvalidInput(_)
                | BhandarError::NoBoxAvailable(_)
                | BhandarError::Busy(_)
                | BhandarError::NoPath { .. }
                | BhandarError::AlreadyExists(_)
        )
    }
}

impl From<toml::de::Error> for BhandarError {
    fn from(e: toml::de::Error) -> Self {
        BhandarError::Config(e.to_string())
    }
}

impl From<serde_json::Error> for BhandarError {
    fn from(e: serde_json::Error) -> Self {
        BhandarError::Snapshot(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, BhandarError>;
