// Error types for the savings tracker
//
// Storage failures and rejected user input are kept apart: the UI offers a
// retry for the first and a correction prompt for the second.

use crate::validation::ValidationError;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T, E = TrackerError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum TrackerError {
    /// SQLite read or write failed (disk full, locked, corrupt row).
    #[error("Persistence failed: {0}")]
    Persistence(#[from] rusqlite::Error),

    /// The directory that should hold the database could not be created.
    #[error("Cannot prepare storage at {}: {source}", path.display())]
    Storage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// User input rejected before an entry was built.
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl TrackerError {
    /// True for failures of the storage layer (worth retrying).
    pub fn is_persistence(&self) -> bool {
        matches!(self, TrackerError::Persistence(_) | TrackerError::Storage { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        let persistence = TrackerError::from(rusqlite::Error::InvalidQuery);
        let validation = TrackerError::from(ValidationError::Empty);

        assert!(persistence.is_persistence());
        assert!(!validation.is_persistence());
    }

    #[test]
    fn test_validation_message_passes_through() {
        let err = TrackerError::from(ValidationError::Negative("-5".to_string()));
        assert_eq!(err.to_string(), ValidationError::Negative("-5".to_string()).to_string());
    }
}
