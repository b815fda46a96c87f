// Error types for the deck + matchup core
//
// Lookups that miss are NOT errors here: remove/update/rename/set-quantity
// report a missing card with `false`, `get` with `None`.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TrackerError {
    /// Input rejected before any state was touched
    #[error("{0}")]
    InvalidInput(String),
}

impl TrackerError {
    pub fn invalid(message: impl Into<String>) -> Self {
        TrackerError::InvalidInput(message.into())
    }
}

pub type TrackerResult<T> = std::result::Result<T, TrackerError>;
