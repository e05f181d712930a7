//! Error types for the beaker simulation.

use thiserror::Error;

/// Why a pour (or pour gesture) was rejected.
///
/// The `Display` text doubles as the user-facing notification.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PourError {
    #[error("Beaker is full!")]
    CapacityExceeded,

    #[error("Select a chemical first")]
    NoChemicalSelected,

    /// Gesture started outside the interactive region. Never notified.
    #[error("pour gesture outside the interactive region")]
    OutOfBounds,

    #[error("Unknown chemical: {0}")]
    UnknownChemical(String),
}

impl PourError {
    /// Whether the host should surface this rejection to the user.
    pub fn is_user_facing(&self) -> bool {
        !matches!(self, PourError::OutOfBounds)
    }
}

/// Errors raised while building a chemical catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Duplicate chemical id: {0}")]
    DuplicateChemical(String),

    #[error("Duplicate reaction for pair {0} + {1}")]
    DuplicateReaction(String, String),

    #[error("Reaction references unknown chemical: {0}")]
    UnknownChemical(String),
}

pub type CatalogResult<T> = std::result::Result<T, CatalogError>;
