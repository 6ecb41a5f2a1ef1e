// Error types for the LiftKey core
//
// Input problems (bad floor lists) never reach this type; they degrade to
// defaults at construction time. What remains are the few conditions a caller
// has to branch on, plus storage failures bubbling up from SQLite / serde.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LiftKeyError {
    /// A card was constructed without an identifier
    #[error("card identifier is empty")]
    EmptyIdentifier,

    /// Merge was asked to combine zero cards
    #[error("no cards selected for merge")]
    EmptySelection,

    #[error("card not found: {0}")]
    CardNotFound(String),

    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, LiftKeyError>;
