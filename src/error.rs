use thiserror::Error;

pub type Result<T> = std::result::Result<T, KanbanError>;

#[derive(Debug, Error)]
pub enum KanbanError {
    #[error("Card not found: {0}")]
    CardNotFound(String),

    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    #[error("Card {card} not found in column {column}")]
    CardNotInColumn { card: String, column: String },

    #[error("Board ownership violated: {0}")]
    OwnershipViolation(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Storage not initialized. Call initialize() first.")]
    StorageNotInitialized,

    #[error("{0}")]
    Other(String),
}

#[cfg(feature = "sqlite-storage")]
impl From<rusqlite::Error> for KanbanError {
    fn from(err: rusqlite::Error) -> Self {
        Self::StorageError(err.to_string())
    }
}
