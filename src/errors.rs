use thiserror::Error;
use uuid::Uuid;

pub type Result<T> = std::result::Result<T, FinanceError>;

/// Error type that captures common ledger failures.
#[derive(Debug, Error)]
pub enum FinanceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: Uuid },
    #[error("Unsupported schema version {0}")]
    UnsupportedSchema(u32),
    #[error("Persistence error: {0}")]
    Persistence(String),
    #[error("Configuration error: {0}")]
    Config(String),
}

impl FinanceError {
    pub fn not_found(entity: &'static str, id: Uuid) -> Self {
        FinanceError::NotFound { entity, id }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        FinanceError::Validation(message.into())
    }
}
