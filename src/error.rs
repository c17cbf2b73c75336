use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum FretpadError {
    #[error("User not found: {0}")]
    UserNotFound(Uuid),

    #[error("Cannot delete the last remaining profile")]
    LastProfile,

    #[error("Invalid import format: {0}")]
    InvalidFormat(String),

    #[error("Unknown note: {0}")]
    UnknownNote(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Store error: {0}")]
    Store(String),
}

pub type Result<T> = std::result::Result<T, FretpadError>;
