use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("File {0} not found")]
    NotFound(String),

    #[error("File {0} already exists")]
    AlreadyExists(String),

    #[error("Unsupported file extension: {0}")]
    InvalidExtension(String),

    #[error("Invalid name: {0}")]
    InvalidName(String),

    #[error("Storage error: {0}")]
    StorageFailure(String),

    #[error("Archive error: {0}")]
    ArchiveFailure(String),

    #[error("Download error: {0}")]
    TransferFailure(String),

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience type alias for Results with AppError
pub type Result<T> = std::result::Result<T, AppError>;
