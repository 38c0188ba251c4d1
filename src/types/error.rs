//! Error types shared across the crate

use thiserror::Error;

use crate::store::StoreError;

/// Result type for logger operations
pub type LoggerResult<T> = Result<T, LoggerError>;

/// Errors surfaced by the engine, the delegate and their collaborators
#[derive(Debug, Error)]
pub enum LoggerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The configured formatter is neither a template nor a function
    #[error("Invalid formatter: {0}")]
    InvalidFormatter(String),

    /// A registered middleware transform rejected the payload
    #[error("Middleware failed: {0}")]
    Middleware(String),

    #[error("Store error: {0}")]
    Backend(#[from] StoreError),

    /// The background router is gone
    #[error("Worker channel closed")]
    ChannelClosed,

    /// A request reached the background router before `init`
    #[error("Worker not initialized")]
    NotInitialized,

    #[error("Worker task failed: {0}")]
    WorkerTask(#[from] tokio::task::JoinError),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),
}

impl LoggerError {
    /// Build a middleware error from any displayable cause
    pub fn middleware(cause: impl std::fmt::Display) -> Self {
        LoggerError::Middleware(cause.to_string())
    }
}
