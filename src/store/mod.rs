//! Persistent log store
//!
//! - `StoreBackend`: embedded key/value backend abstraction
//! - `MemoryBackend`: volatile backend, used when no data directory is set
//! - `FileBackend`: append-only JSONL file replayed on open
//! - `LogStore`: capped, expiring store of `LogRecord`s over a backend
//!
//! ```text
//! open ──► expiry check ──► ready
//!            │ latest entry older than `expire` hours
//!            └──► clear
//!
//! set_item ──► backend.set ──► evict oldest while len > maxSize
//! ```

mod backend;
mod file;
mod log_store;

use thiserror::Error;

pub use backend::{MemoryBackend, StoreBackend};
pub use file::FileBackend;
pub use log_store::LogStore;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors raised by store backends
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}
