//! logdb - client-side logging engine
//!
//! Captures structured log events, transforms and redacts them, keeps
//! them in a capped, expiring local store, and exports the history as
//! formatted text. The pipeline runs either in the calling context
//! (`LogEngine`) or in a background task behind a message-passing proxy
//! (`DelegateLogger`), with the same transformation order, redaction and
//! export format in both modes.
//!
//! # Modules
//!
//! - `types`: Log record model, export artifact, errors
//! - `config`: Logger and store configuration
//! - `middleware`: Ordered payload transforms (last-registered first)
//! - `redact`: Sensitive field masking
//! - `store`: Capped, expiring store over memory or file backends
//! - `engine`: In-context write and export pipeline
//! - `worker`: Delegate proxy, background router, wire protocol
//! - `logger`: `Logger` trait shared by both modes, `create_logger`
//! - `download`: Export "save as file" collaborators
//! - `console`: Level-routed console printer
//! - `utils`: Timestamps, atomic file writes
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use logdb::{FileDownload, LogEngine, LogLevel, LoggerConfig, StoreOptions};
//! use serde_json::json;
//!
//! # async fn run() -> logdb::LoggerResult<()> {
//! let config = LoggerConfig::new().with_store(StoreOptions::with_data_dir("logs"));
//! let engine = LogEngine::with_sink(config, Arc::new(FileDownload::new("exports")))?;
//!
//! engine.write(json!({"url": "/login?token=abcdefghijklmnop"}), LogLevel::Info, "REQ").await?;
//! engine.trigger_download("app.log").await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod console;
pub mod download;
pub mod engine;
pub mod logger;
pub mod middleware;
pub mod redact;
pub mod store;
pub mod types;
pub mod utils;
pub mod worker;

// Re-export commonly used items at crate root
pub use config::{FieldFilter, FilterWords, Formatter, KeyPolicy, LoggerConfig, StoreOptions, WireConfig};
pub use download::{DownloadSink, FileDownload, MemoryDownload};
pub use engine::LogEngine;
pub use logger::{create_logger, ExecutionMode, Logger};
pub use middleware::{MiddlewareFn, MiddlewareId, MiddlewarePipeline};
pub use store::{LogStore, StoreBackend, StoreError};
pub use types::{ExportArtifact, LogLevel, LogRecord, LoggerError, LoggerResult};
pub use worker::{BackgroundRouter, DelegateLogger};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
