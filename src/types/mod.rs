//! Data types for the logging engine
//!
//! This module contains the record model, the export artifact and the
//! crate-wide error type.

mod artifact;
mod error;
mod record;

pub use artifact::{ExportArtifact, TEXT_CONTENT_TYPE};
pub use error::{LoggerError, LoggerResult};
pub use record::{LogLevel, LogRecord, DEFAULT_LABEL};
