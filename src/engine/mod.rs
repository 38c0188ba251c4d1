//! Logging Engine - in-context pipeline
//!
//! ```text
//! write:  payload ─► middleware (last-registered first, stringify last)
//!                 ─► redactor ─► stamp LogRecord ─► storage key ─► store
//!
//! export: store.iterate_all ─► formatter ─► newest-first text ─► artifact
//! ```

mod format;

use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::Value;

use crate::config::{Formatter, KeyPolicy, LoggerConfig};
use crate::download::{DownloadSink, FileDownload};
use crate::middleware::{self, MiddlewareFn, MiddlewareId, MiddlewarePipeline};
use crate::redact::Redactor;
use crate::store::LogStore;
use crate::types::{ExportArtifact, LogLevel, LogRecord, LoggerError, LoggerResult};
use crate::utils::time::now_timestamp;

pub use format::render_template;

/// Engine running the write pipeline and export against its own store
pub struct LogEngine {
    config: LoggerConfig,
    store: LogStore,
    middleware: MiddlewarePipeline,
    /// `None` when filtering is disabled or no field is configured
    redactor: Option<Redactor>,
    /// Next `number` key; seeded from the stored keys on first use
    next_number: Mutex<Option<u64>>,
    download: Arc<dyn DownloadSink>,
}

impl LogEngine {
    /// Open the configured store; downloads are saved to the working directory
    pub fn new(config: LoggerConfig) -> LoggerResult<Self> {
        Self::with_sink(config, Arc::new(FileDownload::current_dir()))
    }

    /// Open the configured store with a custom download collaborator
    pub fn with_sink(config: LoggerConfig, download: Arc<dyn DownloadSink>) -> LoggerResult<Self> {
        let store = LogStore::open(config.store.clone())?;
        Ok(Self::with_store(config, store, download))
    }

    /// Build an engine over an already opened store
    pub fn with_store(config: LoggerConfig, store: LogStore, download: Arc<dyn DownloadSink>) -> Self {
        let redactor = if config.enable_filter_sensitive_data {
            Redactor::new(&config.filter_sensitive_data)
        } else {
            None
        };

        Self {
            middleware: MiddlewarePipeline::with_transforms(vec![middleware::stringify()]),
            redactor,
            next_number: Mutex::new(None),
            config,
            store,
            download,
        }
    }

    pub fn config(&self) -> &LoggerConfig {
        &self.config
    }

    pub fn store(&self) -> &LogStore {
        &self.store
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enable
    }

    /// Register a transform for future writes; it runs before every
    /// transform registered earlier.
    pub fn register_middleware(&self, transform: MiddlewareFn) -> MiddlewareId {
        self.middleware.append(transform)
    }

    pub fn remove_middleware(&self, id: MiddlewareId) -> bool {
        self.middleware.remove(id)
    }

    /// Run the pipeline and persist the resulting record.
    ///
    /// No-op when disabled. A failing transform aborts the write before
    /// anything is stored.
    pub async fn write(&self, payload: Value, level: LogLevel, label: &str) -> LoggerResult<()> {
        if !self.config.enable {
            return Ok(());
        }

        let record = self.prepare(payload, level, label)?;
        let key = self.storage_key(&record)?;
        self.store.set_item(&key, &record);
        Ok(())
    }

    /// Transform, redact and stamp a payload
    fn prepare(&self, payload: Value, level: LogLevel, label: &str) -> LoggerResult<LogRecord> {
        let message = match (self.middleware.run(payload)?, &self.redactor) {
            (Value::String(text), Some(redactor)) => Value::String(redactor.redact(&text)),
            (message, _) => message,
        };
        Ok(LogRecord::new(now_timestamp(), level, label, message))
    }

    fn storage_key(&self, record: &LogRecord) -> LoggerResult<String> {
        match &self.config.key {
            KeyPolicy::Date => Ok(record.timestamp.clone()),
            KeyPolicy::Custom(key_fn) => Ok(key_fn(record)),
            KeyPolicy::Number => {
                let mut next = self.next_number.lock();
                let key = match *next {
                    Some(n) => n,
                    None => self.seed_number()?,
                };
                *next = Some(key + 1);
                Ok(key.to_string())
            }
        }
    }

    /// First `number` key for this engine: one past the largest numeric key
    /// already stored, or the store length when none is numeric. After
    /// eviction the length is below the largest live key.
    fn seed_number(&self) -> LoggerResult<u64> {
        match self.store.max_numeric_key()? {
            Some(max) => Ok(max + 1),
            None => Ok(self.store.length()? as u64),
        }
    }

    /// Render the whole store with the configured formatter.
    ///
    /// Template lines are prepended, so the newest record comes first.
    /// Returns an empty string when disabled.
    pub async fn to_export_string(&self) -> LoggerResult<String> {
        if !self.config.enable {
            return Ok(String::new());
        }

        let mut result = String::new();
        match &self.config.formatter {
            Formatter::Invalid(value) => {
                return Err(LoggerError::InvalidFormatter(value.to_string()));
            }
            Formatter::Template(template) => {
                self.store.iterate_all(|record, _, index| {
                    result.insert_str(0, &render_template(template, record, index));
                })?;
            }
            Formatter::Function(format_fn) => {
                self.store.iterate_all(|record, _, index| {
                    result = format_fn(record, index, &result);
                })?;
            }
        }
        Ok(result)
    }

    /// Export string wrapped as a downloadable artifact
    pub async fn export_artifact(&self) -> LoggerResult<ExportArtifact> {
        Ok(ExportArtifact::from_text(self.to_export_string().await?))
    }

    /// Hand the export artifact to the download collaborator. No-op when disabled.
    pub async fn trigger_download(&self, filename: &str) -> LoggerResult<()> {
        if !self.config.enable {
            return Ok(());
        }
        let artifact = self.export_artifact().await?;
        self.download.save(&artifact, filename).await
    }

    /// Clear the store
    pub async fn destroy(&self) -> LoggerResult<()> {
        let mut next = self.next_number.lock();
        self.store.clear()?;
        *next = None;
        Ok(())
    }
}
