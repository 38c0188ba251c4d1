//! Logger surface shared by both execution modes
//!
//! `LogEngine` runs the pipeline in-context; `DelegateLogger` forwards the
//! same calls to an engine owned by a background router. Callers that do
//! not care which one they hold use `Arc<dyn Logger>`.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::config::LoggerConfig;
use crate::download::DownloadSink;
use crate::engine::LogEngine;
use crate::middleware::{MiddlewareFn, MiddlewareId};
use crate::types::{LogLevel, LoggerResult};
use crate::worker::DelegateLogger;

/// Write/export/destroy surface of a logging engine
#[async_trait]
pub trait Logger: Send + Sync {
    /// Persist `payload` at `level` under `label`
    async fn write(&self, payload: Value, level: LogLevel, label: &str) -> LoggerResult<()>;

    /// Register a transform for future writes (last-registered runs first)
    fn register_middleware(&self, transform: MiddlewareFn) -> MiddlewareId;

    fn remove_middleware(&self, id: MiddlewareId) -> bool;

    /// Export the store and hand it to the download collaborator
    async fn download(&self, filename: &str) -> LoggerResult<()>;

    /// Clear the store
    async fn destroy(&self) -> LoggerResult<()>;

    async fn info(&self, data: Value, tag: &str) -> LoggerResult<()> {
        self.write(data, LogLevel::Info, tag).await
    }

    async fn error(&self, data: Value, tag: &str) -> LoggerResult<()> {
        self.write(data, LogLevel::Error, tag).await
    }

    async fn trace(&self, data: Value, tag: &str) -> LoggerResult<()> {
        self.write(data, LogLevel::Trace, tag).await
    }

    async fn fatal(&self, data: Value, tag: &str) -> LoggerResult<()> {
        self.write(data, LogLevel::Fatal, tag).await
    }

    async fn debug(&self, data: Value, tag: &str) -> LoggerResult<()> {
        self.write(data, LogLevel::Debug, tag).await
    }

    async fn warn(&self, data: Value, tag: &str) -> LoggerResult<()> {
        self.write(data, LogLevel::Warn, tag).await
    }
}

#[async_trait]
impl Logger for LogEngine {
    async fn write(&self, payload: Value, level: LogLevel, label: &str) -> LoggerResult<()> {
        LogEngine::write(self, payload, level, label).await
    }

    fn register_middleware(&self, transform: MiddlewareFn) -> MiddlewareId {
        LogEngine::register_middleware(self, transform)
    }

    fn remove_middleware(&self, id: MiddlewareId) -> bool {
        LogEngine::remove_middleware(self, id)
    }

    async fn download(&self, filename: &str) -> LoggerResult<()> {
        self.trigger_download(filename).await
    }

    async fn destroy(&self) -> LoggerResult<()> {
        LogEngine::destroy(self).await
    }
}

/// Where the pipeline executes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecutionMode {
    /// Engine runs in the calling context
    #[default]
    InContext,
    /// Engine runs in a background task behind a `DelegateLogger`
    Background,
}

/// Build a logger for `mode`.
///
/// `Background` spawns the router with `tokio::spawn` and must be called
/// from within a Tokio runtime.
pub fn create_logger(
    config: LoggerConfig,
    mode: ExecutionMode,
    download: Arc<dyn DownloadSink>,
) -> LoggerResult<Arc<dyn Logger>> {
    match mode {
        ExecutionMode::InContext => Ok(Arc::new(LogEngine::with_sink(config, download)?)),
        ExecutionMode::Background => Ok(Arc::new(DelegateLogger::spawn(&config, download)?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::KeyPolicy;
    use crate::download::MemoryDownload;
    use serde_json::json;

    #[tokio::test]
    async fn test_shorthands_set_level() {
        let sink = Arc::new(MemoryDownload::new());
        let engine = LogEngine::with_sink(LoggerConfig::new().with_key(KeyPolicy::Number), sink).unwrap();
        let logger: &dyn Logger = &engine;

        logger.trace(json!("t"), "LOG").await.unwrap();
        logger.debug(json!("d"), "LOG").await.unwrap();
        logger.info(json!("i"), "LOG").await.unwrap();
        logger.warn(json!("w"), "LOG").await.unwrap();
        logger.error(json!("e"), "LOG").await.unwrap();
        logger.fatal(json!("f"), "LOG").await.unwrap();

        let mut levels = Vec::new();
        engine
            .store()
            .iterate_all(|record, _, _| levels.push(record.level.code()))
            .unwrap();
        assert_eq!(levels, vec!['T', 'D', 'I', 'W', 'E', 'F']);
    }

    #[tokio::test]
    async fn test_create_in_context_logger() {
        let sink = Arc::new(MemoryDownload::new());
        let logger = create_logger(LoggerConfig::new(), ExecutionMode::InContext, sink.clone()).unwrap();

        logger.info(json!("hello"), "LOG").await.unwrap();
        logger.download("app.log").await.unwrap();

        assert_eq!(sink.count(), 1);
        assert!(sink.saved()[0].1.text().contains("[I] 0 [LOG] - hello"));
    }
}
