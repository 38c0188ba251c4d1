//! Delegate proxy
//!
//! Same surface as `LogEngine`, but owns no store: requests are sent to a
//! background router and the `downloadLog` reply is turned into a download
//! on this side.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::protocol::{LogRequest, ReplyData, WorkerMessage, WorkerReply};
use super::router::{BackgroundRouter, WorkerHandle};
use crate::config::LoggerConfig;
use crate::download::{DownloadSink, DEFAULT_FILENAME};
use crate::logger::Logger;
use crate::middleware::{MiddlewareFn, MiddlewareId, MiddlewarePipeline};
use crate::types::{LogLevel, LoggerError, LoggerResult};

/// Forwards logging operations to a background engine replica
pub struct DelegateLogger {
    requests: mpsc::UnboundedSender<WorkerMessage>,
    /// Runs on this side before the payload is posted
    middleware: MiddlewarePipeline,
    /// File name used for the next `downloadLog` reply
    filename: Arc<Mutex<String>>,
    worker: JoinHandle<()>,
    receiver: JoinHandle<()>,
}

impl DelegateLogger {
    /// Spawn a background router and attach to it.
    ///
    /// Must be called from within a Tokio runtime: the router and the
    /// reply handler are started with `tokio::spawn`, which panics otherwise.
    pub fn spawn(config: &LoggerConfig, download: Arc<dyn DownloadSink>) -> LoggerResult<Self> {
        Self::attach(config, BackgroundRouter::spawn(), download)
    }

    /// Attach to a running router: post `init` with the closure-free
    /// config and start handling replies.
    ///
    /// Must be called from within a Tokio runtime; the reply handler is
    /// started with `tokio::spawn`.
    pub fn attach(
        config: &LoggerConfig,
        worker: WorkerHandle,
        download: Arc<dyn DownloadSink>,
    ) -> LoggerResult<Self> {
        let WorkerHandle {
            requests,
            replies,
            task,
        } = worker;

        requests
            .send(WorkerMessage::Init(config.to_wire()))
            .map_err(|_| LoggerError::ChannelClosed)?;

        let filename = Arc::new(Mutex::new(DEFAULT_FILENAME.to_string()));
        let receiver = tokio::spawn(handle_replies(replies, Arc::clone(&filename), download));

        Ok(Self {
            requests,
            middleware: MiddlewarePipeline::new(),
            filename,
            worker: task,
            receiver,
        })
    }

    fn post(&self, message: WorkerMessage) -> LoggerResult<()> {
        self.requests
            .send(message)
            .map_err(|_| LoggerError::ChannelClosed)
    }

    /// Run local middleware and post a `log` request
    pub fn write(&self, payload: Value, level: LogLevel, label: &str) -> LoggerResult<()> {
        let data = self.middleware.run(payload)?;
        self.post(WorkerMessage::Log(LogRequest {
            data,
            level,
            label: label.to_string(),
        }))
    }

    pub fn register_middleware(&self, transform: MiddlewareFn) -> MiddlewareId {
        self.middleware.append(transform)
    }

    pub fn remove_middleware(&self, id: MiddlewareId) -> bool {
        self.middleware.remove(id)
    }

    /// Request an export; the download happens when the reply arrives.
    ///
    /// `filename` replaces the remembered name when given.
    pub fn download(&self, filename: Option<&str>) -> LoggerResult<()> {
        if let Some(name) = filename {
            *self.filename.lock() = name.to_string();
        }
        self.post(WorkerMessage::DownloadLog)
    }

    /// Ask the background engine to clear its store
    pub fn destroy(&self) -> LoggerResult<()> {
        self.post(WorkerMessage::Destroy)
    }

    /// Stop accepting requests, let the router drain its queue, and wait
    /// until every pending reply has been handled.
    pub async fn close(self) -> LoggerResult<()> {
        let Self {
            requests,
            worker,
            receiver,
            ..
        } = self;

        drop(requests);
        worker.await?;
        receiver.await?;
        Ok(())
    }
}

/// Reply loop: only an artifact payload triggers a download
async fn handle_replies(
    mut replies: mpsc::UnboundedReceiver<WorkerReply>,
    filename: Arc<Mutex<String>>,
    download: Arc<dyn DownloadSink>,
) {
    while let Some(reply) = replies.recv().await {
        match reply {
            WorkerReply::DownloadLog(ReplyData::Artifact(artifact)) => {
                let name = filename.lock().clone();
                if let Err(e) = download.save(&artifact, &name).await {
                    tracing::error!(filename = %name, error = %e, "log download failed");
                }
            }
            WorkerReply::DownloadLog(ReplyData::Other(data)) => {
                tracing::error!(%data, "downloadLog reply is not an export artifact");
            }
        }
    }
}

#[async_trait]
impl Logger for DelegateLogger {
    async fn write(&self, payload: Value, level: LogLevel, label: &str) -> LoggerResult<()> {
        DelegateLogger::write(self, payload, level, label)
    }

    fn register_middleware(&self, transform: MiddlewareFn) -> MiddlewareId {
        DelegateLogger::register_middleware(self, transform)
    }

    fn remove_middleware(&self, id: MiddlewareId) -> bool {
        DelegateLogger::remove_middleware(self, id)
    }

    async fn download(&self, filename: &str) -> LoggerResult<()> {
        DelegateLogger::download(self, Some(filename))
    }

    async fn destroy(&self) -> LoggerResult<()> {
        DelegateLogger::destroy(self)
    }
}
