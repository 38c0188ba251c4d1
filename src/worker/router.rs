//! Background message router
//!
//! Owns exactly one `LogEngine`, created by the `init` request, and
//! processes requests one at a time in arrival order: a `downloadLog`
//! sent after a `log` always reflects that log.

use serde_json::json;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::protocol::{ReplyData, WorkerMessage, WorkerReply};
use crate::config::LoggerConfig;
use crate::engine::LogEngine;
use crate::types::{LoggerError, LoggerResult};

/// Channel ends of a running router, held by the delegate side
pub struct WorkerHandle {
    pub requests: mpsc::UnboundedSender<WorkerMessage>,
    pub replies: mpsc::UnboundedReceiver<WorkerReply>,
    pub task: JoinHandle<()>,
}

/// Background endpoint dispatching requests to its engine
pub struct BackgroundRouter {
    engine: Option<LogEngine>,
    replies: mpsc::UnboundedSender<WorkerReply>,
}

impl BackgroundRouter {
    pub fn new(replies: mpsc::UnboundedSender<WorkerReply>) -> Self {
        Self {
            engine: None,
            replies,
        }
    }

    /// Start a router on a Tokio task. Panics outside a Tokio runtime.
    pub fn spawn() -> WorkerHandle {
        let (request_tx, request_rx) = mpsc::unbounded_channel();
        let (reply_tx, reply_rx) = mpsc::unbounded_channel();

        let router = Self::new(reply_tx);
        let task = tokio::spawn(router.run(request_rx));

        WorkerHandle {
            requests: request_tx,
            replies: reply_rx,
            task,
        }
    }

    /// Process requests until every sender is dropped.
    ///
    /// A failing request is logged and does not stop the loop.
    pub async fn run(mut self, mut requests: mpsc::UnboundedReceiver<WorkerMessage>) {
        while let Some(message) = requests.recv().await {
            if let Err(e) = self.dispatch(message).await {
                tracing::error!(error = %e, "log worker error");
            }
        }
        tracing::debug!("log worker stopped");
    }

    /// Handle one request
    pub async fn dispatch(&mut self, message: WorkerMessage) -> LoggerResult<()> {
        match message {
            WorkerMessage::Init(wire) => {
                let config = LoggerConfig::from_wire(wire)?;
                tracing::debug!(store = %config.store.store_name, "initializing log worker");
                self.engine = Some(LogEngine::new(config)?);
                Ok(())
            }
            WorkerMessage::Log(request) => {
                self.engine()?
                    .write(request.data, request.level, &request.label)
                    .await
            }
            WorkerMessage::DownloadLog => {
                let data = match self.engine()?.export_artifact().await {
                    Ok(artifact) => ReplyData::Artifact(artifact),
                    Err(e) => {
                        tracing::error!(error = %e, "log export failed");
                        ReplyData::Other(json!({ "error": e.to_string() }))
                    }
                };
                self.replies
                    .send(WorkerReply::DownloadLog(data))
                    .map_err(|_| LoggerError::ChannelClosed)
            }
            WorkerMessage::Destroy => self.engine()?.destroy().await,
        }
    }

    fn engine(&self) -> LoggerResult<&LogEngine> {
        self.engine.as_ref().ok_or(LoggerError::NotInitialized)
    }
}
