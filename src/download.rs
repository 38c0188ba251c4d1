//! Download collaborators
//!
//! An export artifact is handed to a `DownloadSink` together with a
//! caller-chosen file name. `FileDownload` saves it into a directory;
//! `MemoryDownload` keeps it for inspection.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::Notify;

use crate::types::{ExportArtifact, LoggerError, LoggerResult};
use crate::utils::atomic::atomic_write;

/// File name used when the caller does not pick one
pub const DEFAULT_FILENAME: &str = "app.log";

/// "Save as file" collaborator
#[async_trait]
pub trait DownloadSink: Send + Sync {
    async fn save(&self, artifact: &ExportArtifact, filename: &str) -> LoggerResult<()>;
}

/// Saves artifacts as files inside one directory
#[derive(Debug, Clone)]
pub struct FileDownload {
    dir: PathBuf,
}

impl FileDownload {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    /// Save into the process working directory
    pub fn current_dir() -> Self {
        Self::new(".")
    }

    /// Target path for `filename`; directory components are stripped
    pub fn target_path(&self, filename: &str) -> LoggerResult<PathBuf> {
        let name = Path::new(filename)
            .file_name()
            .ok_or_else(|| LoggerError::InvalidConfig(format!("invalid file name '{}'", filename)))?;
        Ok(self.dir.join(name))
    }
}

#[async_trait]
impl DownloadSink for FileDownload {
    async fn save(&self, artifact: &ExportArtifact, filename: &str) -> LoggerResult<()> {
        let path = self.target_path(filename)?;
        atomic_write(&path, &artifact.bytes)?;
        tracing::info!(path = %path.display(), bytes = artifact.len(), "saved log export");
        Ok(())
    }
}

/// Keeps saved artifacts in memory
#[derive(Debug, Default)]
pub struct MemoryDownload {
    saved: Mutex<Vec<(String, ExportArtifact)>>,
    notify: Notify,
}

impl MemoryDownload {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every `(filename, artifact)` saved so far
    pub fn saved(&self) -> Vec<(String, ExportArtifact)> {
        self.saved.lock().clone()
    }

    pub fn count(&self) -> usize {
        self.saved.lock().len()
    }

    /// Wait until at least `count` artifacts have been saved
    pub async fn wait_for(&self, count: usize) {
        loop {
            let notified = self.notify.notified();
            if self.count() >= count {
                return;
            }
            notified.await;
        }
    }
}

#[async_trait]
impl DownloadSink for MemoryDownload {
    async fn save(&self, artifact: &ExportArtifact, filename: &str) -> LoggerResult<()> {
        self.saved.lock().push((filename.to_string(), artifact.clone()));
        self.notify.notify_waiters();
        Ok(())
    }
}
