//! Append-only file backend
//!
//! Layout of `<data_dir>/<dbName>/<storeName>.jsonl`:
//!
//! ```text
//! {"op":"meta","store":"log-store","version":1}
//! {"op":"set","key":"2024/05/01 10:00:00.000","value":"{...record...}"}
//! {"op":"remove","key":"..."}
//! ```
//!
//! Writes append one operation line. Opening replays the log into an
//! in-memory index; `clear` and compaction rewrite the file atomically.
//! Compaction also runs whenever the log holds more than `compact_slack`
//! lines beyond the live entries, so a full store evicting on every write
//! keeps a bounded file.

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::backend::{MemoryBackend, StoreBackend};
use super::StoreResult;
use crate::utils::atomic::{atomic_write_with, cleanup_temp_files};

/// Default number of dead lines tolerated before compacting
pub const COMPACT_SLACK: usize = 1024;

/// One line of the store file
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
enum StoreOp {
    Meta { store: String, version: u32 },
    Set { key: String, value: String },
    Remove { key: String },
}

impl StoreOp {
    fn to_json_line(&self) -> StoreResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// File-backed store, replayed into memory on open
pub struct FileBackend {
    path: PathBuf,
    store_name: String,
    version: u32,
    index: MemoryBackend,
    /// Operation lines currently in the file, header included
    lines: usize,
    compact_slack: usize,
}

impl FileBackend {
    /// Open (or create) the store file at `path`
    pub fn open<P: AsRef<Path>>(path: P, store_name: &str, version: u32) -> StoreResult<Self> {
        Self::open_with_slack(path, store_name, version, COMPACT_SLACK)
    }

    /// Open with a custom compaction threshold
    pub fn open_with_slack<P: AsRef<Path>>(
        path: P,
        store_name: &str,
        version: u32,
        compact_slack: usize,
    ) -> StoreResult<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
            let cleaned = cleanup_temp_files(parent)?;
            if cleaned > 0 {
                tracing::warn!(cleaned, dir = %parent.display(), "removed interrupted store rewrites");
            }
        }

        let mut backend = Self {
            path,
            store_name: store_name.to_string(),
            version,
            index: MemoryBackend::new(),
            lines: 0,
            compact_slack,
        };

        if !backend.path.exists() {
            backend.compact()?;
            return Ok(backend);
        }

        let (lines, stored_version) = backend.replay()?;
        backend.lines = lines;
        let entries = backend.index.len()?;

        if stored_version != Some(version) {
            tracing::info!(
                path = %backend.path.display(),
                from = ?stored_version,
                to = version,
                "upgrading store version"
            );
            backend.compact()?;
        } else if lines > entries + 1 + backend.compact_slack {
            tracing::debug!(lines, entries, "compacting store file");
            backend.compact()?;
        }

        Ok(backend)
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replay the file into the index. Returns the number of operation
    /// lines read and the stored version.
    fn replay(&mut self) -> StoreResult<(usize, Option<u32>)> {
        let reader = BufReader::new(File::open(&self.path)?);
        let mut lines = 0;
        let mut version = None;

        for (line_num, line_result) in reader.lines().enumerate() {
            let line = line_result?;
            if line.trim().is_empty() {
                continue;
            }
            lines += 1;

            match serde_json::from_str::<StoreOp>(&line) {
                Ok(StoreOp::Meta { version: v, .. }) => version = Some(v),
                Ok(StoreOp::Set { key, value }) => self.index.set(&key, value)?,
                Ok(StoreOp::Remove { key }) => {
                    self.index.remove(&key)?;
                }
                Err(e) => {
                    tracing::warn!(
                        line = line_num + 1,
                        path = %self.path.display(),
                        error = %e,
                        "skipping undecodable store line"
                    );
                }
            }
        }

        Ok((lines, version))
    }

    /// Number of operation lines in the file
    pub fn line_count(&self) -> usize {
        self.lines
    }

    fn append(&mut self, op: &StoreOp) -> StoreResult<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{}", op.to_json_line()?)?;
        file.sync_all()?;
        self.lines += 1;
        Ok(())
    }

    /// Compact once dead lines exceed the slack
    fn maybe_compact(&mut self) -> StoreResult<()> {
        let live = self.index.len()? + 1;
        if self.lines > live + self.compact_slack {
            tracing::debug!(lines = self.lines, live, "compacting store file");
            self.compact()?;
        }
        Ok(())
    }

    /// Rewrite the file as a header plus one `set` line per live entry
    pub fn compact(&mut self) -> StoreResult<()> {
        let mut lines = vec![StoreOp::Meta {
            store: self.store_name.clone(),
            version: self.version,
        }
        .to_json_line()?];
        for (key, value) in self.index.entries()? {
            lines.push(StoreOp::Set { key, value }.to_json_line()?);
        }

        atomic_write_with(&self.path, |file| {
            for line in &lines {
                writeln!(file, "{}", line)?;
            }
            Ok(())
        })?;
        self.lines = lines.len();
        Ok(())
    }
}

impl StoreBackend for FileBackend {
    fn len(&self) -> StoreResult<usize> {
        self.index.len()
    }

    fn keys(&self) -> StoreResult<Vec<String>> {
        self.index.keys()
    }

    fn oldest(&self) -> StoreResult<Option<String>> {
        self.index.oldest()
    }

    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        self.index.get(key)
    }

    fn set(&mut self, key: &str, value: String) -> StoreResult<()> {
        self.append(&StoreOp::Set {
            key: key.to_string(),
            value: value.clone(),
        })?;
        self.index.set(key, value)?;
        self.maybe_compact()
    }

    fn remove(&mut self, key: &str) -> StoreResult<bool> {
        if self.index.get(key)?.is_none() {
            return Ok(false);
        }
        self.append(&StoreOp::Remove {
            key: key.to_string(),
        })?;
        self.index.remove(key)?;
        self.maybe_compact()?;
        Ok(true)
    }

    fn clear(&mut self) -> StoreResult<()> {
        self.index.clear()?;
        self.compact()
    }

    fn entries(&self) -> StoreResult<Vec<(String, String)>> {
        self.index.entries()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store_path(dir: &TempDir) -> PathBuf {
        dir.path().join("log-db").join("log-store.jsonl")
    }

    #[test]
    fn test_persists_across_reopen() {
        let dir = TempDir::new().unwrap();
        {
            let mut backend = FileBackend::open(store_path(&dir), "log-store", 1).unwrap();
            backend.set("a", "1".into()).unwrap();
            backend.set("b", "2".into()).unwrap();
            backend.remove("a").unwrap();
            backend.set("c", "3".into()).unwrap();
        }

        let backend = FileBackend::open(store_path(&dir), "log-store", 1).unwrap();
        assert_eq!(backend.keys().unwrap(), vec!["b", "c"]);
        assert_eq!(backend.get("c").unwrap().as_deref(), Some("3"));
    }

    #[test]
    fn test_clear_rewrites_file() {
        let dir = TempDir::new().unwrap();
        let mut backend = FileBackend::open(store_path(&dir), "log-store", 1).unwrap();
        backend.set("a", "1".into()).unwrap();
        backend.clear().unwrap();

        let content = std::fs::read_to_string(store_path(&dir)).unwrap();
        assert_eq!(content.lines().count(), 1);
        assert!(content.contains(r#""op":"meta""#));
    }

    #[test]
    fn test_skips_corrupted_lines() {
        let dir = TempDir::new().unwrap();
        let path = store_path(&dir);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(
            &path,
            concat!(
                r#"{"op":"meta","store":"log-store","version":1}"#, "\n",
                r#"{"op":"set","key":"a","value":"1"}"#, "\n",
                "garbage\n",
                r#"{"op":"set","key":"b","value":"2"}"#, "\n",
            ),
        )
        .unwrap();

        let backend = FileBackend::open(&path, "log-store", 1).unwrap();
        assert_eq!(backend.keys().unwrap(), vec!["a", "b"]);
    }

    #[test]
    fn test_version_change_keeps_entries() {
        let dir = TempDir::new().unwrap();
        {
            let mut backend = FileBackend::open(store_path(&dir), "log-store", 1).unwrap();
            backend.set("a", "1".into()).unwrap();
        }

        let backend = FileBackend::open(store_path(&dir), "log-store", 2).unwrap();
        assert_eq!(backend.len().unwrap(), 1);
        let content = std::fs::read_to_string(store_path(&dir)).unwrap();
        assert!(content.starts_with(r#"{"op":"meta","store":"log-store","version":2}"#));
    }

    #[test]
    fn test_file_stays_bounded_under_churn() {
        let dir = TempDir::new().unwrap();
        let path = store_path(&dir);
        let mut backend = FileBackend::open_with_slack(&path, "log-store", 1, 16).unwrap();

        for i in 0..500 {
            backend.set(&i.to_string(), "v".into()).unwrap();
            if backend.len().unwrap() > 10 {
                let oldest = backend.oldest().unwrap().unwrap();
                backend.remove(&oldest).unwrap();
            }
        }

        let on_disk = std::fs::read_to_string(&path).unwrap().lines().count();
        assert_eq!(on_disk, backend.line_count());
        assert!(on_disk <= 10 + 1 + 16 + 1, "file grew to {} lines", on_disk);

        let reopened = FileBackend::open(&path, "log-store", 1).unwrap();
        assert_eq!(reopened.keys().unwrap(), backend.keys().unwrap());
        assert_eq!(reopened.oldest().unwrap().as_deref(), Some("490"));
    }
}
