//! Capped, expiring store of log records

use parking_lot::Mutex;

use super::backend::{MemoryBackend, StoreBackend};
use super::file::FileBackend;
use super::StoreResult;
use crate::config::StoreOptions;
use crate::types::{ExportArtifact, LogRecord};
use crate::utils::time::{elapsed_ms, hour_to_ms, parse_timestamp};

/// Log store owned by exactly one engine
pub struct LogStore {
    options: StoreOptions,
    backend: Mutex<Box<dyn StoreBackend>>,
}

impl LogStore {
    /// Open the store described by `options`.
    ///
    /// Uses a `FileBackend` when `data_dir` is set, memory otherwise, then
    /// clears the store if its latest entry is past the retention window.
    pub fn open(options: StoreOptions) -> StoreResult<Self> {
        let backend: Box<dyn StoreBackend> = match options.store_path() {
            Some(path) => Box::new(FileBackend::open(
                path,
                &options.store_name,
                options.db_version,
            )?),
            None => Box::new(MemoryBackend::new()),
        };
        Self::with_backend(options, backend)
    }

    /// Wrap an existing backend, running the expiry check
    pub fn with_backend(options: StoreOptions, backend: Box<dyn StoreBackend>) -> StoreResult<Self> {
        let store = Self {
            options,
            backend: Mutex::new(backend),
        };

        if store.is_expired()? {
            tracing::info!(
                store = %store.options.store_name,
                expire_hours = store.options.expire,
                "latest log entry past retention window, clearing store"
            );
            store.clear()?;
        }

        Ok(store)
    }

    pub fn options(&self) -> &StoreOptions {
        &self.options
    }

    /// Number of records currently stored
    pub fn length(&self) -> StoreResult<usize> {
        self.backend.lock().len()
    }

    /// Erase all records
    pub fn clear(&self) -> StoreResult<()> {
        self.backend.lock().clear()
    }

    /// Persist a record, logging instead of returning failures
    pub fn set_item(&self, key: &str, record: &LogRecord) {
        if let Err(e) = self.try_set_item(key, record) {
            tracing::error!(key, error = %e, "failed to persist log record");
        }
    }

    /// Persist a record and evict the oldest entries beyond `max_size`.
    ///
    /// A `max_size` of 0 disables the cap.
    pub fn try_set_item(&self, key: &str, record: &LogRecord) -> StoreResult<()> {
        let value = record.to_json()?;
        let mut backend = self.backend.lock();
        backend.set(key, value)?;

        let max_size = self.options.max_size;
        if max_size == 0 {
            return Ok(());
        }

        let mut evicted = 0usize;
        while backend.len()? > max_size {
            let Some(oldest) = backend.oldest()? else {
                break;
            };
            backend.remove(&oldest)?;
            evicted += 1;
        }
        if evicted > 0 {
            tracing::trace!(evicted, max_size, "evicted oldest log records");
        }
        Ok(())
    }

    /// Record stored under `key`
    pub fn get_item(&self, key: &str) -> StoreResult<Option<LogRecord>> {
        Ok(self
            .backend
            .lock()
            .get(key)?
            .map(|raw| LogRecord::decode_stored(key, &raw)))
    }

    /// Keys in insertion order
    pub fn get_keys(&self) -> StoreResult<Vec<String>> {
        self.backend.lock().keys()
    }

    /// Key at `index`; negative indexes count from the end (`-1` is the most recent)
    pub fn get_key_by_index(&self, index: isize) -> StoreResult<Option<String>> {
        let keys = self.get_keys()?;
        let position = if index < 0 {
            keys.len().checked_sub(index.unsigned_abs())
        } else {
            Some(index as usize)
        };
        Ok(position.and_then(|i| keys.get(i).cloned()))
    }

    /// Largest key that parses as an unsigned number
    pub fn max_numeric_key(&self) -> StoreResult<Option<u64>> {
        Ok(self
            .get_keys()?
            .iter()
            .filter_map(|key| key.parse::<u64>().ok())
            .max())
    }

    pub fn remove_item(&self, key: &str) -> StoreResult<bool> {
        self.backend.lock().remove(key)
    }

    /// Remove the first-inserted record, returning its key
    pub fn remove_oldest(&self) -> StoreResult<Option<String>> {
        let mut backend = self.backend.lock();
        let Some(oldest) = backend.oldest()? else {
            return Ok(None);
        };
        backend.remove(&oldest)?;
        Ok(Some(oldest))
    }

    /// Visit every record in insertion order as `(record, key, index)`.
    ///
    /// Entries are snapshotted first, so `visit` runs without holding the
    /// store lock. Entries that are not decodable records are visited with
    /// their raw text as the message.
    pub fn iterate_all<F>(&self, mut visit: F) -> StoreResult<()>
    where
        F: FnMut(&LogRecord, &str, usize),
    {
        let entries = self.backend.lock().entries()?;
        for (index, (key, raw)) in entries.iter().enumerate() {
            let record = LogRecord::decode_stored(key, raw);
            visit(&record, key.as_str(), index);
        }
        Ok(())
    }

    /// Plain dump, newest first: `key [level] [label] - message\r\n`
    pub fn to_export_text(&self) -> StoreResult<String> {
        let mut text = String::new();
        self.iterate_all(|record, key, _| {
            let label = if record.label.is_empty() {
                crate::types::DEFAULT_LABEL
            } else {
                record.label.as_str()
            };
            text = format!(
                "{} [{}] [{}] - {}\r\n{}",
                key,
                record.level,
                label,
                record.message_text(),
                text
            );
        })?;
        Ok(text)
    }

    pub fn to_export_artifact(&self) -> StoreResult<ExportArtifact> {
        Ok(ExportArtifact::from_text(self.to_export_text()?))
    }

    /// Whether the latest entry is at least `expire` hours old.
    ///
    /// The age comes from the most recent key when it parses as a
    /// timestamp, else from that record's own timestamp. An empty store or
    /// an unparseable timestamp is never expired.
    pub fn is_expired(&self) -> StoreResult<bool> {
        let Some(latest_key) = self.get_key_by_index(-1)? else {
            return Ok(false);
        };

        let latest = match parse_timestamp(&latest_key) {
            Some(time) => Some(time),
            None => self
                .get_item(&latest_key)?
                .and_then(|record| parse_timestamp(&record.timestamp)),
        };

        Ok(latest
            .map(|time| elapsed_ms(&time) >= hour_to_ms(self.options.expire))
            .unwrap_or(false))
    }
}
