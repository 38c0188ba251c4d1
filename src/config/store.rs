//! Store configuration

use std::env;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Default entry cap
pub const DEFAULT_MAX_SIZE: usize = 10_000;
/// Default retention window in hours (14 days)
pub const DEFAULT_EXPIRE_HOURS: u64 = 14 * 24;
pub const DEFAULT_DB_NAME: &str = "log-db";
pub const DEFAULT_STORE_NAME: &str = "log-store";
pub const DEFAULT_DB_VERSION: u32 = 1;

/// Configuration for the persistent store.
///
/// Fixed at construction; changing it requires re-opening the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StoreOptions {
    /// Maximum number of records kept
    pub max_size: usize,
    /// Database (namespace) name
    pub db_name: String,
    /// Store name inside the database
    pub store_name: String,
    /// Retention window in hours
    pub expire: u64,
    pub db_version: u32,
    /// Directory for the file backend; `None` keeps records in memory
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            max_size: DEFAULT_MAX_SIZE,
            db_name: DEFAULT_DB_NAME.to_string(),
            store_name: DEFAULT_STORE_NAME.to_string(),
            expire: DEFAULT_EXPIRE_HOURS,
            db_version: DEFAULT_DB_VERSION,
            data_dir: None,
        }
    }
}

impl StoreOptions {
    /// In-memory store with default options
    pub fn new() -> Self {
        Self::default()
    }

    /// File-backed store rooted at `data_dir`
    pub fn with_data_dir<P: AsRef<Path>>(data_dir: P) -> Self {
        Self {
            data_dir: Some(data_dir.as_ref().to_path_buf()),
            ..Default::default()
        }
    }

    pub fn with_max_size(mut self, max_size: usize) -> Self {
        self.max_size = max_size;
        self
    }

    pub fn with_expire_hours(mut self, hours: u64) -> Self {
        self.expire = hours;
        self
    }

    pub fn with_names(mut self, db_name: &str, store_name: &str) -> Self {
        self.db_name = db_name.to_string();
        self.store_name = store_name.to_string();
        self
    }

    /// Defaults overridden by `LOGDB_*` environment variables.
    ///
    /// Unparseable numeric values are ignored with a warning.
    pub fn from_env() -> Self {
        let mut options = Self::default();

        if let Ok(dir) = env::var("LOGDB_DATA_DIR") {
            if !dir.trim().is_empty() {
                options.data_dir = Some(PathBuf::from(dir));
            }
        }
        if let Some(max_size) = env_number("LOGDB_MAX_SIZE") {
            options.max_size = max_size as usize;
        }
        if let Some(expire) = env_number("LOGDB_EXPIRE_HOURS") {
            options.expire = expire;
        }
        if let Ok(name) = env::var("LOGDB_DB_NAME") {
            options.db_name = name;
        }
        if let Ok(name) = env::var("LOGDB_STORE_NAME") {
            options.store_name = name;
        }

        options
    }

    /// Path of the file backing this store, if file-backed
    pub fn store_path(&self) -> Option<PathBuf> {
        self.data_dir
            .as_ref()
            .map(|dir| dir.join(&self.db_name).join(format!("{}.jsonl", self.store_name)))
    }
}

fn env_number(name: &str) -> Option<u64> {
    let raw = env::var(name).ok()?;
    match raw.trim().parse::<u64>() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(var = name, value = %raw, "ignoring non-numeric environment value");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = StoreOptions::default();
        assert_eq!(options.max_size, 10_000);
        assert_eq!(options.expire, 336);
        assert_eq!(options.db_name, "log-db");
        assert_eq!(options.store_name, "log-store");
        assert_eq!(options.db_version, 1);
        assert!(options.store_path().is_none());
    }

    #[test]
    fn test_store_path() {
        let options = StoreOptions::with_data_dir("/tmp/logs").with_names("app", "main");
        assert_eq!(
            options.store_path().unwrap(),
            PathBuf::from("/tmp/logs/app/main.jsonl")
        );
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let options: StoreOptions = serde_json::from_str(r#"{"maxSize": 5}"#).unwrap();
        assert_eq!(options.max_size, 5);
        assert_eq!(options.expire, DEFAULT_EXPIRE_HOURS);
    }
}
