//! Key/value backends behind the log store
//!
//! Backends keep string values under string keys in insertion order.
//! Overwriting a key keeps its original position.

use std::collections::{BTreeMap, HashMap};

use super::StoreResult;

/// Embedded key/value backend
pub trait StoreBackend: Send + Sync {
    /// Number of stored entries
    fn len(&self) -> StoreResult<usize>;

    fn is_empty(&self) -> StoreResult<bool> {
        Ok(self.len()? == 0)
    }

    /// Keys in insertion order
    fn keys(&self) -> StoreResult<Vec<String>>;

    /// First-inserted key still present
    fn oldest(&self) -> StoreResult<Option<String>> {
        Ok(self.keys()?.into_iter().next())
    }

    fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Insert or overwrite (last write wins)
    fn set(&mut self, key: &str, value: String) -> StoreResult<()>;

    /// Remove one entry. Returns false if the key was absent.
    fn remove(&mut self, key: &str) -> StoreResult<bool>;

    /// Remove every entry
    fn clear(&mut self) -> StoreResult<()>;

    /// All `(key, value)` pairs in insertion order
    fn entries(&self) -> StoreResult<Vec<(String, String)>>;
}

/// Volatile backend; also the in-memory index of the file backend.
///
/// Each key gets an insertion sequence number; `order` maps sequence
/// numbers back to keys, so finding or dropping the oldest entry does not
/// scan the whole store.
#[derive(Debug, Default, Clone)]
pub struct MemoryBackend {
    order: BTreeMap<u64, String>,
    values: HashMap<String, (u64, String)>,
    next_seq: u64,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StoreBackend for MemoryBackend {
    fn len(&self) -> StoreResult<usize> {
        Ok(self.values.len())
    }

    fn keys(&self) -> StoreResult<Vec<String>> {
        Ok(self.order.values().cloned().collect())
    }

    fn oldest(&self) -> StoreResult<Option<String>> {
        Ok(self.order.values().next().cloned())
    }

    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.values.get(key).map(|(_, value)| value.clone()))
    }

    fn set(&mut self, key: &str, value: String) -> StoreResult<()> {
        if let Some(entry) = self.values.get_mut(key) {
            entry.1 = value;
            return Ok(());
        }

        let seq = self.next_seq;
        self.next_seq += 1;
        self.order.insert(seq, key.to_string());
        self.values.insert(key.to_string(), (seq, value));
        Ok(())
    }

    fn remove(&mut self, key: &str) -> StoreResult<bool> {
        match self.values.remove(key) {
            Some((seq, _)) => {
                self.order.remove(&seq);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn clear(&mut self) -> StoreResult<()> {
        self.order.clear();
        self.values.clear();
        Ok(())
    }

    fn entries(&self) -> StoreResult<Vec<(String, String)>> {
        Ok(self
            .order
            .values()
            .filter_map(|k| self.values.get(k).map(|(_, v)| (k.clone(), v.clone())))
            .collect())
    }
}
