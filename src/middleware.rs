//! Middleware pipeline applied to payloads before redaction and persistence
//!
//! The pipeline is a stack: `run` starts from the most recently appended
//! transform and threads each output into the next, so the
//! earliest-registered transform runs last. The engine registers a
//! stringify transform first, which therefore always produces the final
//! text the redactor sees.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::Value;

use crate::types::{LoggerError, LoggerResult};

/// A payload transform. Returning an error aborts the write.
pub type MiddlewareFn = Arc<dyn Fn(Value) -> LoggerResult<Value> + Send + Sync>;

/// Handle returned by `append`, used to remove the transform later
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MiddlewareId(u64);

/// Ordered, mutable chain of payload transforms
pub struct MiddlewarePipeline {
    /// Registration order; traversed last-first
    entries: RwLock<Vec<(MiddlewareId, MiddlewareFn)>>,
    next_id: AtomicU64,
}

impl MiddlewarePipeline {
    /// Create an empty pipeline
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
            next_id: AtomicU64::new(0),
        }
    }

    /// Create a pipeline with transforms registered in the given order
    pub fn with_transforms(transforms: Vec<MiddlewareFn>) -> Self {
        let pipeline = Self::new();
        for transform in transforms {
            pipeline.append(transform);
        }
        pipeline
    }

    /// Register a transform; it runs before every transform registered earlier
    pub fn append(&self, transform: MiddlewareFn) -> MiddlewareId {
        let id = MiddlewareId(self.next_id.fetch_add(1, Ordering::SeqCst));
        self.entries.write().push((id, transform));
        id
    }

    /// Register a closure as a transform
    pub fn append_fn<F>(&self, transform: F) -> MiddlewareId
    where
        F: Fn(Value) -> LoggerResult<Value> + Send + Sync + 'static,
    {
        self.append(Arc::new(transform))
    }

    /// Unregister a transform. Returns false if it was not registered.
    pub fn remove(&self, id: MiddlewareId) -> bool {
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|(entry_id, _)| *entry_id != id);
        entries.len() != before
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Run the payload through every transform, last-registered first.
    ///
    /// Works on a snapshot taken at the start of the run: transforms
    /// appended or removed meanwhile only affect later runs.
    pub fn run(&self, payload: Value) -> LoggerResult<Value> {
        let snapshot: Vec<MiddlewareFn> = self
            .entries
            .read()
            .iter()
            .rev()
            .map(|(_, transform)| Arc::clone(transform))
            .collect();

        snapshot
            .iter()
            .try_fold(payload, |current, transform| transform(current))
    }
}

impl Default for MiddlewarePipeline {
    fn default() -> Self {
        Self::new()
    }
}

/// Transform that serializes non-string payloads to JSON text
pub fn stringify() -> MiddlewareFn {
    Arc::new(|payload: Value| match payload {
        Value::String(_) => Ok(payload),
        other => serde_json::to_string(&other)
            .map(Value::String)
            .map_err(LoggerError::from),
    })
}
