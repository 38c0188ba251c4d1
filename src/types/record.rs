//! Log record types
//!
//! A `LogRecord` is the unit of storage. Records are immutable once
//! persisted: the store only supports insertion, enumeration and removal.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Label used when the caller does not supply one
pub const DEFAULT_LABEL: &str = "LOG";

/// Severity of a log record, stored as its single-character code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum LogLevel {
    #[serde(rename = "T")]
    Trace,
    #[serde(rename = "D")]
    Debug,
    #[default]
    #[serde(rename = "I")]
    Info,
    #[serde(rename = "W")]
    Warn,
    #[serde(rename = "E")]
    Error,
    #[serde(rename = "F")]
    Fatal,
}

impl LogLevel {
    /// Single-character code used in storage and export text
    pub fn code(&self) -> char {
        match self {
            LogLevel::Trace => 'T',
            LogLevel::Debug => 'D',
            LogLevel::Info => 'I',
            LogLevel::Warn => 'W',
            LogLevel::Error => 'E',
            LogLevel::Fatal => 'F',
        }
    }

    /// Parse a level from its code or its name (case-insensitive)
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "t" | "trace" => Some(LogLevel::Trace),
            "d" | "debug" => Some(LogLevel::Debug),
            "i" | "info" => Some(LogLevel::Info),
            "w" | "warn" | "warning" => Some(LogLevel::Warn),
            "e" | "error" => Some(LogLevel::Error),
            "f" | "fatal" => Some(LogLevel::Fatal),
            _ => None,
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// One timestamped, leveled, labeled unit of log content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogRecord {
    /// Creation time, formatted at write time
    #[serde(rename = "d")]
    pub timestamp: String,
    #[serde(rename = "lv", default)]
    pub level: LogLevel,
    #[serde(rename = "lb", default = "default_label")]
    pub label: String,
    /// Post-middleware, post-redaction payload
    #[serde(rename = "m")]
    pub message: Value,
}

fn default_label() -> String {
    DEFAULT_LABEL.to_string()
}

impl LogRecord {
    /// Create a record stamped with the given timestamp
    pub fn new(timestamp: String, level: LogLevel, label: &str, message: Value) -> Self {
        Self {
            timestamp,
            level,
            label: label.to_string(),
            message,
        }
    }

    /// Message as export text: strings verbatim, anything else as JSON
    pub fn message_text(&self) -> String {
        match &self.message {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }

    /// Serialize to a single JSON line
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Decode a stored record.
    ///
    /// Text that is not a record is kept as the message of a fallback
    /// record keyed by its storage key, so enumeration never fails on it.
    pub fn decode_stored(key: &str, raw: &str) -> Self {
        match serde_json::from_str::<LogRecord>(raw) {
            Ok(record) => record,
            Err(_) => Self {
                timestamp: key.to_string(),
                level: LogLevel::Info,
                label: DEFAULT_LABEL.to_string(),
                message: Value::String(raw.to_string()),
            },
        }
    }
}
