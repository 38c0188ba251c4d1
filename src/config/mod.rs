//! Logger configuration
//!
//! `LoggerConfig` is the construction-time configuration of an engine.
//! Formatter and key policy may be closures, which cannot cross the worker
//! boundary; `WireConfig` is the serializable subset used both as the
//! `init` message payload and as the JSON configuration file format.

mod store;

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::{LogRecord, LoggerError, LoggerResult};

pub use store::{
    StoreOptions, DEFAULT_DB_NAME, DEFAULT_DB_VERSION, DEFAULT_EXPIRE_HOURS, DEFAULT_MAX_SIZE,
    DEFAULT_STORE_NAME,
};

/// Placeholder tokens understood by template formatters
pub mod format_code {
    pub const DATE: &str = "d%";
    pub const LEVEL: &str = "t%";
    pub const INDEX: &str = "i%";
    pub const LABEL: &str = "l%";
    pub const MESSAGE: &str = "m%";
}

/// Default export template: `<date> [<level>] <index> [<label>] - <message>\r\n`
pub const DEFAULT_TEMPLATE: &str = "d% [t%] i% [l%] - m%\r\n";

/// Function formatter: `(record, index, accumulated) -> accumulated`
pub type FormatFn = Arc<dyn Fn(&LogRecord, usize, &str) -> String + Send + Sync>;

/// Custom storage key derivation
pub type KeyFn = Arc<dyn Fn(&LogRecord) -> String + Send + Sync>;

/// How exported records are rendered
#[derive(Clone)]
pub enum Formatter {
    /// Template with `d%`, `t%`, `i%`, `l%`, `m%` placeholders
    Template(String),
    /// Full control over accumulation
    Function(FormatFn),
    /// A configured value that is neither; export fails on it
    Invalid(Value),
}

impl Formatter {
    /// Interpret a configuration value as a formatter
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::String(template) => Formatter::Template(template),
            other => Formatter::Invalid(other),
        }
    }

    pub fn function<F>(f: F) -> Self
    where
        F: Fn(&LogRecord, usize, &str) -> String + Send + Sync + 'static,
    {
        Formatter::Function(Arc::new(f))
    }
}

impl Default for Formatter {
    fn default() -> Self {
        Formatter::Template(DEFAULT_TEMPLATE.to_string())
    }
}

impl fmt::Debug for Formatter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Formatter::Template(t) => f.debug_tuple("Template").field(t).finish(),
            Formatter::Function(_) => f.write_str("Function(..)"),
            Formatter::Invalid(v) => f.debug_tuple("Invalid").field(v).finish(),
        }
    }
}

/// Storage key policy, fixed for the engine's lifetime
#[derive(Clone, Default)]
pub enum KeyPolicy {
    /// The record's timestamp string
    #[default]
    Date,
    /// Sequential counter seeded from the store length
    Number,
    Custom(KeyFn),
}

impl KeyPolicy {
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(&LogRecord) -> String + Send + Sync + 'static,
    {
        KeyPolicy::Custom(Arc::new(f))
    }

    /// Parse the serializable policy names
    pub fn parse(name: &str) -> LoggerResult<Self> {
        match name {
            "date" => Ok(KeyPolicy::Date),
            "number" => Ok(KeyPolicy::Number),
            other => Err(LoggerError::InvalidConfig(format!(
                "unknown key policy '{}'",
                other
            ))),
        }
    }

    /// Name of the policy, `None` for closures
    pub fn name(&self) -> Option<&'static str> {
        match self {
            KeyPolicy::Date => Some("date"),
            KeyPolicy::Number => Some("number"),
            KeyPolicy::Custom(_) => None,
        }
    }
}

impl fmt::Debug for KeyPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyPolicy::Date => f.write_str("Date"),
            KeyPolicy::Number => f.write_str("Number"),
            KeyPolicy::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Per-field redaction settings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldFilter {
    /// Visible characters, split evenly between start and end (default 12)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reserved_size: Option<usize>,
}

impl FieldFilter {
    pub fn reserved(size: usize) -> Self {
        Self {
            reserved_size: Some(size),
        }
    }
}

/// Sensitive field name -> redaction settings
pub type FilterWords = BTreeMap<String, FieldFilter>;

/// Fields redacted when no filter is configured
pub fn default_filter_words() -> FilterWords {
    ["securityKey", "xyToken", "token"]
        .into_iter()
        .map(|name| (name.to_string(), FieldFilter::default()))
        .collect()
}

/// Construction-time configuration of a logging engine
#[derive(Debug, Clone)]
pub struct LoggerConfig {
    /// Export formatter
    pub formatter: Formatter,
    pub key: KeyPolicy,
    pub store: StoreOptions,
    /// Master switch for writing and exporting
    pub enable: bool,
    pub filter_sensitive_data: FilterWords,
    pub enable_filter_sensitive_data: bool,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            formatter: Formatter::default(),
            key: KeyPolicy::Date,
            store: StoreOptions::default(),
            enable: true,
            filter_sensitive_data: default_filter_words(),
            enable_filter_sensitive_data: true,
        }
    }
}

impl LoggerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_formatter(mut self, formatter: Formatter) -> Self {
        self.formatter = formatter;
        self
    }

    pub fn with_key(mut self, key: KeyPolicy) -> Self {
        self.key = key;
        self
    }

    pub fn with_store(mut self, store: StoreOptions) -> Self {
        self.store = store;
        self
    }

    pub fn with_enable(mut self, enable: bool) -> Self {
        self.enable = enable;
        self
    }

    pub fn with_filter(mut self, filter: FilterWords) -> Self {
        self.filter_sensitive_data = filter;
        self
    }

    pub fn with_filter_enabled(mut self, enabled: bool) -> Self {
        self.enable_filter_sensitive_data = enabled;
        self
    }

    /// Parse a JSON configuration document
    pub fn from_json_str(json: &str) -> LoggerResult<Self> {
        let wire: WireConfig = serde_json::from_str(json)?;
        Self::from_wire(wire)
    }

    /// Build a configuration from its serializable subset
    pub fn from_wire(wire: WireConfig) -> LoggerResult<Self> {
        let defaults = Self::default();
        let key = match wire.key.as_deref() {
            Some(name) => KeyPolicy::parse(name)?,
            None => defaults.key,
        };

        Ok(Self {
            formatter: wire.formatter.map(Formatter::from_value).unwrap_or(defaults.formatter),
            key,
            store: wire.db_options.unwrap_or(defaults.store),
            enable: wire.enable.unwrap_or(defaults.enable),
            filter_sensitive_data: wire
                .filter_sensitive_data
                .unwrap_or(defaults.filter_sensitive_data),
            enable_filter_sensitive_data: wire
                .enable_filter_sensitive_data
                .unwrap_or(defaults.enable_filter_sensitive_data),
        })
    }

    /// Deep copy without closures, fit for crossing the worker boundary.
    ///
    /// Function formatters and custom key policies are dropped; the
    /// receiving side falls back to its defaults for them.
    pub fn to_wire(&self) -> WireConfig {
        let formatter = match &self.formatter {
            Formatter::Template(t) => Some(Value::String(t.clone())),
            Formatter::Invalid(v) => Some(v.clone()),
            Formatter::Function(_) => None,
        };

        WireConfig {
            formatter,
            key: self.key.name().map(str::to_string),
            db_options: Some(self.store.clone()),
            enable: Some(self.enable),
            filter_sensitive_data: Some(self.filter_sensitive_data.clone()),
            enable_filter_sensitive_data: Some(self.enable_filter_sensitive_data),
        }
    }
}

/// Serializable configuration; absent fields take the defaults
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formatter: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub db_options: Option<StoreOptions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter_sensitive_data: Option<FilterWords>,
    #[serde(
        default,
        alias = "enbaleFilterSensitiveData",
        skip_serializing_if = "Option::is_none"
    )]
    pub enable_filter_sensitive_data: Option<bool>,
}
