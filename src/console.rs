//! Level-routed console printer
//!
//! Error, fatal and warn records go to stderr; everything else to stdout.

use std::io::{self, Write};

use serde_json::Value;

use crate::types::LogLevel;

/// Output stream chosen for a level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stream {
    Stdout,
    Stderr,
}

/// Stream a record of `level` is printed to
pub fn stream_for(level: LogLevel) -> Stream {
    match level {
        LogLevel::Fatal | LogLevel::Error | LogLevel::Warn => Stream::Stderr,
        LogLevel::Trace | LogLevel::Debug | LogLevel::Info => Stream::Stdout,
    }
}

/// Console line for a payload: `<label>: <data>`
pub fn format_line(label: &str, data: &Value) -> String {
    match data {
        Value::String(s) => format!("{}: {}", label, s),
        other => format!("{}: {}", label, other),
    }
}

/// Print `data` under `label` to the stream matching `level`
pub fn print(level: LogLevel, label: &str, data: &Value) -> io::Result<()> {
    let line = format_line(label, data);
    match stream_for(level) {
        Stream::Stdout => writeln!(io::stdout().lock(), "{}", line),
        Stream::Stderr => writeln!(io::stderr().lock(), "{}", line),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_stream_routing() {
        assert_eq!(stream_for(LogLevel::Fatal), Stream::Stderr);
        assert_eq!(stream_for(LogLevel::Error), Stream::Stderr);
        assert_eq!(stream_for(LogLevel::Warn), Stream::Stderr);
        assert_eq!(stream_for(LogLevel::Debug), Stream::Stdout);
        assert_eq!(stream_for(LogLevel::Info), Stream::Stdout);
        assert_eq!(stream_for(LogLevel::Trace), Stream::Stdout);
    }

    #[test]
    fn test_format_line() {
        assert_eq!(format_line("LOG", &json!("hi")), "LOG: hi");
        assert_eq!(format_line("REQ", &json!({"a": 1})), r#"REQ: {"a":1}"#);
    }
}
