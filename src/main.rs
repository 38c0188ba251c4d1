//! logdb - Binary Entry Point
//!
//! Reads lines from stdin, logs each one through an in-context engine
//! configured from `LOGDB_*` environment variables, then saves the export.
//!
//! Usage: `logdb [filename] [--echo] [--level=<level>]`

use std::sync::Arc;

use serde_json::Value;
use tokio::io::{self, AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use logdb::{
    console, FileDownload, LogEngine, LogLevel, LoggerConfig, LoggerError, LoggerResult,
    StoreOptions,
};

const STDIN_LABEL: &str = "STDIN";

/// Command line options
struct Args {
    filename: String,
    echo: bool,
    level: LogLevel,
}

impl Args {
    fn parse(args: impl Iterator<Item = String>) -> LoggerResult<Self> {
        let mut parsed = Args {
            filename: logdb::download::DEFAULT_FILENAME.to_string(),
            echo: false,
            level: LogLevel::Info,
        };
        let mut filename = None;

        for arg in args {
            if arg == "--echo" {
                parsed.echo = true;
            } else if let Some(value) = arg.strip_prefix("--level=") {
                parsed.level = LogLevel::parse(value).ok_or_else(|| {
                    LoggerError::InvalidConfig(format!("unknown log level '{}'", value))
                })?;
            } else if arg.starts_with("--") {
                return Err(LoggerError::InvalidConfig(format!("unknown option '{}'", arg)));
            } else if filename.is_none() {
                filename = Some(arg);
            }
        }

        if let Some(name) = filename {
            parsed.filename = name;
        }
        Ok(parsed)
    }
}

#[tokio::main]
async fn main() -> LoggerResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse(std::env::args().skip(1))?;
    tracing::info!(name = logdb::NAME, version = logdb::VERSION, "starting");

    let config = LoggerConfig::new().with_store(StoreOptions::from_env());
    let engine = LogEngine::with_sink(config, Arc::new(FileDownload::current_dir()))?;

    let mut lines = BufReader::new(io::stdin()).lines();
    let mut count = 0usize;
    while let Some(line) = lines.next_line().await? {
        let payload = Value::String(line);
        if args.echo {
            console::print(args.level, STDIN_LABEL, &payload)?;
        }
        engine.write(payload, args.level, STDIN_LABEL).await?;
        count += 1;
    }

    tracing::info!(count, "logged stdin lines");
    engine.trigger_download(&args.filename).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> LoggerResult<Args> {
        Args::parse(args.iter().map(|a| a.to_string()))
    }

    #[test]
    fn test_defaults() {
        let args = parse(&[]).unwrap();
        assert_eq!(args.filename, "app.log");
        assert!(!args.echo);
        assert_eq!(args.level, LogLevel::Info);
    }

    #[test]
    fn test_level_and_filename() {
        let args = parse(&["--level=warn", "out.log", "--echo"]).unwrap();
        assert_eq!(args.filename, "out.log");
        assert!(args.echo);
        assert_eq!(args.level, LogLevel::Warn);
    }

    #[test]
    fn test_rejects_unknown_level() {
        assert!(matches!(parse(&["--level=loud"]), Err(LoggerError::InvalidConfig(_))));
    }
}
