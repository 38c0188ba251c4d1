//! Integration tests for the in-context logging engine

use std::sync::Arc;

use serde_json::{json, Value};
use tempfile::TempDir;

use logdb::redact::MASK;
use logdb::{
    FileDownload, Formatter, KeyPolicy, LogEngine, LogLevel, LoggerConfig, LoggerError, MemoryDownload,
    MiddlewareFn, StoreOptions,
};

fn setup(config: LoggerConfig) -> (LogEngine, Arc<MemoryDownload>) {
    let sink = Arc::new(MemoryDownload::new());
    let engine = LogEngine::with_sink(config, sink.clone()).unwrap();
    (engine, sink)
}

fn suffix(tag: &'static str) -> MiddlewareFn {
    Arc::new(move |payload: Value| match payload {
        Value::String(text) => Ok(Value::String(format!("{}{}", text, tag))),
        other => Err(LoggerError::middleware(format!("expected text, got {}", other))),
    })
}

fn messages(engine: &LogEngine) -> Vec<String> {
    let mut out = Vec::new();
    engine
        .store()
        .iterate_all(|record, _, _| out.push(record.message_text()))
        .unwrap();
    out
}

#[tokio::test]
async fn test_redaction_keeps_prefix_and_suffix() {
    let (engine, _) = setup(LoggerConfig::new().with_key(KeyPolicy::Number));

    engine
        .write(json!("GET /api?token=abcdefghijklmnop&page=2"), LogLevel::Info, "REQ")
        .await
        .unwrap();
    engine
        .write(json!({"securityKey": "0123456789abcdefXYZ"}), LogLevel::Info, "REQ")
        .await
        .unwrap();

    let stored = messages(&engine);
    assert_eq!(stored[0], format!("GET /api?token=abcdef{}klmnop&page=2", MASK));
    assert!(!stored[0].contains("abcdefghijklmnop"));
    assert_eq!(stored[1], format!(r#"{{"securityKey":"012345{}defXYZ"}}"#, MASK));
}

#[tokio::test]
async fn test_redaction_disabled() {
    let config = LoggerConfig::new()
        .with_key(KeyPolicy::Number)
        .with_filter_enabled(false);
    let (engine, _) = setup(config);

    engine
        .write(json!("token=abcdefghijklmnop"), LogLevel::Info, "REQ")
        .await
        .unwrap();

    assert_eq!(messages(&engine), vec!["token=abcdefghijklmnop"]);
}

#[tokio::test]
async fn test_middleware_runs_last_registered_first() {
    let (engine, _) = setup(LoggerConfig::new().with_key(KeyPolicy::Number));

    engine.register_middleware(suffix("-t1"));
    engine.register_middleware(suffix("-t2"));

    engine.write(json!("x"), LogLevel::Info, "LOG").await.unwrap();

    // T1(T2(x))
    assert_eq!(messages(&engine), vec!["x-t2-t1"]);
}

#[tokio::test]
async fn test_middleware_output_reaches_stringify() {
    let (engine, _) = setup(LoggerConfig::new().with_key(KeyPolicy::Number));

    engine.register_middleware(Arc::new(|payload: Value| Ok(json!({ "wrapped": payload }))));
    engine.write(json!("x"), LogLevel::Info, "LOG").await.unwrap();

    assert_eq!(messages(&engine), vec![r#"{"wrapped":"x"}"#]);
}

#[tokio::test]
async fn test_removed_middleware_no_longer_runs() {
    let (engine, _) = setup(LoggerConfig::new().with_key(KeyPolicy::Number));

    let id = engine.register_middleware(Arc::new(|_| Ok(json!("replaced"))));
    engine.write(json!("one"), LogLevel::Info, "LOG").await.unwrap();
    assert!(engine.remove_middleware(id));
    engine.write(json!("two"), LogLevel::Info, "LOG").await.unwrap();

    assert_eq!(messages(&engine), vec!["replaced", "two"]);
}

#[tokio::test]
async fn test_failing_middleware_aborts_write() {
    let (engine, _) = setup(LoggerConfig::new().with_key(KeyPolicy::Number));
    engine.register_middleware(Arc::new(|_| Err(LoggerError::middleware("rejected"))));

    let result = engine.write(json!("x"), LogLevel::Info, "LOG").await;

    assert!(matches!(result, Err(LoggerError::Middleware(_))));
    assert_eq!(engine.store().length().unwrap(), 0);
}

#[tokio::test]
async fn test_number_keys_follow_store_length() {
    let (engine, _) = setup(LoggerConfig::new().with_key(KeyPolicy::Number));

    engine.write(json!("a"), LogLevel::Info, "LOG").await.unwrap();
    engine.write(json!("b"), LogLevel::Info, "LOG").await.unwrap();

    assert_eq!(engine.store().get_keys().unwrap(), vec!["0", "1"]);

    engine.destroy().await.unwrap();
    engine.write(json!("c"), LogLevel::Info, "LOG").await.unwrap();
    assert_eq!(engine.store().get_keys().unwrap(), vec!["0"]);
}

#[tokio::test]
async fn test_export_lists_newest_first() {
    let (engine, sink) = setup(LoggerConfig::new().with_key(KeyPolicy::Number));

    engine.write(json!("a"), LogLevel::Info, "LOG").await.unwrap();
    engine.write(json!("b"), LogLevel::Warn, "TAG").await.unwrap();

    let text = engine.to_export_string().await.unwrap();
    let lines: Vec<&str> = text.split("\r\n").filter(|l| !l.is_empty()).collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].ends_with(" [W] 1 [TAG] - b"));
    assert!(lines[1].ends_with(" [I] 0 [LOG] - a"));

    engine.trigger_download("out.log").await.unwrap();
    let saved = sink.saved();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].0, "out.log");
    assert_eq!(saved[0].1.text(), text);
}

#[tokio::test]
async fn test_function_formatter_accumulates() {
    let config = LoggerConfig::new()
        .with_key(KeyPolicy::Number)
        .with_formatter(Formatter::function(|record, index, acc| {
            format!("{}{}:{};", acc, index, record.message_text())
        }));
    let (engine, _) = setup(config);

    engine.write(json!("a"), LogLevel::Info, "LOG").await.unwrap();
    engine.write(json!("b"), LogLevel::Info, "LOG").await.unwrap();

    assert_eq!(engine.to_export_string().await.unwrap(), "0:a;1:b;");
}

#[tokio::test]
async fn test_disabled_engine_is_silent() {
    let (engine, sink) = setup(LoggerConfig::new().with_enable(false));

    engine.write(json!("a"), LogLevel::Error, "LOG").await.unwrap();
    engine.trigger_download("app.log").await.unwrap();

    assert_eq!(engine.store().length().unwrap(), 0);
    assert_eq!(engine.to_export_string().await.unwrap(), "");
    assert_eq!(sink.count(), 0);
}

#[tokio::test]
async fn test_numeric_formatter_is_invalid() {
    let config = LoggerConfig::new().with_formatter(Formatter::from_value(json!(42)));
    let (engine, sink) = setup(config);

    engine.write(json!("a"), LogLevel::Info, "LOG").await.unwrap();

    let result = engine.to_export_string().await;
    assert!(matches!(result, Err(LoggerError::InvalidFormatter(_))));
    assert!(engine.trigger_download("app.log").await.is_err());
    assert_eq!(sink.count(), 0);
}

#[tokio::test]
async fn test_max_size_evicts_oldest() {
    let config = LoggerConfig::new()
        .with_key(KeyPolicy::Number)
        .with_store(StoreOptions::new().with_max_size(2));
    let (engine, _) = setup(config);

    for message in ["a", "b", "c"] {
        engine.write(json!(message), LogLevel::Info, "LOG").await.unwrap();
    }

    assert_eq!(messages(&engine), vec!["b", "c"]);
}

#[tokio::test]
async fn test_file_store_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let config = LoggerConfig::new()
        .with_key(KeyPolicy::Number)
        .with_store(StoreOptions::with_data_dir(dir.path()));

    {
        let (engine, _) = setup(config.clone());
        engine.write(json!("a"), LogLevel::Info, "LOG").await.unwrap();
        engine.write(json!({"n": 1}), LogLevel::Debug, "OBJ").await.unwrap();
    }

    let (engine, _) = setup(config);
    assert_eq!(messages(&engine), vec!["a", r#"{"n":1}"#]);

    // counter reseeds from the reopened store
    engine.write(json!("c"), LogLevel::Info, "LOG").await.unwrap();
    assert_eq!(engine.store().get_keys().unwrap(), vec!["0", "1", "2"]);
}

#[tokio::test]
async fn test_file_download_writes_export() {
    let dir = TempDir::new().unwrap();
    let sink = Arc::new(FileDownload::new(dir.path()));
    let engine = LogEngine::with_sink(LoggerConfig::new(), sink).unwrap();

    engine.write(json!("hello"), LogLevel::Info, "LOG").await.unwrap();
    engine.trigger_download("app.log").await.unwrap();

    let content = std::fs::read_to_string(dir.path().join("app.log")).unwrap();
    assert_eq!(content, engine.to_export_string().await.unwrap());
    assert!(content.ends_with(" [I] 0 [LOG] - hello\r\n"));
}

#[tokio::test]
async fn test_reopened_full_store_keeps_newest_first() {
    let dir = TempDir::new().unwrap();
    let config = LoggerConfig::new()
        .with_key(KeyPolicy::Number)
        .with_formatter(Formatter::Template("m%\n".into()))
        .with_store(StoreOptions::with_data_dir(dir.path()).with_max_size(3));

    {
        let (engine, _) = setup(config.clone());
        for message in ["a", "b", "c", "d", "e"] {
            engine.write(json!(message), LogLevel::Info, "LOG").await.unwrap();
        }
    }

    let (engine, _) = setup(config);
    engine.write(json!("new"), LogLevel::Info, "LOG").await.unwrap();

    assert_eq!(engine.to_export_string().await.unwrap(), "new\ne\nd\n");
}
