//! Message protocol between the delegate and the background router
//!
//! Wire shape: `{ "id": <action>, "data": <payload> }`.
//!
//! | id            | direction          | data                     | reply |
//! |---------------|--------------------|--------------------------|-------|
//! | `init`        | delegate → router  | closure-free config      | none  |
//! | `log`         | delegate → router  | `{ data, level, label }` | none  |
//! | `downloadLog` | delegate → router  | none                     | yes   |
//! | `destroy`     | delegate → router  | none                     | none  |
//! | `downloadLog` | router → delegate  | export artifact          | -     |

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::WireConfig;
use crate::types::{ExportArtifact, LogLevel};

/// Request kinds understood by the background router
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "id", content = "data", rename_all = "camelCase")]
pub enum WorkerMessage {
    /// Create the background engine
    Init(WireConfig),
    /// Write one record (fire-and-forget)
    Log(LogRequest),
    /// Export the store; answered with `WorkerReply::DownloadLog`
    DownloadLog,
    /// Clear the background store
    Destroy,
}

/// Payload of a `log` request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogRequest {
    pub data: Value,
    pub level: LogLevel,
    pub label: String,
}

/// Replies posted back by the router
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "id", content = "data", rename_all = "camelCase")]
pub enum WorkerReply {
    DownloadLog(ReplyData),
}

/// Reply payload as received; only `Artifact` triggers a download
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ReplyData {
    Artifact(ExportArtifact),
    Other(Value),
}
