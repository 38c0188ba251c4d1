//! Delegated execution mode
//!
//! - `protocol`: request/reply messages and their wire shape
//! - `BackgroundRouter`: owns the background `LogEngine`, one request at a time
//! - `DelegateLogger`: caller-side proxy posting requests and handling replies
//!
//! ```text
//! DelegateLogger ──init/log/downloadLog/destroy──► BackgroundRouter ──► LogEngine
//!       ▲                                               │
//!       └──────────── downloadLog(artifact) ────────────┘
//!       │
//!       └──► DownloadSink::save
//! ```

pub mod protocol;
mod proxy;
mod router;

pub use protocol::{LogRequest, ReplyData, WorkerMessage, WorkerReply};
pub use proxy::DelegateLogger;
pub use router::{BackgroundRouter, WorkerHandle};
