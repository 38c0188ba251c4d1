//! Utility functions and helpers
//!
//! Timestamp formatting/parsing and atomic file writes.

pub mod atomic;
pub mod time;

pub use atomic::{atomic_write, atomic_write_with, cleanup_temp_files};
pub use time::{elapsed_ms, format_timestamp, hour_to_ms, now_timestamp, parse_timestamp};
