//! Structured logging for analysis runs.

mod format;

pub use format::{LogEvent, StructuredLogger};
