//! Timer and host log forwarding
//!
//! [`Timer`] backs the task pollers. [`LoggerSink`] receives the events that
//! `core-runtime`'s tracing layer forwards to the host.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

use crate::{error::Result, platform::PlatformSendSync};

/// Async sleep provided by the host executor
///
/// Pollers that wait between status checks go through this trait so they run
/// under tokio on desktop and on the browser event loop on `wasm32`.
#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
pub trait Timer: PlatformSendSync {
    /// Suspend the current task for `duration`
    async fn sleep(&self, duration: Duration);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

/// One forwarded tracing event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub level: LogLevel,
    pub timestamp: DateTime<Utc>,
    /// Module path of the emitting code, e.g. `core_api::dispatch`.
    pub target: String,
    pub message: String,
    /// Event fields rendered with `Display`/`Debug`. Credential fields are
    /// expected to be redacted before they are recorded.
    pub fields: HashMap<String, String>,
    /// Name of the innermost span the event was recorded in.
    pub span_id: Option<String>,
}

impl LogEntry {
    pub fn new(level: LogLevel, target: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level,
            timestamp: Utc::now(),
            target: target.into(),
            message: message.into(),
            fields: HashMap::new(),
            span_id: None,
        }
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }
}

/// Host log pipeline: a desktop log file, the browser console, a crash
/// reporter.
///
/// ```ignore
/// use bridge_traits::time::{LoggerSink, LogEntry, LogLevel};
///
/// async fn report(sink: &dyn LoggerSink, code: i32) {
///     let entry = LogEntry::new(LogLevel::Warn, "core_api::dispatch", "Request rejected")
///         .with_field("code", code.to_string());
///     sink.log(entry).await.ok();
/// }
/// ```
#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
pub trait LoggerSink: PlatformSendSync {
    async fn log(&self, entry: LogEntry) -> Result<()>;

    async fn flush(&self) -> Result<()> {
        Ok(())
    }

    /// Entries below this level are not forwarded.
    fn min_level(&self) -> LogLevel {
        LogLevel::Info
    }
}
