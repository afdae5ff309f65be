//! # Host Bridge Traits
//!
//! Platform abstraction traits that must be implemented by each host platform.
//!
//! ## Overview
//!
//! This crate defines the contract between the plant-monitoring client core and
//! platform-specific implementations. Each trait represents a capability that the
//! core requires but that must be implemented differently on desktop and in the
//! browser.
//!
//! ## Traits
//!
//! ### Networking
//! - [`HttpClient`](http::HttpClient) - Single-shot async HTTP with timeouts and multipart bodies
//!
//! ### Storage
//! - [`SettingsStore`](storage::SettingsStore) - Durable key-value storage for the session
//!
//! ### Utilities
//! - [`Timer`](time::Timer) - Executor-aware sleep used by pollers
//! - [`LoggerSink`](time::LoggerSink) - Forward structured logs to host logging
//!
//! ## Platform Requirements
//!
//! | Platform | Implementation Crate |
//! |----------|---------------------|
//! | Desktop  | `bridge-desktop`    |
//! | Web      | `bridge-wasm`       |
//!
//! ## Fail-Fast Strategy
//!
//! The core fails fast with a descriptive error when a required capability is
//! missing:
//!
//! ```ignore
//! use core_runtime::error::CoreError;
//!
//! let http_client = config.http_client
//!     .ok_or_else(|| CoreError::CapabilityMissing {
//!         capability: "HttpClient".to_string(),
//!         message: "No HTTP client implementation provided. \
//!                  Desktop: enable the `desktop-shims` feature. \
//!                  Web: call `build_wasm_bridges`.".to_string()
//!     })?;
//! ```
//!
//! ## Error Handling
//!
//! All bridge traits use [`BridgeError`](error::BridgeError). Implementations
//! convert platform errors into it and must map "no response obtained" failures
//! to [`BridgeError::Timeout`] or [`BridgeError::ConnectionFailed`] so callers
//! can tell transport failures apart from server rejections.
//!
//! ## Thread Safety
//!
//! Bridge traits are bounded by [`PlatformSendSync`](platform::PlatformSendSync):
//! `Send + Sync` on native targets, unbounded on `wasm32`.

pub mod error;
pub mod http;
pub mod platform;
pub mod storage;
pub mod time;

pub use error::BridgeError;

// Re-export commonly used types
pub use http::{FormPart, FormValue, HttpBody, HttpClient, HttpMethod, HttpRequest, HttpResponse};
pub use platform::{PlatformSend, PlatformSendSync};
pub use storage::{MemorySettingsStore, SettingsStore};
pub use time::{LogEntry, LogLevel, LoggerSink, Timer};
