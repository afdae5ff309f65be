//! # Core Runtime Module
//!
//! Provides foundational runtime infrastructure for the plant-monitoring client:
//! - Logging and tracing infrastructure
//! - Configuration management
//! - Event bus system
//! - Navigation signal
//!
//! ## Overview
//!
//! Every other core crate depends on this one for its configuration, its
//! logging conventions and the broadcast channel that carries session changes,
//! navigation requests and notices to the UI shell.

pub mod config;
pub mod error;
pub mod events;
pub mod logging;
pub mod navigation;

pub use config::{ClientConfig, ClientConfigBuilder};
pub use error::{Error, Result};
pub use events::{CoreEvent, EventBus, EventStream, Notice, NoticeLevel};
pub use navigation::{Navigator, Route};
