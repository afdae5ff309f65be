//! # Desktop Bridge Implementations
//!
//! Default implementations of bridge traits for desktop platforms
//! (macOS, Windows, Linux).
//!
//! ## Overview
//!
//! - `HttpClient` using `reqwest`
//! - `SettingsStore` using a SQLite-backed key-value table
//! - `Timer` using the tokio timer wheel
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_desktop::{ReqwestHttpClient, SqliteSettingsStore, TokioTimer};
//!
//! #[tokio::main]
//! async fn main() -> bridge_traits::error::Result<()> {
//!     let http_client = ReqwestHttpClient::new()?;
//!     let settings = SqliteSettingsStore::open("plantwatch/settings.db".into()).await?;
//!
//!     // Hand them to `ClientConfig::builder()`
//!     Ok(())
//! }
//! ```

mod http;
mod settings;
mod timer;

pub use http::{ReqwestHttpClient, DEFAULT_TIMEOUT};
pub use settings::SqliteSettingsStore;
pub use timer::TokioTimer;
