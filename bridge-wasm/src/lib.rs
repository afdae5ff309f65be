//! WebAssembly Bridge Implementations
//!
//! This crate provides WebAssembly-compatible implementations of the bridge traits
//! defined in `bridge-traits`. These implementations use browser APIs through
//! `web-sys` and `wasm-bindgen`.
//!
//! # Platform Support
//!
//! This crate is designed exclusively for the `wasm32-unknown-unknown` target.
//! It compiles to an empty crate on native targets.
//!
//! # Implementations
//!
//! - `WasmHttpClient`: `fetch` with `AbortController` timeouts and `FormData` uploads
//! - `WasmSettingsStore`: namespaced `localStorage`
//! - `WasmTimer`: `setTimeout` via `gloo-timers`
//!
//! # Examples
//!
//! ```ignore
//! use bridge_wasm::{build_wasm_bridges, WasmBridgeConfig};
//!
//! let bridges = build_wasm_bridges(WasmBridgeConfig::default())?;
//! let token = bridges.settings_store.get_string("token").await?;
//! ```

#![cfg(target_arch = "wasm32")]
#![warn(missing_docs)]

pub mod bootstrap;
pub mod http;
pub mod storage;
pub mod timer;

// Re-export commonly used types
pub use bootstrap::{build_wasm_bridges, WasmBridgeConfig, WasmBridgeSet};
pub use http::WasmHttpClient;
pub use storage::WasmSettingsStore;
pub use timer::WasmTimer;
