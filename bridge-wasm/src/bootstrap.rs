//! Convenience helpers for wiring all wasm bridge implementations together.
//!
//! Host shells can use [`build_wasm_bridges`] to construct the HTTP, settings
//! and timer adapters in one call. The result mirrors the role that the
//! `bridge-desktop` crate plays for native targets, giving wasm builds a single
//! entry point for assembling bridge trait objects.

use std::sync::Arc;
use std::time::Duration;

use bridge_traits::{
    error::Result as BridgeResult, http::HttpClient, storage::SettingsStore, time::Timer,
};

use crate::{http::WasmHttpClient, storage::WasmSettingsStore, timer::WasmTimer};

/// Configuration for [`build_wasm_bridges`].
#[derive(Debug, Clone)]
pub struct WasmBridgeConfig {
    /// Logical namespace used for `localStorage` keys. Empty stores keys verbatim.
    pub namespace: String,
    /// Fallback timeout for `fetch` requests.
    pub request_timeout: Duration,
}

impl WasmBridgeConfig {
    /// Create a new config using the provided namespace.
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            request_timeout: crate::http::DEFAULT_TIMEOUT,
        }
    }

    /// Override the fallback request timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

impl Default for WasmBridgeConfig {
    fn default() -> Self {
        Self::new("plantwatch")
    }
}

/// Fully constructed wasm bridge objects ready for injection into the core.
pub struct WasmBridgeSet {
    /// HTTP client powered by browser `fetch`.
    pub http_client: Arc<dyn HttpClient>,
    /// Plain settings store layered on `localStorage`.
    pub settings_store: Arc<dyn SettingsStore>,
    /// `setTimeout`-based sleeper.
    pub timer: Arc<dyn Timer>,
}

impl WasmBridgeSet {
    /// Convenience accessor to clone the HTTP client.
    pub fn http(&self) -> Arc<dyn HttpClient> {
        Arc::clone(&self.http_client)
    }

    /// Convenience accessor to clone the settings store.
    pub fn settings_store(&self) -> Arc<dyn SettingsStore> {
        Arc::clone(&self.settings_store)
    }

    /// Convenience accessor to clone the timer.
    pub fn timer(&self) -> Arc<dyn Timer> {
        Arc::clone(&self.timer)
    }
}

/// Build the default wasm bridge stack.
///
/// Hosts should call this during startup (e.g., inside their wasm bindgen
/// bootstrap) and pass the returned trait objects into `core-service`.
pub fn build_wasm_bridges(config: WasmBridgeConfig) -> BridgeResult<WasmBridgeSet> {
    let http_client: Arc<dyn HttpClient> =
        Arc::new(WasmHttpClient::with_timeout(config.request_timeout)?);
    let settings_store: Arc<dyn SettingsStore> =
        Arc::new(WasmSettingsStore::new(&config.namespace)?);
    let timer: Arc<dyn Timer> = Arc::new(WasmTimer);

    tracing::debug!(namespace = %config.namespace, "wasm bridges ready");

    Ok(WasmBridgeSet {
        http_client,
        settings_store,
        timer,
    })
}
