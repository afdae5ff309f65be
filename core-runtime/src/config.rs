//! # Client Configuration
//!
//! Builder-based configuration for the plant-monitoring client core.
//!
//! ## Overview
//!
//! [`ClientConfig`] holds every bridge and setting the core needs. The builder
//! fails fast: a missing bridge is reported as
//! [`Error::CapabilityMissing`](crate::Error::CapabilityMissing) naming the
//! capability, and out-of-range values as [`Error::Config`](crate::Error::Config).
//!
//! ## Bridges
//!
//! - `HttpClient` - desktop default: reqwest
//! - `SettingsStore` - desktop default: SQLite at `settings_path`, in-memory without one
//! - `Timer` - desktop default: tokio
//!
//! Defaults are only available with the `desktop-shims` feature. Browser hosts
//! inject the `bridge-wasm` adapters.
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::ClientConfig;
//! use std::time::Duration;
//!
//! let config = ClientConfig::builder()
//!     .api_base_url("https://plants.example.org/api")
//!     .request_timeout(Duration::from_secs(30))
//!     .settings_path("/var/lib/plantwatch/settings.db")
//!     .build()?;
//! ```
//!
//! When no base URL is set explicitly, `PLANTWATCH_API_BASE` is consulted
//! before falling back to [`DEFAULT_API_BASE_URL`].

use crate::error::{Error, Result};
use crate::events::DEFAULT_EVENT_BUFFER_SIZE;
use bridge_traits::{http::HttpClient, storage::SettingsStore, time::Timer};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// API server used when nothing else is configured.
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8083";

/// Environment variable that overrides the API base URL.
pub const API_BASE_ENV: &str = "PLANTWATCH_API_BASE";

/// Per-request timeout used when nothing else is configured.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

const MAX_REQUEST_TIMEOUT: Duration = Duration::from_secs(600);

/// Core configuration for the client.
#[derive(Clone)]
pub struct ClientConfig {
    /// API origin without a trailing slash
    pub api_base_url: String,

    /// Timeout applied to every API request
    pub request_timeout: Duration,

    /// Capacity of the event bus channel
    pub event_buffer_size: usize,

    /// Where the desktop settings database lives, if persisted
    pub settings_path: Option<PathBuf>,

    pub http_client: Arc<dyn HttpClient>,

    /// Durable storage for the session
    pub settings_store: Arc<dyn SettingsStore>,

    /// Sleeper used by polling workflows
    pub timer: Arc<dyn Timer>,
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_base_url", &self.api_base_url)
            .field("request_timeout", &self.request_timeout)
            .field("event_buffer_size", &self.event_buffer_size)
            .field("settings_path", &self.settings_path)
            .finish_non_exhaustive()
    }
}

impl ClientConfig {
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    /// Validates the configuration and returns an error if invalid.
    ///
    /// This checks:
    /// - The base URL is an absolute http(s) URL
    /// - The request timeout is non-zero and at most ten minutes
    /// - The event buffer holds at least one event
    pub fn validate(&self) -> Result<()> {
        let parsed = Url::parse(&self.api_base_url).map_err(|e| {
            Error::Config(format!("Invalid API base URL '{}': {}", self.api_base_url, e))
        })?;

        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(Error::Config(format!(
                "API base URL must use http or https, got '{}'",
                parsed.scheme()
            )));
        }

        if self.request_timeout.is_zero() {
            return Err(Error::Config(
                "Request timeout must be greater than zero".to_string(),
            ));
        }

        if self.request_timeout > MAX_REQUEST_TIMEOUT {
            return Err(Error::Config(
                "Request timeout exceeds maximum of 600 seconds".to_string(),
            ));
        }

        if self.event_buffer_size == 0 {
            return Err(Error::Config(
                "Event buffer size must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

/// Pick the base URL: explicit value, then environment, then default.
///
/// Blank values are skipped and a trailing slash is removed.
pub fn resolve_api_base_url(explicit: Option<&str>, from_env: Option<&str>) -> String {
    let chosen = [explicit, from_env]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|value| !value.is_empty())
        .unwrap_or(DEFAULT_API_BASE_URL);

    chosen.trim_end_matches('/').to_string()
}

#[cfg(not(feature = "desktop-shims"))]
fn capability_missing(capability: &str, purpose: &str) -> Error {
    Error::CapabilityMissing {
        capability: capability.to_string(),
        message: format!(
            "{capability} implementation is required for {purpose}. \
             Desktop: enable the 'desktop-shims' feature. \
             Web: inject the adapters returned by bridge_wasm::build_wasm_bridges."
        ),
    }
}

#[cfg(feature = "desktop-shims")]
fn provide_default_http_client(timeout: Duration) -> Result<Arc<dyn HttpClient>> {
    let client = bridge_desktop::ReqwestHttpClient::with_timeout(timeout)
        .map_err(|e| Error::Internal(format!("Failed to create default HttpClient: {}", e)))?;
    Ok(Arc::new(client))
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_http_client(_timeout: Duration) -> Result<Arc<dyn HttpClient>> {
    Err(capability_missing("HttpClient", "API requests"))
}

#[cfg(feature = "desktop-shims")]
fn provide_default_settings_store(path: Option<&PathBuf>) -> Result<Arc<dyn SettingsStore>> {
    let Some(path) = path else {
        tracing::warn!("No settings path configured; the session will not survive a restart");
        return Ok(Arc::new(bridge_traits::storage::MemorySettingsStore::new()));
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| {
            Error::Config(format!(
                "Cannot create settings directory {}: {}",
                parent.display(),
                e
            ))
        })?;
    }

    Ok(Arc::new(bridge_desktop::SqliteSettingsStore::open_lazy(path)))
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_settings_store(_path: Option<&PathBuf>) -> Result<Arc<dyn SettingsStore>> {
    Err(capability_missing("SettingsStore", "session persistence"))
}

#[cfg(feature = "desktop-shims")]
fn provide_default_timer() -> Result<Arc<dyn Timer>> {
    Ok(Arc::new(bridge_desktop::TokioTimer))
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_timer() -> Result<Arc<dyn Timer>> {
    Err(capability_missing("Timer", "polling workflows"))
}

/// Builder for [`ClientConfig`].
#[derive(Default)]
pub struct ClientConfigBuilder {
    api_base_url: Option<String>,
    request_timeout: Option<Duration>,
    event_buffer_size: Option<usize>,
    settings_path: Option<PathBuf>,
    http_client: Option<Arc<dyn HttpClient>>,
    settings_store: Option<Arc<dyn SettingsStore>>,
    timer: Option<Arc<dyn Timer>>,
}

impl ClientConfigBuilder {
    /// Sets the API origin, e.g. `http://localhost:8083`.
    pub fn api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = Some(url.into());
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    pub fn event_buffer_size(mut self, size: usize) -> Self {
        self.event_buffer_size = Some(size);
        self
    }

    /// Sets the SQLite file used by the desktop settings store.
    ///
    /// Ignored when a settings store is injected.
    pub fn settings_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.settings_path = Some(path.into());
        self
    }

    pub fn http_client(mut self, client: Arc<dyn HttpClient>) -> Self {
        self.http_client = Some(client);
        self
    }

    pub fn settings_store(mut self, store: Arc<dyn SettingsStore>) -> Self {
        self.settings_store = Some(store);
        self
    }

    pub fn timer(mut self, timer: Arc<dyn Timer>) -> Self {
        self.timer = Some(timer);
        self
    }

    /// Builds and validates the configuration.
    ///
    /// # Errors
    ///
    /// - [`Error::Config`] for invalid values
    /// - [`Error::CapabilityMissing`] when a bridge is absent and no default exists
    pub fn build(self) -> Result<ClientConfig> {
        let env_base = std::env::var(API_BASE_ENV).ok();
        let api_base_url = resolve_api_base_url(self.api_base_url.as_deref(), env_base.as_deref());
        let request_timeout = self.request_timeout.unwrap_or(DEFAULT_REQUEST_TIMEOUT);

        let http_client = match self.http_client {
            Some(client) => client,
            None => provide_default_http_client(request_timeout)?,
        };

        let settings_store = match self.settings_store {
            Some(store) => store,
            None => provide_default_settings_store(self.settings_path.as_ref())?,
        };

        let timer = match self.timer {
            Some(timer) => timer,
            None => provide_default_timer()?,
        };

        let config = ClientConfig {
            api_base_url,
            request_timeout,
            event_buffer_size: self.event_buffer_size.unwrap_or(DEFAULT_EVENT_BUFFER_SIZE),
            settings_path: self.settings_path,
            http_client,
            settings_store,
            timer,
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bridge_traits::error::Result as BridgeResult;
    use bridge_traits::http::{HttpRequest, HttpResponse};
    use bridge_traits::storage::MemorySettingsStore;

    struct NoopHttp;

    #[async_trait]
    impl HttpClient for NoopHttp {
        async fn execute(&self, _request: HttpRequest) -> BridgeResult<HttpResponse> {
            Ok(HttpResponse {
                status: 200,
                headers: Default::default(),
                body: Default::default(),
            })
        }
    }

    struct NoopTimer;

    #[async_trait]
    impl Timer for NoopTimer {
        async fn sleep(&self, _duration: Duration) {}
    }

    fn injected() -> ClientConfigBuilder {
        ClientConfig::builder()
            .http_client(Arc::new(NoopHttp))
            .settings_store(Arc::new(MemorySettingsStore::new()))
            .timer(Arc::new(NoopTimer))
    }

    #[test]
    fn test_resolve_api_base_url_precedence() {
        assert_eq!(
            resolve_api_base_url(Some("https://a.example/"), Some("https://b.example")),
            "https://a.example"
        );
        assert_eq!(
            resolve_api_base_url(None, Some("https://b.example")),
            "https://b.example"
        );
        assert_eq!(resolve_api_base_url(Some("  "), None), DEFAULT_API_BASE_URL);
        assert_eq!(resolve_api_base_url(None, None), DEFAULT_API_BASE_URL);
    }

    #[test]
    fn test_build_with_injected_bridges() {
        let config = injected()
            .api_base_url("https://plants.example.org/api/")
            .request_timeout(Duration::from_secs(5))
            .build()
            .unwrap();

        assert_eq!(config.api_base_url, "https://plants.example.org/api");
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert_eq!(config.event_buffer_size, DEFAULT_EVENT_BUFFER_SIZE);
    }

    #[test]
    fn test_rejects_bad_values() {
        let err = injected().api_base_url("ftp://plants").build().unwrap_err();
        assert!(matches!(err, Error::Config(_)));

        let err = injected().api_base_url("not a url").build().unwrap_err();
        assert!(matches!(err, Error::Config(_)));

        let err = injected()
            .request_timeout(Duration::ZERO)
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));

        let err = injected().event_buffer_size(0).build().unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[cfg(not(feature = "desktop-shims"))]
    #[test]
    fn test_missing_bridge_fails_fast() {
        let err = ClientConfig::builder()
            .settings_store(Arc::new(MemorySettingsStore::new()))
            .timer(Arc::new(NoopTimer))
            .build()
            .unwrap_err();

        match err {
            Error::CapabilityMissing { capability, .. } => assert_eq!(capability, "HttpClient"),
            other => panic!("expected CapabilityMissing, got {other:?}"),
        }
    }

    #[cfg(feature = "desktop-shims")]
    #[tokio::test]
    async fn test_desktop_defaults_persist_settings() {
        let base = std::env::temp_dir().join(format!(
            "core-runtime-test-{}",
            chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default()
        ));
        let config = ClientConfig::builder()
            .settings_path(base.join("settings.db"))
            .build()
            .expect("desktop defaults should succeed");

        config.settings_store.set_string("token", "t").await.unwrap();
        assert_eq!(
            config.settings_store.get_string("token").await.unwrap().as_deref(),
            Some("t")
        );

        drop(config);
        let _ = std::fs::remove_dir_all(&base);
    }
}
