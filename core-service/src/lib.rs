//! Core service façade and bootstrap helpers.
//!
//! This crate wires host-provided bridge implementations (HTTP, settings
//! storage, timer) into the client core and hands back a [`PlantClient`].
//! Desktop apps typically enable the `desktop-shims` feature (which lets
//! [`ClientConfig::builder`] fall back to `bridge-desktop`), whereas
//! WebAssembly builds enable the `wasm` feature and rely on the adapters from
//! `bridge-wasm`.
//!
//! ```ignore
//! use core_service::{ClientConfig, PlantClient};
//!
//! let client = PlantClient::bootstrap(ClientConfig::builder().build()?).await?;
//! let signed_in = client.login("inspector", "secret").await?;
//! if signed_in.success {
//!     let plants = client.wrapper()
//!         .call(client.plants().list(), &Default::default())
//!         .await?;
//! }
//! ```

pub mod client;
pub mod error;

pub use client::PlantClient;
pub use core_runtime::config::ClientConfig;
pub use error::{CoreError, Result};

#[cfg(feature = "wasm")]
pub use bridge_wasm::WasmBridgeConfig;
#[cfg(feature = "wasm")]
use bridge_wasm::build_wasm_bridges;

/// Convenience bootstrapper for WebAssembly hosts.
///
/// ```
/// # #[cfg(feature = "wasm")]
/// # async fn example() -> core_service::Result<()> {
/// use core_service::{bootstrap_wasm, WasmBridgeConfig};
///
/// let config = WasmBridgeConfig::default();
/// let client = bootstrap_wasm(config, Some("https://plants.example.org/api")).await?;
/// let decision = client.check_route("/map");
/// # Ok(())
/// # }
/// ```
#[cfg(feature = "wasm")]
pub async fn bootstrap_wasm(config: WasmBridgeConfig, api_base_url: Option<&str>) -> Result<PlantClient> {
    let timeout = config.request_timeout;
    let bridges =
        build_wasm_bridges(config).map_err(|err| CoreError::InitializationFailed(err.to_string()))?;

    let mut builder = ClientConfig::builder()
        .http_client(bridges.http())
        .settings_store(bridges.settings_store())
        .timer(bridges.timer())
        .request_timeout(timeout);
    if let Some(url) = api_base_url {
        builder = builder.api_base_url(url);
    }

    PlantClient::bootstrap(builder.build()?).await
}
