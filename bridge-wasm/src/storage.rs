//! `localStorage`-backed implementation of the settings bridge.
//!
//! Keys are scoped as `{namespace}::settings::{key}` so several host shells can
//! share an origin. An empty namespace stores keys verbatim, which lets the
//! client read a session written by an older page on the same origin.

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result as BridgeResult},
    storage::SettingsStore,
};
use wasm_bindgen::{JsCast, JsValue};

const SETTINGS_PREFIX: &str = "settings";

fn js_error(context: &str, err: JsValue) -> BridgeError {
    let message = if err.is_string() {
        err.as_string().unwrap_or_default()
    } else if let Some(js_err) = err.dyn_ref::<js_sys::Error>() {
        js_err.message().into()
    } else {
        format!("{err:?}")
    };
    BridgeError::Storage(format!("wasm storage {context}: {message}"))
}

fn local_storage() -> BridgeResult<web_sys::Storage> {
    let window = web_sys::window().ok_or_else(|| BridgeError::NotAvailable("window".into()))?;
    window
        .local_storage()
        .map_err(|err| js_error("localStorage", err))?
        .ok_or_else(|| BridgeError::NotAvailable("localStorage".into()))
}

#[derive(Clone)]
/// Browser-backed settings store (plain-text key/value pairs).
pub struct WasmSettingsStore {
    storage: web_sys::Storage,
    prefix: String,
}

impl WasmSettingsStore {
    /// Construct a new settings store scoped to the provided namespace.
    pub fn new(namespace: impl Into<String>) -> BridgeResult<Self> {
        let namespace = namespace.into();
        let prefix = if namespace.is_empty() {
            String::new()
        } else {
            format!("{namespace}::{SETTINGS_PREFIX}::")
        };
        Ok(Self {
            storage: local_storage()?,
            prefix,
        })
    }

    fn key_for(&self, key: &str) -> String {
        format!("{}{}", self.prefix, key)
    }
}

#[async_trait(?Send)]
impl SettingsStore for WasmSettingsStore {
    async fn set_string(&self, key: &str, value: &str) -> BridgeResult<()> {
        self.storage
            .set_item(&self.key_for(key), value)
            .map_err(|err| js_error("set setting", err))
    }

    async fn get_string(&self, key: &str) -> BridgeResult<Option<String>> {
        self.storage
            .get_item(&self.key_for(key))
            .map_err(|err| js_error("get setting", err))
    }

    async fn delete(&self, key: &str) -> BridgeResult<()> {
        self.storage
            .remove_item(&self.key_for(key))
            .map_err(|err| js_error("remove setting", err))
    }

    async fn list_keys(&self) -> BridgeResult<Vec<String>> {
        list_prefixed_keys(&self.storage, &self.prefix)
    }

    async fn clear_all(&self) -> BridgeResult<()> {
        let keys = self.list_keys().await?;
        for key in keys {
            self.storage
                .remove_item(&self.key_for(&key))
                .map_err(|err| js_error("clear setting", err))?;
        }
        Ok(())
    }
}

fn list_prefixed_keys(storage: &web_sys::Storage, prefix: &str) -> BridgeResult<Vec<String>> {
    let len = storage
        .length()
        .map_err(|err| js_error("storage length", err))?;
    let mut keys = Vec::new();
    for idx in 0..len {
        if let Some(entry) = storage
            .key(idx)
            .map_err(|err| js_error("storage key", err))?
        {
            if let Some(stripped) = entry.strip_prefix(prefix) {
                keys.push(stripped.to_string());
            }
        }
    }
    Ok(keys)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test::wasm_bindgen_test_configure!(run_in_browser);

    fn unique_namespace(prefix: &str) -> String {
        format!("{prefix}-{}", js_sys::Date::now())
    }

    #[wasm_bindgen_test]
    async fn settings_store_roundtrip() {
        console_error_panic_hook::set_once();
        let store = WasmSettingsStore::new(unique_namespace("settings")).expect("settings store init");

        store.set_string("token", "opaque").await.expect("set token");
        store
            .set_string("userInfo", r#"{"username":"ops"}"#)
            .await
            .expect("set profile");

        assert_eq!(
            store.get_string("token").await.expect("get token"),
            Some("opaque".to_string())
        );

        let keys = store.list_keys().await.expect("list keys");
        assert!(keys.contains(&"token".to_string()));
        assert!(keys.contains(&"userInfo".to_string()));

        store.delete("token").await.expect("delete token");
        assert!(!store.has_key("token").await.expect("has token"));

        store.clear_all().await.expect("clear settings");
        assert!(store.list_keys().await.expect("list cleared").is_empty());
    }
}
