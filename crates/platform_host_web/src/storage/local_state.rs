//! `localStorage`-backed app-state store.
//!
//! The browser API is synchronous; the [`AppStateStore`] futures resolve immediately. Each
//! namespace is one `localStorage` key holding the serialized [`AppStateEnvelope`].

use platform_host::{AppStateEnvelope, AppStateStore, AppStateStoreFuture};

#[derive(Debug, Clone, Copy, Default)]
/// App-state store backed by `window.localStorage`.
pub struct WebLocalStateStore;

impl WebLocalStateStore {
    /// Reads the raw JSON text stored under `key`.
    pub fn load_raw(self, key: &str) -> Option<String> {
        #[cfg(target_arch = "wasm32")]
        {
            let storage = web_sys::window()?.local_storage().ok().flatten()?;
            storage.get_item(key).ok().flatten()
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            let _ = key;
            None
        }
    }

    /// Writes raw JSON text under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error when localStorage is unavailable or rejects the write (quota, privacy
    /// mode).
    pub fn save_raw(self, key: &str, raw_json: &str) -> Result<(), String> {
        #[cfg(target_arch = "wasm32")]
        {
            let storage = web_sys::window()
                .and_then(|w| w.local_storage().ok().flatten())
                .ok_or_else(|| "localStorage unavailable".to_string())?;
            storage
                .set_item(key, raw_json)
                .map_err(|e| format!("localStorage set_item failed: {e:?}"))
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            let _ = (key, raw_json);
            Err("localStorage is only available on wasm32".to_string())
        }
    }

    /// Removes `key`.
    ///
    /// # Errors
    ///
    /// Returns an error when localStorage is unavailable or the removal fails.
    pub fn remove_raw(self, key: &str) -> Result<(), String> {
        #[cfg(target_arch = "wasm32")]
        {
            let storage = web_sys::window()
                .and_then(|w| w.local_storage().ok().flatten())
                .ok_or_else(|| "localStorage unavailable".to_string())?;
            storage
                .remove_item(key)
                .map_err(|e| format!("localStorage remove_item failed: {e:?}"))
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            let _ = key;
            Ok(())
        }
    }
}

/// Parses stored envelope text; text that is not an envelope reads as absent.
pub fn parse_envelope(raw: &str) -> Option<AppStateEnvelope> {
    serde_json::from_str(raw).ok()
}

impl AppStateStore for WebLocalStateStore {
    fn load_app_state_envelope<'a>(
        &'a self,
        namespace: &'a str,
    ) -> AppStateStoreFuture<'a, Result<Option<AppStateEnvelope>, String>> {
        let store = *self;
        Box::pin(async move { Ok(store.load_raw(namespace).as_deref().and_then(parse_envelope)) })
    }

    fn save_app_state_envelope<'a>(
        &'a self,
        envelope: &'a AppStateEnvelope,
    ) -> AppStateStoreFuture<'a, Result<(), String>> {
        let store = *self;
        Box::pin(async move {
            let raw = serde_json::to_string(envelope).map_err(|e| e.to_string())?;
            store.save_raw(&envelope.namespace, &raw)
        })
    }

    fn delete_app_state<'a>(
        &'a self,
        namespace: &'a str,
    ) -> AppStateStoreFuture<'a, Result<(), String>> {
        let store = *self;
        Box::pin(async move { store.remove_raw(namespace) })
    }
}

#[cfg(test)]
mod tests {
    use futures::executor::block_on;
    use serde_json::json;

    use super::*;

    #[test]
    fn parse_envelope_rejects_foreign_text() {
        assert!(parse_envelope("not json").is_none());
        assert!(parse_envelope("{\"windows\":{}}").is_none());

        let envelope = AppStateEnvelope::new("web-os:windows", 1, json!({"order": []}));
        let raw = serde_json::to_string(&envelope).expect("serialize");
        assert_eq!(parse_envelope(&raw), Some(envelope));
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn native_build_loads_nothing_and_reports_write_failures() {
        let store = WebLocalStateStore;
        assert_eq!(
            block_on(store.load_app_state_envelope("web-os:windows")).expect("load"),
            None
        );
        let envelope = AppStateEnvelope::new("web-os:windows", 1, json!({}));
        assert!(block_on(store.save_app_state_envelope(&envelope)).is_err());
    }
}
