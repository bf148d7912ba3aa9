//! Versioned app-state envelopes and the async store contract that persists them.

use std::{cell::RefCell, collections::HashMap, future::Future, pin::Pin, rc::Rc};

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;

/// Version of the [`AppStateEnvelope`] wrapper itself.
pub const APP_STATE_ENVELOPE_VERSION: u32 = 1;
/// Namespace holding the window-manager registry layout.
pub const WINDOW_LAYOUT_NAMESPACE: &str = "web-os:windows";
/// Namespace holding desktop icon positions.
pub const DESKTOP_ICONS_NAMESPACE: &str = "web-os:desktop";
/// Namespace holding window-manager tuning overrides.
pub const WINDOW_MANAGER_CONFIG_NAMESPACE: &str = "web-os:wm-config";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// Versioned wrapper around a persisted JSON payload.
pub struct AppStateEnvelope {
    /// Wrapper schema version.
    pub envelope_version: u32,
    /// Owning namespace (storage key).
    pub namespace: String,
    /// Payload schema version chosen by the owner.
    pub schema_version: u32,
    /// Last write time in unix milliseconds.
    pub updated_at_unix_ms: u64,
    /// Payload body.
    pub payload: Value,
}

impl AppStateEnvelope {
    /// Wraps `payload` and stamps it with a monotonic write time.
    pub fn new(namespace: impl Into<String>, schema_version: u32, payload: Value) -> Self {
        Self {
            envelope_version: APP_STATE_ENVELOPE_VERSION,
            namespace: namespace.into(),
            schema_version,
            updated_at_unix_ms: crate::time::next_monotonic_timestamp_ms(),
            payload,
        }
    }
}

/// Boxed local future returned by [`AppStateStore`] methods.
pub type AppStateStoreFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// Durable storage for app-state envelopes keyed by namespace.
pub trait AppStateStore {
    /// Loads the envelope stored under `namespace`.
    fn load_app_state_envelope<'a>(
        &'a self,
        namespace: &'a str,
    ) -> AppStateStoreFuture<'a, Result<Option<AppStateEnvelope>, String>>;

    /// Replaces the envelope stored under its namespace.
    fn save_app_state_envelope<'a>(
        &'a self,
        envelope: &'a AppStateEnvelope,
    ) -> AppStateStoreFuture<'a, Result<(), String>>;

    /// Removes whatever is stored under `namespace`.
    fn delete_app_state<'a>(
        &'a self,
        namespace: &'a str,
    ) -> AppStateStoreFuture<'a, Result<(), String>>;
}

#[derive(Debug, Clone, Copy, Default)]
/// Store that keeps nothing; loads are always empty and writes always succeed.
pub struct NoopAppStateStore;

impl AppStateStore for NoopAppStateStore {
    fn load_app_state_envelope<'a>(
        &'a self,
        _namespace: &'a str,
    ) -> AppStateStoreFuture<'a, Result<Option<AppStateEnvelope>, String>> {
        Box::pin(async { Ok(None) })
    }

    fn save_app_state_envelope<'a>(
        &'a self,
        _envelope: &'a AppStateEnvelope,
    ) -> AppStateStoreFuture<'a, Result<(), String>> {
        Box::pin(async { Ok(()) })
    }

    fn delete_app_state<'a>(
        &'a self,
        _namespace: &'a str,
    ) -> AppStateStoreFuture<'a, Result<(), String>> {
        Box::pin(async { Ok(()) })
    }
}

#[derive(Debug, Clone, Default)]
/// Process-local store; clones share the same map.
pub struct MemoryAppStateStore {
    inner: Rc<RefCell<HashMap<String, AppStateEnvelope>>>,
}

impl MemoryAppStateStore {
    /// Number of namespaces currently held.
    pub fn len(&self) -> usize {
        self.inner.borrow().len()
    }

    /// Whether nothing has been saved yet.
    pub fn is_empty(&self) -> bool {
        self.inner.borrow().is_empty()
    }
}

impl AppStateStore for MemoryAppStateStore {
    fn load_app_state_envelope<'a>(
        &'a self,
        namespace: &'a str,
    ) -> AppStateStoreFuture<'a, Result<Option<AppStateEnvelope>, String>> {
        Box::pin(async move { Ok(self.inner.borrow().get(namespace).cloned()) })
    }

    fn save_app_state_envelope<'a>(
        &'a self,
        envelope: &'a AppStateEnvelope,
    ) -> AppStateStoreFuture<'a, Result<(), String>> {
        Box::pin(async move {
            self.inner
                .borrow_mut()
                .insert(envelope.namespace.clone(), envelope.clone());
            Ok(())
        })
    }

    fn delete_app_state<'a>(
        &'a self,
        namespace: &'a str,
    ) -> AppStateStoreFuture<'a, Result<(), String>> {
        Box::pin(async move {
            self.inner.borrow_mut().remove(namespace);
            Ok(())
        })
    }
}

/// Serializes `payload` into an envelope for `namespace`.
///
/// # Errors
///
/// Returns an error when `payload` cannot be converted to JSON.
pub fn build_app_state_envelope<T: Serialize>(
    namespace: &str,
    schema_version: u32,
    payload: &T,
) -> Result<AppStateEnvelope, String> {
    let payload = serde_json::to_value(payload).map_err(|e| e.to_string())?;
    Ok(AppStateEnvelope::new(namespace, schema_version, payload))
}

/// Decodes an envelope payload as `T`.
///
/// # Errors
///
/// Returns an error when the payload does not match `T`.
pub fn decode_envelope_payload<T: DeserializeOwned>(
    envelope: &AppStateEnvelope,
) -> Result<T, String> {
    serde_json::from_value(envelope.payload.clone()).map_err(|e| e.to_string())
}

/// Serializes and saves `payload` under `namespace`.
///
/// # Errors
///
/// Returns an error when serialization or the store write fails.
pub async fn save_app_state_with<S: AppStateStore + ?Sized, T: Serialize>(
    store: &S,
    namespace: &str,
    schema_version: u32,
    payload: &T,
) -> Result<(), String> {
    let envelope = build_app_state_envelope(namespace, schema_version, payload)?;
    store.save_app_state_envelope(&envelope).await
}

/// Loads `namespace` and decodes it, routing older schema versions through `migrate`.
///
/// Envelopes at `current_version` decode directly. Any other version is handed to `migrate`,
/// which may upgrade the payload or return `Ok(None)` to discard it.
///
/// # Errors
///
/// Returns an error when the store read, decode, or migration fails.
pub async fn load_app_state_with_migration<S, T, F>(
    store: &S,
    namespace: &str,
    current_version: u32,
    migrate: F,
) -> Result<Option<T>, String>
where
    S: AppStateStore + ?Sized,
    T: DeserializeOwned,
    F: Fn(u32, &AppStateEnvelope) -> Result<Option<T>, String>,
{
    let Some(envelope) = store.load_app_state_envelope(namespace).await? else {
        return Ok(None);
    };
    if envelope.envelope_version != APP_STATE_ENVELOPE_VERSION {
        return Ok(None);
    }
    if envelope.schema_version == current_version {
        return decode_envelope_payload(&envelope).map(Some);
    }
    migrate(envelope.schema_version, &envelope)
}

#[cfg(test)]
mod tests {
    use futures::executor::block_on;
    use pretty_assertions::assert_eq;
    use serde::Deserialize;
    use serde_json::json;

    use super::*;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Layout {
        count: u32,
    }

    #[test]
    fn envelope_serializes_with_snake_case_fields() {
        let envelope = AppStateEnvelope {
            envelope_version: APP_STATE_ENVELOPE_VERSION,
            namespace: WINDOW_LAYOUT_NAMESPACE.to_string(),
            schema_version: 3,
            updated_at_unix_ms: 99,
            payload: json!({"count": 1}),
        };
        let value = serde_json::to_value(&envelope).expect("serialize envelope");
        assert_eq!(value["namespace"], json!("web-os:windows"));
        assert_eq!(value["schema_version"], json!(3));
        assert_eq!(value["updated_at_unix_ms"], json!(99));
    }

    #[test]
    fn memory_store_round_trips_and_deletes() {
        let store = MemoryAppStateStore::default();
        block_on(save_app_state_with(&store, "ns", 1, &json!({"count": 4}))).expect("save");
        let loaded: Option<Layout> =
            block_on(load_app_state_with_migration(&store, "ns", 1, |_, _| Ok(None)))
                .expect("load");
        assert_eq!(loaded, Some(Layout { count: 4 }));

        block_on(store.delete_app_state("ns")).expect("delete");
        assert!(store.is_empty());
    }

    #[test]
    fn other_schema_versions_go_through_migration() {
        let store = MemoryAppStateStore::default();
        block_on(save_app_state_with(&store, "ns", 0, &json!({"legacy": 7}))).expect("save");

        let migrated: Option<Layout> = block_on(load_app_state_with_migration(
            &store,
            "ns",
            1,
            |version, envelope| {
                assert_eq!(version, 0);
                let legacy = envelope.payload["legacy"].as_u64().unwrap_or_default();
                Ok(Some(Layout {
                    count: legacy as u32,
                }))
            },
        ))
        .expect("load");
        assert_eq!(migrated, Some(Layout { count: 7 }));

        let discarded: Option<Layout> =
            block_on(load_app_state_with_migration(&store, "ns", 1, |_, _| Ok(None)))
                .expect("load");
        assert_eq!(discarded, None);
    }

    #[test]
    fn current_version_with_wrong_shape_is_an_error() {
        let store = MemoryAppStateStore::default();
        block_on(save_app_state_with(&store, "ns", 1, &json!({"count": "many"}))).expect("save");
        let result: Result<Option<Layout>, String> =
            block_on(load_app_state_with_migration(&store, "ns", 1, |_, _| Ok(None)));
        assert!(result.is_err());
    }

    #[test]
    fn noop_store_never_returns_data() {
        let store = NoopAppStateStore;
        block_on(save_app_state_with(&store, "ns", 1, &json!({}))).expect("save");
        assert_eq!(
            block_on(store.load_app_state_envelope("ns")).expect("load"),
            None
        );
    }
}
