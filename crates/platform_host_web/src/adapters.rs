//! Compile-time store selection for runtime wiring.

use platform_host::{AppStateEnvelope, AppStateStore, AppStateStoreFuture, MemoryAppStateStore};

use crate::WebLocalStateStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Host strategy selected for the active build target.
pub enum HostStrategy {
    /// `localStorage` adapters inside a browser tab.
    Browser,
    /// Process-local memory adapters for native builds and tests.
    Memory,
}

/// Returns the host strategy for the active build target.
pub const fn selected_host_strategy() -> HostStrategy {
    #[cfg(target_arch = "wasm32")]
    {
        HostStrategy::Browser
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        HostStrategy::Memory
    }
}

/// Returns the selected host strategy as a stable string token.
pub fn host_strategy_name() -> &'static str {
    match selected_host_strategy() {
        HostStrategy::Browser => "browser",
        HostStrategy::Memory => "memory",
    }
}

/// Store adapter erasing the concrete backend behind [`AppStateStore`].
#[derive(Debug, Clone)]
pub enum AppStateStoreAdapter {
    /// Browser `localStorage` persistence.
    Browser(WebLocalStateStore),
    /// In-memory persistence that lasts for the process.
    Memory(MemoryAppStateStore),
}

impl AppStateStore for AppStateStoreAdapter {
    fn load_app_state_envelope<'a>(
        &'a self,
        namespace: &'a str,
    ) -> AppStateStoreFuture<'a, Result<Option<AppStateEnvelope>, String>> {
        match self {
            Self::Browser(store) => store.load_app_state_envelope(namespace),
            Self::Memory(store) => store.load_app_state_envelope(namespace),
        }
    }

    fn save_app_state_envelope<'a>(
        &'a self,
        envelope: &'a AppStateEnvelope,
    ) -> AppStateStoreFuture<'a, Result<(), String>> {
        match self {
            Self::Browser(store) => store.save_app_state_envelope(envelope),
            Self::Memory(store) => store.save_app_state_envelope(envelope),
        }
    }

    fn delete_app_state<'a>(
        &'a self,
        namespace: &'a str,
    ) -> AppStateStoreFuture<'a, Result<(), String>> {
        match self {
            Self::Browser(store) => store.delete_app_state(namespace),
            Self::Memory(store) => store.delete_app_state(namespace),
        }
    }
}

/// Builds the app-state store for the selected host strategy.
pub fn app_state_store() -> AppStateStoreAdapter {
    match selected_host_strategy() {
        HostStrategy::Browser => AppStateStoreAdapter::Browser(WebLocalStateStore),
        HostStrategy::Memory => AppStateStoreAdapter::Memory(MemoryAppStateStore::default()),
    }
}
