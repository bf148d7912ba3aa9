//! Window-layout persistence: the stored payload, rehydration normalization, and the debounced
//! save-on-change observer.

use std::{
    cell::RefCell,
    collections::{BTreeMap, BTreeSet},
    rc::Rc,
};

use desktop_app_contract::app_descriptor;
use platform_host::{
    build_app_state_envelope, decode_envelope_payload, AppStateStore, APP_STATE_ENVELOPE_VERSION,
    WINDOW_LAYOUT_NAMESPACE,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    lifecycle::Clock,
    model::{WindowId, WindowLifecycle, WindowManagerState, WindowRecord, WindowSnap},
    window_manager::{SubscriptionId, WindowManager},
};

/// Schema version of [`PersistedWindowLayout`].
pub const WINDOW_LAYOUT_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PersistenceError {
    #[error("layout storage failed: {0}")]
    Storage(String),
    #[error("stored layout is malformed: {0}")]
    Malformed(String),
}

/// Stored shape of the window registry.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersistedWindowLayout {
    pub windows: BTreeMap<WindowId, WindowRecord>,
    pub order: Vec<WindowId>,
    pub active_id: Option<WindowId>,
    pub next_z: u64,
}

impl From<&WindowManagerState> for PersistedWindowLayout {
    fn from(state: &WindowManagerState) -> Self {
        Self {
            windows: state.windows.clone(),
            order: state.order.clone(),
            active_id: state.active_id.clone(),
            next_z: state.next_z,
        }
    }
}

/// Turns a stored layout into a consistent registry.
///
/// Every lifecycle becomes `Normal`. Order and registry are reconciled, stale restore
/// rectangles and duplicate singletons are dropped, z-indices are made unique, the counter is
/// raised above all of them, and focus is cleared unless it names a visible window.
pub fn rehydrate(layout: PersistedWindowLayout) -> WindowManagerState {
    let PersistedWindowLayout {
        windows,
        order,
        active_id,
        next_z,
    } = layout;

    let mut windows = windows
        .into_iter()
        .map(|(id, mut record)| {
            record.id = id.clone();
            record.lifecycle = WindowLifecycle::Normal;
            if !record.maximized && record.snap == WindowSnap::None {
                record.restore_rect = None;
            }
            (id, record)
        })
        .collect::<BTreeMap<_, _>>();

    let mut seen = BTreeSet::new();
    let mut order = order
        .into_iter()
        .filter(|id| windows.contains_key(id) && seen.insert(id.clone()))
        .collect::<Vec<_>>();
    for id in windows.keys() {
        if !seen.contains(id) {
            order.push(id.clone());
        }
    }

    let mut singletons = BTreeSet::new();
    order.retain(|id| {
        let Some(record) = windows.get(id) else {
            return false;
        };
        if app_descriptor(record.app_kind).singleton && !singletons.insert(record.app_kind) {
            leptos::logging::warn!("dropping duplicate {} window {id} from stored layout", record.app_kind);
            windows.remove(id);
            return false;
        }
        true
    });

    let mut by_z = windows
        .values()
        .map(|w| (w.z_index, w.id.clone()))
        .collect::<Vec<_>>();
    by_z.sort();
    let mut last_z = None::<u64>;
    for (z, id) in by_z {
        let z = match last_z {
            Some(last) if z <= last => last + 1,
            _ => z,
        };
        if let Some(record) = windows.get_mut(&id) {
            record.z_index = z;
        }
        last_z = Some(z);
    }

    let floor = WindowManagerState::default().next_z;
    let next_z = last_z
        .map_or(next_z, |max| next_z.max(max + 1))
        .max(floor);
    let active_id = active_id.filter(|id| windows.get(id).is_some_and(|w| !w.minimized));

    WindowManagerState {
        windows,
        order,
        active_id,
        next_z,
    }
}

/// Writes `state` under the window-layout namespace.
pub async fn persist_layout<S: AppStateStore + ?Sized>(
    store: &S,
    state: &WindowManagerState,
) -> Result<(), PersistenceError> {
    let envelope = build_app_state_envelope(
        WINDOW_LAYOUT_NAMESPACE,
        WINDOW_LAYOUT_SCHEMA_VERSION,
        &PersistedWindowLayout::from(state),
    )
    .map_err(PersistenceError::Malformed)?;
    store
        .save_app_state_envelope(&envelope)
        .await
        .map_err(PersistenceError::Storage)
}

/// Loads and rehydrates the stored layout. Unknown schema versions yield `Ok(None)`.
pub async fn load_layout<S: AppStateStore + ?Sized>(
    store: &S,
) -> Result<Option<WindowManagerState>, PersistenceError> {
    let Some(envelope) = store
        .load_app_state_envelope(WINDOW_LAYOUT_NAMESPACE)
        .await
        .map_err(PersistenceError::Storage)?
    else {
        return Ok(None);
    };
    if envelope.envelope_version != APP_STATE_ENVELOPE_VERSION
        || envelope.schema_version != WINDOW_LAYOUT_SCHEMA_VERSION
    {
        leptos::logging::warn!(
            "discarding stored layout with schema {} (envelope {})",
            envelope.schema_version,
            envelope.envelope_version
        );
        return Ok(None);
    }

    let layout = decode_envelope_payload::<PersistedWindowLayout>(&envelope)
        .map_err(PersistenceError::Malformed)?;
    Ok(Some(rehydrate(layout)))
}

/// [`load_layout`] that logs failures and falls back to an empty registry.
pub async fn load_layout_or_default<S: AppStateStore + ?Sized>(store: &S) -> WindowManagerState {
    match load_layout(store).await {
        Ok(Some(state)) => state,
        Ok(None) => WindowManagerState::default(),
        Err(err) => {
            leptos::logging::warn!("window layout load failed: {err}");
            WindowManagerState::default()
        }
    }
}

/// Best-effort save; failures are logged and dropped.
pub async fn persist_layout_logged<S: AppStateStore + ?Sized>(store: &S, state: &WindowManagerState) {
    if let Err(err) = persist_layout(store, state).await {
        leptos::logging::warn!("window layout persist failed: {err}");
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct PendingLayout {
    state: WindowManagerState,
    version: u64,
    due_at_ms: u64,
}

/// Coalesces layout changes and releases the newest one after a quiet period.
pub struct LayoutPersister {
    clock: Rc<dyn Clock>,
    debounce_ms: u64,
    pending: Option<PendingLayout>,
    last_flushed_version: Option<u64>,
}

impl std::fmt::Debug for LayoutPersister {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LayoutPersister")
            .field("debounce_ms", &self.debounce_ms)
            .field("pending", &self.pending.as_ref().map(|p| (p.version, p.due_at_ms)))
            .field("last_flushed_version", &self.last_flushed_version)
            .finish()
    }
}

impl LayoutPersister {
    pub fn new(clock: Rc<dyn Clock>, debounce_ms: u64) -> Self {
        Self {
            clock,
            debounce_ms,
            pending: None,
            last_flushed_version: None,
        }
    }

    /// Subscribes `persister` to every change of `wm`.
    pub fn observe_manager(persister: &Rc<RefCell<Self>>, wm: &mut WindowManager) -> SubscriptionId {
        let persister = Rc::clone(persister);
        wm.subscribe(move |state, version| persister.borrow_mut().observe(state, version))
    }

    /// Records a change and restarts the quiet period.
    pub fn observe(&mut self, state: &WindowManagerState, version: u64) {
        self.pending = Some(PendingLayout {
            state: state.clone(),
            version,
            due_at_ms: self.clock.now_ms().saturating_add(self.debounce_ms),
        });
    }

    pub fn pending_due_at(&self) -> Option<u64> {
        self.pending.as_ref().map(|p| p.due_at_ms)
    }

    pub fn is_due(&self) -> bool {
        self.pending
            .as_ref()
            .is_some_and(|p| p.due_at_ms <= self.clock.now_ms())
    }

    pub fn last_flushed_version(&self) -> Option<u64> {
        self.last_flushed_version
    }

    /// Takes the pending layout if its quiet period has elapsed.
    pub fn take_due(&mut self) -> Option<WindowManagerState> {
        if self.is_due() {
            self.take_now()
        } else {
            None
        }
    }

    /// Takes the pending layout regardless of timing, for unload handlers.
    pub fn take_now(&mut self) -> Option<WindowManagerState> {
        let pending = self.pending.take()?;
        self.last_flushed_version = Some(pending.version);
        Some(pending.state)
    }

    /// Saves the pending layout if it is due.
    pub async fn flush_if_due<S: AppStateStore + ?Sized>(&mut self, store: &S) -> bool {
        match self.take_due() {
            Some(state) => {
                persist_layout_logged(store, &state).await;
                true
            }
            None => false,
        }
    }

    /// Saves the pending layout immediately.
    pub async fn flush_now<S: AppStateStore + ?Sized>(&mut self, store: &S) -> bool {
        match self.take_now() {
            Some(state) => {
                persist_layout_logged(store, &state).await;
                true
            }
            None => false,
        }
    }
}
