//! Leptos context wiring the [`WindowManager`] into reactive signals.
//!
//! The manager stays the single writer. Components call [`DesktopRuntimeContext::with_manager`]
//! and the context mirrors the new state into signals once the borrow is released, arms the
//! lifecycle timers the store asked for, and schedules the debounced layout save.
#![allow(clippy::clone_on_copy)]

use std::{
    cell::{Cell, RefCell},
    collections::HashMap,
    rc::Rc,
};

use desktop_app_contract::AppKind;
use leptos::*;
use platform_host_web::{AppStateStoreAdapter, TimeoutHandle};

use crate::{
    compositor,
    config::WindowManagerConfig,
    desktop::{load_icon_layout, persist_icon_layout, DesktopIconLayout},
    geometry::{Viewport, WorkArea},
    lifecycle::{Clock, SystemClock, TransitionTicket},
    model::{WindowId, WindowManagerState, WindowRecord},
    persistence::{load_layout_or_default, persist_layout_logged, LayoutPersister},
    window_manager::WindowManager,
};

#[derive(Clone, Copy)]
/// Leptos context for reading window-manager state and issuing window operations.
pub struct DesktopRuntimeContext {
    manager: StoredValue<Rc<RefCell<WindowManager>>>,
    persister: StoredValue<Rc<RefCell<LayoutPersister>>>,
    store: StoredValue<AppStateStoreAdapter>,
    transition_timers: StoredValue<Rc<RefCell<HashMap<WindowId, (u64, TimeoutHandle)>>>>,
    layout_timer: StoredValue<Rc<Cell<Option<TimeoutHandle>>>>,
    /// Mirror of the registry, refreshed after every change.
    pub state: RwSignal<WindowManagerState>,
    /// Store version matching [`Self::state`].
    pub version: RwSignal<u64>,
    /// Render-ordered visible windows.
    pub visible_windows: Memo<Vec<WindowRecord>>,
    /// Desktop icon positions.
    pub icons: RwSignal<DesktopIconLayout>,
    /// Window whose content should take keyboard focus next.
    pub input_focus: RwSignal<Option<WindowId>>,
}

impl DesktopRuntimeContext {
    /// Builds the context inside the current reactive owner.
    pub fn new(config: WindowManagerConfig, store: AppStateStoreAdapter) -> Self {
        let clock: Rc<dyn Clock> = Rc::new(SystemClock);
        Self::with_clock(config, store, clock)
    }

    pub fn with_clock(
        config: WindowManagerConfig,
        store: AppStateStoreAdapter,
        clock: Rc<dyn Clock>,
    ) -> Self {
        let debounce_ms = config.persist_debounce_ms;
        let mut manager = WindowManager::with_clock(config, Rc::clone(&clock));
        let (width, height) = platform_host_web::inner_size();
        manager.set_viewport(Viewport { width, height });

        let persister = Rc::new(RefCell::new(LayoutPersister::new(clock, debounce_ms)));
        LayoutPersister::observe_manager(&persister, &mut manager);

        let state = create_rw_signal(manager.state().clone());
        let version = create_rw_signal(manager.version());
        let visible_windows = create_memo(move |_| state.with(compositor::visible_windows));

        Self {
            manager: store_value(Rc::new(RefCell::new(manager))),
            persister: store_value(persister),
            store: store_value(store),
            transition_timers: store_value(Rc::default()),
            layout_timer: store_value(Rc::default()),
            state,
            version,
            visible_windows,
            icons: create_rw_signal(DesktopIconLayout::default()),
            input_focus: create_rw_signal(None),
        }
    }

    /// Runs `f` against the manager, then publishes whatever it changed.
    pub fn with_manager<R>(&self, f: impl FnOnce(&mut WindowManager) -> R) -> R {
        let manager = self.manager.get_value();
        let (result, snapshot, tickets, focus, now_ms) = {
            let mut wm = manager.borrow_mut();
            let result = f(&mut wm);
            let snapshot = (wm.version() != self.version.get_untracked())
                .then(|| (wm.state().clone(), wm.version()));
            (
                result,
                snapshot,
                wm.drain_armed_tickets(),
                wm.take_input_focus_request(),
                wm.now_ms(),
            )
        };

        if let Some((state, version)) = snapshot {
            self.state.set(state);
            self.version.set(version);
            self.schedule_layout_flush();
        }
        if focus.is_some() {
            self.input_focus.set(focus);
        }
        for ticket in tickets {
            self.arm_transition(ticket, now_ms);
        }
        result
    }

    pub fn open_app(&self, kind: AppKind) -> WindowId {
        self.with_manager(|wm| wm.open_app(kind))
    }

    pub fn close_window(&self, window_id: &WindowId) {
        self.with_manager(|wm| wm.close_window(window_id));
    }

    pub fn focus_window(&self, window_id: &WindowId) {
        self.with_manager(|wm| wm.focus_window(window_id));
    }

    pub fn work_area(&self) -> WorkArea {
        self.manager.get_value().borrow().work_area()
    }

    pub fn animations_enabled(&self) -> bool {
        self.manager.get_value().borrow().config().animation_ms > 0
    }

    /// Re-reads the browser viewport.
    pub fn sync_viewport(&self) {
        let (width, height) = platform_host_web::inner_size();
        self.with_manager(|wm| wm.set_viewport(Viewport { width, height }));
    }

    /// Replaces the icon layout and saves it.
    pub fn update_icons(&self, f: impl FnOnce(&mut DesktopIconLayout)) {
        self.icons.update(f);
        let layout = self.icons.get_untracked();
        let store = self.store.get_value();
        platform_host_web::spawn_local(async move {
            persist_icon_layout(&store, &layout).await;
        });
    }

    /// Saves any pending layout right away, for unload handlers.
    pub fn flush_layout_now(&self) {
        let pending = self.persister.get_value().borrow_mut().take_now();
        if let Some(state) = pending {
            let store = self.store.get_value();
            platform_host_web::spawn_local(async move {
                persist_layout_logged(&store, &state).await;
            });
        }
    }

    fn flush_layout_if_due(&self) {
        let due = self.persister.get_value().borrow_mut().take_due();
        if let Some(state) = due {
            let store = self.store.get_value();
            platform_host_web::spawn_local(async move {
                persist_layout_logged(&store, &state).await;
            });
        }
    }

    fn schedule_layout_flush(&self) {
        let persister = self.persister.get_value();
        let Some(due_at) = persister.borrow().pending_due_at() else {
            return;
        };
        let now_ms = self.manager_now_ms();
        let delay = u32::try_from(due_at.saturating_sub(now_ms)).unwrap_or(u32::MAX);
        let slot = self.layout_timer.get_value();
        if let Some(previous) = slot.take() {
            platform_host_web::clear_timeout(previous);
        }
        let runtime = self.clone();
        let fired = Rc::clone(&slot);
        match platform_host_web::set_timeout(delay, move || {
            fired.set(None);
            runtime.flush_layout_if_due();
        }) {
            Ok(handle) => slot.set(Some(handle)),
            Err(err) => logging::debug_warn!("layout save timer unavailable: {err}"),
        }
    }

    fn manager_now_ms(&self) -> u64 {
        self.manager.get_value().borrow().now_ms()
    }

    /// Arms the browser timer for `ticket`, dropping the timer of the ticket it replaced.
    fn arm_transition(&self, ticket: TransitionTicket, now_ms: u64) {
        let delay = u32::try_from(ticket.due_at_ms.saturating_sub(now_ms)).unwrap_or(u32::MAX);
        let timers = self.transition_timers.get_value();
        if let Some((_, previous)) = timers.borrow_mut().remove(&ticket.window_id) {
            platform_host_web::clear_timeout(previous);
        }

        let runtime = self.clone();
        let window_id = ticket.window_id.clone();
        let generation = ticket.generation;
        let fired = Rc::clone(&timers);
        let armed = platform_host_web::set_timeout(delay, move || {
            {
                let mut timers = fired.borrow_mut();
                if timers.get(&ticket.window_id).is_some_and(|(g, _)| *g == ticket.generation) {
                    timers.remove(&ticket.window_id);
                }
            }
            runtime.with_manager(|wm| wm.settle_ticket(&ticket));
        });
        match armed {
            Ok(handle) => {
                timers.borrow_mut().insert(window_id, (generation, handle));
            }
            Err(err) => logging::debug_warn!("lifecycle timer unavailable: {err}"),
        }
    }

    /// Loads the saved window layout and icon positions into the running context.
    pub async fn hydrate_from_store(self) {
        let store = self.store.get_value();
        let layout = load_layout_or_default(&store).await;
        self.with_manager(|wm| wm.hydrate(layout));
        let icons = load_icon_layout(&store).await;
        self.icons.set(icons);
    }
}

/// Creates the runtime context, provides it to descendants, and starts boot hydration.
pub fn provide_desktop_runtime(
    config: WindowManagerConfig,
    store: AppStateStoreAdapter,
) -> DesktopRuntimeContext {
    let runtime = DesktopRuntimeContext::new(config, store);
    provide_context(runtime);
    platform_host_web::spawn_local(runtime.hydrate_from_store());

    #[cfg(target_arch = "wasm32")]
    {
        let resize = window_event_listener(ev::resize, move |_| runtime.sync_viewport());
        let unload = window_event_listener(ev::beforeunload, move |_| runtime.flush_layout_now());
        on_cleanup(move || {
            resize.remove();
            unload.remove();
        });
    }

    runtime
}

/// Returns the current [`DesktopRuntimeContext`].
///
/// # Panics
///
/// Panics if called outside [`provide_desktop_runtime`].
pub fn use_desktop_runtime() -> DesktopRuntimeContext {
    use_context::<DesktopRuntimeContext>().expect("DesktopRuntimeContext not provided")
}

#[cfg(test)]
mod tests {
    use platform_host::MemoryAppStateStore;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::lifecycle::ManualClock;

    fn memory_runtime(clock: &ManualClock) -> DesktopRuntimeContext {
        DesktopRuntimeContext::with_clock(
            WindowManagerConfig::default(),
            AppStateStoreAdapter::Memory(MemoryAppStateStore::default()),
            Rc::new(clock.clone()),
        )
    }

    #[test]
    fn signals_follow_manager_changes() {
        let runtime = create_runtime();
        let clock = ManualClock::new(0);
        let ctx = memory_runtime(&clock);

        let id = ctx.open_app(AppKind::Notes);
        assert_eq!(ctx.version.get_untracked(), 1);
        assert_eq!(ctx.state.get_untracked().active_id, Some(id.clone()));
        assert_eq!(ctx.input_focus.get_untracked(), Some(id.clone()));
        assert_eq!(
            ctx.visible_windows
                .get_untracked()
                .into_iter()
                .map(|w| w.id)
                .collect::<Vec<_>>(),
            vec![id.clone()]
        );

        clock.advance(500);
        ctx.with_manager(|wm| wm.run_due_transitions());
        ctx.with_manager(|wm| wm.minimize_window(&id));
        clock.advance(500);
        ctx.with_manager(|wm| wm.run_due_transitions());
        assert!(ctx.visible_windows.get_untracked().is_empty());

        runtime.dispose();
    }

    #[test]
    fn hydrate_loads_saved_layout() {
        let runtime = create_runtime();
        let clock = ManualClock::new(0);
        let store = MemoryAppStateStore::default();

        let mut saved = WindowManager::with_clock(
            WindowManagerConfig::default(),
            Rc::new(clock.clone()),
        );
        let id = saved.open_app(AppKind::Terminal);
        futures::executor::block_on(crate::persistence::persist_layout(&store, saved.state()))
            .expect("persist");

        let ctx = DesktopRuntimeContext::with_clock(
            WindowManagerConfig::default(),
            AppStateStoreAdapter::Memory(store),
            Rc::new(clock),
        );
        futures::executor::block_on(ctx.hydrate_from_store());
        let state = ctx.state.get_untracked();
        assert_eq!(state.order, vec![id]);
        assert!(state.check_invariants().is_empty());

        runtime.dispose();
    }
}
