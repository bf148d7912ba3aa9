//! Authoritative window-manager store: owns the registry, runs reducer actions, arms lifecycle
//! tickets, and notifies listeners after every change.

use std::rc::Rc;

use desktop_app_contract::{app_descriptor, AppKind};

use crate::{
    config::WindowManagerConfig,
    geometry::{Viewport, WorkArea},
    lifecycle::{Clock, SystemClock, TransitionScheduler, TransitionTicket},
    model::{WindowId, WindowManagerState, WindowRecord, WindowRectPatch, WindowSnap},
    reducer::{reduce_windows, ReducerContext, RuntimeEffect, WindowAction},
};

/// Handle returned by [`WindowManager::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(&WindowManagerState, u64)>;

/// Single-writer window registry.
///
/// Every public operation is a silent no-op when it does not apply (unknown id, maximized
/// window, animation in flight). Successful mutations bump [`WindowManager::version`] by one
/// and notify listeners in subscription order.
pub struct WindowManager {
    state: WindowManagerState,
    config: WindowManagerConfig,
    viewport: Viewport,
    clock: Rc<dyn Clock>,
    scheduler: TransitionScheduler,
    armed: Vec<TransitionTicket>,
    input_focus: Option<WindowId>,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: u64,
    version: u64,
}

impl std::fmt::Debug for WindowManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WindowManager")
            .field("state", &self.state)
            .field("viewport", &self.viewport)
            .field("pending_transitions", &self.scheduler.len())
            .field("listeners", &self.listeners.len())
            .field("version", &self.version)
            .finish()
    }
}

impl Default for WindowManager {
    fn default() -> Self {
        Self::new(WindowManagerConfig::default())
    }
}

impl WindowManager {
    /// Creates an empty manager driven by the wall clock.
    pub fn new(config: WindowManagerConfig) -> Self {
        Self::with_clock(config, Rc::new(SystemClock))
    }

    /// Creates an empty manager driven by `clock`.
    pub fn with_clock(config: WindowManagerConfig, clock: Rc<dyn Clock>) -> Self {
        let config = config.sanitized();
        Self {
            state: WindowManagerState::with_initial_z(config.initial_z_index),
            config,
            viewport: Viewport::default(),
            clock,
            scheduler: TransitionScheduler::default(),
            armed: Vec::new(),
            input_focus: None,
            listeners: Vec::new(),
            next_subscription: 0,
            version: 0,
        }
    }

    pub fn state(&self) -> &WindowManagerState {
        &self.state
    }

    pub fn window(&self, id: &WindowId) -> Option<&WindowRecord> {
        self.state.window(id)
    }

    pub fn order(&self) -> &[WindowId] {
        &self.state.order
    }

    pub fn active_id(&self) -> Option<&WindowId> {
        self.state.active_id.as_ref()
    }

    /// Number of state-changing dispatches so far.
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn config(&self) -> &WindowManagerConfig {
        &self.config
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn work_area(&self) -> WorkArea {
        WorkArea::from_viewport(self.viewport, self.config.taskbar_height)
    }

    pub fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }

    /// Opens `kind` and returns the window hosting it.
    ///
    /// Singleton kinds with a live window return that window, restored and focused.
    pub fn open_app(&mut self, kind: AppKind) -> WindowId {
        let reused = if app_descriptor(kind).singleton {
            self.state.live_window_of_kind(kind).map(|w| w.id.clone())
        } else {
            None
        };

        let mut window_id = WindowId::generate();
        while self.state.windows.contains_key(&window_id) {
            window_id = WindowId::generate();
        }
        self.dispatch(WindowAction::OpenApp {
            kind,
            window_id: window_id.clone(),
        });
        reused.unwrap_or(window_id)
    }

    pub fn close_window(&mut self, window_id: &WindowId) {
        self.dispatch(WindowAction::CloseWindow {
            window_id: window_id.clone(),
        });
    }

    pub fn focus_window(&mut self, window_id: &WindowId) {
        self.dispatch(WindowAction::FocusWindow {
            window_id: window_id.clone(),
        });
    }

    pub fn minimize_window(&mut self, window_id: &WindowId) {
        self.dispatch(WindowAction::MinimizeWindow {
            window_id: window_id.clone(),
        });
    }

    pub fn restore_window(&mut self, window_id: &WindowId) {
        self.dispatch(WindowAction::RestoreWindow {
            window_id: window_id.clone(),
        });
    }

    pub fn toggle_maximize_window(&mut self, window_id: &WindowId) {
        self.dispatch(WindowAction::ToggleMaximizeWindow {
            window_id: window_id.clone(),
        });
    }

    pub fn move_window(&mut self, window_id: &WindowId, x: i32, y: i32) {
        self.dispatch(WindowAction::MoveWindow {
            window_id: window_id.clone(),
            x,
            y,
        });
    }

    pub fn resize_window(&mut self, window_id: &WindowId, patch: WindowRectPatch) {
        self.dispatch(WindowAction::ResizeWindow {
            window_id: window_id.clone(),
            patch,
        });
    }

    pub fn snap_window(&mut self, window_id: &WindowId, snap: WindowSnap) {
        self.dispatch(WindowAction::SnapWindow {
            window_id: window_id.clone(),
            snap,
        });
    }

    pub fn cycle_focus(&mut self) {
        self.dispatch(WindowAction::CycleFocus);
    }

    /// Updates the viewport and re-fits every window when it changed.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        if viewport == self.viewport {
            return;
        }
        self.viewport = viewport;
        self.dispatch(WindowAction::FitToWorkArea);
    }

    /// Replaces the registry with a rehydrated layout, dropping pending transitions, and fits it
    /// to the current work area.
    pub fn hydrate(&mut self, state: WindowManagerState) {
        self.dispatch(WindowAction::HydrateLayout { state });
        self.dispatch(WindowAction::FitToWorkArea);
    }

    /// Registers `listener`, called with the new state and version after each change.
    pub fn subscribe(
        &mut self,
        listener: impl FnMut(&WindowManagerState, u64) + 'static,
    ) -> SubscriptionId {
        self.next_subscription += 1;
        let id = SubscriptionId(self.next_subscription);
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Removes a listener; returns whether it was registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(existing, _)| *existing != id);
        self.listeners.len() != before
    }

    /// Earliest pending transition deadline.
    pub fn next_due_at(&self) -> Option<u64> {
        self.scheduler.next_due_at()
    }

    pub fn pending_transition(&self, window_id: &WindowId) -> Option<&TransitionTicket> {
        self.scheduler.pending_for(window_id)
    }

    /// Tickets scheduled since the last call, for the host to arm timers against.
    pub fn drain_armed_tickets(&mut self) -> Vec<TransitionTicket> {
        std::mem::take(&mut self.armed)
    }

    /// Window whose content should receive keyboard focus, if one was requested.
    pub fn take_input_focus_request(&mut self) -> Option<WindowId> {
        self.input_focus.take()
    }

    /// Settles every transition due by the clock's current time. Returns how many were applied.
    pub fn run_due_transitions(&mut self) -> usize {
        let due = self.scheduler.take_due(self.clock.now_ms());
        due.into_iter()
            .filter(|ticket| self.complete(ticket))
            .count()
    }

    /// Settles a single ticket when it is still the window's current one.
    ///
    /// Timer callbacks call this; stale tickets are discarded.
    pub fn settle_ticket(&mut self, ticket: &TransitionTicket) -> bool {
        if !self.scheduler.take_if_current(ticket) {
            leptos::logging::debug_warn!(
                "dropping stale {:?} ticket for window {}",
                ticket.kind,
                ticket.window_id
            );
            return false;
        }
        self.complete(ticket)
    }

    fn complete(&mut self, ticket: &TransitionTicket) -> bool {
        self.dispatch(WindowAction::CompleteTransition {
            window_id: ticket.window_id.clone(),
            kind: ticket.kind,
        })
    }

    /// Applies `action`; returns whether the registry changed.
    pub fn dispatch(&mut self, action: WindowAction) -> bool {
        let ctx = ReducerContext {
            config: &self.config,
            work_area: WorkArea::from_viewport(self.viewport, self.config.taskbar_height),
            now_ms: self.clock.now_ms(),
        };
        let mut next = self.state.clone();

        let effects = match reduce_windows(&mut next, &ctx, action) {
            Ok(effects) => effects,
            Err(err) => {
                leptos::logging::debug_warn!("window manager ignored action: {err}");
                return false;
            }
        };
        let now_ms = ctx.now_ms;

        let changed = next != self.state;
        if changed {
            self.state = next;
            self.version += 1;
        }
        for effect in effects {
            self.run_effect(effect, now_ms);
        }
        if changed {
            for (_, listener) in &mut self.listeners {
                listener(&self.state, self.version);
            }
        }

        if self.config.animation_ms == 0 && !self.scheduler.is_empty() {
            self.armed.clear();
            self.run_due_transitions();
        }
        changed
    }

    fn run_effect(&mut self, effect: RuntimeEffect, now_ms: u64) {
        match effect {
            RuntimeEffect::ScheduleTransition { window_id, kind } => {
                let due_at_ms = now_ms.saturating_add(self.config.animation_ms);
                let ticket = self.scheduler.schedule(window_id, kind, due_at_ms);
                self.armed.retain(|armed| armed.window_id != ticket.window_id);
                self.armed.push(ticket);
            }
            RuntimeEffect::CancelAllTransitions => {
                self.scheduler.clear();
                self.armed.clear();
            }
            RuntimeEffect::FocusWindowInput(window_id) => {
                self.input_focus = Some(window_id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{
        lifecycle::{ManualClock, TransitionKind},
        model::WindowLifecycle,
    };

    fn manager() -> (WindowManager, ManualClock) {
        let clock = ManualClock::new(1_000);
        let manager =
            WindowManager::with_clock(WindowManagerConfig::default(), Rc::new(clock.clone()));
        (manager, clock)
    }

    #[test]
    fn open_settles_after_animation() {
        let (mut wm, clock) = manager();
        let id = wm.open_app(AppKind::Notes);
        assert_eq!(wm.window(&id).map(|w| w.lifecycle), Some(WindowLifecycle::Opening));
        assert_eq!(wm.next_due_at(), Some(1_180));

        clock.advance(179);
        assert_eq!(wm.run_due_transitions(), 0);
        clock.advance(1);
        assert_eq!(wm.run_due_transitions(), 1);
        assert_eq!(wm.window(&id).map(|w| w.lifecycle), Some(WindowLifecycle::Normal));
    }

    #[test]
    fn version_only_moves_on_real_changes() {
        let (mut wm, _clock) = manager();
        let id = wm.open_app(AppKind::Notes);
        assert_eq!(wm.version(), 1);

        wm.focus_window(&WindowId::from("missing"));
        wm.move_window(&WindowId::from("missing"), 1, 1);
        assert_eq!(wm.version(), 1);

        wm.focus_window(&id);
        assert_eq!(wm.version(), 2);
    }

    #[test]
    fn listeners_run_in_order_and_can_unsubscribe() {
        let (mut wm, _clock) = manager();
        let seen = Rc::new(RefCell::new(Vec::new()));

        let first = {
            let seen = Rc::clone(&seen);
            wm.subscribe(move |_, version| seen.borrow_mut().push(("first", version)))
        };
        {
            let seen = Rc::clone(&seen);
            wm.subscribe(move |_, version| seen.borrow_mut().push(("second", version)));
        }

        wm.open_app(AppKind::Terminal);
        assert!(wm.unsubscribe(first));
        assert!(!wm.unsubscribe(first));
        wm.open_app(AppKind::Terminal);

        assert_eq!(
            *seen.borrow(),
            vec![("first", 1), ("second", 1), ("second", 2)]
        );
    }

    #[test]
    fn closing_during_minimize_replaces_the_pending_ticket() {
        let (mut wm, clock) = manager();
        let id = wm.open_app(AppKind::Notes);
        clock.advance(200);
        wm.run_due_transitions();

        wm.minimize_window(&id);
        let minimize_ticket = wm.pending_transition(&id).cloned().expect("minimize ticket");
        assert_eq!(minimize_ticket.kind, TransitionKind::CompleteMinimize);

        wm.close_window(&id);
        assert!(!wm.settle_ticket(&minimize_ticket));
        assert_eq!(wm.window(&id).map(|w| w.lifecycle), Some(WindowLifecycle::Closing));

        clock.advance(200);
        wm.run_due_transitions();
        assert!(wm.window(&id).is_none());
        assert!(wm.order().is_empty());
        assert_eq!(wm.active_id(), None);
    }

    #[test]
    fn zero_animation_settles_inline() {
        let clock = ManualClock::new(0);
        let mut wm = WindowManager::with_clock(
            WindowManagerConfig {
                animation_ms: 0,
                ..WindowManagerConfig::default()
            },
            Rc::new(clock),
        );
        let id = wm.open_app(AppKind::Notes);
        assert_eq!(wm.window(&id).map(|w| w.lifecycle), Some(WindowLifecycle::Normal));

        wm.close_window(&id);
        assert!(wm.window(&id).is_none());
        assert!(wm.drain_armed_tickets().is_empty());
    }

    #[test]
    fn armed_tickets_match_scheduler_and_drain_once() {
        let (mut wm, _clock) = manager();
        let a = wm.open_app(AppKind::Notes);
        let b = wm.open_app(AppKind::Notes);
        let armed = wm.drain_armed_tickets();
        assert_eq!(
            armed.iter().map(|t| t.window_id.clone()).collect::<Vec<_>>(),
            vec![a, b.clone()]
        );
        assert!(wm.drain_armed_tickets().is_empty());
        assert_eq!(wm.take_input_focus_request(), Some(b));
        assert_eq!(wm.take_input_focus_request(), None);
    }

    #[test]
    fn viewport_shrink_refits_windows() {
        let (mut wm, _clock) = manager();
        let id = wm.open_app(AppKind::Notes);
        wm.set_viewport(Viewport {
            width: 640,
            height: 480,
        });
        let rect = wm.window(&id).expect("window").rect;
        assert!(rect.w <= 640);
        assert!(rect.h <= 480 - 48);
        assert!(wm.state().check_invariants().is_empty());
    }
}
