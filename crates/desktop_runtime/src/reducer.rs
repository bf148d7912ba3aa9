//! Window actions, side-effect intents, and the transition logic that applies them.

use desktop_app_contract::{app_descriptor, AppKind};
use thiserror::Error;

use crate::{
    config::WindowManagerConfig,
    geometry::{clamp, clamp_rect, snap_rect, WorkArea},
    lifecycle::TransitionKind,
    model::{
        WindowId, WindowLifecycle, WindowManagerState, WindowRecord, WindowRect, WindowRectPatch,
        WindowSnap,
    },
};

#[derive(Debug, Clone, PartialEq)]
/// Actions accepted by [`reduce_windows`].
pub enum WindowAction {
    /// Open a window for `kind`, or reuse the live singleton window.
    OpenApp {
        /// Application to host.
        kind: AppKind,
        /// Id assigned if a new record is created.
        window_id: WindowId,
    },
    /// Start the close animation; the record is removed when it settles.
    CloseWindow {
        /// Window to close.
        window_id: WindowId,
    },
    /// Raise a window above all others and focus it.
    FocusWindow {
        /// Window to focus.
        window_id: WindowId,
    },
    /// Start the minimize animation.
    MinimizeWindow {
        /// Window to minimize.
        window_id: WindowId,
    },
    /// Show a minimized window again and focus it.
    RestoreWindow {
        /// Window to restore.
        window_id: WindowId,
    },
    /// Maximize to the work area, or return to the saved rectangle.
    ToggleMaximizeWindow {
        /// Window to toggle.
        window_id: WindowId,
    },
    /// Move the top-left corner.
    MoveWindow {
        /// Window being dragged.
        window_id: WindowId,
        /// Requested left edge.
        x: i32,
        /// Requested top edge.
        y: i32,
    },
    /// Overlay a partial rectangle onto the current geometry.
    ResizeWindow {
        /// Window being resized.
        window_id: WindowId,
        /// Fields to replace.
        patch: WindowRectPatch,
    },
    /// Snap to a half or the full work area, or unsnap.
    SnapWindow {
        /// Window to snap.
        window_id: WindowId,
        /// Target region.
        snap: WindowSnap,
    },
    /// Focus the next window down the stack, wrapping.
    CycleFocus,
    /// Finish a deferred lifecycle transition.
    CompleteTransition {
        /// Window whose transition came due.
        window_id: WindowId,
        /// Transition to finish.
        kind: TransitionKind,
    },
    /// Re-fit every window after the work area changed.
    FitToWorkArea,
    /// Replace the registry with a rehydrated layout.
    HydrateLayout {
        /// Normalized registry.
        state: WindowManagerState,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Side-effect intents emitted by [`reduce_windows`] for the owning store to execute.
pub enum RuntimeEffect {
    /// Arm the window's deferred transition, replacing any pending one.
    ScheduleTransition {
        /// Window the transition belongs to.
        window_id: WindowId,
        /// Transition to run when the animation ends.
        kind: TransitionKind,
    },
    /// Drop every pending transition.
    CancelAllTransitions,
    /// Move keyboard focus into the window's content.
    FocusWindowInput(WindowId),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
/// Reasons an action was rejected. The store treats all of them as silent no-ops.
pub enum ReducerError {
    /// The target window id is not registered.
    #[error("window {0} not found")]
    WindowNotFound(WindowId),
    /// A new window was requested with an id that is already registered.
    #[error("window id {0} is already in use")]
    WindowIdInUse(WindowId),
    /// Geometry edits are ignored while maximized.
    #[error("window {0} is maximized")]
    WindowMaximized(WindowId),
    /// The window is animating out and accepts nothing further.
    #[error("window {0} is closing")]
    WindowClosing(WindowId),
    /// Another transition on the same window has not finished.
    #[error("window {window_id} is still {lifecycle:?}")]
    TransitionInFlight {
        /// Busy window.
        window_id: WindowId,
        /// Lifecycle currently in flight.
        lifecycle: WindowLifecycle,
    },
    /// The operation makes no sense from the window's current state.
    #[error("window {window_id} cannot {operation} from its current state")]
    InvalidTransition {
        /// Target window.
        window_id: WindowId,
        /// Rejected operation.
        operation: &'static str,
    },
}

/// Inputs an action needs besides the state itself.
#[derive(Debug, Clone, Copy)]
pub struct ReducerContext<'a> {
    /// Active tuning.
    pub config: &'a WindowManagerConfig,
    /// Current work area.
    pub work_area: WorkArea,
    /// Timestamp stamped onto touched records.
    pub now_ms: u64,
}

impl ReducerContext<'_> {
    fn clamp(&self, rect: WindowRect) -> WindowRect {
        clamp_rect(rect, self.work_area, self.config.rect_limits())
    }
}

/// Applies `action` to `state` and returns the side effects the store must run.
///
/// # Errors
///
/// Returns a [`ReducerError`] when the action does not apply; `state` is left untouched.
pub fn reduce_windows(
    state: &mut WindowManagerState,
    ctx: &ReducerContext<'_>,
    action: WindowAction,
) -> Result<Vec<RuntimeEffect>, ReducerError> {
    let mut effects = Vec::new();
    match action {
        WindowAction::OpenApp { kind, window_id } => {
            if app_descriptor(kind).singleton {
                if let Some(existing) = state.live_window_of_kind(kind).map(|w| w.id.clone()) {
                    let needs_restore = state.window(&existing).is_some_and(|w| {
                        w.minimized || w.lifecycle == WindowLifecycle::Minimizing
                    });
                    if needs_restore {
                        restore_internal(state, ctx, &existing, &mut effects)?;
                    }
                    focus_internal(state, ctx, &existing)?;
                    effects.push(RuntimeEffect::FocusWindowInput(existing));
                    return Ok(effects);
                }
            }

            if state.windows.contains_key(&window_id) {
                return Err(ReducerError::WindowIdInUse(window_id));
            }

            let mut record = new_record(state, ctx, kind, window_id.clone());
            record.z_index = state.take_z();
            state.windows.insert(window_id.clone(), record);
            state.order.push(window_id.clone());
            state.active_id = Some(window_id.clone());
            effects.push(RuntimeEffect::ScheduleTransition {
                window_id: window_id.clone(),
                kind: TransitionKind::Settle,
            });
            effects.push(RuntimeEffect::FocusWindowInput(window_id));
        }
        WindowAction::CloseWindow { window_id } => {
            let window = live_window_mut(state, &window_id)?;
            window.lifecycle = WindowLifecycle::Closing;
            window.updated_at_ms = ctx.now_ms;
            effects.push(RuntimeEffect::ScheduleTransition {
                window_id,
                kind: TransitionKind::Remove,
            });
        }
        WindowAction::FocusWindow { window_id } => {
            let minimized = live_window_mut(state, &window_id)?.minimized;
            if minimized {
                restore_internal(state, ctx, &window_id, &mut effects)?;
            }
            focus_internal(state, ctx, &window_id)?;
            effects.push(RuntimeEffect::FocusWindowInput(window_id));
        }
        WindowAction::MinimizeWindow { window_id } => {
            let window = live_window_mut(state, &window_id)?;
            if window.minimized {
                return Err(ReducerError::InvalidTransition {
                    window_id,
                    operation: "minimize",
                });
            }
            ensure_settled(window)?;
            window.lifecycle = WindowLifecycle::Minimizing;
            window.updated_at_ms = ctx.now_ms;
            effects.push(RuntimeEffect::ScheduleTransition {
                window_id,
                kind: TransitionKind::CompleteMinimize,
            });
        }
        WindowAction::RestoreWindow { window_id } => {
            live_window_mut(state, &window_id)?;
            restore_internal(state, ctx, &window_id, &mut effects)?;
            focus_internal(state, ctx, &window_id)?;
        }
        WindowAction::ToggleMaximizeWindow { window_id } => {
            let work = ctx.work_area.rect();
            let fallback = ctx.clamp(ctx.config.default_rect);
            let window = live_window_mut(state, &window_id)?;
            if window.minimized {
                return Err(ReducerError::InvalidTransition {
                    window_id,
                    operation: "maximize",
                });
            }
            ensure_settled(window)?;

            if window.maximized {
                let target = window
                    .restore_rect
                    .take()
                    .map(|rect| ctx.clamp(rect))
                    .unwrap_or(fallback);
                window.rect = target;
                window.maximized = false;
                window.snap = WindowSnap::None;
                window.lifecycle = WindowLifecycle::Unmaximizing;
            } else {
                window.restore_rect = Some(window.restore_rect.unwrap_or(window.rect));
                window.rect = work;
                window.maximized = true;
                window.snap = WindowSnap::Fullscreen;
                window.lifecycle = WindowLifecycle::Maximizing;
            }
            window.updated_at_ms = ctx.now_ms;
            effects.push(RuntimeEffect::ScheduleTransition {
                window_id,
                kind: TransitionKind::Settle,
            });
        }
        WindowAction::MoveWindow { window_id, x, y } => {
            let window = geometry_target_mut(state, &window_id)?;
            let moved = WindowRect { x, y, ..window.rect };
            window.rect = ctx.clamp(moved);
            release_snap(window);
            window.updated_at_ms = ctx.now_ms;
        }
        WindowAction::ResizeWindow { window_id, patch } => {
            let window = geometry_target_mut(state, &window_id)?;
            window.rect = ctx.clamp(window.rect.merged(patch));
            release_snap(window);
            window.updated_at_ms = ctx.now_ms;
        }
        WindowAction::SnapWindow { window_id, snap } => {
            let window = live_window_mut(state, &window_id)?;
            if window.minimized {
                return Err(ReducerError::InvalidTransition {
                    window_id,
                    operation: "snap",
                });
            }
            ensure_settled(window)?;

            match snap_rect(snap, ctx.work_area) {
                None => {
                    let target = window.restore_rect.take().unwrap_or(window.rect);
                    window.rect = ctx.clamp(target);
                    window.snap = WindowSnap::None;
                    window.maximized = false;
                }
                Some(target) => {
                    window.restore_rect = Some(window.restore_rect.unwrap_or(window.rect));
                    window.rect = target;
                    window.snap = snap;
                    window.maximized = snap == WindowSnap::Fullscreen;
                }
            }
            window.updated_at_ms = ctx.now_ms;
        }
        WindowAction::CycleFocus => {
            let mut eligible = state
                .ordered_windows()
                .filter(|w| w.is_focusable())
                .map(|w| (w.z_index, w.id.clone()))
                .collect::<Vec<_>>();
            if eligible.len() < 2 {
                return Ok(effects);
            }
            eligible.sort_by(|a, b| b.0.cmp(&a.0));

            let current = state
                .active_id
                .as_ref()
                .and_then(|active| eligible.iter().position(|(_, id)| id == active));
            let next_index = current.map_or(0, |idx| (idx + 1) % eligible.len());
            let next = eligible[next_index].1.clone();
            focus_internal(state, ctx, &next)?;
            effects.push(RuntimeEffect::FocusWindowInput(next));
        }
        WindowAction::CompleteTransition { window_id, kind } => {
            complete_transition(state, ctx, window_id, kind)?;
        }
        WindowAction::FitToWorkArea => {
            for window in state.windows.values_mut() {
                let snap = if window.maximized {
                    WindowSnap::Fullscreen
                } else {
                    window.snap
                };
                let current = window.rect;
                window.rect = snap_rect(snap, ctx.work_area).unwrap_or_else(|| ctx.clamp(current));
                if let Some(restore) = window.restore_rect {
                    window.restore_rect = Some(ctx.clamp(restore));
                }
            }
        }
        WindowAction::HydrateLayout { state: hydrated } => {
            *state = hydrated;
            effects.push(RuntimeEffect::CancelAllTransitions);
        }
    }

    Ok(effects)
}

fn new_record(
    state: &WindowManagerState,
    ctx: &ReducerContext<'_>,
    kind: AppKind,
    window_id: WindowId,
) -> WindowRecord {
    let config = ctx.config;
    let cascade = i32::try_from(state.order.len())
        .unwrap_or(i32::MAX)
        .saturating_mul(config.cascade_step);
    let work = ctx.work_area;
    let base = WindowRect {
        x: clamp(
            config.default_rect.x.saturating_add(cascade),
            0,
            (work.w - config.cascade_edge_margin).max(0),
        ),
        y: clamp(
            config.default_rect.y.saturating_add(cascade),
            0,
            (work.h - config.cascade_edge_margin).max(0),
        ),
        ..config.default_rect
    };

    WindowRecord {
        id: window_id,
        app_kind: kind,
        title: app_descriptor(kind).title.to_string(),
        rect: ctx.clamp(base),
        restore_rect: None,
        z_index: 0,
        minimized: false,
        maximized: false,
        snap: WindowSnap::None,
        lifecycle: WindowLifecycle::Opening,
        created_at_ms: ctx.now_ms,
        updated_at_ms: ctx.now_ms,
    }
}

fn focus_internal(
    state: &mut WindowManagerState,
    ctx: &ReducerContext<'_>,
    window_id: &WindowId,
) -> Result<(), ReducerError> {
    let z = state.next_z;
    let window = live_window_mut(state, window_id)?;
    window.z_index = z;
    window.updated_at_ms = ctx.now_ms;
    state.take_z();
    state.active_id = Some(window_id.clone());
    Ok(())
}

/// Brings a minimized (or minimizing) window back. Focus is left to the caller.
fn restore_internal(
    state: &mut WindowManagerState,
    ctx: &ReducerContext<'_>,
    window_id: &WindowId,
    effects: &mut Vec<RuntimeEffect>,
) -> Result<(), ReducerError> {
    let window = live_window_mut(state, window_id)?;
    let interrupting_minimize = window.lifecycle == WindowLifecycle::Minimizing;
    if !window.minimized && !interrupting_minimize {
        ensure_settled(window)?;
        return Err(ReducerError::InvalidTransition {
            window_id: window_id.clone(),
            operation: "restore",
        });
    }
    if window.minimized {
        ensure_settled(window)?;
    }

    window.minimized = false;
    window.lifecycle = WindowLifecycle::Restoring;
    window.updated_at_ms = ctx.now_ms;
    effects.push(RuntimeEffect::ScheduleTransition {
        window_id: window_id.clone(),
        kind: TransitionKind::Settle,
    });
    Ok(())
}

fn complete_transition(
    state: &mut WindowManagerState,
    ctx: &ReducerContext<'_>,
    window_id: WindowId,
    kind: TransitionKind,
) -> Result<(), ReducerError> {
    let window = state
        .windows
        .get_mut(&window_id)
        .ok_or_else(|| ReducerError::WindowNotFound(window_id.clone()))?;

    match (kind, window.lifecycle) {
        (TransitionKind::Remove, WindowLifecycle::Closing) => {
            state.windows.remove(&window_id);
            state.order.retain(|id| id != &window_id);
            if state.active_id.as_ref() == Some(&window_id) {
                state.active_id = state.last_focusable_in_order().map(|w| w.id.clone());
            }
        }
        (TransitionKind::CompleteMinimize, WindowLifecycle::Minimizing) => {
            window.minimized = true;
            window.lifecycle = WindowLifecycle::Normal;
            window.updated_at_ms = ctx.now_ms;
            if state.active_id.as_ref() == Some(&window_id) {
                state.active_id = None;
            }
        }
        (
            TransitionKind::Settle,
            WindowLifecycle::Opening
            | WindowLifecycle::Restoring
            | WindowLifecycle::Maximizing
            | WindowLifecycle::Unmaximizing,
        ) => {
            window.lifecycle = WindowLifecycle::Normal;
            window.updated_at_ms = ctx.now_ms;
        }
        _ => {
            return Err(ReducerError::InvalidTransition {
                window_id,
                operation: "settle",
            })
        }
    }
    Ok(())
}

fn live_window_mut<'s>(
    state: &'s mut WindowManagerState,
    window_id: &WindowId,
) -> Result<&'s mut WindowRecord, ReducerError> {
    let window = state
        .windows
        .get_mut(window_id)
        .ok_or_else(|| ReducerError::WindowNotFound(window_id.clone()))?;
    if !window.is_live() {
        return Err(ReducerError::WindowClosing(window_id.clone()));
    }
    Ok(window)
}

fn geometry_target_mut<'s>(
    state: &'s mut WindowManagerState,
    window_id: &WindowId,
) -> Result<&'s mut WindowRecord, ReducerError> {
    let window = live_window_mut(state, window_id)?;
    if window.maximized {
        return Err(ReducerError::WindowMaximized(window_id.clone()));
    }
    Ok(window)
}

fn ensure_settled(window: &WindowRecord) -> Result<(), ReducerError> {
    if window.lifecycle.is_transient() {
        return Err(ReducerError::TransitionInFlight {
            window_id: window.id.clone(),
            lifecycle: window.lifecycle,
        });
    }
    Ok(())
}

/// Free movement breaks any snap and forgets the pre-snap geometry.
fn release_snap(window: &mut WindowRecord) {
    window.snap = WindowSnap::None;
    window.restore_rect = None;
}
