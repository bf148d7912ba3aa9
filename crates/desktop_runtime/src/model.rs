use std::{collections::BTreeMap, fmt};

use desktop_app_contract::AppKind;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WindowId(pub String);

impl WindowId {
    /// Allocates a fresh id; ids are never reused within or across sessions.
    pub fn generate() -> Self {
        Self(platform_host::unique_token("win"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for WindowId {
    fn from(raw: &str) -> Self {
        Self(raw.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowRect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl WindowRect {
    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            ..self
        }
    }

    /// Overlays every field present in `patch`.
    pub fn merged(self, patch: WindowRectPatch) -> Self {
        Self {
            x: patch.x.unwrap_or(self.x),
            y: patch.y.unwrap_or(self.y),
            w: patch.w.unwrap_or(self.w),
            h: patch.h.unwrap_or(self.h),
        }
    }
}

/// Partial rectangle passed to resize operations; absent fields keep their current value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WindowRectPatch {
    pub x: Option<i32>,
    pub y: Option<i32>,
    pub w: Option<i32>,
    pub h: Option<i32>,
}

impl From<WindowRect> for WindowRectPatch {
    fn from(rect: WindowRect) -> Self {
        Self {
            x: Some(rect.x),
            y: Some(rect.y),
            w: Some(rect.w),
            h: Some(rect.h),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindowSnap {
    #[default]
    None,
    Left,
    Right,
    Fullscreen,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindowLifecycle {
    Opening,
    #[default]
    Normal,
    Closing,
    Minimizing,
    Restoring,
    Maximizing,
    Unmaximizing,
}

impl WindowLifecycle {
    /// Whether an animation is in flight. `Closing` counts; it ends in removal.
    pub fn is_transient(self) -> bool {
        !matches!(self, Self::Normal)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowRecord {
    pub id: WindowId,
    pub app_kind: AppKind,
    pub title: String,
    pub rect: WindowRect,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restore_rect: Option<WindowRect>,
    pub z_index: u64,
    pub minimized: bool,
    pub maximized: bool,
    #[serde(default)]
    pub snap: WindowSnap,
    #[serde(default)]
    pub lifecycle: WindowLifecycle,
    pub created_at_ms: u64,
    pub updated_at_ms: u64,
}

impl WindowRecord {
    /// Closing windows are on their way out and no longer count as open.
    pub fn is_live(&self) -> bool {
        self.lifecycle != WindowLifecycle::Closing
    }

    /// Eligible for focus and cycling.
    pub fn is_focusable(&self) -> bool {
        self.is_live() && !self.minimized
    }
}

/// Authoritative registry owned by [`crate::WindowManager`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowManagerState {
    pub windows: BTreeMap<WindowId, WindowRecord>,
    /// Insertion order, used for taskbar display and cascading.
    pub order: Vec<WindowId>,
    pub active_id: Option<WindowId>,
    /// Next z-order value; monotonic, never handed out twice.
    pub next_z: u64,
}

impl Default for WindowManagerState {
    fn default() -> Self {
        Self::with_initial_z(10)
    }
}

impl WindowManagerState {
    pub fn with_initial_z(next_z: u64) -> Self {
        Self {
            windows: BTreeMap::new(),
            order: Vec::new(),
            active_id: None,
            next_z,
        }
    }

    pub fn window(&self, id: &WindowId) -> Option<&WindowRecord> {
        self.windows.get(id)
    }

    /// Records in `order` sequence.
    pub fn ordered_windows(&self) -> impl Iterator<Item = &WindowRecord> + '_ {
        self.order.iter().filter_map(|id| self.windows.get(id))
    }

    pub fn live_window_of_kind(&self, kind: AppKind) -> Option<&WindowRecord> {
        self.ordered_windows()
            .find(|w| w.app_kind == kind && w.is_live())
    }

    /// Most recently opened window that can take focus.
    pub fn last_focusable_in_order(&self) -> Option<&WindowRecord> {
        self.order
            .iter()
            .rev()
            .filter_map(|id| self.windows.get(id))
            .find(|w| w.is_focusable())
    }

    /// Hands out the next z-index and advances the counter.
    pub(crate) fn take_z(&mut self) -> u64 {
        let z = self.next_z;
        self.next_z = self.next_z.saturating_add(1);
        z
    }

    /// Lists every broken registry invariant; empty when the state is consistent.
    pub fn check_invariants(&self) -> Vec<String> {
        let mut violations = Vec::new();

        if let Some(active) = &self.active_id {
            match self.windows.get(active) {
                None => violations.push(format!("active window {active} is not registered")),
                Some(w) if w.minimized => {
                    violations.push(format!("active window {active} is minimized"))
                }
                Some(_) => {}
            }
        }

        let mut seen_z = std::collections::BTreeSet::new();
        for window in self.windows.values() {
            if !seen_z.insert(window.z_index) {
                violations.push(format!("z-index {} is used twice", window.z_index));
            }
            if window.z_index >= self.next_z {
                violations.push(format!(
                    "window {} has z-index {} at or above the counter {}",
                    window.id, window.z_index, self.next_z
                ));
            }
            if window.restore_rect.is_some() && !window.maximized && window.snap == WindowSnap::None {
                violations.push(format!("window {} keeps a stale restore rect", window.id));
            }
        }

        if self.order.len() != self.windows.len()
            || self.order.iter().any(|id| !self.windows.contains_key(id))
        {
            violations.push("order list does not match the registry".to_string());
        }

        let mut live_singletons = std::collections::BTreeMap::<AppKind, usize>::new();
        for window in self.windows.values().filter(|w| w.is_live()) {
            if desktop_app_contract::app_descriptor(window.app_kind).singleton {
                *live_singletons.entry(window.app_kind).or_default() += 1;
            }
        }
        for (kind, count) in live_singletons {
            if count > 1 {
                violations.push(format!("singleton {kind} has {count} live windows"));
            }
        }

        violations
    }
}
