//! Window-manager tuning knobs and their best-effort loading from host storage.

use platform_host::{load_app_state_with_migration, AppStateStore, WINDOW_MANAGER_CONFIG_NAMESPACE};
use serde::{Deserialize, Serialize};

use crate::{
    geometry::RectLimits,
    model::WindowRect,
};

/// Schema version of the persisted [`WindowManagerConfig`] payload.
pub const WINDOW_MANAGER_CONFIG_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
/// Geometry, timing, and persistence parameters for a [`crate::WindowManager`].
pub struct WindowManagerConfig {
    /// Geometry of the first window opened on an empty desktop.
    pub default_rect: WindowRect,
    /// Per-open-window offset applied in both axes when cascading new windows.
    pub cascade_step: i32,
    /// Cascaded origins stop this far before the right/bottom work-area edges.
    pub cascade_edge_margin: i32,
    /// Minimum window width.
    pub min_window_width: i32,
    /// Minimum window height.
    pub min_window_height: i32,
    /// Pixels of a window that must stay inside the work area.
    pub offscreen_allowance: i32,
    /// Pointer distance from an edge that triggers snap-on-release.
    pub snap_threshold: i32,
    /// Height reserved for the taskbar.
    pub taskbar_height: i32,
    /// Length of every open/close/minimize/restore/maximize animation. `0` settles at once.
    pub animation_ms: u64,
    /// Quiet period before a changed layout is written to storage.
    pub persist_debounce_ms: u64,
    /// First z-order value handed out on an empty registry.
    pub initial_z_index: u64,
}

impl Default for WindowManagerConfig {
    fn default() -> Self {
        Self {
            default_rect: WindowRect {
                x: 80,
                y: 80,
                w: 860,
                h: 560,
            },
            cascade_step: 18,
            cascade_edge_margin: 80,
            min_window_width: 220,
            min_window_height: 140,
            offscreen_allowance: 24,
            snap_threshold: 16,
            taskbar_height: 48,
            animation_ms: 180,
            persist_debounce_ms: 150,
            initial_z_index: 10,
        }
    }
}

impl WindowManagerConfig {
    /// Size floor and offscreen allowance used for clamping.
    pub fn rect_limits(&self) -> RectLimits {
        RectLimits {
            min_w: self.min_window_width,
            min_h: self.min_window_height,
            allow_offscreen: self.offscreen_allowance,
        }
    }

    /// Returns a copy with out-of-range values pulled back to usable ones.
    pub fn sanitized(mut self) -> Self {
        self.min_window_width = self.min_window_width.max(1);
        self.min_window_height = self.min_window_height.max(1);
        self.cascade_step = self.cascade_step.max(0);
        self.offscreen_allowance = self.offscreen_allowance.max(0);
        self.snap_threshold = self.snap_threshold.max(0);
        self.taskbar_height = self.taskbar_height.max(0);
        self
    }
}

/// Loads configuration overrides from `store`, falling back to defaults on absence or error.
pub async fn load_config<S: AppStateStore + ?Sized>(store: &S) -> WindowManagerConfig {
    match load_app_state_with_migration::<_, WindowManagerConfig, _>(
        store,
        WINDOW_MANAGER_CONFIG_NAMESPACE,
        WINDOW_MANAGER_CONFIG_SCHEMA_VERSION,
        |_, _| Ok(None),
    )
    .await
    {
        Ok(Some(config)) => config.sanitized(),
        Ok(None) => WindowManagerConfig::default(),
        Err(err) => {
            leptos::logging::warn!("window manager config load failed: {err}");
            WindowManagerConfig::default()
        }
    }
}
