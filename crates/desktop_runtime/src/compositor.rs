//! Render-order projection of the registry.

use crate::model::{WindowManagerState, WindowRecord};

/// Non-minimized windows, bottom to top. Equal z-indices fall back to id order.
pub fn visible_windows(state: &WindowManagerState) -> Vec<WindowRecord> {
    let mut visible = state
        .windows
        .values()
        .filter(|w| !w.minimized)
        .cloned()
        .collect::<Vec<_>>();
    visible.sort_by(|a, b| a.z_index.cmp(&b.z_index).then_with(|| a.id.cmp(&b.id)));
    visible
}

#[derive(Debug, Default)]
/// Caches [`visible_windows`] against the store version.
pub struct Compositor {
    cached: Option<(u64, Vec<WindowRecord>)>,
    recomputes: u64,
}

impl Compositor {
    /// Visible windows for `state` at `version`, recomputed only when the version moved.
    pub fn layers(&mut self, state: &WindowManagerState, version: u64) -> &[WindowRecord] {
        let stale = self
            .cached
            .as_ref()
            .map_or(true, |(cached_version, _)| *cached_version != version);
        if stale {
            self.recomputes += 1;
            self.cached = Some((version, visible_windows(state)));
        }
        self.cached
            .as_ref()
            .map(|(_, layers)| layers.as_slice())
            .unwrap_or_default()
    }

    /// How many times the projection was rebuilt.
    pub fn recomputes(&self) -> u64 {
        self.recomputes
    }
}
