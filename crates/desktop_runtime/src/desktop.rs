//! Desktop icon grid: per-app positions, icon dragging, and their persisted layout.

use std::collections::BTreeMap;

use desktop_app_contract::{desktop_icon_apps, AppKind};
use platform_host::{
    load_app_state_with_migration, save_app_state_with, AppStateStore, DESKTOP_ICONS_NAMESPACE,
};
use serde::{Deserialize, Serialize};

use crate::{
    frame::PointerInput,
    geometry::{clamp, round_to, WorkArea},
};

/// Schema version of the persisted [`DesktopIconLayout`].
pub const DESKTOP_ICONS_SCHEMA_VERSION: u32 = 1;
/// Margin of the first icon from the top-left corner.
pub const ICON_MARGIN: i32 = 24;
/// Vertical distance between icons in the default column.
pub const ICON_ROW_STEP: i32 = 84;
/// Square footprint of one icon.
pub const ICON_CELL: i32 = 72;
/// Dropped icons align to this grid.
pub const ICON_GRID: i32 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IconPosition {
    pub x: i32,
    pub y: i32,
}

/// Default slot of the `index`-th desktop icon.
pub fn default_icon_position(index: usize) -> IconPosition {
    let row = i32::try_from(index).unwrap_or(i32::MAX);
    IconPosition {
        x: ICON_MARGIN,
        y: ICON_MARGIN.saturating_add(row.saturating_mul(ICON_ROW_STEP)),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
/// Where each desktop-visible app's icon sits.
pub struct DesktopIconLayout {
    positions: BTreeMap<AppKind, IconPosition>,
}

impl Default for DesktopIconLayout {
    fn default() -> Self {
        Self {
            positions: desktop_icon_apps()
                .iter()
                .enumerate()
                .map(|(idx, app)| (app.kind, default_icon_position(idx)))
                .collect(),
        }
    }
}

impl DesktopIconLayout {
    pub fn position(&self, kind: AppKind) -> Option<IconPosition> {
        self.positions.get(&kind).copied()
    }

    /// Icons in catalog order with their positions.
    pub fn icons(&self) -> Vec<(AppKind, IconPosition)> {
        desktop_icon_apps()
            .iter()
            .filter_map(|app| self.position(app.kind).map(|pos| (app.kind, pos)))
            .collect()
    }

    /// Moves `kind`'s icon, keeping it fully on the work area. Non-desktop apps are ignored.
    pub fn set_position(&mut self, kind: AppKind, position: IconPosition, work: WorkArea) {
        if let Some(slot) = self.positions.get_mut(&kind) {
            *slot = IconPosition {
                x: clamp(position.x, 0, (work.w - ICON_CELL).max(0)),
                y: clamp(position.y, 0, (work.h - ICON_CELL).max(0)),
            };
        }
    }

    pub fn reset_layout(&mut self) {
        *self = Self::default();
    }

    /// Keeps stored positions for known icons and fills in defaults for the rest.
    fn merged_with_defaults(stored: BTreeMap<AppKind, IconPosition>) -> Self {
        let mut layout = Self::default();
        for (kind, position) in stored {
            if let Some(slot) = layout.positions.get_mut(&kind) {
                *slot = position;
            }
        }
        layout
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// In-progress icon drag.
pub struct IconDrag {
    kind: AppKind,
    pointer_id: i32,
    origin_x: i32,
    origin_y: i32,
    origin: IconPosition,
}

impl IconDrag {
    /// Starts dragging `kind`'s icon; only the primary button drags.
    pub fn begin(layout: &DesktopIconLayout, kind: AppKind, input: PointerInput) -> Option<Self> {
        if input.button != crate::frame::PRIMARY_BUTTON {
            return None;
        }
        Some(Self {
            kind,
            pointer_id: input.pointer_id,
            origin_x: input.x,
            origin_y: input.y,
            origin: layout.position(kind)?,
        })
    }

    pub fn kind(&self) -> AppKind {
        self.kind
    }

    /// Follows the pointer from the drag origin.
    pub fn update(&self, layout: &mut DesktopIconLayout, input: PointerInput, work: WorkArea) {
        if input.pointer_id != self.pointer_id {
            return;
        }
        layout.set_position(self.kind, self.target(input), work);
    }

    /// Drops the icon on the nearest grid point.
    pub fn finish(self, layout: &mut DesktopIconLayout, input: PointerInput, work: WorkArea) {
        if input.pointer_id != self.pointer_id {
            return;
        }
        let target = self.target(input);
        layout.set_position(
            self.kind,
            IconPosition {
                x: round_to(target.x, ICON_GRID),
                y: round_to(target.y, ICON_GRID),
            },
            work,
        );
    }

    fn target(&self, input: PointerInput) -> IconPosition {
        IconPosition {
            x: self.origin.x + (input.x - self.origin_x),
            y: self.origin.y + (input.y - self.origin_y),
        }
    }
}

/// Loads the saved icon layout, falling back to the default column.
pub async fn load_icon_layout<S: AppStateStore + ?Sized>(store: &S) -> DesktopIconLayout {
    match load_app_state_with_migration::<_, BTreeMap<AppKind, IconPosition>, _>(
        store,
        DESKTOP_ICONS_NAMESPACE,
        DESKTOP_ICONS_SCHEMA_VERSION,
        |_, _| Ok(None),
    )
    .await
    {
        Ok(Some(stored)) => DesktopIconLayout::merged_with_defaults(stored),
        Ok(None) => DesktopIconLayout::default(),
        Err(err) => {
            leptos::logging::warn!("desktop icon layout load failed: {err}");
            DesktopIconLayout::default()
        }
    }
}

/// Saves the icon layout; failures are logged.
pub async fn persist_icon_layout<S: AppStateStore + ?Sized>(store: &S, layout: &DesktopIconLayout) {
    if let Err(err) = save_app_state_with(
        store,
        DESKTOP_ICONS_NAMESPACE,
        DESKTOP_ICONS_SCHEMA_VERSION,
        layout,
    )
    .await
    {
        leptos::logging::warn!("desktop icon layout persist failed: {err}");
    }
}
