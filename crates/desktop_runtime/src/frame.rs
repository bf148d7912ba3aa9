//! Per-window pointer interaction: title-bar drag with snap-on-release, eight-handle resize,
//! title-bar buttons, and the render projection of a window frame.

use desktop_app_contract::AppContentHandle;
use wasm_bindgen::JsCast;

use crate::{
    geometry::{clamp, snap_from_pointer, WorkArea},
    model::{WindowId, WindowLifecycle, WindowRecord, WindowRect, WindowRectPatch, WindowSnap},
    window_manager::WindowManager,
};

/// `PointerEvent.button` value of the primary button.
pub const PRIMARY_BUTTON: i16 = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Pointer sample in viewport coordinates.
pub struct PointerInput {
    pub pointer_id: i32,
    pub x: i32,
    pub y: i32,
    pub button: i16,
}

impl PointerInput {
    pub fn primary(pointer_id: i32, x: i32, y: i32) -> Self {
        Self {
            pointer_id,
            x,
            y,
            button: PRIMARY_BUTTON,
        }
    }

    pub fn from_pointer_event(event: &web_sys::PointerEvent) -> Self {
        Self {
            pointer_id: event.pointer_id(),
            x: event.client_x(),
            y: event.client_y(),
            button: event.button(),
        }
    }

    fn is_primary(self) -> bool {
        self.button == PRIMARY_BUTTON
    }
}

/// Routes further events of the pointer to the element that received `event`.
pub fn capture_pointer(event: &web_sys::PointerEvent) {
    if let Some(element) = event
        .current_target()
        .and_then(|target| target.dyn_into::<web_sys::Element>().ok())
    {
        if let Err(err) = element.set_pointer_capture(event.pointer_id()) {
            leptos::logging::warn!("pointer capture failed: {err:?}");
        }
    }
}

/// Releases a capture taken by [`capture_pointer`].
pub fn release_pointer(event: &web_sys::PointerEvent) {
    if let Some(element) = event
        .current_target()
        .and_then(|target| target.dyn_into::<web_sys::Element>().ok())
    {
        if element.has_pointer_capture(event.pointer_id()) {
            let _ = element.release_pointer_capture(event.pointer_id());
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Resize handle position.
pub enum ResizeDirection {
    North,
    South,
    East,
    West,
    NorthEast,
    NorthWest,
    SouthEast,
    SouthWest,
}

impl ResizeDirection {
    pub const ALL: [Self; 8] = [
        Self::North,
        Self::South,
        Self::East,
        Self::West,
        Self::NorthEast,
        Self::NorthWest,
        Self::SouthEast,
        Self::SouthWest,
    ];

    pub fn touches_north(self) -> bool {
        matches!(self, Self::North | Self::NorthEast | Self::NorthWest)
    }

    pub fn touches_south(self) -> bool {
        matches!(self, Self::South | Self::SouthEast | Self::SouthWest)
    }

    pub fn touches_east(self) -> bool {
        matches!(self, Self::East | Self::NorthEast | Self::SouthEast)
    }

    pub fn touches_west(self) -> bool {
        matches!(self, Self::West | Self::NorthWest | Self::SouthWest)
    }

    /// Short handle name used for CSS classes (`n`, `se`, ...).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::North => "n",
            Self::South => "s",
            Self::East => "e",
            Self::West => "w",
            Self::NorthEast => "ne",
            Self::NorthWest => "nw",
            Self::SouthEast => "se",
            Self::SouthWest => "sw",
        }
    }

    /// CSS cursor shown over the handle.
    pub fn cursor(self) -> &'static str {
        match self {
            Self::North | Self::South => "ns-resize",
            Self::East | Self::West => "ew-resize",
            Self::NorthEast | Self::SouthWest => "nesw-resize",
            Self::NorthWest | Self::SouthEast => "nwse-resize",
        }
    }
}

/// Applies a handle drag of `(dx, dy)` to `origin`.
///
/// Each touched dimension is clamped to `[min, work area]`. Dragging a west or north edge moves
/// the origin by however much the size actually changed, so the opposite edge stays put.
pub fn resize_rect(
    origin: WindowRect,
    direction: ResizeDirection,
    dx: i32,
    dy: i32,
    min_w: i32,
    min_h: i32,
    work: WorkArea,
) -> WindowRect {
    let mut rect = origin;

    if direction.touches_east() {
        rect.w = clamp(origin.w + dx, min_w, work.w);
    } else if direction.touches_west() {
        rect.w = clamp(origin.w - dx, min_w, work.w);
        rect.x = origin.x + (origin.w - rect.w);
    }

    if direction.touches_south() {
        rect.h = clamp(origin.h + dy, min_h, work.h);
    } else if direction.touches_north() {
        rect.h = clamp(origin.h - dy, min_h, work.h);
        rect.y = origin.y + (origin.h - rect.h);
    }

    rect
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Gesture {
    Drag {
        pointer_id: i32,
        origin_x: i32,
        origin_y: i32,
        origin_rect: WindowRect,
    },
    Resize {
        pointer_id: i32,
        direction: ResizeDirection,
        origin_x: i32,
        origin_y: i32,
        origin_rect: WindowRect,
    },
}

impl Gesture {
    fn pointer_id(self) -> i32 {
        match self {
            Self::Drag { pointer_id, .. } | Self::Resize { pointer_id, .. } => pointer_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// In-progress gesture state for one window frame.
///
/// Controllers never touch geometry directly; every change goes through the [`WindowManager`].
pub struct FrameController {
    window_id: WindowId,
    gesture: Option<Gesture>,
}

impl FrameController {
    pub fn new(window_id: WindowId) -> Self {
        Self {
            window_id,
            gesture: None,
        }
    }

    pub fn window_id(&self) -> &WindowId {
        &self.window_id
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.gesture, Some(Gesture::Drag { .. }))
    }

    pub fn is_resizing(&self) -> bool {
        matches!(self.gesture, Some(Gesture::Resize { .. }))
    }

    /// Pointer press anywhere in the frame: raises and focuses the window.
    pub fn pointer_down_frame(&self, wm: &mut WindowManager, input: PointerInput) {
        if input.is_primary() {
            wm.focus_window(&self.window_id);
        }
    }

    /// Title-bar press. Returns whether a drag started.
    pub fn begin_drag(&mut self, wm: &mut WindowManager, input: PointerInput) -> bool {
        let Some(origin_rect) = self.gesture_origin(wm, input) else {
            return false;
        };
        self.gesture = Some(Gesture::Drag {
            pointer_id: input.pointer_id,
            origin_x: input.x,
            origin_y: input.y,
            origin_rect,
        });
        true
    }

    /// Resize-handle press. Returns whether a resize started.
    pub fn begin_resize(
        &mut self,
        wm: &mut WindowManager,
        input: PointerInput,
        direction: ResizeDirection,
    ) -> bool {
        let Some(origin_rect) = self.gesture_origin(wm, input) else {
            return false;
        };
        self.gesture = Some(Gesture::Resize {
            pointer_id: input.pointer_id,
            direction,
            origin_x: input.x,
            origin_y: input.y,
            origin_rect,
        });
        true
    }

    fn gesture_origin(&self, wm: &mut WindowManager, input: PointerInput) -> Option<WindowRect> {
        if !input.is_primary() {
            return None;
        }
        wm.focus_window(&self.window_id);
        let window = wm.window(&self.window_id)?;
        if window.maximized || !window.is_live() {
            return None;
        }
        Some(window.rect)
    }

    pub fn pointer_move(&mut self, wm: &mut WindowManager, input: PointerInput) {
        match self.gesture {
            Some(Gesture::Drag {
                pointer_id,
                origin_x,
                origin_y,
                origin_rect,
            }) if pointer_id == input.pointer_id => {
                let moved = origin_rect.offset(input.x - origin_x, input.y - origin_y);
                wm.move_window(&self.window_id, moved.x, moved.y);
            }
            Some(Gesture::Resize {
                pointer_id,
                direction,
                origin_x,
                origin_y,
                origin_rect,
            }) if pointer_id == input.pointer_id => {
                let config = wm.config();
                let rect = resize_rect(
                    origin_rect,
                    direction,
                    input.x - origin_x,
                    input.y - origin_y,
                    config.min_window_width,
                    config.min_window_height,
                    wm.work_area(),
                );
                wm.resize_window(&self.window_id, WindowRectPatch::from(rect));
            }
            _ => {}
        }
    }

    /// Ends the gesture. A drag released near a work-area edge snaps; the applied snap is
    /// returned.
    pub fn pointer_up(&mut self, wm: &mut WindowManager, input: PointerInput) -> Option<WindowSnap> {
        let gesture = self.gesture.filter(|g| g.pointer_id() == input.pointer_id)?;
        self.gesture = None;

        let Gesture::Drag { .. } = gesture else {
            return None;
        };
        let snap = snap_from_pointer(input.x, input.y, wm.work_area(), wm.config().snap_threshold);
        if snap == WindowSnap::None {
            return None;
        }
        wm.snap_window(&self.window_id, snap);
        Some(snap)
    }

    /// Abandons the gesture without snapping.
    pub fn pointer_cancel(&mut self) {
        self.gesture = None;
    }

    pub fn title_double_click(&mut self, wm: &mut WindowManager) {
        self.gesture = None;
        wm.toggle_maximize_window(&self.window_id);
    }

    pub fn minimize_clicked(&self, wm: &mut WindowManager) {
        wm.minimize_window(&self.window_id);
    }

    pub fn maximize_clicked(&self, wm: &mut WindowManager) {
        wm.toggle_maximize_window(&self.window_id);
    }

    pub fn close_clicked(&mut self, wm: &mut WindowManager) {
        self.gesture = None;
        wm.close_window(&self.window_id);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Animation class applied to a frame.
pub enum FrameAnimation {
    Open,
    Close,
    Minimize,
    Restore,
    Maximize,
    Idle,
}

impl FrameAnimation {
    pub fn from_lifecycle(lifecycle: WindowLifecycle) -> Self {
        match lifecycle {
            WindowLifecycle::Opening => Self::Open,
            WindowLifecycle::Closing => Self::Close,
            WindowLifecycle::Minimizing => Self::Minimize,
            WindowLifecycle::Restoring | WindowLifecycle::Unmaximizing => Self::Restore,
            WindowLifecycle::Maximizing => Self::Maximize,
            WindowLifecycle::Normal => Self::Idle,
        }
    }

    pub fn css_class(self) -> &'static str {
        match self {
            Self::Open => "window-anim-open",
            Self::Close => "window-anim-close",
            Self::Minimize => "window-anim-minimize",
            Self::Restore => "window-anim-restore",
            Self::Maximize => "window-anim-maximize",
            Self::Idle => "",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Everything a frame needs to render itself.
pub struct FrameView {
    pub window_id: WindowId,
    pub title: String,
    pub style: String,
    pub animation: FrameAnimation,
    pub is_active: bool,
    pub is_maximized: bool,
    pub snap: WindowSnap,
    /// Handle the hosted app renders its content against.
    pub content: AppContentHandle,
}

pub fn frame_view(
    record: &WindowRecord,
    active_id: Option<&WindowId>,
    animations_enabled: bool,
) -> FrameView {
    let WindowRect { x, y, w, h } = record.rect;
    let animation = if animations_enabled {
        FrameAnimation::from_lifecycle(record.lifecycle)
    } else {
        FrameAnimation::Idle
    };
    FrameView {
        window_id: record.id.clone(),
        title: record.title.clone(),
        style: format!(
            "left:{x}px;top:{y}px;width:{w}px;height:{h}px;z-index:{};",
            record.z_index
        ),
        animation,
        is_active: active_id == Some(&record.id),
        is_maximized: record.maximized,
        snap: record.snap,
        content: AppContentHandle::new(record.app_kind, record.id.as_str()),
    }
}
