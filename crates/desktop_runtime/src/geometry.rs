//! Pure rectangle math for the window manager: clamping, snapping targets, and work-area
//! derivation.

use serde::{Deserialize, Serialize};

use crate::model::{WindowRect, WindowSnap};

/// Work areas never shrink below this height, however tall the taskbar.
pub const MIN_WORK_AREA_HEIGHT: i32 = 200;

/// Clamps `n` into `[min, max]`. When `min > max`, `max` wins.
pub fn clamp(n: i32, min: i32, max: i32) -> i32 {
    n.max(min).min(max)
}

/// Rounds `n` to the nearest multiple of `step`, halves away from zero.
pub fn round_to(n: i32, step: i32) -> i32 {
    if step <= 0 {
        return n;
    }
    let half = step / 2;
    if n >= 0 {
        (n + half) / step * step
    } else {
        -((-n + half) / step * step)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
/// Browser viewport size in CSS pixels.
pub struct Viewport {
    /// `innerWidth`.
    pub width: i32,
    /// `innerHeight`.
    pub height: i32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 800,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Region available to windows: the viewport minus the taskbar strip.
pub struct WorkArea {
    /// Usable width.
    pub w: i32,
    /// Usable height.
    pub h: i32,
}

impl WorkArea {
    /// Derives the work area for `viewport` with a taskbar of `taskbar_height` px.
    pub fn from_viewport(viewport: Viewport, taskbar_height: i32) -> Self {
        Self {
            w: viewport.width,
            h: (viewport.height - taskbar_height).max(MIN_WORK_AREA_HEIGHT),
        }
    }

    /// Whole work area as a rectangle at the origin.
    pub fn rect(self) -> WindowRect {
        WindowRect {
            x: 0,
            y: 0,
            w: self.w,
            h: self.h,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Size floor and offscreen allowance applied by [`clamp_rect`].
pub struct RectLimits {
    /// Minimum window width.
    pub min_w: i32,
    /// Minimum window height.
    pub min_h: i32,
    /// Pixels of the window that must stay inside the work area.
    pub allow_offscreen: i32,
}

/// Clamps `rect` so its size lies in `[min, work area]` and at least `allow_offscreen` px of
/// it remains reachable inside the work area.
pub fn clamp_rect(rect: WindowRect, work: WorkArea, limits: RectLimits) -> WindowRect {
    let w = clamp(rect.w, limits.min_w, work.w);
    let h = clamp(rect.h, limits.min_h, work.h);
    let allow = limits.allow_offscreen;

    WindowRect {
        x: clamp(rect.x, -w + allow, work.w - allow),
        y: clamp(rect.y, -h + allow, work.h - allow),
        w,
        h,
    }
}

/// Target rectangle for `snap`, or `None` for [`WindowSnap::None`].
pub fn snap_rect(snap: WindowSnap, work: WorkArea) -> Option<WindowRect> {
    let half = work.w / 2;
    match snap {
        WindowSnap::None => None,
        WindowSnap::Fullscreen => Some(work.rect()),
        WindowSnap::Left => Some(WindowRect {
            x: 0,
            y: 0,
            w: half,
            h: work.h,
        }),
        WindowSnap::Right => Some(WindowRect {
            x: half,
            y: 0,
            w: half,
            h: work.h,
        }),
    }
}

/// Maps a pointer-release position to the snap region it lands in.
///
/// The top edge wins over the side edges so corner drops maximize.
pub fn snap_from_pointer(x: i32, y: i32, work: WorkArea, threshold: i32) -> WindowSnap {
    if y <= threshold {
        WindowSnap::Fullscreen
    } else if x <= threshold {
        WindowSnap::Left
    } else if x >= work.w - threshold {
        WindowSnap::Right
    } else {
        WindowSnap::None
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    const WORK: WorkArea = WorkArea { w: 1200, h: 700 };
    const LIMITS: RectLimits = RectLimits {
        min_w: 220,
        min_h: 140,
        allow_offscreen: 24,
    };

    #[test]
    fn clamp_prefers_max_when_bounds_cross() {
        assert_eq!(clamp(5, 0, 10), 5);
        assert_eq!(clamp(-5, 0, 10), 0);
        assert_eq!(clamp(50, 0, 10), 10);
        assert_eq!(clamp(5, 20, 10), 10);
    }

    #[test]
    fn round_to_snaps_to_nearest_step() {
        assert_eq!(round_to(17, 8), 16);
        assert_eq!(round_to(20, 8), 24);
        assert_eq!(round_to(-13, 10), -10);
        assert_eq!(round_to(-15, 10), -20);
        assert_eq!(round_to(7, 0), 7);
    }

    #[test]
    fn work_area_subtracts_taskbar_with_floor() {
        let area = WorkArea::from_viewport(
            Viewport {
                width: 1024,
                height: 768,
            },
            48,
        );
        assert_eq!(area, WorkArea { w: 1024, h: 720 });

        let squat = WorkArea::from_viewport(
            Viewport {
                width: 400,
                height: 150,
            },
            48,
        );
        assert_eq!(squat.h, MIN_WORK_AREA_HEIGHT);
    }

    #[test]
    fn clamp_rect_keeps_a_grab_margin_on_screen() {
        let rect = clamp_rect(
            WindowRect {
                x: -1000,
                y: 5000,
                w: 300,
                h: 200,
            },
            WORK,
            LIMITS,
        );
        assert_eq!(rect.x, -300 + 24);
        assert_eq!(rect.y, 700 - 24);
    }

    #[test]
    fn clamp_rect_enforces_size_floor_and_ceiling() {
        let tiny = clamp_rect(
            WindowRect {
                x: 10,
                y: 10,
                w: 20,
                h: 20,
            },
            WORK,
            LIMITS,
        );
        assert_eq!((tiny.w, tiny.h), (220, 140));

        let huge = clamp_rect(
            WindowRect {
                x: 0,
                y: 0,
                w: 5000,
                h: 5000,
            },
            WORK,
            LIMITS,
        );
        assert_eq!((huge.w, huge.h), (1200, 700));
    }

    #[test]
    fn half_snaps_split_the_width() {
        let work = WorkArea { w: 1001, h: 700 };
        assert_eq!(
            snap_rect(WindowSnap::Left, work),
            Some(WindowRect {
                x: 0,
                y: 0,
                w: 500,
                h: 700
            })
        );
        assert_eq!(
            snap_rect(WindowSnap::Right, work),
            Some(WindowRect {
                x: 500,
                y: 0,
                w: 500,
                h: 700
            })
        );
        assert_eq!(snap_rect(WindowSnap::None, work), None);
    }

    #[test]
    fn pointer_snap_regions() {
        assert_eq!(snap_from_pointer(600, 4, WORK, 16), WindowSnap::Fullscreen);
        assert_eq!(snap_from_pointer(2, 4, WORK, 16), WindowSnap::Fullscreen);
        assert_eq!(snap_from_pointer(10, 300, WORK, 16), WindowSnap::Left);
        assert_eq!(snap_from_pointer(1190, 300, WORK, 16), WindowSnap::Right);
        assert_eq!(snap_from_pointer(600, 300, WORK, 16), WindowSnap::None);
    }
}
