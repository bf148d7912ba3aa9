use std::rc::Rc;

use desktop_app_contract::AppKind;
use desktop_runtime::{
    frame::{FrameController, PointerInput, ResizeDirection},
    persistence::{load_layout, persist_layout},
    visible_windows, ManualClock, WindowId, WindowLifecycle, WindowManager, WindowManagerConfig,
    WindowRect, WindowSnap,
};
use futures::executor::block_on;
use platform_host::MemoryAppStateStore;
use pretty_assertions::assert_eq;

struct Harness {
    wm: WindowManager,
    clock: ManualClock,
}

impl Harness {
    fn new() -> Self {
        let clock = ManualClock::new(10_000);
        let wm = WindowManager::with_clock(WindowManagerConfig::default(), Rc::new(clock.clone()));
        Self { wm, clock }
    }

    fn settle(&mut self) {
        self.clock.advance(1_000);
        self.wm.run_due_transitions();
    }

    fn open(&mut self, kind: AppKind) -> WindowId {
        let id = self.wm.open_app(kind);
        self.settle();
        id
    }

    fn rect(&self, id: &WindowId) -> WindowRect {
        self.wm.window(id).expect("window").rect
    }

    fn z(&self, id: &WindowId) -> u64 {
        self.wm.window(id).expect("window").z_index
    }

    fn assert_consistent(&self) {
        let violations = self.wm.state().check_invariants();
        assert!(violations.is_empty(), "{violations:?}");
    }
}

#[test]
fn scenario_a_cascade_and_stacking() {
    let mut h = Harness::new();
    let w1 = h.open(AppKind::Notes);
    let w2 = h.open(AppKind::Notes);

    assert_eq!(
        h.rect(&w1),
        WindowRect {
            x: 80,
            y: 80,
            w: 860,
            h: 560
        }
    );
    let (r1, r2) = (h.rect(&w1), h.rect(&w2));
    assert_eq!((r2.x - r1.x, r2.y - r1.y), (18, 18));
    assert!(h.z(&w2) > h.z(&w1));
    h.assert_consistent();
}

#[test]
fn scenario_b_refocus_bumps_z() {
    let mut h = Harness::new();
    let w1 = h.open(AppKind::Notes);
    let _w2 = h.open(AppKind::Terminal);

    h.wm.focus_window(&w1);
    let first = h.z(&w1);
    h.wm.focus_window(&w1);
    assert!(h.z(&w1) > first);
    assert_eq!(h.wm.active_id(), Some(&w1));
    h.assert_consistent();
}

#[test]
fn scenario_c_maximize_round_trip() {
    let mut h = Harness::new();
    let w1 = h.open(AppKind::Notes);
    h.wm.move_window(&w1, 133, 97);
    let before = h.rect(&w1);

    h.wm.toggle_maximize_window(&w1);
    let maximized = h.wm.window(&w1).expect("window").clone();
    assert!(maximized.maximized);
    assert_eq!(maximized.snap, WindowSnap::Fullscreen);
    assert_eq!(maximized.lifecycle, WindowLifecycle::Maximizing);
    assert_eq!(maximized.rect, h.wm.work_area().rect());

    // Ignored while the maximize animation is in flight.
    h.wm.toggle_maximize_window(&w1);
    assert!(h.wm.window(&w1).expect("window").maximized);

    h.settle();
    h.wm.toggle_maximize_window(&w1);
    h.settle();
    let restored = h.wm.window(&w1).expect("window");
    assert_eq!(restored.rect, before);
    assert_eq!(restored.restore_rect, None);
    assert!(!restored.maximized);
    assert_eq!(restored.snap, WindowSnap::None);
    h.assert_consistent();
}

#[test]
fn scenario_d_drag_far_offscreen_is_clamped() {
    let mut h = Harness::new();
    let w1 = h.open(AppKind::Notes);
    h.wm.move_window(&w1, -1000, 100);
    let rect = h.rect(&w1);
    assert_eq!(rect.x, -rect.w + h.wm.config().offscreen_allowance);

    // Maximized windows ignore moves.
    h.wm.toggle_maximize_window(&w1);
    h.settle();
    h.wm.move_window(&w1, 300, 300);
    assert_eq!(h.rect(&w1), h.wm.work_area().rect());
}

#[test]
fn scenario_e_minimize_active_clears_focus_and_hides() {
    let mut h = Harness::new();
    let w1 = h.open(AppKind::Notes);
    let w2 = h.open(AppKind::Terminal);
    assert_eq!(h.wm.active_id(), Some(&w2));

    h.wm.minimize_window(&w2);
    assert_eq!(h.wm.active_id(), Some(&w2));
    h.settle();

    assert_eq!(h.wm.active_id(), None);
    let visible = visible_windows(h.wm.state())
        .into_iter()
        .map(|w| w.id)
        .collect::<Vec<_>>();
    assert_eq!(visible, vec![w1]);

    h.wm.restore_window(&w2);
    assert_eq!(h.wm.active_id(), Some(&w2));
    h.settle();
    h.assert_consistent();
}

#[test]
fn scenario_f_northwest_resize_through_the_frame() {
    let mut h = Harness::new();
    let w1 = h.open(AppKind::Notes);
    h.wm.move_window(&w1, 100, 100);
    h.wm.resize_window(
        &w1,
        WindowRect {
            x: 100,
            y: 100,
            w: 300,
            h: 200,
        }
        .into(),
    );

    let mut frame = FrameController::new(w1.clone());
    assert!(frame.begin_resize(
        &mut h.wm,
        PointerInput::primary(3, 100, 100),
        ResizeDirection::NorthWest
    ));
    frame.pointer_move(&mut h.wm, PointerInput::primary(3, 120, 120));
    frame.pointer_up(&mut h.wm, PointerInput::primary(3, 120, 120));

    assert_eq!(
        h.rect(&w1),
        WindowRect {
            x: 120,
            y: 120,
            w: 280,
            h: 180
        }
    );

    // The floor holds however far the handle travels.
    assert!(frame.begin_resize(
        &mut h.wm,
        PointerInput::primary(3, 120, 120),
        ResizeDirection::NorthWest
    ));
    frame.pointer_move(&mut h.wm, PointerInput::primary(3, 900, 900));
    let rect = h.rect(&w1);
    assert_eq!((rect.w, rect.h), (220, 140));
    assert_eq!((rect.x + rect.w, rect.y + rect.h), (400, 300));
}

#[test]
fn non_singleton_opens_are_distinct() {
    let mut h = Harness::new();
    let mut ids = Vec::new();
    for n in 1..=6 {
        ids.push(h.wm.open_app(AppKind::Terminal));
        assert_eq!(h.wm.state().windows.len(), n);
    }
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 6);
    h.assert_consistent();
}

#[test]
fn singleton_open_reuses_and_restores() {
    let mut h = Harness::new();
    let first = h.wm.open_app(AppKind::SystemMonitor);
    let second = h.wm.open_app(AppKind::SystemMonitor);
    assert_eq!(first, second);
    h.settle();

    h.wm.minimize_window(&first);
    h.settle();
    assert!(h.wm.window(&first).expect("window").minimized);

    let third = h.wm.open_app(AppKind::SystemMonitor);
    assert_eq!(third, first);
    assert!(!h.wm.window(&first).expect("window").minimized);
    assert_eq!(h.wm.active_id(), Some(&first));
    let monitors = h
        .wm
        .state()
        .windows
        .values()
        .filter(|w| w.app_kind == AppKind::SystemMonitor)
        .count();
    assert_eq!(monitors, 1);
}

#[test]
fn singleton_can_reopen_while_previous_window_closes() {
    let mut h = Harness::new();
    let first = h.open(AppKind::Settings);
    h.wm.close_window(&first);
    let second = h.wm.open_app(AppKind::Settings);
    assert_ne!(first, second);
    h.assert_consistent();

    h.settle();
    assert!(h.wm.window(&first).is_none());
    assert_eq!(h.wm.order(), &[second]);
}

#[test]
fn drag_released_on_top_edge_maximizes_and_unmaximize_returns_to_drop_point() {
    let mut h = Harness::new();
    let w1 = h.open(AppKind::Notes);
    let mut frame = FrameController::new(w1.clone());

    assert!(frame.begin_drag(&mut h.wm, PointerInput::primary(7, 300, 95)));
    frame.pointer_move(&mut h.wm, PointerInput::primary(7, 420, 4));
    let dropped = h.rect(&w1);
    assert_eq!(
        frame.pointer_up(&mut h.wm, PointerInput::primary(7, 420, 4)),
        Some(WindowSnap::Fullscreen)
    );

    let window = h.wm.window(&w1).expect("window");
    assert!(window.maximized);
    assert_eq!(window.snap, WindowSnap::Fullscreen);
    assert_eq!(window.rect, h.wm.work_area().rect());
    assert_eq!(window.restore_rect, Some(dropped));
    assert!(!frame.begin_drag(&mut h.wm, PointerInput::primary(7, 300, 10)));

    h.wm.toggle_maximize_window(&w1);
    h.settle();
    assert_eq!(h.rect(&w1), dropped);
    h.assert_consistent();
}

#[test]
fn unsnap_twice_is_idempotent() {
    let mut h = Harness::new();
    let w1 = h.open(AppKind::Notes);
    h.wm.snap_window(&w1, WindowSnap::Right);
    assert_eq!(h.rect(&w1).x, h.wm.work_area().w / 2);

    h.wm.snap_window(&w1, WindowSnap::None);
    let once = h.rect(&w1);
    assert_eq!(once, WindowRect { x: 80, y: 80, w: 860, h: 560 });
    let version = h.wm.version();
    h.wm.snap_window(&w1, WindowSnap::None);
    assert_eq!(h.rect(&w1), once);
    assert_eq!(h.wm.version(), version);
    h.assert_consistent();
}

#[test]
fn snap_fullscreen_counts_as_maximized_and_keeps_first_restore_rect() {
    let mut h = Harness::new();
    let w1 = h.open(AppKind::Notes);
    let original = h.rect(&w1);

    h.wm.snap_window(&w1, WindowSnap::Left);
    h.wm.snap_window(&w1, WindowSnap::Fullscreen);
    let window = h.wm.window(&w1).expect("window");
    assert!(window.maximized);
    assert_eq!(window.restore_rect, Some(original));

    h.wm.toggle_maximize_window(&w1);
    h.settle();
    assert_eq!(h.rect(&w1), original);
}

#[test]
fn close_removes_after_animation_and_hands_focus_down() {
    let mut h = Harness::new();
    let w1 = h.open(AppKind::Notes);
    let w2 = h.open(AppKind::Terminal);

    h.wm.close_window(&w2);
    assert!(h.wm.window(&w2).is_some());
    assert_eq!(h.wm.state().order.len(), 2);
    h.settle();

    assert!(h.wm.window(&w2).is_none());
    assert_eq!(h.wm.active_id(), Some(&w1));
    h.assert_consistent();
}

#[test]
fn cycle_focus_wraps_and_skips_minimized() {
    let mut h = Harness::new();
    let a = h.open(AppKind::Notes);
    let b = h.open(AppKind::Terminal);
    let c = h.open(AppKind::FileExplorer);
    h.wm.minimize_window(&b);
    h.settle();
    h.wm.focus_window(&c);

    h.wm.cycle_focus();
    assert_eq!(h.wm.active_id(), Some(&a));
    h.wm.cycle_focus();
    assert_eq!(h.wm.active_id(), Some(&c));
    assert!(h.wm.window(&b).expect("window").minimized);

    h.wm.close_window(&a);
    let version = h.wm.version();
    h.wm.cycle_focus();
    assert_eq!(h.wm.version(), version);
}

#[test]
fn unknown_ids_are_silent_noops() {
    let mut h = Harness::new();
    h.open(AppKind::Notes);
    let before = h.wm.state().clone();
    let version = h.wm.version();
    let ghost = WindowId::from("win_ghost");

    h.wm.close_window(&ghost);
    h.wm.focus_window(&ghost);
    h.wm.minimize_window(&ghost);
    h.wm.restore_window(&ghost);
    h.wm.toggle_maximize_window(&ghost);
    h.wm.move_window(&ghost, 1, 2);
    h.wm.resize_window(&ghost, Default::default());
    h.wm.snap_window(&ghost, WindowSnap::Left);

    assert_eq!(h.wm.state(), &before);
    assert_eq!(h.wm.version(), version);
}

#[test]
fn persisted_layout_round_trips_with_normal_lifecycles() {
    let mut h = Harness::new();
    let a = h.open(AppKind::Notes);
    let b = h.open(AppKind::Terminal);
    h.wm.snap_window(&a, WindowSnap::Left);
    h.wm.toggle_maximize_window(&b);

    let store = MemoryAppStateStore::default();
    block_on(persist_layout(&store, h.wm.state())).expect("persist");
    let loaded = block_on(load_layout(&store))
        .expect("load")
        .expect("layout");

    let mut expected = h.wm.state().clone();
    for record in expected.windows.values_mut() {
        record.lifecycle = WindowLifecycle::Normal;
    }
    assert_eq!(loaded, expected);

    let mut fresh = Harness::new();
    fresh.wm.hydrate(loaded);
    assert_eq!(fresh.wm.state(), &expected);
    assert_eq!(fresh.wm.next_due_at(), None);
    let next = fresh.wm.open_app(AppKind::Notes);
    assert!(fresh.z(&next) > fresh.z(&b));
}

#[test]
fn closing_cancels_pending_minimize() {
    let mut h = Harness::new();
    let w1 = h.open(AppKind::Notes);
    h.wm.minimize_window(&w1);
    h.wm.close_window(&w1);
    h.clock.advance(1_000);
    assert_eq!(h.wm.run_due_transitions(), 1);
    assert!(h.wm.window(&w1).is_none());
    assert!(h.wm.state().windows.is_empty());
}
