//! Taskbar projections: running-window buttons and the start-menu launcher list.

use desktop_app_contract::{app_descriptor, installed_apps, AppKind};

use crate::{
    model::{WindowId, WindowManagerState},
    window_manager::WindowManager,
};

#[derive(Debug, Clone, PartialEq, Eq)]
/// One running-window button.
pub struct TaskbarEntry {
    pub window_id: WindowId,
    pub app_kind: AppKind,
    pub title: String,
    pub icon_id: &'static str,
    pub is_active: bool,
    pub is_minimized: bool,
}

/// Buttons for every live window, in open order.
pub fn running_entries(state: &WindowManagerState) -> Vec<TaskbarEntry> {
    state
        .ordered_windows()
        .filter(|w| w.is_live())
        .map(|w| TaskbarEntry {
            window_id: w.id.clone(),
            app_kind: w.app_kind,
            title: w.title.clone(),
            icon_id: app_descriptor(w.app_kind).icon_id,
            is_active: state.active_id.as_ref() == Some(&w.id),
            is_minimized: w.minimized,
        })
        .collect()
}

/// Taskbar button click: restores a minimized window, minimizes the active one, and focuses
/// anything else.
pub fn activate_entry(wm: &mut WindowManager, window_id: &WindowId) {
    let Some(window) = wm.window(window_id) else {
        return;
    };
    if window.minimized {
        wm.restore_window(window_id);
    } else if wm.active_id() == Some(window_id) {
        wm.minimize_window(window_id);
    } else {
        wm.focus_window(window_id);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Start-menu row.
pub struct LauncherEntry {
    pub kind: AppKind,
    pub title: &'static str,
    pub icon_id: &'static str,
}

pub fn launcher_entries() -> Vec<LauncherEntry> {
    installed_apps()
        .iter()
        .map(|app| LauncherEntry {
            kind: app.kind,
            title: app.title,
            icon_id: app.icon_id,
        })
        .collect()
}

/// Opens System Settings, reusing its window when one is live.
pub fn open_system_settings(wm: &mut WindowManager) -> WindowId {
    wm.open_app(AppKind::Settings)
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{config::WindowManagerConfig, lifecycle::ManualClock};

    fn settled(wm: &mut WindowManager, clock: &ManualClock) {
        clock.advance(1_000);
        wm.run_due_transitions();
    }

    #[test]
    fn entries_follow_open_order_and_flag_focus() {
        let clock = ManualClock::new(0);
        let mut wm =
            WindowManager::with_clock(WindowManagerConfig::default(), Rc::new(clock.clone()));
        let notes = wm.open_app(AppKind::Notes);
        let term = wm.open_app(AppKind::Terminal);
        settled(&mut wm, &clock);
        wm.focus_window(&notes);

        let entries = running_entries(wm.state());
        assert_eq!(
            entries
                .iter()
                .map(|e| (e.window_id.clone(), e.is_active))
                .collect::<Vec<_>>(),
            vec![(notes, true), (term, false)]
        );
        assert_eq!(entries[1].title, "Terminal");
    }

    #[test]
    fn activating_cycles_between_minimize_and_restore() {
        let clock = ManualClock::new(0);
        let mut wm =
            WindowManager::with_clock(WindowManagerConfig::default(), Rc::new(clock.clone()));
        let id = wm.open_app(AppKind::Notes);
        settled(&mut wm, &clock);

        activate_entry(&mut wm, &id);
        settled(&mut wm, &clock);
        assert!(wm.window(&id).expect("window").minimized);
        assert_eq!(wm.active_id(), None);

        activate_entry(&mut wm, &id);
        assert!(!wm.window(&id).expect("window").minimized);
        assert_eq!(wm.active_id(), Some(&id));
    }

    #[test]
    fn settings_opens_once() {
        let mut wm = WindowManager::default();
        let first = open_system_settings(&mut wm);
        let second = open_system_settings(&mut wm);
        assert_eq!(first, second);
        assert_eq!(launcher_entries().len(), AppKind::ALL.len());
    }
}
