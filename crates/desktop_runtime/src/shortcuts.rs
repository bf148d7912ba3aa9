//! Global keyboard shortcuts handled by the shell.

use desktop_app_contract::AppKind;

use crate::window_manager::WindowManager;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
/// Key plus modifier state, as reported by `KeyboardEvent`.
pub struct KeyChord {
    pub key: String,
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    pub meta: bool,
}

impl KeyChord {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Self::default()
        }
    }

    pub fn with_ctrl(mut self) -> Self {
        self.ctrl = true;
        self
    }

    pub fn with_alt(mut self) -> Self {
        self.alt = true;
        self
    }

    pub fn with_shift(mut self) -> Self {
        self.shift = true;
        self
    }

    pub fn from_keyboard_event(event: &web_sys::KeyboardEvent) -> Self {
        Self {
            key: event.key(),
            ctrl: event.ctrl_key(),
            alt: event.alt_key(),
            shift: event.shift_key(),
            meta: event.meta_key(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellShortcut {
    /// Alt+Tab.
    CycleFocus,
    /// Ctrl+Alt+Delete.
    OpenSystemMonitor,
    /// Ctrl+Alt+W on the focused window.
    CloseActiveWindow,
}

pub fn resolve(chord: &KeyChord) -> Option<ShellShortcut> {
    if chord.meta {
        return None;
    }
    match (chord.ctrl, chord.alt, chord.key.as_str()) {
        (false, true, "Tab") => Some(ShellShortcut::CycleFocus),
        (true, true, "Delete") => Some(ShellShortcut::OpenSystemMonitor),
        (true, true, "w" | "W") => Some(ShellShortcut::CloseActiveWindow),
        _ => None,
    }
}

pub fn apply_shortcut(wm: &mut WindowManager, shortcut: ShellShortcut) {
    match shortcut {
        ShellShortcut::CycleFocus => wm.cycle_focus(),
        ShellShortcut::OpenSystemMonitor => {
            wm.open_app(AppKind::SystemMonitor);
        }
        ShellShortcut::CloseActiveWindow => {
            if let Some(active) = wm.active_id().cloned() {
                wm.close_window(&active);
            }
        }
    }
}

/// Resolves and applies `chord`; returns whether it was a shell shortcut.
pub fn handle_chord(wm: &mut WindowManager, chord: &KeyChord) -> bool {
    match resolve(chord) {
        Some(shortcut) => {
            apply_shortcut(wm, shortcut);
            true
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{config::WindowManagerConfig, lifecycle::ManualClock};

    #[test]
    fn resolves_known_chords_only() {
        assert_eq!(
            resolve(&KeyChord::new("Tab").with_alt()),
            Some(ShellShortcut::CycleFocus)
        );
        assert_eq!(
            resolve(&KeyChord::new("Tab").with_alt().with_shift()),
            Some(ShellShortcut::CycleFocus)
        );
        assert_eq!(
            resolve(&KeyChord::new("Delete").with_ctrl().with_alt()),
            Some(ShellShortcut::OpenSystemMonitor)
        );
        assert_eq!(resolve(&KeyChord::new("Tab")), None);
        assert_eq!(resolve(&KeyChord::new("Delete").with_ctrl()), None);
    }

    #[test]
    fn alt_tab_cycles_and_ctrl_alt_delete_reuses_monitor() {
        let clock = ManualClock::new(0);
        let mut wm =
            WindowManager::with_clock(WindowManagerConfig::default(), Rc::new(clock.clone()));
        let first = wm.open_app(AppKind::Notes);
        let second = wm.open_app(AppKind::Terminal);
        clock.advance(500);
        wm.run_due_transitions();

        assert!(handle_chord(&mut wm, &KeyChord::new("Tab").with_alt()));
        assert_eq!(wm.active_id(), Some(&first));

        let monitor = {
            handle_chord(&mut wm, &KeyChord::new("Delete").with_ctrl().with_alt());
            wm.active_id().cloned().expect("monitor focused")
        };
        handle_chord(&mut wm, &KeyChord::new("Delete").with_ctrl().with_alt());
        assert_eq!(wm.active_id(), Some(&monitor));
        assert_eq!(wm.order().len(), 3);
        assert_ne!(monitor, second);
    }
}
