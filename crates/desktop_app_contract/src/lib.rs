//! Shared contract types between the desktop window manager runtime and hosted apps.
//!
//! Apps never touch window-manager state directly. They contribute a static catalog entry
//! ([`AppDescriptor`]) and receive an [`AppContentHandle`] naming the window they render into.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

use std::fmt;

use serde::{Deserialize, Serialize};

/// Closed set of application kinds the desktop can host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AppKind {
    /// File browser over the virtual filesystem.
    FileExplorer,
    /// Markdown notes editor.
    Notes,
    /// Chat assistant.
    AiAssistant,
    /// Running-window and resource monitor.
    SystemMonitor,
    /// Command terminal.
    Terminal,
    /// Desktop settings.
    Settings,
}

impl AppKind {
    /// Every kind in catalog order.
    pub const ALL: [AppKind; 6] = [
        AppKind::FileExplorer,
        AppKind::Notes,
        AppKind::AiAssistant,
        AppKind::SystemMonitor,
        AppKind::Terminal,
        AppKind::Settings,
    ];

    /// Returns the stable kebab-case token used in persisted layouts.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::FileExplorer => "file-explorer",
            Self::Notes => "notes",
            Self::AiAssistant => "ai-assistant",
            Self::SystemMonitor => "system-monitor",
            Self::Terminal => "terminal",
            Self::Settings => "settings",
        }
    }

    /// Parses a kebab-case token back into a kind.
    ///
    /// # Errors
    ///
    /// Returns an error naming the token when it matches no known kind.
    pub fn parse(raw: &str) -> Result<Self, String> {
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == raw)
            .ok_or_else(|| format!("unknown app kind `{raw}`"))
    }
}

impl fmt::Display for AppKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Static catalog metadata for one application kind.
pub struct AppDescriptor {
    /// Kind this entry describes.
    pub kind: AppKind,
    /// Window title assigned at open time.
    pub title: &'static str,
    /// Icon reference resolved by the shell's icon set.
    pub icon_id: &'static str,
    /// At most one live window may host this kind.
    pub singleton: bool,
    /// Whether the desktop surface shows an icon for this kind.
    pub show_on_desktop: bool,
}

const APP_CATALOG: [AppDescriptor; 6] = [
    AppDescriptor {
        kind: AppKind::FileExplorer,
        title: "File Explorer",
        icon_id: "folder",
        singleton: false,
        show_on_desktop: true,
    },
    AppDescriptor {
        kind: AppKind::Notes,
        title: "Notes",
        icon_id: "file-text",
        singleton: false,
        show_on_desktop: true,
    },
    AppDescriptor {
        kind: AppKind::AiAssistant,
        title: "AI Assistant",
        icon_id: "bot",
        singleton: false,
        show_on_desktop: true,
    },
    AppDescriptor {
        kind: AppKind::SystemMonitor,
        title: "System Monitor",
        icon_id: "activity",
        singleton: true,
        show_on_desktop: true,
    },
    AppDescriptor {
        kind: AppKind::Terminal,
        title: "Terminal",
        icon_id: "terminal",
        singleton: false,
        show_on_desktop: true,
    },
    AppDescriptor {
        kind: AppKind::Settings,
        title: "Settings",
        icon_id: "settings",
        singleton: true,
        show_on_desktop: true,
    },
];

/// Returns the full installed-app catalog in display order.
pub fn installed_apps() -> &'static [AppDescriptor] {
    &APP_CATALOG
}

/// Returns the catalog entry for `kind`.
pub fn app_descriptor(kind: AppKind) -> &'static AppDescriptor {
    // The catalog is indexed by `AppKind::ALL` order.
    let index = AppKind::ALL
        .iter()
        .position(|candidate| *candidate == kind)
        .unwrap_or_default();
    &APP_CATALOG[index]
}

/// Returns catalog entries that get a desktop icon.
pub fn desktop_icon_apps() -> Vec<AppDescriptor> {
    installed_apps()
        .iter()
        .copied()
        .filter(|entry| entry.show_on_desktop)
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// Opaque handle an app renders against; the window manager never inspects app content.
pub struct AppContentHandle {
    /// Hosted application kind.
    pub kind: AppKind,
    /// Window id string the content is keyed by.
    pub window_key: String,
}

impl AppContentHandle {
    /// Creates a handle for `kind` rendered inside the window identified by `window_key`.
    pub fn new(kind: AppKind, window_key: impl Into<String>) -> Self {
        Self {
            kind,
            window_key: window_key.into(),
        }
    }

    /// Namespaced key apps can use for per-window scratch storage.
    pub fn storage_key(&self) -> String {
        format!("app.{}.{}", self.kind.as_str(), self.window_key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_is_indexed_by_kind_order() {
        for kind in AppKind::ALL {
            assert_eq!(app_descriptor(kind).kind, kind);
        }
        assert_eq!(installed_apps().len(), AppKind::ALL.len());
    }

    #[test]
    fn singleton_flags_match_catalog() {
        let singletons = installed_apps()
            .iter()
            .filter(|entry| entry.singleton)
            .map(|entry| entry.kind)
            .collect::<Vec<_>>();
        assert_eq!(singletons, vec![AppKind::SystemMonitor, AppKind::Settings]);
    }

    #[test]
    fn kind_tokens_parse_back() {
        assert_eq!(AppKind::parse("ai-assistant"), Ok(AppKind::AiAssistant));
        assert!(AppKind::parse("paint").is_err());
        let json = serde_json::to_string(&AppKind::FileExplorer).expect("serialize kind");
        assert_eq!(json, "\"file-explorer\"");
    }

    #[test]
    fn content_handle_storage_key_is_namespaced() {
        let handle = AppContentHandle::new(AppKind::Notes, "win_1");
        assert_eq!(handle.storage_key(), "app.notes.win_1");
    }
}
