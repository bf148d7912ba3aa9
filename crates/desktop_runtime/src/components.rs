//! Desktop shell UI: icon grid, window layer, and taskbar, all driven by [`DesktopRuntimeContext`].

mod desktop_icons;
mod taskbar;
mod window;

use desktop_app_contract::AppContentHandle;
use leptos::*;

use self::{desktop_icons::DesktopIconGrid, taskbar::Taskbar, window::DesktopWindow};
use crate::{
    runtime_context::{use_desktop_runtime, DesktopRuntimeContext},
    shortcuts::{handle_chord, KeyChord},
};

fn stop_pointer_event(ev: &web_sys::PointerEvent) {
    ev.prevent_default();
    ev.stop_propagation();
}

fn stop_mouse_event(ev: &web_sys::MouseEvent) {
    ev.prevent_default();
    ev.stop_propagation();
}

#[component]
/// Renders the full desktop and routes global shortcuts into the window manager.
///
/// `render_app` draws the content of each window; without it a titled placeholder is shown.
pub fn DesktopShell(
    #[prop(optional)] render_app: Option<Callback<AppContentHandle, View>>,
) -> impl IntoView {
    let runtime = use_desktop_runtime();

    let keydown = window_event_listener(ev::keydown, move |ev| {
        if ev.default_prevented() {
            return;
        }
        let chord = KeyChord::from_keyboard_event(&ev);
        if runtime.with_manager(|wm| handle_chord(wm, &chord)) {
            ev.prevent_default();
            ev.stop_propagation();
        }
    });
    on_cleanup(move || keydown.remove());

    view! {
        <div id="desktop-shell-root" class="desktop-shell" tabindex="-1">
            <div class="desktop-surface">
                <DesktopIconGrid />
                {WindowLayer(WindowLayerProps { render_app })}
            </div>
            <Taskbar />
        </div>
    }
}

#[component]
/// Visible windows, bottom to top.
pub fn WindowLayer(
    #[prop(optional)] render_app: Option<Callback<AppContentHandle, View>>,
) -> impl IntoView {
    let runtime: DesktopRuntimeContext = use_desktop_runtime();

    view! {
        <div class="desktop-window-layer">
            <For
                each=move || runtime.visible_windows.get()
                key=|win| win.id.clone()
                let:win
            >
                <DesktopWindow window_id=win.id render_app=render_app />
            </For>
        </div>
    }
}
