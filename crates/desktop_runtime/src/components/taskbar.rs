use super::*;
use crate::taskbar::{
    activate_entry, launcher_entries, open_system_settings, running_entries, TaskbarEntry,
};

fn taskbar_window_button_class(entry: &TaskbarEntry) -> &'static str {
    match (entry.is_active, entry.is_minimized) {
        (_, true) => "taskbar-window-button minimized",
        (true, false) => "taskbar-window-button active",
        (false, false) => "taskbar-window-button",
    }
}

#[component]
pub(super) fn Taskbar() -> impl IntoView {
    let runtime = use_desktop_runtime();
    let start_open = create_rw_signal(false);
    let height = runtime.with_manager(|wm| wm.config().taskbar_height);

    view! {
        <footer
            class="taskbar"
            role="toolbar"
            aria-label="Taskbar"
            style=format!("height:{height}px;")
        >
            <button
                class="taskbar-start"
                aria-haspopup="menu"
                aria-expanded=move || start_open.get().to_string()
                on:click=move |_| start_open.update(|open| *open = !*open)
            >
                "Start"
            </button>
            <Show when=move || start_open.get() fallback=|| ()>
                <div class="start-menu" role="menu">
                    <For each=launcher_entries key=|entry| entry.kind let:entry>
                        <button
                            role="menuitem"
                            data-icon=entry.icon_id
                            on:click=move |_| {
                                start_open.set(false);
                                runtime.open_app(entry.kind);
                            }
                        >
                            {entry.title}
                        </button>
                    </For>
                    <button
                        role="menuitem"
                        class="start-menu-settings"
                        on:click=move |_| {
                            start_open.set(false);
                            runtime.with_manager(open_system_settings);
                        }
                    >
                        "System Settings"
                    </button>
                </div>
            </Show>

            <div class="taskbar-running-strip" role="group" aria-label="Running windows">
                <For
                    each=move || runtime.state.with(running_entries)
                    key=|entry| (entry.window_id.clone(), entry.is_active, entry.is_minimized)
                    let:entry
                >
                    {{
                        let window_id = entry.window_id.clone();
                        view! {
                            <button
                                class=taskbar_window_button_class(&entry)
                                data-app=entry.icon_id
                                aria-pressed=(entry.is_active && !entry.is_minimized).to_string()
                                title=entry.title.clone()
                                on:click=move |_| {
                                    runtime.with_manager(|wm| activate_entry(wm, &window_id));
                                }
                            >
                                {entry.title.clone()}
                            </button>
                        }
                    }}
                </For>
            </div>
        </footer>
    }
}
