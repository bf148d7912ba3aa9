use desktop_app_contract::{app_descriptor, AppKind};

use super::*;
use crate::{
    desktop::{IconDrag, ICON_CELL},
    frame::{capture_pointer, release_pointer, PointerInput},
};

#[component]
pub(super) fn DesktopIconGrid() -> impl IntoView {
    let runtime = use_desktop_runtime();
    let drag = create_rw_signal(None::<IconDrag>);

    view! {
        <div class="desktop-icon-grid" role="list">
            <For
                each=move || runtime.icons.with(|layout| layout.icons())
                key=|(kind, _)| *kind
                children=move |(kind, _)| view! { <DesktopIcon kind drag /> }
            />
        </div>
    }
}

#[component]
fn DesktopIcon(kind: AppKind, drag: RwSignal<Option<IconDrag>>) -> impl IntoView {
    let runtime = use_desktop_runtime();
    let app = app_descriptor(kind);

    let style = move || {
        runtime.icons.with(|layout| {
            layout.position(kind).map(|pos| {
                format!(
                    "left:{}px;top:{}px;width:{ICON_CELL}px;height:{ICON_CELL}px;",
                    pos.x, pos.y
                )
            })
        })
    };
    let is_dragging = move || drag.with(|d| d.is_some_and(|d| d.kind() == kind));

    let on_pointerdown = move |ev: web_sys::PointerEvent| {
        let input = PointerInput::from_pointer_event(&ev);
        let started = runtime
            .icons
            .with_untracked(|layout| IconDrag::begin(layout, kind, input));
        if started.is_some() {
            capture_pointer(&ev);
            stop_pointer_event(&ev);
            drag.set(started);
        }
    };
    let on_pointermove = move |ev: web_sys::PointerEvent| {
        let Some(active) = drag.get_untracked().filter(|d| d.kind() == kind) else {
            return;
        };
        let input = PointerInput::from_pointer_event(&ev);
        let work = runtime.work_area();
        runtime.icons.update(|layout| active.update(layout, input, work));
    };
    let on_pointerup = move |ev: web_sys::PointerEvent| {
        let Some(active) = drag.get_untracked().filter(|d| d.kind() == kind) else {
            return;
        };
        drag.set(None);
        release_pointer(&ev);
        let input = PointerInput::from_pointer_event(&ev);
        let work = runtime.work_area();
        runtime.update_icons(|layout| active.finish(layout, input, work));
    };
    let on_pointercancel = move |ev: web_sys::PointerEvent| {
        if drag.get_untracked().is_some_and(|d| d.kind() == kind) {
            drag.set(None);
            release_pointer(&ev);
        }
    };

    view! {
        <button
            class="desktop-icon"
            class:dragging=is_dragging
            role="listitem"
            style=style
            data-icon=app.icon_id
            aria-label=app.title
            on:pointerdown=on_pointerdown
            on:pointermove=on_pointermove
            on:pointerup=on_pointerup
            on:pointercancel=on_pointercancel
            on:dblclick=move |ev: web_sys::MouseEvent| {
                stop_mouse_event(&ev);
                runtime.open_app(kind);
            }
        >
            <span class="desktop-icon-label">{app.title}</span>
        </button>
    }
}
