use super::*;
use crate::{
    frame::{
        capture_pointer, frame_view, release_pointer, FrameController, PointerInput,
        ResizeDirection,
    },
    model::WindowId,
};

#[component]
pub(super) fn DesktopWindow(
    window_id: WindowId,
    render_app: Option<Callback<AppContentHandle, View>>,
) -> impl IntoView {
    let runtime = use_desktop_runtime();
    let frame = store_value(FrameController::new(window_id.clone()));
    let body_ref = create_node_ref::<html::Div>();

    let lookup_id = window_id.clone();
    let view_model = create_memo(move |_| {
        let animations = runtime.animations_enabled();
        runtime.state.with(|state| {
            state
                .window(&lookup_id)
                .filter(|w| !w.minimized)
                .map(|w| frame_view(w, state.active_id.as_ref(), animations))
        })
    });

    let focus_id = window_id.clone();
    create_effect(move |_| {
        if runtime.input_focus.get().as_ref() != Some(&focus_id) {
            return;
        }
        if let Some(body) = body_ref.get() {
            let _ = body.focus();
        }
    });

    let focus = move |ev: web_sys::PointerEvent| {
        let input = PointerInput::from_pointer_event(&ev);
        frame.with_value(|f| runtime.with_manager(|wm| f.pointer_down_frame(wm, input)));
    };
    let begin_move = move |ev: web_sys::PointerEvent| {
        let input = PointerInput::from_pointer_event(&ev);
        let started = frame
            .try_update_value(|f| runtime.with_manager(|wm| f.begin_drag(wm, input)))
            .unwrap_or(false);
        if started {
            capture_pointer(&ev);
            stop_pointer_event(&ev);
        }
    };
    let pointer_move = move |ev: web_sys::PointerEvent| {
        let input = PointerInput::from_pointer_event(&ev);
        frame.update_value(|f| runtime.with_manager(|wm| f.pointer_move(wm, input)));
    };
    let pointer_up = move |ev: web_sys::PointerEvent| {
        let input = PointerInput::from_pointer_event(&ev);
        frame.update_value(|f| {
            runtime.with_manager(|wm| f.pointer_up(wm, input));
        });
        release_pointer(&ev);
    };
    let pointer_cancel = move |ev: web_sys::PointerEvent| {
        frame.update_value(FrameController::pointer_cancel);
        release_pointer(&ev);
    };
    let titlebar_double_click = move |ev: web_sys::MouseEvent| {
        stop_mouse_event(&ev);
        frame.update_value(|f| runtime.with_manager(|wm| f.title_double_click(wm)));
    };
    let minimize = move |ev: web_sys::MouseEvent| {
        stop_mouse_event(&ev);
        frame.with_value(|f| runtime.with_manager(|wm| f.minimize_clicked(wm)));
    };
    let toggle_maximize = move |ev: web_sys::MouseEvent| {
        stop_mouse_event(&ev);
        frame.with_value(|f| runtime.with_manager(|wm| f.maximize_clicked(wm)));
    };
    let close = move |ev: web_sys::MouseEvent| {
        stop_mouse_event(&ev);
        frame.update_value(|f| runtime.with_manager(|wm| f.close_clicked(wm)));
    };

    let class_name = move || {
        view_model.with(|win| {
            win.as_ref().map_or_else(String::new, |win| {
                format!(
                    "desktop-window {}{}{}",
                    win.animation.css_class(),
                    if win.is_active { " focused" } else { "" },
                    if win.is_maximized { " maximized" } else { "" },
                )
            })
        })
    };
    let style = move || view_model.with(|win| win.as_ref().map(|w| w.style.clone()));
    let maximized = move || view_model.with(|win| win.as_ref().is_some_and(|w| w.is_maximized));

    view! {
        <Show when=move || view_model.with(Option::is_some) fallback=|| ()>
            {move || {
                let Some(win) = view_model.get_untracked() else {
                    return ().into_view();
                };
                let content = win.content.clone();
                let body = match render_app {
                    Some(render) => render.call(content.clone()),
                    None => view! { <p class="window-app-placeholder">{win.title.clone()}</p> }
                        .into_view(),
                };

                view! {
                    <section
                        class=class_name
                        style=style
                        data-window-id=win.window_id.to_string()
                        role="dialog"
                        aria-label=win.title.clone()
                        on:pointerdown=focus
                    >
                        <header
                            class="titlebar"
                            on:pointerdown=begin_move
                            on:pointermove=pointer_move
                            on:pointerup=pointer_up
                            on:pointercancel=pointer_cancel
                            on:dblclick=titlebar_double_click
                        >
                            <span class="titlebar-title">{win.title.clone()}</span>
                            <div class="titlebar-controls">
                                <button
                                    aria-label="Minimize window"
                                    on:pointerdown=move |ev| stop_pointer_event(&ev)
                                    on:click=minimize
                                >
                                    "_"
                                </button>
                                <button
                                    aria-label=move || {
                                        if maximized() { "Restore window" } else { "Maximize window" }
                                    }
                                    on:pointerdown=move |ev| stop_pointer_event(&ev)
                                    on:click=toggle_maximize
                                >
                                    {move || if maximized() { "❐" } else { "□" }}
                                </button>
                                <button
                                    aria-label="Close window"
                                    on:pointerdown=move |ev| stop_pointer_event(&ev)
                                    on:click=close
                                >
                                    "×"
                                </button>
                            </div>
                        </header>
                        <div
                            class="window-body"
                            tabindex="-1"
                            data-app=content.kind.as_str()
                            data-content-key=content.storage_key()
                            node_ref=body_ref
                        >
                            {body}
                        </div>
                        <Show when=move || !maximized() fallback=|| ()>
                            {ResizeDirection::ALL
                                .into_iter()
                                .map(|direction| view! { <WindowResizeHandle frame direction /> })
                                .collect_view()}
                        </Show>
                    </section>
                }
                    .into_view()
            }}
        </Show>
    }
}

#[component]
fn WindowResizeHandle(
    frame: StoredValue<FrameController>,
    direction: ResizeDirection,
) -> impl IntoView {
    let runtime = use_desktop_runtime();
    let class_name = format!("window-resize-handle {}", direction.as_str());
    let style = format!("cursor:{};", direction.cursor());

    let on_pointerdown = move |ev: web_sys::PointerEvent| {
        let input = PointerInput::from_pointer_event(&ev);
        let started = frame
            .try_update_value(|f| runtime.with_manager(|wm| f.begin_resize(wm, input, direction)))
            .unwrap_or(false);
        if started {
            capture_pointer(&ev);
            stop_pointer_event(&ev);
        }
    };
    let on_pointermove = move |ev: web_sys::PointerEvent| {
        let input = PointerInput::from_pointer_event(&ev);
        frame.update_value(|f| runtime.with_manager(|wm| f.pointer_move(wm, input)));
    };
    let on_pointerup = move |ev: web_sys::PointerEvent| {
        let input = PointerInput::from_pointer_event(&ev);
        frame.update_value(|f| {
            runtime.with_manager(|wm| f.pointer_up(wm, input));
        });
        release_pointer(&ev);
    };
    let on_pointercancel = move |ev: web_sys::PointerEvent| {
        frame.update_value(FrameController::pointer_cancel);
        release_pointer(&ev);
    };

    view! {
        <div
            class=class_name
            style=style
            aria-hidden="true"
            on:pointerdown=on_pointerdown
            on:pointermove=on_pointermove
            on:pointerup=on_pointerup
            on:pointercancel=on_pointercancel
        />
    }
}
