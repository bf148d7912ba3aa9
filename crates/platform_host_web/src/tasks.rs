//! Timer and task scheduling on the browser event loop.
//!
//! Native builds have no event loop to hand work to: timers report unavailability and spawned
//! futures run to completion on the caller's thread.

use std::future::Future;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Handle for a scheduled browser timeout.
pub struct TimeoutHandle(pub i32);

/// Runs `callback` once after `delay_ms` on the browser event loop.
///
/// # Errors
///
/// Returns an error when no browser window is available (including every native build).
pub fn set_timeout(delay_ms: u32, callback: impl FnOnce() + 'static) -> Result<TimeoutHandle, String> {
    #[cfg(target_arch = "wasm32")]
    {
        use wasm_bindgen::{closure::Closure, JsCast};

        let window = web_sys::window().ok_or_else(|| "window unavailable".to_string())?;
        let closure = Closure::once_into_js(callback);
        let delay = i32::try_from(delay_ms).unwrap_or(i32::MAX);
        window
            .set_timeout_with_callback_and_timeout_and_arguments_0(
                closure.unchecked_ref::<js_sys::Function>(),
                delay,
            )
            .map(TimeoutHandle)
            .map_err(|e| format!("setTimeout failed: {e:?}"))
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        let _ = (delay_ms, callback);
        Err("timers are only available on wasm32".to_string())
    }
}

/// Cancels a timeout scheduled with [`set_timeout`]; unknown handles are ignored.
pub fn clear_timeout(handle: TimeoutHandle) {
    #[cfg(target_arch = "wasm32")]
    {
        if let Some(window) = web_sys::window() {
            window.clear_timeout_with_handle(handle.0);
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        let _ = handle;
    }
}

/// Spawns a fire-and-forget future.
pub fn spawn_local<F>(future: F)
where
    F: Future<Output = ()> + 'static,
{
    #[cfg(target_arch = "wasm32")]
    {
        wasm_bindgen_futures::spawn_local(future);
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        futures::executor::block_on(future);
    }
}
