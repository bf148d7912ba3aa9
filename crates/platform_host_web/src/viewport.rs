//! Browser viewport queries.

/// Fallback viewport used when no browser window is reachable.
pub const FALLBACK_VIEWPORT: (i32, i32) = (1280, 800);

/// Returns the current `(innerWidth, innerHeight)` of the browser window in CSS pixels.
pub fn inner_size() -> (i32, i32) {
    #[cfg(target_arch = "wasm32")]
    {
        let Some(window) = web_sys::window() else {
            return FALLBACK_VIEWPORT;
        };
        let width = window
            .inner_width()
            .ok()
            .and_then(|v| v.as_f64())
            .map(|v| v as i32);
        let height = window
            .inner_height()
            .ok()
            .and_then(|v| v.as_f64())
            .map(|v| v as i32);
        match (width, height) {
            (Some(w), Some(h)) => (w, h),
            _ => FALLBACK_VIEWPORT,
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        FALLBACK_VIEWPORT
    }
}
