//! Wall-clock and sequence helpers shared by host adapters and the runtime.

use std::cell::Cell;
#[cfg(not(target_arch = "wasm32"))]
use std::time::{SystemTime, UNIX_EPOCH};

thread_local! {
    static LAST_TIMESTAMP_MS: Cell<u64> = const { Cell::new(0) };
    static TOKEN_SEQUENCE: Cell<u64> = const { Cell::new(0) };
}

/// Returns the current unix timestamp in milliseconds.
pub fn unix_time_ms_now() -> u64 {
    #[cfg(target_arch = "wasm32")]
    {
        js_sys::Date::now().max(0.0) as u64
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64
    }
}

/// Returns a unix millisecond timestamp strictly greater than any previously returned one.
pub fn next_monotonic_timestamp_ms() -> u64 {
    let now = unix_time_ms_now();
    LAST_TIMESTAMP_MS.with(|last| {
        let next = now.max(last.get().saturating_add(1));
        last.set(next);
        next
    })
}

/// Returns a process-unique token `"{prefix}_{millis:x}{sequence:04x}"`.
///
/// The time component keeps tokens unique across reloads, the sequence within one millisecond.
pub fn unique_token(prefix: &str) -> String {
    let sequence = TOKEN_SEQUENCE.with(|seq| {
        let next = seq.get().wrapping_add(1);
        seq.set(next);
        next
    });
    format!(
        "{prefix}_{:x}{:04x}",
        unix_time_ms_now(),
        sequence & 0xffff
    )
}
