//! Host-neutral storage and time contracts used by the desktop runtime and its browser adapters.
//!
//! Concrete `localStorage` wiring lives in `platform_host_web`; this crate only defines the
//! versioned envelope model, the async store trait, and in-memory implementations for tests and
//! non-browser targets.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

pub mod storage;
pub mod time;

pub use storage::app_state::{
    build_app_state_envelope, decode_envelope_payload, load_app_state_with_migration,
    save_app_state_with, AppStateEnvelope, AppStateStore, AppStateStoreFuture,
    MemoryAppStateStore, NoopAppStateStore, APP_STATE_ENVELOPE_VERSION, DESKTOP_ICONS_NAMESPACE,
    WINDOW_LAYOUT_NAMESPACE, WINDOW_MANAGER_CONFIG_NAMESPACE,
};
pub use time::{next_monotonic_timestamp_ms, unique_token, unix_time_ms_now};
