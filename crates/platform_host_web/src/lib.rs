//! Browser (`wasm32`) implementations of [`platform_host`] contracts.
//!
//! Native builds compile every adapter to an inert fallback so the runtime stays testable off
//! the browser: storage selects an in-memory store, timers report unavailability, and the
//! viewport reports a fixed size.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

pub mod adapters;
pub mod storage;
pub mod tasks;
pub mod viewport;

pub use adapters::{
    app_state_store, host_strategy_name, selected_host_strategy, AppStateStoreAdapter,
    HostStrategy,
};
pub use storage::local_state::{parse_envelope, WebLocalStateStore};
pub use tasks::{clear_timeout, set_timeout, spawn_local, TimeoutHandle};
pub use viewport::inner_size;
