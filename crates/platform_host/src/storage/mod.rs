//! Durable storage contracts.

pub mod app_state;
