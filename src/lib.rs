//! Coopkeeper firmware library.
//!
//! Exposes the pure-logic modules for integration testing and host-side
//! simulation. All ESP-IDF-specific code is guarded by
//! `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

pub mod app;
pub mod automation;
pub mod clock;
pub mod config;
pub mod door;
pub mod error;
pub mod event_log;
pub mod feeder;
pub mod pins;

// Peripheral-facing modules; the real implementations are guarded by cfg
// attributes inside, with host stubs alongside.
pub mod adapters;
pub mod drivers;
pub mod sensors;
