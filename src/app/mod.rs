//! Application core: pure domain logic, zero I/O.
//!
//! This module wires the coop's business rules together: door motion,
//! light automation, feed scheduling and the operator command path.
//! All interaction with hardware happens through **port traits** defined
//! in [`ports`], keeping this layer fully testable without real peripherals.

pub mod channels;
pub mod commands;
pub mod ports;
pub mod service;
