//! Inbound commands to the application service.
//!
//! These represent actions requested by an operator (dashboard, serial
//! console, provisioning form) that the
//! [`AppService`](super::service::AppService) interprets and acts upon.

use crate::config::SystemConfig;

/// Commands that external adapters can send into the application core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppCommand {
    /// Manual override: open a closed door, close an open one.
    ToggleDoor,

    /// Run one feeder cycle now.
    ManualFeed,

    /// Replace the configuration (validated before it takes effect).
    UpdateConfig(SystemConfig),

    /// Empty the event log.
    ClearLog,
}
