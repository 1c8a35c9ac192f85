//! Operator command channel.
//!
//! Uses an `embassy-sync` bounded MPMC channel to bridge operator-facing
//! tasks (dashboard, serial console) with the synchronous control loop.
//! Senders never touch core state; the loop drains the channel between
//! ticks, so every mutation still happens on one thread of control.
//!
//! ```text
//! ┌──────────────┐  AppCommand  ┌──────────────┐
//! │ Operator UI  │────────────▶│ Control Loop │
//! │  (any task)  │             │  (sync)      │
//! └──────────────┘             └──────────────┘
//! ```

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use log::warn;

use super::commands::AppCommand;

/// Channel depth for operator commands.
pub const CMD_DEPTH: usize = 8;

pub type CommandChannel = Channel<CriticalSectionRawMutex, AppCommand, CMD_DEPTH>;

/// Inbound command channel: operator tasks → control loop.
pub static CMD_CHANNEL: CommandChannel = Channel::new();

/// Queue `cmd` without blocking.  Returns `false` (and drops the command)
/// when the channel is full.
pub fn post(channel: &CommandChannel, cmd: AppCommand) -> bool {
    match channel.try_send(cmd) {
        Ok(()) => true,
        Err(_) => {
            warn!("commands: channel full, dropping command");
            false
        }
    }
}

/// Pop every queued command, oldest first, handing each to `handle`.
/// Returns how many were handled.
pub fn drain(channel: &CommandChannel, mut handle: impl FnMut(AppCommand)) -> usize {
    let mut n = 0;
    while let Ok(cmd) = channel.try_receive() {
        handle(cmd);
        n += 1;
    }
    n
}
