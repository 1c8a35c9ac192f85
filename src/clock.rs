//! Clock and timer service.
//!
//! Time enters the core in two shapes:
//!
//! - [`Instant`]: monotonic milliseconds since boot, used for every timer
//!   deadline and log timestamp.
//! - [`ClockTime`]: wall-clock time of day, used only by the feeder
//!   schedule.  It is `None` until the wall clock has been synced.
//!
//! Delayed work is expressed as [`TimerEvent`]s held by a [`TimerService`]
//! rather than nested callbacks.  The control loop polls
//! [`TimerService::pop_due`] and dispatches each event to the component that
//! owns it, so every state mutation happens on one thread of control.
//!
//! ```text
//!  DoorController ──after(DoorTravel)──▶ ┌──────────────┐
//!  FeederScheduler ─after(FeedComplete)─▶ │ TimerService │──pop_due()──▶ AppService
//!                                         └──────────────┘
//! ```
//!
//! Each actuator channel may hold at most one pending timer.

use core::fmt;
use core::time::Duration;

use heapless::Vec;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::TimerError;

// ═══════════════════════════════════════════════════════════════
//  Time types
// ═══════════════════════════════════════════════════════════════

/// Monotonic timestamp in milliseconds since boot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct Instant(u64);

impl Instant {
    pub const ZERO: Self = Self(0);

    pub const fn from_millis(ms: u64) -> Self {
        Self(ms)
    }

    pub const fn from_secs(secs: u64) -> Self {
        Self(secs * 1000)
    }

    pub const fn as_millis(self) -> u64 {
        self.0
    }

    /// `self + delay`, saturating at the end of time.
    pub fn saturating_add(self, delay: Duration) -> Self {
        let ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        Self(self.0.saturating_add(ms))
    }

    /// Time elapsed from `earlier` to `self`, zero if `earlier` is later.
    pub fn saturating_duration_since(self, earlier: Self) -> Duration {
        Duration::from_millis(self.0.saturating_sub(earlier.0))
    }
}

impl fmt::Display for Instant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:03}s", self.0 / 1000, self.0 % 1000)
    }
}

/// Wall-clock time of day (24-hour).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ClockTime {
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

impl ClockTime {
    /// Returns `None` if any field is out of range.
    pub const fn new(hour: u8, minute: u8, second: u8) -> Option<Self> {
        if hour < 24 && minute < 60 && second < 60 {
            Some(Self {
                hour,
                minute,
                second,
            })
        } else {
            None
        }
    }

    /// Time of day for `secs` seconds past midnight (wraps every 24 h).
    pub const fn from_secs_of_day(secs: u64) -> Self {
        let secs = secs % 86_400;
        Self {
            hour: (secs / 3600) as u8,
            minute: ((secs / 60) % 60) as u8,
            second: (secs % 60) as u8,
        }
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}:{:02}", self.hour, self.minute, self.second)
    }
}

// ═══════════════════════════════════════════════════════════════
//  Clock port
// ═══════════════════════════════════════════════════════════════

/// Time source consumed by the core.
pub trait Clock {
    /// Monotonic time since boot.
    fn now(&self) -> Instant;

    /// Current wall-clock time of day, or `None` if not yet synced.
    fn time_of_day(&self) -> Option<ClockTime>;
}

impl<T: Clock + ?Sized> Clock for &T {
    fn now(&self) -> Instant {
        (**self).now()
    }

    fn time_of_day(&self) -> Option<ClockTime> {
        (**self).time_of_day()
    }
}

// ═══════════════════════════════════════════════════════════════
//  Timer service
// ═══════════════════════════════════════════════════════════════

/// Work that becomes due after a delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    /// The door travel window elapsed; sample the actuator outcome.
    DoorTravel,
    /// The safety-reverse window after a jam elapsed.
    DoorRecovery,
    /// The feeder has run for its configured duration.
    FeedComplete,
}

/// Which actuator a timer belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerChannel {
    Door,
    Feeder,
}

impl TimerEvent {
    pub const fn channel(self) -> TimerChannel {
        match self {
            Self::DoorTravel | Self::DoorRecovery => TimerChannel::Door,
            Self::FeedComplete => TimerChannel::Feeder,
        }
    }
}

/// Handle returned by [`TimerService::after`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CancelToken(u32);

#[derive(Debug, Clone, Copy)]
struct PendingTimer {
    token: u32,
    due: Instant,
    event: TimerEvent,
}

/// Maximum number of pending timers (one per channel, with headroom).
const MAX_TIMERS: usize = 4;

/// Fixed-capacity deadline queue.
pub struct TimerService {
    pending: Vec<PendingTimer, MAX_TIMERS>,
    next_token: u32,
}

impl Default for TimerService {
    fn default() -> Self {
        Self::new()
    }
}

impl TimerService {
    pub fn new() -> Self {
        Self {
            pending: Vec::new(),
            next_token: 0,
        }
    }

    /// Schedule `event` to become due `delay` after `now`.
    ///
    /// Fails with [`TimerError::ChannelBusy`] if the event's channel already
    /// has a pending timer.
    pub fn after(
        &mut self,
        now: Instant,
        delay: Duration,
        event: TimerEvent,
    ) -> Result<CancelToken, TimerError> {
        if self.is_pending(event.channel()) {
            return Err(TimerError::ChannelBusy);
        }
        let token = self.next_token;
        let due = now.saturating_add(delay);
        self.pending
            .push(PendingTimer { token, due, event })
            .map_err(|_| TimerError::Full)?;
        self.next_token = self.next_token.wrapping_add(1);
        debug!("timer: {:?} due at {} (token {})", event, due, token);
        Ok(CancelToken(token))
    }

    /// Drop a pending timer.  Returns `false` if it already fired.
    pub fn cancel(&mut self, token: CancelToken) -> bool {
        match self.pending.iter().position(|p| p.token == token.0) {
            Some(idx) => {
                self.pending.swap_remove(idx);
                true
            }
            None => false,
        }
    }

    /// Remove and return the earliest timer whose deadline is `<= now`.
    ///
    /// Timers due at the same instant come out in scheduling order.
    pub fn pop_due(&mut self, now: Instant) -> Option<TimerEvent> {
        let idx = self
            .pending
            .iter()
            .enumerate()
            .filter(|(_, p)| p.due <= now)
            .min_by_key(|(_, p)| (p.due, p.token))
            .map(|(i, _)| i)?;
        Some(self.pending.swap_remove(idx).event)
    }

    /// Earliest pending deadline, for sleeping until the next piece of work.
    pub fn next_due(&self) -> Option<Instant> {
        self.pending.iter().map(|p| p.due).min()
    }

    /// Whether `channel` currently has a pending timer.
    pub fn is_pending(&self, channel: TimerChannel) -> bool {
        self.pending.iter().any(|p| p.event.channel() == channel)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

// ═══════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════
