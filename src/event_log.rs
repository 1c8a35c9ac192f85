//! Event log sink.
//!
//! A bounded, append-only record of what the controller did and why.  The
//! door controller, automation loop and feeder scheduler append through the
//! [`EventSink`] port; an operator-facing observer (dashboard, log viewer)
//! reads through [`EventLog::subscribe`] or [`EventLog::events_after`].
//!
//! The log keeps the most recent [`LOG_CAPACITY`] entries in a fixed-size
//! ring.  Entries are immutable and only ever leave by eviction of the
//! oldest, or by an operator [`clear`](EventLog::clear).
//!
//! Every append is also forwarded to the `log` facade at the matching level,
//! so the serial console tells the same story.

use core::fmt::{self, Write as _};

use heapless::{Deque, String};
use serde::Serialize;

use crate::clock::Instant;

/// Number of entries retained.
pub const LOG_CAPACITY: usize = 100;

/// Maximum message length in bytes; longer messages are truncated.
pub const MESSAGE_CAP: usize = 128;

/// Severity of a [`LogEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warn => "WARN",
            Self::Error => "ERROR",
        }
    }
}

impl From<LogLevel> for log::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Debug => log::Level::Debug,
            LogLevel::Info => log::Level::Info,
            LogLevel::Warn => log::Level::Warn,
            LogLevel::Error => log::Level::Error,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Opaque, unique, monotonically increasing event identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct EventId(u64);

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:08x}", self.0)
    }
}

/// One immutable log entry.
#[derive(Debug, Clone, Serialize)]
pub struct LogEvent {
    id: EventId,
    timestamp: Instant,
    level: LogLevel,
    message: String<MESSAGE_CAP>,
}

impl LogEvent {
    pub fn id(&self) -> EventId {
        self.id
    }

    pub fn timestamp(&self) -> Instant {
        self.timestamp
    }

    pub fn level(&self) -> LogLevel {
        self.level
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

// ───────────────────────────────────────────────────────────────
// Port
// ───────────────────────────────────────────────────────────────

/// Where domain components report activity.
pub trait EventSink {
    fn append(&mut self, at: Instant, level: LogLevel, message: fmt::Arguments<'_>);
}

/// Writes into a fixed-capacity string, dropping whatever does not fit.
struct Truncating<'a>(&'a mut String<MESSAGE_CAP>);

impl fmt::Write for Truncating<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for c in s.chars() {
            if self.0.push(c).is_err() {
                break;
            }
        }
        Ok(())
    }
}

// ───────────────────────────────────────────────────────────────
// EventLog
// ───────────────────────────────────────────────────────────────

/// Bounded ring of the most recent [`LOG_CAPACITY`] events.
pub struct EventLog {
    entries: Deque<LogEvent, LOG_CAPACITY>,
    next_id: u64,
    evicted: u64,
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new()
    }
}

impl EventLog {
    pub fn new() -> Self {
        Self {
            entries: Deque::new(),
            next_id: 1,
            evicted: 0,
        }
    }

    /// All retained events, oldest first.
    ///
    /// The iterator borrows the log, so it is a finite snapshot: an observer
    /// that wants live updates polls again (see [`events_after`](Self::events_after)).
    pub fn subscribe(&self) -> impl Iterator<Item = &LogEvent> + '_ {
        self.entries.iter()
    }

    /// Retained events newer than `id`, oldest first.
    pub fn events_after(&self, id: EventId) -> impl Iterator<Item = &LogEvent> + '_ {
        self.entries.iter().filter(move |e| e.id > id)
    }

    /// Most recent event.
    pub fn latest(&self) -> Option<&LogEvent> {
        self.entries.back()
    }

    /// Empty the log.  Operator action only; automation never calls this.
    pub fn clear(&mut self) {
        let n = self.entries.len();
        self.entries.clear();
        log::info!("event log cleared ({} entries)", n);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries dropped by bounded eviction since boot.
    pub fn evicted(&self) -> u64 {
        self.evicted
    }
}

impl EventSink for EventLog {
    fn append(&mut self, at: Instant, level: LogLevel, message: fmt::Arguments<'_>) {
        let mut text = String::new();
        let _ = Truncating(&mut text).write_fmt(message);

        let id = EventId(self.next_id);
        self.next_id += 1;

        log::log!(log::Level::from(level), "[{}] {}", id, text);

        if self.entries.is_full() {
            self.entries.pop_front();
            self.evicted += 1;
        }
        // Room was made above, so this cannot be rejected.
        let _ = self.entries.push_back(LogEvent {
            id,
            timestamp: at,
            level,
            message: text,
        });
    }
}
