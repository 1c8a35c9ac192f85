//! Time adapters.
//!
//! - [`SystemClock`]: the real clock.
//!   - **`target_os = "espidf"`** wraps `esp_timer_get_time()` (monotonic)
//!     and `gettimeofday` + `localtime_r` (wall clock, after SNTP sync).
//!   - **`not(target_os = "espidf")`** uses `std::time::Instant` and the
//!     host's UTC time of day.
//! - [`ManualClock`]: a clock that only moves when told to, for
//!   simulation and tests.

use core::cell::Cell;
use core::time::Duration;

use crate::clock::{Clock, ClockTime, Instant};

/// Wall-clock seconds before 2020-01-01 mean the clock was never synced.
const EPOCH_2020: i64 = 1_577_836_800;

pub struct SystemClock {
    #[cfg(not(target_os = "espidf"))]
    start: std::time::Instant,
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            #[cfg(not(target_os = "espidf"))]
            start: std::time::Instant::now(),
        }
    }
}

#[cfg(target_os = "espidf")]
impl Clock for SystemClock {
    fn now(&self) -> Instant {
        // SAFETY: esp_timer_get_time reads the monotonic RTC counter.
        let us = unsafe { esp_idf_svc::sys::esp_timer_get_time() };
        Instant::from_millis(us.max(0) as u64 / 1_000)
    }

    fn time_of_day(&self) -> Option<ClockTime> {
        let mut tv = esp_idf_svc::sys::timeval {
            tv_sec: 0,
            tv_usec: 0,
        };
        // SAFETY: tv is a valid out-pointer; a null timezone is allowed.
        if unsafe { esp_idf_svc::sys::gettimeofday(&mut tv, core::ptr::null_mut()) } != 0 {
            return None;
        }
        if (tv.tv_sec as i64) < EPOCH_2020 {
            return None;
        }
        let secs = tv.tv_sec as esp_idf_svc::sys::time_t;
        // SAFETY: tm is plain data; localtime_r fills it or returns null.
        let mut tm: esp_idf_svc::sys::tm = unsafe { core::mem::zeroed() };
        if unsafe { esp_idf_svc::sys::localtime_r(&secs, &mut tm) }.is_null() {
            return None;
        }
        ClockTime::new(
            u8::try_from(tm.tm_hour).ok()?,
            u8::try_from(tm.tm_min).ok()?,
            // tm_sec can be 60 on a leap second.
            u8::try_from(tm.tm_sec.min(59)).ok()?,
        )
    }
}

#[cfg(not(target_os = "espidf"))]
impl Clock for SystemClock {
    fn now(&self) -> Instant {
        let ms = u64::try_from(self.start.elapsed().as_millis()).unwrap_or(u64::MAX);
        Instant::from_millis(ms)
    }

    fn time_of_day(&self) -> Option<ClockTime> {
        let since_epoch = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .ok()?;
        let secs = since_epoch.as_secs();
        if i64::try_from(secs).ok()? < EPOCH_2020 {
            return None;
        }
        Some(ClockTime::from_secs_of_day(secs))
    }
}

// ───────────────────────────────────────────────────────────────
// ManualClock
// ───────────────────────────────────────────────────────────────

/// A clock driven by hand.  Monotonic time and time of day advance
/// together; time of day stays `None` until [`set_time_of_day`] is called.
///
/// [`set_time_of_day`]: ManualClock::set_time_of_day
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<Instant>,
    /// Seconds past midnight at `now`, if synced.
    day_secs: Cell<Option<u64>>,
    /// Milliseconds accumulated below one second of wall time.
    sub_ms: Cell<u64>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// A clock already synced to `tod`.
    pub fn at(tod: ClockTime) -> Self {
        let clock = Self::new();
        clock.set_time_of_day(tod);
        clock
    }

    pub fn set_time_of_day(&self, tod: ClockTime) {
        let secs = u64::from(tod.hour) * 3600 + u64::from(tod.minute) * 60 + u64::from(tod.second);
        self.day_secs.set(Some(secs));
        self.sub_ms.set(0);
    }

    pub fn advance(&self, by: Duration) {
        let ms = u64::try_from(by.as_millis()).unwrap_or(u64::MAX);
        self.now.set(self.now.get().saturating_add(by));
        if let Some(secs) = self.day_secs.get() {
            let total = self.sub_ms.get().saturating_add(ms);
            self.sub_ms.set(total % 1000);
            self.day_secs.set(Some(secs.saturating_add(total / 1000)));
        }
    }

    pub fn advance_ms(&self, ms: u64) {
        self.advance(Duration::from_millis(ms));
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.now.get()
    }

    fn time_of_day(&self) -> Option<ClockTime> {
        self.day_secs.get().map(ClockTime::from_secs_of_day)
    }
}
