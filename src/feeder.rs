//! Feeder scheduler.
//!
//! Runs the feeder motor for `feed_duration_secs` at the morning and evening
//! feed times, or on operator request.  A cycle that is already running
//! swallows any further trigger, scheduled or manual.
//!
//! Feed windows are matched on hour and minute.  Each window fires at most
//! once per matching minute: after a short cycle finishes, later ticks in
//! the same minute do not start another.

use log::{debug, warn};
use serde::Serialize;

use crate::app::ports::ActuatorPort;
use crate::clock::{ClockTime, Instant, TimerEvent, TimerService};
use crate::config::{FeedTime, SystemConfig};
use crate::event_log::{EventSink, LogLevel};

/// Feeder run state, owned by [`FeederScheduler`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct FeederRunState {
    pub running: bool,
    pub started_at: Option<Instant>,
}

/// What started a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedTrigger {
    Scheduled(FeedTime),
    Manual,
}

#[derive(Debug, Default)]
pub struct FeederScheduler {
    run: FeederRunState,
    /// Window that already fired during its current minute.
    latched: Option<FeedTime>,
    cycles: u32,
}

impl FeederScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> FeederRunState {
        self.run
    }

    pub fn is_running(&self) -> bool {
        self.run.running
    }

    /// Completed cycles since boot.
    pub fn cycles(&self) -> u32 {
        self.cycles
    }

    /// Check the feed windows against the wall clock.  Returns `true` if a
    /// cycle was started.
    pub fn tick(
        &mut self,
        time_of_day: ClockTime,
        now: Instant,
        config: &SystemConfig,
        timers: &mut TimerService,
        hw: &mut impl ActuatorPort,
        sink: &mut impl EventSink,
    ) -> bool {
        if self.latched.is_some_and(|w| !w.matches(time_of_day)) {
            self.latched = None;
        }

        let Some(window) = [config.feed_time_morning, config.feed_time_evening]
            .into_iter()
            .find(|w| w.matches(time_of_day))
        else {
            return false;
        };

        if self.run.running || self.latched == Some(window) {
            return false;
        }

        let started = self.trigger_feed(FeedTrigger::Scheduled(window), now, config, timers, hw, sink);
        if started {
            self.latched = Some(window);
        }
        started
    }

    /// Operator-requested cycle; same guard as the schedule.
    pub fn manual_trigger(
        &mut self,
        now: Instant,
        config: &SystemConfig,
        timers: &mut TimerService,
        hw: &mut impl ActuatorPort,
        sink: &mut impl EventSink,
    ) -> bool {
        self.trigger_feed(FeedTrigger::Manual, now, config, timers, hw, sink)
    }

    /// Start a cycle unless one is already running.
    pub fn trigger_feed(
        &mut self,
        trigger: FeedTrigger,
        now: Instant,
        config: &SystemConfig,
        timers: &mut TimerService,
        hw: &mut impl ActuatorPort,
        sink: &mut impl EventSink,
    ) -> bool {
        if self.run.running {
            debug!("feeder: {:?} ignored, cycle in progress", trigger);
            return false;
        }

        let duration = config.feed_duration();
        if let Err(e) = timers.after(now, duration, TimerEvent::FeedComplete) {
            warn!("feeder: completion timer unavailable ({}), not starting", e);
            return false;
        }

        self.run = FeederRunState {
            running: true,
            started_at: Some(now),
        };
        match trigger {
            FeedTrigger::Scheduled(at) => sink.append(
                now,
                LogLevel::Info,
                format_args!("Scheduled feed ({}) for {} s", at, duration.as_secs()),
            ),
            FeedTrigger::Manual => {
                sink.append(now, LogLevel::Info, format_args!("Manual feed triggered"))
            }
        }
        hw.drive_feeder(true);
        true
    }

    /// Handle the feeder's completion timer.
    pub fn on_timer(
        &mut self,
        event: TimerEvent,
        now: Instant,
        hw: &mut impl ActuatorPort,
        sink: &mut impl EventSink,
    ) {
        if event != TimerEvent::FeedComplete || !self.run.running {
            warn!("feeder: ignoring stray {:?}", event);
            return;
        }
        hw.drive_feeder(false);
        self.run = FeederRunState::default();
        self.cycles = self.cycles.saturating_add(1);
        sink.append(now, LogLevel::Info, format_args!("Feed cycle complete"));
    }
}
