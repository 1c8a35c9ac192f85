//! Application service: the hexagonal core.
//!
//! [`AppService`] owns the door controller, automation loop, feeder
//! scheduler, timer service, event log and configuration store.  It exposes
//! a clean, hardware-agnostic API.  All I/O flows through port traits
//! injected at call sites, making the entire service testable with mock
//! adapters.
//!
//! ```text
//!  SensorPort ──▶ ┌──────────────────────────┐ ──▶ EventLog
//!                 │        AppService         │
//! ActuatorPort ◀──│ Door · Automation · Feed  │◀── Clock
//!                 └──────────────────────────┘
//!                              ▲
//!                         AppCommand
//! ```
//!
//! The service is driven from one control loop: readings go in through
//! [`on_reading`](AppService::on_reading), time advances through
//! [`tick`](AppService::tick), and operator actions through
//! [`handle_command`](AppService::handle_command).

use log::{debug, info};
use serde::Serialize;

use crate::automation::AutomationLoop;
use crate::clock::{Clock, Instant, TimerChannel, TimerService};
use crate::config::{ConfigStore, SystemConfig};
use crate::door::{Direction, DoorController, DoorState};
use crate::error::ConfigError;
use crate::event_log::{EventLog, EventSink, LogLevel};
use crate::feeder::{FeederRunState, FeederScheduler};

use super::commands::AppCommand;
use super::ports::{ActuatorPort, SensorPort, SensorReading};

/// Point-in-time view for a dashboard collaborator.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct StatusSnapshot {
    pub door: DoorState,
    pub feeder: FeederRunState,
    pub latest_reading: Option<SensorReading>,
    pub config: SystemConfig,
    pub jam_count: u32,
    pub feed_cycles: u32,
    pub log_entries: usize,
}

// ───────────────────────────────────────────────────────────────
// AppService
// ───────────────────────────────────────────────────────────────

/// The application service orchestrates all domain logic.
pub struct AppService {
    config: ConfigStore,
    door: DoorController,
    automation: AutomationLoop,
    feeder: FeederScheduler,
    timers: TimerService,
    log: EventLog,
}

impl AppService {
    /// Construct the service from an initial configuration.
    ///
    /// The door starts `Closed` and the feeder idle.
    pub fn new(config: SystemConfig) -> Result<Self, ConfigError> {
        let config = ConfigStore::new(config)?;
        let door = DoorController::from_config(&config.get());
        info!(
            "AppService ready: door {}, sunrise {}%, sunset {}%",
            door.state(),
            config.get().sunrise_threshold,
            config.get().sunset_threshold
        );
        Ok(Self {
            config,
            door,
            automation: AutomationLoop::new(),
            feeder: FeederScheduler::new(),
            timers: TimerService::new(),
            log: EventLog::new(),
        })
    }

    // ── Inputs ────────────────────────────────────────────────

    /// Feed a new sensor reading to the automation loop.
    pub fn on_reading(
        &mut self,
        reading: SensorReading,
        hw: &mut impl ActuatorPort,
    ) -> Option<Direction> {
        let config = self.config.get();
        self.automation.on_reading(
            reading,
            &config,
            &mut self.door,
            &mut self.timers,
            hw,
            &mut self.log,
        )
    }

    /// Pull the newest reading from `hw`, if any, and act on it.
    ///
    /// The `hw` parameter satisfies **both** [`SensorPort`] and
    /// [`ActuatorPort`], which avoids a double mutable borrow while keeping
    /// the port boundary explicit.
    pub fn poll_sensors(&mut self, hw: &mut (impl SensorPort + ActuatorPort)) -> Option<Direction> {
        let reading = hw.latest_reading()?;
        self.on_reading(reading, hw)
    }

    /// Advance time: fire due timers, then check the feed schedule.
    pub fn tick(&mut self, clock: &impl Clock, hw: &mut impl ActuatorPort) {
        let now = clock.now();
        self.fire_due_timers(now, hw);

        match clock.time_of_day() {
            Some(tod) => {
                let config = self.config.get();
                self.feeder
                    .tick(tod, now, &config, &mut self.timers, hw, &mut self.log);
            }
            None => debug!("tick: wall clock not synced, feed schedule skipped"),
        }
    }

    /// Dispatch every timer due at `now` to its owner.  Returns how many
    /// fired.
    pub fn fire_due_timers(&mut self, now: Instant, hw: &mut impl ActuatorPort) -> usize {
        let config = self.config.get();
        let mut fired = 0;
        while let Some(event) = self.timers.pop_due(now) {
            fired += 1;
            match event.channel() {
                TimerChannel::Door => {
                    let settled =
                        self.door
                            .on_timer(event, now, &mut self.timers, hw, &mut self.log);
                    if settled.is_some() {
                        self.automation.on_door_settled(
                            now,
                            &config,
                            &mut self.door,
                            &mut self.timers,
                            hw,
                            &mut self.log,
                        );
                    }
                }
                TimerChannel::Feeder => self.feeder.on_timer(event, now, hw, &mut self.log),
            }
        }
        fired
    }

    // ── Command handling ──────────────────────────────────────

    /// Process an operator command.
    pub fn handle_command(&mut self, cmd: AppCommand, now: Instant, hw: &mut impl ActuatorPort) {
        match cmd {
            AppCommand::ToggleDoor => self.toggle_door(now, hw),
            AppCommand::ManualFeed => {
                let config = self.config.get();
                self.feeder
                    .manual_trigger(now, &config, &mut self.timers, hw, &mut self.log);
            }
            AppCommand::UpdateConfig(next) => self.update_config(next, now, hw),
            AppCommand::ClearLog => self.log.clear(),
        }
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn door_state(&self) -> DoorState {
        self.door.state()
    }

    pub fn feeder_state(&self) -> FeederRunState {
        self.feeder.state()
    }

    /// Copy of the live configuration.
    pub fn config(&self) -> SystemConfig {
        self.config.get()
    }

    /// Read-only access for log observers.
    pub fn log(&self) -> &EventLog {
        &self.log
    }

    pub fn latest_reading(&self) -> Option<SensorReading> {
        self.automation.latest()
    }

    /// Earliest pending timer deadline, so the loop can sleep until then.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.timers.next_due()
    }

    pub fn status(&self) -> StatusSnapshot {
        StatusSnapshot {
            door: self.door.state(),
            feeder: self.feeder.state(),
            latest_reading: self.automation.latest(),
            config: self.config.get(),
            jam_count: self.door.jam_count(),
            feed_cycles: self.feeder.cycles(),
            log_entries: self.log.len(),
        }
    }

    // ── Internal ──────────────────────────────────────────────

    fn toggle_door(&mut self, now: Instant, hw: &mut impl ActuatorPort) {
        let direction = match self.door.state() {
            DoorState::Closed => Direction::Open,
            DoorState::Open => Direction::Close,
            busy => {
                self.log.append(
                    now,
                    LogLevel::Debug,
                    format_args!("Manual override ignored: door {}", busy),
                );
                return;
            }
        };

        let verb = match direction {
            Direction::Open => "opening",
            Direction::Close => "closing",
        };
        if let Err(e) = self.door.request_move_because(
            direction,
            now,
            (LogLevel::Warn, format_args!("Manual override: {} door", verb)),
            &mut self.timers,
            hw,
            &mut self.log,
        ) {
            debug!("toggle: {:?} refused ({})", direction, e);
        }
    }

    fn update_config(&mut self, next: SystemConfig, now: Instant, hw: &mut impl ActuatorPort) {
        if let Err(e) = self.config.set(next) {
            self.log.append(
                now,
                LogLevel::Warn,
                format_args!("Configuration rejected: {}", e),
            );
            return;
        }

        let config = self.config.get();
        self.door
            .set_timing(config.door_travel(), config.door_recovery());
        self.log.append(
            now,
            LogLevel::Info,
            format_args!(
                "Configuration updated: sunrise {}%, sunset {}%, feeds {} / {}",
                config.sunrise_threshold,
                config.sunset_threshold,
                config.feed_time_morning,
                config.feed_time_evening
            ),
        );

        // New thresholds apply to the reading already in hand.
        self.automation.on_door_settled(
            now,
            &config,
            &mut self.door,
            &mut self.timers,
            hw,
            &mut self.log,
        );
    }
}
