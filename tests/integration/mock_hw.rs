//! Mock hardware adapter for integration tests.
//!
//! Records every actuator call so tests can assert on the full command
//! history without touching real GPIO registers.  Door outcomes are
//! scripted: queue `Jammed` to force a fault, otherwise travel completes.

use std::collections::VecDeque;

use coopkeeper::adapters::time::ManualClock;
use coopkeeper::app::ports::{ActuatorOutcome, ActuatorPort, SensorPort, SensorReading};
use coopkeeper::app::service::AppService;
use coopkeeper::clock::{Clock, ClockTime};
use coopkeeper::config::SystemConfig;
use coopkeeper::door::Direction;
use coopkeeper::event_log::LogLevel;

// ── Actuator call record ──────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ActuatorCall {
    DriveDoor(Direction),
    StopDoor,
    Feeder(bool),
}

// ── MockHardware ──────────────────────────────────────────────

pub struct MockHardware {
    pub calls: Vec<ActuatorCall>,
    pub outcomes: VecDeque<ActuatorOutcome>,
    pub pending_reading: Option<SensorReading>,
}

#[allow(dead_code)]
impl MockHardware {
    pub fn new() -> Self {
        Self {
            calls: Vec::new(),
            outcomes: VecDeque::new(),
            pending_reading: None,
        }
    }

    /// The next door travel reports a stall.
    pub fn jam_next(&mut self) {
        self.outcomes.push_back(ActuatorOutcome::Jammed);
    }

    pub fn door_drives(&self) -> Vec<Direction> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                ActuatorCall::DriveDoor(d) => Some(*d),
                _ => None,
            })
            .collect()
    }

    pub fn feeder_calls(&self) -> Vec<bool> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                ActuatorCall::Feeder(on) => Some(*on),
                _ => None,
            })
            .collect()
    }

    pub fn feeder_on(&self) -> bool {
        self.feeder_calls().last().copied().unwrap_or(false)
    }
}

impl Default for MockHardware {
    fn default() -> Self {
        Self::new()
    }
}

impl ActuatorPort for MockHardware {
    fn drive_door(&mut self, direction: Direction) {
        self.calls.push(ActuatorCall::DriveDoor(direction));
    }

    fn door_outcome(&mut self, _direction: Direction) -> ActuatorOutcome {
        self.outcomes.pop_front().unwrap_or(ActuatorOutcome::Completed)
    }

    fn stop_door(&mut self) {
        self.calls.push(ActuatorCall::StopDoor);
    }

    fn drive_feeder(&mut self, on: bool) {
        self.calls.push(ActuatorCall::Feeder(on));
    }
}

// ── SensorPort for MockHardware ──────────────────────────────

impl SensorPort for MockHardware {
    fn latest_reading(&mut self) -> Option<SensorReading> {
        self.pending_reading.take()
    }
}

// ── Rig ───────────────────────────────────────────────────────

/// A fresh service, mock hardware and a manual clock.
pub struct Rig {
    pub app: AppService,
    pub hw: MockHardware,
    pub clock: ManualClock,
}

#[allow(dead_code)]
impl Rig {
    pub fn new() -> Self {
        Self::with_config(SystemConfig::default())
    }

    pub fn with_config(config: SystemConfig) -> Self {
        Self {
            app: AppService::new(config).expect("valid test config"),
            hw: MockHardware::new(),
            clock: ManualClock::new(),
        }
    }

    /// A rig whose wall clock reads `h:m:s`.
    pub fn at(h: u8, m: u8, s: u8) -> Self {
        let rig = Self::new();
        rig.clock
            .set_time_of_day(ClockTime::new(h, m, s).expect("valid time"));
        rig
    }

    /// Deliver a light reading stamped with the current clock.
    pub fn read_light(&mut self, light_level: u8) -> Option<Direction> {
        self.hw.pending_reading = Some(SensorReading {
            light_level,
            battery_voltage: 12.4,
            observed_at: self.clock.now(),
        });
        self.app.poll_sensors(&mut self.hw)
    }

    pub fn tick(&mut self) {
        self.app.tick(&self.clock, &mut self.hw);
    }

    /// Advance the clock in `step_ms` increments, ticking after each.
    pub fn run_for(&mut self, total_ms: u64, step_ms: u64) {
        let mut elapsed = 0;
        while elapsed < total_ms {
            let step = step_ms.min(total_ms - elapsed);
            self.clock.advance_ms(step);
            self.tick();
            elapsed += step;
        }
    }

    pub fn levels(&self) -> Vec<LogLevel> {
        self.app.log().subscribe().map(|e| e.level()).collect()
    }

    pub fn count(&self, level: LogLevel) -> usize {
        self.app
            .log()
            .subscribe()
            .filter(|e| e.level() == level)
            .count()
    }

    pub fn messages(&self) -> Vec<String> {
        self.app
            .log()
            .subscribe()
            .map(|e| e.message().to_string())
            .collect()
    }
}
