//! Simulated coop: a host-side stand-in for the whole board.
//!
//! Implements both [`SensorPort`] and [`ActuatorPort`] so an
//! [`AppService`](crate::app::service::AppService) can run without
//! hardware.  Light level is set by the caller; the battery drains slowly
//! with every reading; each door travel jams with a configurable
//! probability drawn from an injected `rand::Rng`.
//!
//! Every actuator command is recorded so a test or demo can inspect what
//! the core asked for.

use log::debug;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::app::ports::{ActuatorOutcome, ActuatorPort, SensorPort, SensorReading};
use crate::clock::Instant;
use crate::door::Direction;

/// Chance that any one door travel jams.
pub const DEFAULT_FAULT_PROBABILITY: f64 = 0.2;

const BATTERY_START_V: f32 = 12.4;
const BATTERY_DRAIN_PER_READ_V: f32 = 0.001;
const BATTERY_FLOOR_V: f32 = 10.5;

/// A command the core issued to the simulated actuators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimCommand {
    DriveDoor(Direction),
    StopDoor,
    Feeder(bool),
}

pub struct SimulatedCoop<R = SmallRng> {
    rng: R,
    fault_probability: f64,
    forced: Option<ActuatorOutcome>,
    light_level: u8,
    battery_voltage: f32,
    now: Instant,
    door_motor: Option<Direction>,
    feeder_on: bool,
    commands: Vec<SimCommand>,
}

impl SimulatedCoop<SmallRng> {
    /// Seeded simulation with the default fault probability.
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(SmallRng::seed_from_u64(seed))
    }
}

impl<R: Rng> SimulatedCoop<R> {
    pub fn with_rng(rng: R) -> Self {
        Self {
            rng,
            fault_probability: DEFAULT_FAULT_PROBABILITY,
            forced: None,
            light_level: 50,
            battery_voltage: BATTERY_START_V,
            now: Instant::ZERO,
            door_motor: None,
            feeder_on: false,
            commands: Vec::new(),
        }
    }

    /// Clamped to `0.0..=1.0`; NaN disables faults.
    pub fn with_fault_probability(mut self, p: f64) -> Self {
        self.fault_probability = if p.is_nan() { 0.0 } else { p.clamp(0.0, 1.0) };
        self
    }

    pub fn fault_probability(&self) -> f64 {
        self.fault_probability
    }

    /// Override the next door outcome instead of rolling for it.
    pub fn force_next_outcome(&mut self, outcome: ActuatorOutcome) {
        self.forced = Some(outcome);
    }

    /// Clamped to 100.
    pub fn set_light_level(&mut self, percent: u8) {
        self.light_level = percent.min(100);
    }

    /// Timestamp applied to subsequent readings.
    pub fn set_now(&mut self, now: Instant) {
        self.now = now;
    }

    pub fn battery_voltage(&self) -> f32 {
        self.battery_voltage
    }

    pub fn door_motor(&self) -> Option<Direction> {
        self.door_motor
    }

    pub fn feeder_on(&self) -> bool {
        self.feeder_on
    }

    pub fn commands(&self) -> &[SimCommand] {
        &self.commands
    }

    /// Feeder on/off commands, in order.
    pub fn feeder_commands(&self) -> impl Iterator<Item = bool> + '_ {
        self.commands.iter().filter_map(|c| match c {
            SimCommand::Feeder(on) => Some(*on),
            _ => None,
        })
    }
}

impl<R: Rng> SensorPort for SimulatedCoop<R> {
    fn latest_reading(&mut self) -> Option<SensorReading> {
        self.battery_voltage = (self.battery_voltage - BATTERY_DRAIN_PER_READ_V).max(BATTERY_FLOOR_V);
        Some(SensorReading {
            light_level: self.light_level,
            battery_voltage: self.battery_voltage,
            observed_at: self.now,
        })
    }
}

impl<R: Rng> ActuatorPort for SimulatedCoop<R> {
    fn drive_door(&mut self, direction: Direction) {
        self.door_motor = Some(direction);
        self.commands.push(SimCommand::DriveDoor(direction));
    }

    fn door_outcome(&mut self, direction: Direction) -> ActuatorOutcome {
        let outcome = self.forced.take().unwrap_or_else(|| {
            if self.rng.gen_bool(self.fault_probability) {
                ActuatorOutcome::Jammed
            } else {
                ActuatorOutcome::Completed
            }
        });
        debug!("sim: {:?} travel -> {:?}", direction, outcome);
        outcome
    }

    fn stop_door(&mut self) {
        self.door_motor = None;
        self.commands.push(SimCommand::StopDoor);
    }

    fn drive_feeder(&mut self, on: bool) {
        self.feeder_on = on;
        self.commands.push(SimCommand::Feeder(on));
    }
}
