//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ AppService (domain)
//! ```
//!
//! Driven adapters (sensors, actuators, clocks) implement these traits.  The
//! [`AppService`](super::service::AppService) consumes them via generics, so
//! the domain core never touches hardware directly.
//!
//! The event sink port lives with the log it feeds, in
//! [`event_log`](crate::event_log), and is re-exported here.

use serde::Serialize;

use crate::clock::Instant;
use crate::door::Direction;

pub use crate::clock::Clock;
pub use crate::event_log::EventSink;

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// One sample of the environment.  The latest reading is the current
/// state; readings are never queued.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SensorReading {
    /// Ambient light, 0-100 %.
    pub light_level: u8,
    /// Supply battery voltage.
    pub battery_voltage: f32,
    pub observed_at: Instant,
}

/// Read-side port: the domain calls this to obtain sensor data.
pub trait SensorPort {
    /// Newest reading, or `None` if nothing new is available.
    fn latest_reading(&mut self) -> Option<SensorReading>;
}

// ───────────────────────────────────────────────────────────────
// Actuator port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// How a door travel ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ActuatorOutcome {
    Completed,
    Jammed,
}

/// Write-side port: the domain calls this to command actuators.
pub trait ActuatorPort {
    /// Energise the door motor in `direction`.
    fn drive_door(&mut self, direction: Direction);

    /// Sampled once the travel window has elapsed: did the travel in
    /// `direction` complete, or did the motor stall?
    fn door_outcome(&mut self, direction: Direction) -> ActuatorOutcome;

    /// De-energise the door motor.
    fn stop_door(&mut self);

    /// Switch the feeder motor.
    fn drive_feeder(&mut self, on: bool);
}
