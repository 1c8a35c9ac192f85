//! Light-driven door automation.
//!
//! Two thresholds with a dead band between them give hysteresis:
//!
//! ```text
//!   0 %        sunset            sunrise        100 %
//!   ├────────────┼──────────────────┼─────────────┤
//!    close if Open   (no decision)     open if Closed
//! ```
//!
//! A closed door only opens once light climbs above `sunrise`, and an open
//! door only closes once it falls below `sunset`, so a reading hovering
//! around either threshold cannot make the door oscillate.
//!
//! The decision itself ([`evaluate`]) is pure.  [`AutomationLoop`] keeps the
//! latest reading and feeds decisions into the door controller, both when a
//! new reading arrives and when the door comes to rest.

use log::debug;

use crate::app::ports::{ActuatorPort, SensorReading};
use crate::clock::{Instant, TimerService};
use crate::config::SystemConfig;
use crate::door::{Direction, DoorController, DoorState};
use crate::event_log::{EventSink, LogLevel};

/// Decide whether the door should move for `light_level` (%).
///
/// Only rest states produce a decision; a door in motion or jammed is left
/// alone.
pub fn evaluate(light_level: u8, state: DoorState, config: &SystemConfig) -> Option<Direction> {
    match state {
        DoorState::Closed if light_level > config.sunrise_threshold => Some(Direction::Open),
        DoorState::Open if light_level < config.sunset_threshold => Some(Direction::Close),
        _ => None,
    }
}

/// Holds the latest reading and turns decisions into door requests.
#[derive(Debug, Default)]
pub struct AutomationLoop {
    latest: Option<SensorReading>,
}

impl AutomationLoop {
    pub fn new() -> Self {
        Self { latest: None }
    }

    /// Most recent reading; it replaces, not queues, earlier ones.
    pub fn latest(&self) -> Option<SensorReading> {
        self.latest
    }

    /// Record `reading` and act on it.  Returns the direction requested, if
    /// the door accepted one.
    pub fn on_reading(
        &mut self,
        reading: SensorReading,
        config: &SystemConfig,
        door: &mut DoorController,
        timers: &mut TimerService,
        hw: &mut impl ActuatorPort,
        sink: &mut impl EventSink,
    ) -> Option<Direction> {
        self.latest = Some(reading);
        self.decide(reading.observed_at, config, door, timers, hw, sink)
    }

    /// Re-run the decision against the latest reading once the door is at
    /// rest again.
    pub fn on_door_settled(
        &mut self,
        now: Instant,
        config: &SystemConfig,
        door: &mut DoorController,
        timers: &mut TimerService,
        hw: &mut impl ActuatorPort,
        sink: &mut impl EventSink,
    ) -> Option<Direction> {
        self.decide(now, config, door, timers, hw, sink)
    }

    fn decide(
        &mut self,
        now: Instant,
        config: &SystemConfig,
        door: &mut DoorController,
        timers: &mut TimerService,
        hw: &mut impl ActuatorPort,
        sink: &mut impl EventSink,
    ) -> Option<Direction> {
        let light = self.latest?.light_level;
        let direction = evaluate(light, door.state(), config)?;

        let accepted = match direction {
            Direction::Open => door.request_move_because(
                direction,
                now,
                (
                    LogLevel::Info,
                    format_args!(
                        "Light level {}% > threshold {}%. Opening door.",
                        light, config.sunrise_threshold
                    ),
                ),
                timers,
                hw,
                sink,
            ),
            Direction::Close => door.request_move_because(
                direction,
                now,
                (
                    LogLevel::Info,
                    format_args!(
                        "Light level {}% < threshold {}%. Closing door.",
                        light, config.sunset_threshold
                    ),
                ),
                timers,
                hw,
                sink,
            ),
        };
        if let Err(e) = accepted {
            debug!("automation: {:?} not taken ({})", direction, e);
            return None;
        }
        Some(direction)
    }
}
