//! Hardware adapter: bridges real peripherals to domain port traits.
//!
//! Owns the [`SensorHub`] and both motor drivers, exposing them through
//! [`SensorPort`] and [`ActuatorPort`].  This is the only module in the
//! system that touches actual hardware.  On non-espidf targets the sensor
//! drivers fall back to their cfg-gated simulation stubs.
//!
//! Readings are rate-limited to the configured sensor interval: between
//! intervals [`latest_reading`](SensorPort::latest_reading) returns `None`.
//! A failed LDR read also returns `None`; the next attempt waits for the
//! following interval.

use core::time::Duration;

use embedded_hal::digital::{InputPin, OutputPin};
use log::error;

use crate::app::ports::{ActuatorOutcome, ActuatorPort, SensorPort, SensorReading};
use crate::clock::{Clock, Instant};
use crate::door::Direction;
use crate::drivers::door_motor::DoorMotor;
use crate::drivers::feeder_motor::FeederMotor;
use crate::sensors::SensorHub;

/// Concrete adapter that combines all hardware behind port traits.
pub struct HardwareAdapter<C, EN, DIR, STALL, FEED> {
    clock: C,
    sensor_hub: SensorHub,
    door: DoorMotor<EN, DIR, STALL>,
    feeder: FeederMotor<FEED>,
    read_interval: Duration,
    last_read: Option<Instant>,
}

impl<C, EN, DIR, STALL, FEED> HardwareAdapter<C, EN, DIR, STALL, FEED>
where
    C: Clock,
    EN: OutputPin,
    DIR: OutputPin,
    STALL: InputPin,
    FEED: OutputPin,
{
    pub fn new(
        clock: C,
        sensor_hub: SensorHub,
        door: DoorMotor<EN, DIR, STALL>,
        feeder: FeederMotor<FEED>,
        read_interval: Duration,
    ) -> Self {
        Self {
            clock,
            sensor_hub,
            door,
            feeder,
            read_interval,
            last_read: None,
        }
    }

    pub fn set_read_interval(&mut self, interval: Duration) {
        self.read_interval = interval;
    }

    /// Sample the door stall line.  Call on every loop pass.
    pub fn poll_stall(&mut self) -> bool {
        self.door.poll_stall()
    }

    /// Kill both motors (boot and shutdown).
    pub fn all_off(&mut self) {
        self.stop_door();
        self.drive_feeder(false);
    }
}

// ── SensorPort implementation ─────────────────────────────────

impl<C, EN, DIR, STALL, FEED> SensorPort for HardwareAdapter<C, EN, DIR, STALL, FEED>
where
    C: Clock,
{
    fn latest_reading(&mut self) -> Option<SensorReading> {
        let now = self.clock.now();
        let interval = self.read_interval;
        if self
            .last_read
            .is_some_and(|last| now.saturating_duration_since(last) < interval)
        {
            return None;
        }
        self.last_read = Some(now);
        self.sensor_hub.read_all(now)
    }
}

// ── ActuatorPort implementation ───────────────────────────────

impl<C, EN, DIR, STALL, FEED> ActuatorPort for HardwareAdapter<C, EN, DIR, STALL, FEED>
where
    EN: OutputPin,
    DIR: OutputPin,
    STALL: InputPin,
    FEED: OutputPin,
{
    fn drive_door(&mut self, direction: Direction) {
        if let Err(e) = self.door.drive(direction) {
            // The travel deadline still fires; door_outcome reports a jam
            // because the motor never reached the Running state.
            error!("hw: {}", e);
        }
    }

    fn door_outcome(&mut self, direction: Direction) -> ActuatorOutcome {
        self.door.outcome(direction)
    }

    fn stop_door(&mut self) {
        if let Err(e) = self.door.stop() {
            error!("hw: {}", e);
        }
    }

    fn drive_feeder(&mut self, on: bool) {
        if let Err(e) = self.feeder.set(on) {
            error!("hw: {}", e);
        }
    }
}
