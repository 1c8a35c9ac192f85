//! Sensor subsystem: individual drivers and the aggregating [`SensorHub`].
//!
//! The hub owns every sensor driver and produces a
//! [`SensorReading`] each read interval for the automation loop.

pub mod battery;
pub mod light;

use log::warn;

use crate::app::ports::SensorReading;
use crate::clock::Instant;
use battery::BatteryMonitor;
use light::LightSensor;

/// Serialises unit tests that drive the simulation statics.
#[cfg(test)]
pub(crate) static SIM_ADC_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());

/// Aggregates all sensor drivers and produces a unified reading.
pub struct SensorHub {
    pub light: LightSensor,
    pub battery: BatteryMonitor,
}

impl SensorHub {
    /// Construct a new hub.  Pass in pre-built drivers (built in main
    /// where peripheral ownership is established).
    pub fn new(light: LightSensor, battery: BatteryMonitor) -> Self {
        Self { light, battery }
    }

    /// Read every sensor, stamped with `now`.
    ///
    /// Without a light level there is nothing to automate from, so a failed
    /// LDR read yields `None`.  A failed battery read falls back to the last
    /// good voltage (0 V before the first one).
    pub fn read_all(&mut self, now: Instant) -> Option<SensorReading> {
        let Some(light) = self.light.read() else {
            warn!("sensors: LDR read failed, reading skipped");
            return None;
        };
        let battery_voltage = match self.battery.read_volts() {
            Some(v) => v,
            None => {
                warn!("sensors: battery read failed, reporting last value");
                self.battery.last_volts().unwrap_or(0.0)
            }
        };
        Some(SensorReading {
            light_level: light.percent,
            battery_voltage,
            observed_at: now,
        })
    }
}
