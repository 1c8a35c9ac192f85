//! Actuator drivers, hardware initialisation, and peripheral helpers.

pub mod door_motor;
pub mod feeder_motor;
pub mod hw_init;
pub mod watchdog;

/// A digital pin write or read failed.  Carries the pin's role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinFault(pub &'static str);

impl core::fmt::Display for PinFault {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{} pin fault", self.0)
    }
}
