//! Feeder auger motor, switched through a logic-level MOSFET on GPIO 16.

use embedded_hal::digital::OutputPin;

use super::PinFault;

pub struct FeederMotor<P> {
    pin: P,
}

impl<P: OutputPin> FeederMotor<P> {
    pub fn new(pin: P) -> Self {
        Self { pin }
    }

    pub fn set(&mut self, on: bool) -> Result<(), PinFault> {
        let res = if on {
            self.pin.set_high()
        } else {
            self.pin.set_low()
        };
        res.map_err(|_| PinFault("feeder"))
    }
}
