//! Coop door motor driver (H-bridge with over-current stall line).
//!
//! Two outputs drive the bridge: `EN` energises the motor and `DIR`
//! selects the direction (HIGH = raise / open).  The bridge's current-sense
//! comparator raises `STALL` while the motor is loaded past its limit,
//! which is how an obstruction shows up.
//!
//! ## Stall latch
//!
//! `STALL` is only meaningful while the motor runs, and a brief spike must
//! not be lost between samples.  The control loop calls
//! [`poll_stall`](DoorMotor::poll_stall) on every pass; any HIGH sample
//! latches until the next [`drive`](DoorMotor::drive).  When the travel
//! window closes, [`outcome`](DoorMotor::outcome) reports `Jammed` if the
//! latch is set.
//!
//! The driver is generic over `embedded-hal` 1.0 digital pins so the same
//! code runs on `esp-idf-hal` `PinDriver`s and on test doubles.

use embedded_hal::digital::{InputPin, OutputPin};
use log::{debug, warn};

use super::PinFault;
use crate::app::ports::ActuatorOutcome;
use crate::door::Direction;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotorState {
    Stopped,
    Running(Direction),
}

pub struct DoorMotor<EN, DIR, STALL> {
    enable: EN,
    dir: DIR,
    stall: STALL,
    state: MotorState,
    stall_latched: bool,
}

impl<EN, DIR, STALL> DoorMotor<EN, DIR, STALL>
where
    EN: OutputPin,
    DIR: OutputPin,
    STALL: InputPin,
{
    pub fn new(enable: EN, dir: DIR, stall: STALL) -> Self {
        Self {
            enable,
            dir,
            stall,
            state: MotorState::Stopped,
            stall_latched: false,
        }
    }

    /// Energise the motor in `direction`, clearing the stall latch.
    pub fn drive(&mut self, direction: Direction) -> Result<(), PinFault> {
        // Direction must settle before the bridge is enabled.
        self.enable.set_low().map_err(|_| PinFault("door enable"))?;
        let set_dir = match direction {
            Direction::Open => self.dir.set_high(),
            Direction::Close => self.dir.set_low(),
        };
        set_dir.map_err(|_| PinFault("door direction"))?;
        self.enable.set_high().map_err(|_| PinFault("door enable"))?;

        self.stall_latched = false;
        self.state = MotorState::Running(direction);
        debug!("door motor: running {:?}", direction);
        Ok(())
    }

    pub fn stop(&mut self) -> Result<(), PinFault> {
        self.state = MotorState::Stopped;
        self.enable.set_low().map_err(|_| PinFault("door enable"))
    }

    /// Sample the stall line.  Returns the latch state.
    pub fn poll_stall(&mut self) -> bool {
        if self.state == MotorState::Stopped {
            return self.stall_latched;
        }
        match self.stall.is_high() {
            Ok(true) => {
                if !self.stall_latched {
                    warn!("door motor: stall detected");
                }
                self.stall_latched = true;
            }
            Ok(false) => {}
            Err(_) => warn!("door motor: stall line unreadable"),
        }
        self.stall_latched
    }

    /// Outcome of the travel in `direction` that just ran its full window.
    ///
    /// A travel that is not the one in progress, or an unreadable stall
    /// line, counts as a jam: the safe answer is to back off.
    pub fn outcome(&mut self, direction: Direction) -> ActuatorOutcome {
        let jammed = self.poll_stall();
        if jammed || self.state != MotorState::Running(direction) {
            ActuatorOutcome::Jammed
        } else {
            ActuatorOutcome::Completed
        }
    }

    pub fn state(&self) -> MotorState {
        self.state
    }
}
