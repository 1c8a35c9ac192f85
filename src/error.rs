//! Unified error types for the coopkeeper firmware.
//!
//! Each subsystem has a small `Copy` error enum; all of them convert into the
//! top-level [`Error`] so callers that do not care about the origin can
//! use a single type.  None of these are fatal to the control loop: the
//! service handles them locally by logging and carrying on.

use core::fmt;

use crate::drivers::hw_init::HwInitError;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A door move request was refused.
    Door(DoorError),
    /// A configuration write was rejected.
    Config(ConfigError),
    /// The timer service could not schedule a deadline.
    Timer(TimerError),
    /// Peripheral initialisation failed.
    Init(HwInitError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Door(e) => write!(f, "door: {e}"),
            Self::Config(e) => write!(f, "config: {e}"),
            Self::Timer(e) => write!(f, "timer: {e}"),
            Self::Init(e) => write!(f, "init: {e}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<HwInitError> for Error {
    fn from(e: HwInitError) -> Self {
        Self::Init(e)
    }
}

// ---------------------------------------------------------------------------
// Door errors
// ---------------------------------------------------------------------------

/// Why [`DoorController::request_move`](crate::door::DoorController::request_move)
/// refused a request.
///
/// Neither variant is a system fault.  `Busy` means "try again once the door
/// is at rest"; `NoOp` means the door is already where it was asked to go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DoorError {
    /// The door is in motion or recovering from a jam.
    Busy,
    /// The door already rests in the requested state.
    NoOp,
}

impl fmt::Display for DoorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Busy => write!(f, "door busy"),
            Self::NoOp => write!(f, "door already in requested state"),
        }
    }
}

impl From<DoorError> for Error {
    fn from(e: DoorError) -> Self {
        Self::Door(e)
    }
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

/// A rejected configuration write.  The previous configuration stays live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// A config field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
    /// The supplied document could not be decoded at all.
    Malformed,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
            Self::Malformed => write!(f, "malformed config document"),
        }
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

// ---------------------------------------------------------------------------
// Timer errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerError {
    /// The actuator channel already has a pending deadline.
    ChannelBusy,
    /// Every timer slot is in use.
    Full,
}

impl fmt::Display for TimerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ChannelBusy => write!(f, "channel already has a pending timer"),
            Self::Full => write!(f, "timer slots exhausted"),
        }
    }
}

impl From<TimerError> for Error {
    fn from(e: TimerError) -> Self {
        Self::Timer(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
