//! System configuration parameters
//!
//! All tunable parameters for the coop controller, plus [`ConfigStore`],
//! the single owner of the live, validated snapshot.
//!
//! Values arrive from a configuration collaborator (provisioning form, RPC)
//! as a whole [`SystemConfig`] or a JSON document.  A write is validated in
//! full before it replaces the previous snapshot, so a reader never sees a
//! half-applied update and a rejected write leaves the old values in force.

use core::fmt;
use core::str::FromStr;
use core::time::Duration;

use log::{info, warn};
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::clock::ClockTime;
use crate::error::ConfigError;

// ═══════════════════════════════════════════════════════════════
//  FeedTime
// ═══════════════════════════════════════════════════════════════

/// A time of day at minute resolution, written `HH:MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FeedTime {
    hour: u8,
    minute: u8,
}

impl FeedTime {
    pub const fn new(hour: u8, minute: u8) -> Option<Self> {
        if hour < 24 && minute < 60 {
            Some(Self { hour, minute })
        } else {
            None
        }
    }

    pub const fn hour(self) -> u8 {
        self.hour
    }

    pub const fn minute(self) -> u8 {
        self.minute
    }

    /// True when `now` falls inside this minute (any second).
    pub fn matches(self, now: ClockTime) -> bool {
        now.hour == self.hour && now.minute == self.minute
    }
}

impl fmt::Display for FeedTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

impl FromStr for FeedTime {
    type Err = ConfigError;

    /// Accepts exactly `HH:MM` with two ASCII digits on each side.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        const BAD: ConfigError = ConfigError::ValidationFailed("feed time must be HH:MM");

        let bytes = s.as_bytes();
        if bytes.len() != 5 || bytes[2] != b':' {
            return Err(BAD);
        }
        let two_digits = |hi: u8, lo: u8| -> Option<u8> {
            if hi.is_ascii_digit() && lo.is_ascii_digit() {
                Some((hi - b'0') * 10 + (lo - b'0'))
            } else {
                None
            }
        };
        let hour = two_digits(bytes[0], bytes[1]).ok_or(BAD)?;
        let minute = two_digits(bytes[3], bytes[4]).ok_or(BAD)?;
        Self::new(hour, minute).ok_or(ConfigError::ValidationFailed(
            "feed time out of range (00:00-23:59)",
        ))
    }
}

impl Serialize for FeedTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for FeedTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct FeedTimeVisitor;

        impl Visitor<'_> for FeedTimeVisitor {
            type Value = FeedTime;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a time of day as \"HH:MM\"")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<FeedTime, E> {
                v.parse().map_err(|e: ConfigError| E::custom(e))
            }
        }

        deserializer.deserialize_str(FeedTimeVisitor)
    }
}

// ═══════════════════════════════════════════════════════════════
//  SystemConfig
// ═══════════════════════════════════════════════════════════════

/// Core system configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SystemConfig {
    // --- Door (LDR hysteresis) ---
    /// Light level (%) above which a closed door opens
    pub sunrise_threshold: u8,
    /// Light level (%) below which an open door closes
    pub sunset_threshold: u8,

    // --- Feeder ---
    pub feed_time_morning: FeedTime,
    pub feed_time_evening: FeedTime,
    /// How long the feeder motor runs per cycle (seconds)
    pub feed_duration_secs: u16,

    // --- Door actuator timing ---
    /// Time allowed for a full open/close travel (milliseconds)
    pub door_travel_ms: u32,
    /// How long the motor reverses after a jam (milliseconds)
    pub door_recovery_ms: u32,

    // --- Timing ---
    /// Light / battery read interval (milliseconds)
    pub sensor_read_interval_ms: u32,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            sunrise_threshold: 60,
            sunset_threshold: 20,

            feed_time_morning: FeedTime { hour: 8, minute: 0 },
            feed_time_evening: FeedTime {
                hour: 16,
                minute: 0,
            },
            feed_duration_secs: 5,

            door_travel_ms: 3000,
            door_recovery_ms: 3000,

            sensor_read_interval_ms: 1000,
        }
    }
}

impl SystemConfig {
    /// Range-check every field.  Invalid values are rejected, never clamped.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sunrise_threshold > 100 {
            return Err(ConfigError::ValidationFailed(
                "sunrise_threshold must be 0-100",
            ));
        }
        if self.sunset_threshold >= self.sunrise_threshold {
            return Err(ConfigError::ValidationFailed(
                "sunset_threshold must be < sunrise_threshold",
            ));
        }
        if self.feed_duration_secs == 0 {
            return Err(ConfigError::ValidationFailed(
                "feed_duration_secs must be > 0",
            ));
        }
        if !(500..=60_000).contains(&self.door_travel_ms) {
            return Err(ConfigError::ValidationFailed(
                "door_travel_ms must be 500-60000",
            ));
        }
        if !(500..=60_000).contains(&self.door_recovery_ms) {
            return Err(ConfigError::ValidationFailed(
                "door_recovery_ms must be 500-60000",
            ));
        }
        if !(100..=600_000).contains(&self.sensor_read_interval_ms) {
            return Err(ConfigError::ValidationFailed(
                "sensor_read_interval_ms must be 100-600000",
            ));
        }
        Ok(())
    }

    pub fn door_travel(&self) -> Duration {
        Duration::from_millis(self.door_travel_ms as u64)
    }

    pub fn door_recovery(&self) -> Duration {
        Duration::from_millis(self.door_recovery_ms as u64)
    }

    pub fn feed_duration(&self) -> Duration {
        Duration::from_secs(self.feed_duration_secs as u64)
    }

    pub fn sensor_read_interval(&self) -> Duration {
        Duration::from_millis(self.sensor_read_interval_ms as u64)
    }
}

// ═══════════════════════════════════════════════════════════════
//  ConfigStore
// ═══════════════════════════════════════════════════════════════

/// Owner of the live configuration snapshot.
#[derive(Debug)]
pub struct ConfigStore {
    current: SystemConfig,
    revision: u32,
}

impl ConfigStore {
    /// Build a store from an initial configuration, which must be valid.
    pub fn new(initial: SystemConfig) -> Result<Self, ConfigError> {
        initial.validate()?;
        Ok(Self {
            current: initial,
            revision: 0,
        })
    }

    /// Copy of the current snapshot.
    pub fn get(&self) -> SystemConfig {
        self.current
    }

    /// Validate `config` and, if it passes, replace the snapshot whole.
    pub fn set(&mut self, config: SystemConfig) -> Result<(), ConfigError> {
        if let Err(e) = config.validate() {
            warn!("config: rejected write ({}), keeping revision {}", e, self.revision);
            return Err(e);
        }
        self.current = config;
        self.revision = self.revision.wrapping_add(1);
        info!("config: revision {} applied", self.revision);
        Ok(())
    }

    /// Decode a JSON document and apply it with [`set`](Self::set).
    pub fn apply_json(&mut self, json: &str) -> Result<(), ConfigError> {
        let config: SystemConfig =
            serde_json::from_str(json).map_err(|_| ConfigError::Malformed)?;
        self.set(config)
    }

    /// Number of accepted writes since construction.
    pub fn revision(&self) -> u32 {
        self.revision
    }
}

impl Default for ConfigStore {
    fn default() -> Self {
        Self {
            current: SystemConfig::default(),
            revision: 0,
        }
    }
}
