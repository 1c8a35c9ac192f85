//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements           | Connects to                  |
//! |------------|----------------------|------------------------------|
//! | `hardware` | SensorPort           | ESP32 ADC (LDR, battery)     |
//! |            | ActuatorPort         | Door H-bridge, feeder MOSFET |
//! | `sim`      | SensorPort           | Settable light, battery drain|
//! |            | ActuatorPort         | Recorded commands, RNG jams  |
//! | `time`     | Clock                | esp_timer / std, wall clock  |

pub mod hardware;
pub mod sim;
pub mod time;
