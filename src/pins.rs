//! GPIO / peripheral pin assignments for the coop controller (ESP32 DevKit).
//!
//! Single source of truth for pin numbers.  `main()` takes the matching
//! typed pins from `Peripherals`; keep the two in step.

// ---------------------------------------------------------------------------
// Door motor (H-bridge with current-sense comparator)
// ---------------------------------------------------------------------------

/// Digital output: HIGH energises the bridge.
pub const DOOR_ENABLE_GPIO: i32 = 19;
/// Digital output: HIGH = raise (open), LOW = lower (close).
pub const DOOR_DIR_GPIO: i32 = 18;
/// Digital input: HIGH while motor current exceeds the stall limit.
pub const DOOR_STALL_GPIO: i32 = 5;

// ---------------------------------------------------------------------------
// Feeder
// ---------------------------------------------------------------------------

/// Digital output to the feeder MOSFET gate (via 220 Ω).  HIGH = run.
pub const FEEDER_GPIO: i32 = 16;

// ---------------------------------------------------------------------------
// Sensors: Analog (ADC1)
// ---------------------------------------------------------------------------

/// LDR + 10 kΩ divider.  ADC1 channel 6.
pub const LDR_ADC_GPIO: i32 = 34;

/// Battery divider (100 kΩ / 22 kΩ).  ADC1 channel 7.
pub const BATTERY_ADC_GPIO: i32 = 35;
