//! Battery voltage monitor.
//!
//! A 100 kΩ / 22 kΩ divider brings the 12 V lead-acid supply into the
//! ADC1_CH7 (GPIO 35) range.

use core::sync::atomic::{AtomicU16, Ordering};

#[cfg(target_os = "espidf")]
use crate::drivers::hw_init;

static SIM_BATTERY_ADC: AtomicU16 = AtomicU16::new(0);

#[cfg(not(target_os = "espidf"))]
pub fn sim_set_battery_adc(raw: u16) {
    SIM_BATTERY_ADC.store(raw, Ordering::Relaxed);
}

/// ADC input voltage at full scale with 12 dB attenuation.
const ADC_FULL_SCALE_V: f32 = 3.3;
const R_TOP_OHMS: f32 = 100_000.0;
const R_BOTTOM_OHMS: f32 = 22_000.0;

/// Battery volts for a 12-bit conversion of the divider midpoint.
pub fn raw_to_volts(raw: u16) -> f32 {
    let v_adc = f32::from(raw.min(4095)) / 4095.0 * ADC_FULL_SCALE_V;
    v_adc * (R_TOP_OHMS + R_BOTTOM_OHMS) / R_BOTTOM_OHMS
}

pub struct BatteryMonitor {
    last_volts: Option<f32>,
    _adc_gpio: i32,
}

impl BatteryMonitor {
    pub fn new(adc_gpio: i32) -> Self {
        Self {
            last_volts: None,
            _adc_gpio: adc_gpio,
        }
    }

    /// `None` if the conversion failed.
    pub fn read_volts(&mut self) -> Option<f32> {
        let volts = raw_to_volts(self.read_adc()?);
        self.last_volts = Some(volts);
        Some(volts)
    }

    pub fn last_volts(&self) -> Option<f32> {
        self.last_volts
    }

    #[cfg(target_os = "espidf")]
    fn read_adc(&self) -> Option<u16> {
        hw_init::adc1_read(hw_init::ADC1_CH_BATTERY)
    }

    #[cfg(not(target_os = "espidf"))]
    fn read_adc(&self) -> Option<u16> {
        Some(SIM_BATTERY_ADC.load(Ordering::Relaxed))
    }
}
