//! LDR (photoresistor) light sensor driver.
//!
//! The LDR sits in a voltage divider with a 10 kΩ resistor, read through
//! ADC1_CH6 (GPIO 34).  Each reading averages [`SAMPLES`] raw conversions
//! and scales the 12-bit result to a 0-100 % light level.  Failed
//! conversions are left out of the average; if every one fails there is no
//! reading at all rather than a false "dark".
//!
//! ## Dual-target design
//!
//! On ESP-IDF: reads ADC1_CH6 via the oneshot API (initialised by hw_init).
//! On host/test: reads from a static `AtomicU16` for injection, with a
//! second static counting conversions that should fail.

use core::sync::atomic::{AtomicU16, Ordering};

use log::debug;

#[cfg(target_os = "espidf")]
use crate::drivers::hw_init;

static SIM_LDR_ADC: AtomicU16 = AtomicU16::new(0);
static SIM_LDR_FAILURES: AtomicU16 = AtomicU16::new(0);

#[cfg(not(target_os = "espidf"))]
pub fn sim_set_ldr_adc(raw: u16) {
    SIM_LDR_ADC.store(raw, Ordering::Relaxed);
}

/// Make the next `count` simulated conversions fail.
#[cfg(not(target_os = "espidf"))]
pub fn sim_fail_ldr_samples(count: u16) {
    SIM_LDR_FAILURES.store(count, Ordering::Relaxed);
}

/// Raw conversions averaged per reading.
pub const SAMPLES: u32 = 10;

/// Full-scale value of a 12-bit conversion.
pub const ADC_MAX: u16 = 4095;

#[cfg(target_os = "espidf")]
const SAMPLE_SPACING_MS: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LightReading {
    /// Averaged raw ADC value.
    pub raw: u16,
    /// 0-100 %.
    pub percent: u8,
    /// Conversions that made it into the average.
    pub samples: u32,
}

/// Scale a 12-bit conversion to a whole percentage, clamping overrange.
pub fn raw_to_percent(raw: u16) -> u8 {
    let raw = u32::from(raw.min(ADC_MAX));
    ((raw * 100 + u32::from(ADC_MAX) / 2) / u32::from(ADC_MAX)) as u8
}

pub struct LightSensor {
    last: Option<LightReading>,
    _adc_gpio: i32,
}

impl LightSensor {
    pub fn new(adc_gpio: i32) -> Self {
        Self {
            last: None,
            _adc_gpio: adc_gpio,
        }
    }

    /// Average up to [`SAMPLES`] conversions.  `None` if none succeeded.
    pub fn read(&mut self) -> Option<LightReading> {
        let mut sum: u32 = 0;
        let mut samples: u32 = 0;
        for _ in 0..SAMPLES {
            if let Some(raw) = self.read_adc() {
                sum += u32::from(raw);
                samples += 1;
            }
            self.settle();
        }
        if samples == 0 {
            return None;
        }
        if samples < SAMPLES {
            debug!("ldr: {}/{} conversions failed", SAMPLES - samples, SAMPLES);
        }
        let raw = (sum / samples) as u16;
        let reading = LightReading {
            raw,
            percent: raw_to_percent(raw),
            samples,
        };
        self.last = Some(reading);
        Some(reading)
    }

    pub fn last(&self) -> Option<LightReading> {
        self.last
    }

    #[cfg(target_os = "espidf")]
    fn read_adc(&self) -> Option<u16> {
        hw_init::adc1_read(hw_init::ADC1_CH_LDR)
    }

    #[cfg(not(target_os = "espidf"))]
    fn read_adc(&self) -> Option<u16> {
        let failing = SIM_LDR_FAILURES
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| n.checked_sub(1))
            .is_ok();
        (!failing).then(|| SIM_LDR_ADC.load(Ordering::Relaxed))
    }

    #[cfg(target_os = "espidf")]
    fn settle(&self) {
        esp_idf_hal::delay::FreeRtos::delay_ms(SAMPLE_SPACING_MS);
    }

    #[cfg(not(target_os = "espidf"))]
    fn settle(&self) {}
}
