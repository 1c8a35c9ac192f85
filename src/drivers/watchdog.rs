//! Task watchdog for the control loop.
//!
//! If the loop stops calling [`Watchdog::feed`] for longer than the timeout,
//! the TWDT panics and the chip resets.  A reset de-energises both motors,
//! which leaves the door wherever it stopped and the feeder off.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

pub struct Watchdog {
    #[cfg(target_os = "espidf")]
    subscribed: bool,
}

impl Watchdog {
    /// Configure the TWDT and subscribe the calling task.
    pub fn new(timeout_ms: u32) -> Self {
        #[cfg(target_os = "espidf")]
        {
            // SAFETY: TWDT calls run once from the main task at boot.
            let subscribed = unsafe {
                let cfg = esp_task_wdt_config_t {
                    timeout_ms,
                    idle_core_mask: 0,
                    trigger_panic: true,
                };
                let ret = esp_task_wdt_reconfigure(&cfg);
                if ret != ESP_OK {
                    log::warn!("watchdog: reconfigure returned {} (already configured?)", ret);
                }
                esp_task_wdt_add(core::ptr::null_mut()) == ESP_OK
            };
            if subscribed {
                log::info!("watchdog: subscribed ({} ms, panic on trigger)", timeout_ms);
            } else {
                log::warn!("watchdog: failed to subscribe, running unguarded");
            }
            Self { subscribed }
        }

        #[cfg(not(target_os = "espidf"))]
        {
            log::info!("watchdog(sim): {} ms timeout not enforced", timeout_ms);
            Self {}
        }
    }

    /// Must be called more often than the timeout.
    pub fn feed(&self) {
        #[cfg(target_os = "espidf")]
        if self.subscribed {
            // SAFETY: resets the current task's TWDT entry; no shared state.
            unsafe {
                esp_task_wdt_reset();
            }
        }
    }
}
