//! Coopkeeper Firmware: Main Entry Point
//!
//! Hexagonal architecture driven by one cooperative control loop.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HardwareAdapter            SystemClock        CMD_CHANNEL     │
//! │  (Sensor + Actuator)        (Clock)            (AppCommand)    │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              AppService (pure logic)                   │    │
//! │  │  Door · Automation · Feeder · Timers · EventLog        │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::Result;
use esp_idf_hal::delay::FreeRtos;
use esp_idf_hal::gpio::PinDriver;
use esp_idf_hal::peripherals::Peripherals;
use log::{error, info, warn};

use coopkeeper::adapters::hardware::HardwareAdapter;
use coopkeeper::adapters::time::SystemClock;
use coopkeeper::app::channels::{self, CMD_CHANNEL};
use coopkeeper::app::ports::Clock;
use coopkeeper::app::service::AppService;
use coopkeeper::clock::Instant;
use coopkeeper::config::SystemConfig;
use coopkeeper::drivers::door_motor::DoorMotor;
use coopkeeper::drivers::feeder_motor::FeederMotor;
use coopkeeper::drivers::{hw_init, watchdog::Watchdog};
use coopkeeper::pins;
use coopkeeper::sensors::battery::BatteryMonitor;
use coopkeeper::sensors::light::LightSensor;
use coopkeeper::sensors::SensorHub;

/// Control loop period.  Short enough to catch stall spikes.
const LOOP_PERIOD_MS: u32 = 20;
const WATCHDOG_TIMEOUT_MS: u32 = 10_000;
const STATUS_EVERY_MS: u64 = 60_000;

// ── Main ──────────────────────────────────────────────────────

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  Coopkeeper v{}                      ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Config + core ──────────────────────────────────────
    // Persistence belongs to the provisioning collaborator; boot always
    // starts from defaults and accepts UpdateConfig over CMD_CHANNEL.
    let config = SystemConfig::default();
    // No ADC means no light reading to automate from.
    let mut app = bring_up(config).inspect_err(|e| error!("boot failed: {}", e))?;

    // ── 3. Peripherals ────────────────────────────────────────
    let peripherals = Peripherals::take()?;
    let door_enable = PinDriver::output(peripherals.pins.gpio19)?;
    let door_dir = PinDriver::output(peripherals.pins.gpio18)?;
    let door_stall = PinDriver::input(peripherals.pins.gpio5)?;
    let feeder_pin = PinDriver::output(peripherals.pins.gpio16)?;
    info!(
        "pins: door EN={} DIR={} STALL={}, feeder={}, LDR={}, battery={}",
        pins::DOOR_ENABLE_GPIO,
        pins::DOOR_DIR_GPIO,
        pins::DOOR_STALL_GPIO,
        pins::FEEDER_GPIO,
        pins::LDR_ADC_GPIO,
        pins::BATTERY_ADC_GPIO
    );

    // ── 4. Construct adapters ─────────────────────────────────
    let clock = SystemClock::new();
    let sensor_hub = SensorHub::new(
        LightSensor::new(pins::LDR_ADC_GPIO),
        BatteryMonitor::new(pins::BATTERY_ADC_GPIO),
    );
    let mut hw = HardwareAdapter::new(
        &clock,
        sensor_hub,
        DoorMotor::new(door_enable, door_dir, door_stall),
        FeederMotor::new(feeder_pin),
        config.sensor_read_interval(),
    );
    hw.all_off();

    let watchdog = Watchdog::new(WATCHDOG_TIMEOUT_MS);

    info!("System ready. Entering control loop.");

    // ── 5. Control loop ───────────────────────────────────────
    let mut last_status = clock.now();
    loop {
        hw.poll_stall();

        app.poll_sensors(&mut hw);
        app.tick(&clock, &mut hw);

        let handled = channels::drain(&CMD_CHANNEL, |cmd| {
            app.handle_command(cmd, clock.now(), &mut hw);
        });
        if handled > 0 {
            hw.set_read_interval(app.config().sensor_read_interval());
        }

        let now = clock.now();
        if now.saturating_duration_since(last_status).as_millis() >= u128::from(STATUS_EVERY_MS) {
            let status = app.status();
            info!(
                "status: door {} feeder {} jams {} feeds {} log {}",
                status.door,
                if status.feeder.running { "RUNNING" } else { "idle" },
                status.jam_count,
                status.feed_cycles,
                status.log_entries
            );
            if clock.time_of_day().is_none() {
                warn!("status: wall clock not synced, feed schedule inactive");
            }
            last_status = now;
        }

        watchdog.feed();
        FreeRtos::delay_ms(sleep_ms(app.next_deadline(), clock.now()));
    }
}

/// ADC bring-up and service construction, both fatal at boot.
fn bring_up(config: SystemConfig) -> coopkeeper::error::Result<AppService> {
    hw_init::init_peripherals()?;
    Ok(AppService::new(config)?)
}

/// Sleep one loop period, or less if a timer falls due sooner.  Never zero,
/// so the idle task still gets to run.
fn sleep_ms(next_deadline: Option<Instant>, now: Instant) -> u32 {
    next_deadline.map_or(LOOP_PERIOD_MS, |due| {
        let until = due.saturating_duration_since(now).as_millis();
        until.clamp(1, u128::from(LOOP_PERIOD_MS)) as u32
    })
}
