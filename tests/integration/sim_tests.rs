//! `AppService` driven by the simulated coop adapter.

use coopkeeper::adapters::sim::SimulatedCoop;
use coopkeeper::adapters::time::ManualClock;
use coopkeeper::app::ports::ActuatorOutcome;
use coopkeeper::app::service::AppService;
use coopkeeper::clock::Clock;
use coopkeeper::config::SystemConfig;
use coopkeeper::door::DoorState;

fn step(app: &mut AppService, sim: &mut SimulatedCoop, clock: &ManualClock, ms: u64) {
    clock.advance_ms(ms);
    sim.set_now(clock.now());
    app.poll_sensors(sim);
    app.tick(clock, sim);
}

#[test]
fn fault_free_sim_opens_at_sunrise() {
    let mut app = AppService::new(SystemConfig::default()).unwrap();
    let mut sim = SimulatedCoop::seeded(42).with_fault_probability(0.0);
    let clock = ManualClock::new();

    sim.set_light_level(80);
    for _ in 0..40 {
        step(&mut app, &mut sim, &clock, 100);
    }
    assert_eq!(app.door_state(), DoorState::Open);
    assert_eq!(sim.door_motor(), None, "motor stopped at rest");
}

#[test]
fn always_jamming_door_never_reaches_open() {
    let mut app = AppService::new(SystemConfig::default()).unwrap();
    let mut sim = SimulatedCoop::seeded(42).with_fault_probability(1.0);
    let clock = ManualClock::new();

    sim.set_light_level(80);
    for _ in 0..300 {
        step(&mut app, &mut sim, &clock, 100);
        assert_ne!(app.door_state(), DoorState::Open);
    }
    // 30 s of retries at 6 s per jam-and-reverse.
    assert!(app.status().jam_count >= 4, "jams: {}", app.status().jam_count);
}

#[test]
fn forced_fault_then_clean_retry() {
    let mut app = AppService::new(SystemConfig::default()).unwrap();
    let mut sim = SimulatedCoop::seeded(1).with_fault_probability(0.0);
    let clock = ManualClock::new();

    sim.force_next_outcome(ActuatorOutcome::Jammed);
    sim.set_light_level(80);
    for _ in 0..100 {
        step(&mut app, &mut sim, &clock, 100);
    }
    assert_eq!(app.door_state(), DoorState::Open);
    assert_eq!(app.status().jam_count, 1);
}

#[test]
fn battery_reading_reaches_status() {
    let mut app = AppService::new(SystemConfig::default()).unwrap();
    let mut sim = SimulatedCoop::seeded(0);
    let clock = ManualClock::new();
    step(&mut app, &mut sim, &clock, 1_000);

    let reading = app.status().latest_reading.unwrap();
    assert!(reading.battery_voltage < 12.4);
    assert_eq!(reading.observed_at, clock.now());
}
