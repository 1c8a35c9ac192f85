//! End-to-end scenarios through `AppService` with mock hardware.

use super::mock_hw::{ActuatorCall, Rig};

use coopkeeper::door::{Direction, DoorState};
use coopkeeper::event_log::LogLevel;

// ── Scenario A: sunrise opens the door ───────────────────────

#[test]
fn sunrise_reading_opens_door_with_two_info_entries() {
    let mut rig = Rig::new();

    assert_eq!(rig.read_light(65), Some(Direction::Open));
    assert_eq!(rig.app.door_state(), DoorState::Opening);

    rig.run_for(2_900, 100);
    assert_eq!(rig.app.door_state(), DoorState::Opening);
    rig.run_for(100, 100);
    assert_eq!(rig.app.door_state(), DoorState::Open);

    assert_eq!(rig.count(LogLevel::Info), 2);
    let messages = rig.messages();
    // The reason is recorded before the door reports its transient state.
    assert_eq!(messages[0], "Light level 65% > threshold 60%. Opening door.");
    assert!(messages[1].starts_with("Door OPENING"), "{}", messages[1]);
    assert_eq!(messages[2], "Door movement complete: OPEN");
    assert_eq!(
        rig.hw.calls,
        [ActuatorCall::DriveDoor(Direction::Open), ActuatorCall::StopDoor]
    );
}

// ── Scenario B: obstruction while opening ────────────────────

#[test]
fn jam_while_opening_auto_reverses_to_closed() {
    let mut rig = Rig::new();
    rig.hw.jam_next();

    rig.read_light(65);
    rig.run_for(3_000, 100);
    assert_eq!(rig.app.door_state(), DoorState::Jammed);

    // Dusk arrives mid-recovery; nothing reopens the door afterwards.
    rig.read_light(40);
    assert_eq!(rig.app.door_state(), DoorState::Jammed);

    rig.run_for(3_000, 100);
    assert_eq!(rig.app.door_state(), DoorState::Closed);

    assert_eq!(
        rig.levels(),
        [LogLevel::Info, LogLevel::Debug, LogLevel::Error, LogLevel::Warn]
    );
    let messages = rig.messages();
    assert!(messages[0].starts_with("Light level 65%"), "{}", messages[0]);
    assert!(messages[2].contains("during OPENING"), "{}", messages[2]);
    assert!(messages[3].contains("Reverted to CLOSED"), "{}", messages[3]);
    assert_eq!(
        rig.hw.door_drives(),
        [Direction::Open, Direction::Close],
        "motor reversed after the jam"
    );
    assert_eq!(rig.app.status().jam_count, 1);
}

#[test]
fn jam_recovery_retries_when_light_still_says_open() {
    let mut rig = Rig::new();
    rig.hw.jam_next();

    rig.read_light(65);
    rig.run_for(6_000, 100);

    // Back at Closed with a bright reading in hand: automation tries again.
    assert_eq!(rig.app.door_state(), DoorState::Opening);
    rig.run_for(3_000, 100);
    assert_eq!(rig.app.door_state(), DoorState::Open);
}

// ── Scenario C: morning feed ─────────────────────────────────

#[test]
fn morning_feed_runs_one_cycle_of_configured_duration() {
    let mut rig = Rig::at(8, 0, 0);

    rig.tick();
    assert!(rig.app.feeder_state().running);
    assert!(rig.hw.feeder_on());

    // A second tick at 08:00:00 starts nothing.
    rig.tick();
    assert_eq!(rig.hw.feeder_calls(), [true]);

    rig.run_for(4_900, 100);
    assert!(rig.app.feeder_state().running);
    rig.run_for(100, 100);
    assert!(!rig.app.feeder_state().running);
    assert_eq!(rig.hw.feeder_calls(), [true, false]);

    // Rest of the minute: no second cycle.
    rig.run_for(50_000, 1_000);
    assert_eq!(rig.hw.feeder_calls(), [true, false]);
    assert_eq!(rig.app.status().feed_cycles, 1);
}

// ── Hysteresis through the service ───────────────────────────

#[test]
fn repeated_bright_readings_request_open_once() {
    let mut rig = Rig::new();
    assert_eq!(rig.read_light(70), Some(Direction::Open));
    for _ in 0..5 {
        rig.clock.advance_ms(200);
        assert_eq!(rig.read_light(70), None, "door is Opening");
    }
    rig.run_for(3_000, 100);
    assert_eq!(rig.app.door_state(), DoorState::Open);
    assert_eq!(rig.read_light(70), None, "door is Open");
    assert_eq!(rig.hw.door_drives(), [Direction::Open]);
}

#[test]
fn dusk_closes_open_door() {
    let mut rig = Rig::new();
    rig.read_light(70);
    rig.run_for(3_000, 100);

    assert_eq!(rig.read_light(35), None, "dead band");
    assert_eq!(rig.read_light(15), Some(Direction::Close));
    assert!(rig
        .messages()
        .iter()
        .any(|m| m == "Light level 15% < threshold 20%. Closing door."));
    rig.run_for(3_000, 100);
    assert_eq!(rig.app.door_state(), DoorState::Closed);
}
