//! Operator door override and door retiming through the command path.

use super::mock_hw::Rig;

use coopkeeper::app::commands::AppCommand;
use coopkeeper::clock::Clock;
use coopkeeper::config::SystemConfig;
use coopkeeper::door::{Direction, DoorState};
use coopkeeper::event_log::LogLevel;

fn toggle(rig: &mut Rig) {
    let now = rig.clock.now();
    rig.app.handle_command(AppCommand::ToggleDoor, now, &mut rig.hw);
}

#[test]
fn toggle_opens_closed_door_with_warn_entry() {
    let mut rig = Rig::new();
    toggle(&mut rig);

    assert_eq!(rig.app.door_state(), DoorState::Opening);
    assert_eq!(rig.levels(), [LogLevel::Warn, LogLevel::Debug]);
    let first = rig.app.log().subscribe().next().unwrap();
    assert_eq!(first.message(), "Manual override: opening door");
}

#[test]
fn toggle_closes_open_door() {
    let mut rig = Rig::new();
    toggle(&mut rig);
    rig.run_for(3_000, 500);
    assert_eq!(rig.app.door_state(), DoorState::Open);

    toggle(&mut rig);
    assert_eq!(rig.app.door_state(), DoorState::Closing);
    assert!(rig
        .messages()
        .iter()
        .any(|m| m == "Manual override: closing door"));
}

#[test]
fn toggle_while_moving_is_ignored() {
    let mut rig = Rig::new();
    toggle(&mut rig);
    toggle(&mut rig);
    toggle(&mut rig);

    assert_eq!(rig.app.door_state(), DoorState::Opening);
    assert_eq!(rig.hw.door_drives(), [Direction::Open]);
    assert_eq!(rig.count(LogLevel::Warn), 1);
}

#[test]
fn toggle_while_jammed_is_ignored() {
    let mut rig = Rig::new();
    rig.hw.jam_next();
    toggle(&mut rig);
    rig.run_for(3_000, 500);
    assert_eq!(rig.app.door_state(), DoorState::Jammed);

    toggle(&mut rig);
    assert_eq!(rig.app.door_state(), DoorState::Jammed);
    assert!(rig
        .app
        .log()
        .latest()
        .unwrap()
        .message()
        .contains("ignored"));
}

#[test]
fn config_update_retimes_next_travel() {
    let mut rig = Rig::new();
    let faster = SystemConfig {
        door_travel_ms: 1_000,
        ..Default::default()
    };
    let now = rig.clock.now();
    rig.app
        .handle_command(AppCommand::UpdateConfig(faster), now, &mut rig.hw);

    toggle(&mut rig);
    rig.run_for(1_000, 100);
    assert_eq!(rig.app.door_state(), DoorState::Open);
}

#[test]
fn manual_open_at_night_is_closed_again_by_automation() {
    let mut rig = Rig::new();
    rig.read_light(10);
    toggle(&mut rig);
    rig.run_for(3_000, 100);

    // Door settled Open with a dark reading in hand.
    assert_eq!(rig.app.door_state(), DoorState::Closing);
}

#[test]
fn clear_log_empties_history() {
    let mut rig = Rig::new();
    toggle(&mut rig);
    assert!(!rig.app.log().is_empty());

    let now = rig.clock.now();
    rig.app.handle_command(AppCommand::ClearLog, now, &mut rig.hw);
    assert!(rig.app.log().is_empty());
    // Clearing the log does not touch the door.
    assert_eq!(rig.app.door_state(), DoorState::Opening);
}
