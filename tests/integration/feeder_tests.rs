//! Feeder schedule and manual feed through `AppService`.

use super::mock_hw::Rig;

use coopkeeper::app::channels::{self, CommandChannel};
use coopkeeper::app::commands::AppCommand;
use coopkeeper::clock::{Clock, ClockTime};
use coopkeeper::event_log::LogLevel;

fn feed_now(rig: &mut Rig) {
    let now = rig.clock.now();
    rig.app.handle_command(AppCommand::ManualFeed, now, &mut rig.hw);
}

#[test]
fn double_trigger_runs_one_cycle_and_logs_one_completion() {
    let mut rig = Rig::new();
    feed_now(&mut rig);
    rig.clock.advance_ms(1_000);
    feed_now(&mut rig);

    rig.run_for(10_000, 500);
    assert_eq!(rig.hw.feeder_calls(), [true, false]);
    let completions = rig
        .messages()
        .iter()
        .filter(|m| m.as_str() == "Feed cycle complete")
        .count();
    assert_eq!(completions, 1);
}

#[test]
fn unsynced_clock_skips_schedule() {
    let mut rig = Rig::new();
    rig.run_for(120_000, 1_000);
    assert!(rig.hw.feeder_calls().is_empty());
}

#[test]
fn evening_window_fires_after_sync() {
    let mut rig = Rig::new();
    rig.tick();
    rig.clock
        .set_time_of_day(ClockTime::new(15, 59, 58).unwrap());
    rig.run_for(2_000, 1_000);

    assert!(rig.app.feeder_state().running);
    assert!(rig
        .messages()
        .iter()
        .any(|m| m.starts_with("Scheduled feed (16:00)")));
}

#[test]
fn changed_feed_duration_applies_to_next_cycle() {
    let mut rig = Rig::new();
    let mut config = rig.app.config();
    config.feed_duration_secs = 2;
    let now = rig.clock.now();
    rig.app
        .handle_command(AppCommand::UpdateConfig(config), now, &mut rig.hw);

    feed_now(&mut rig);
    rig.run_for(2_000, 500);
    assert!(!rig.app.feeder_state().running);
}

#[test]
fn commands_arrive_through_the_channel() {
    let mut rig = Rig::new();
    let inbox = CommandChannel::new();
    assert!(channels::post(&inbox, AppCommand::ManualFeed));
    assert!(channels::post(&inbox, AppCommand::ManualFeed));

    let now = rig.clock.now();
    let handled = channels::drain(&inbox, |cmd| rig.app.handle_command(cmd, now, &mut rig.hw));
    assert_eq!(handled, 2);
    assert_eq!(rig.hw.feeder_calls(), [true]);
    assert_eq!(rig.count(LogLevel::Info), 1);
}
