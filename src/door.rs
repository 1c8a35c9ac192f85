//! Door controller: motion state machine with jam detection and safety
//! auto-reverse.
//!
//! ```text
//!            request_move(Open)          travel elapsed, Completed
//!  CLOSED ───────────────────▶ OPENING ───────────────────────────▶ OPEN
//!    ▲                            │                                  │
//!    │                  travel elapsed, Jammed                       │
//!    │                            ▼                                  │
//!    └──── recovery elapsed ─── JAMMED ◀── travel elapsed, Jammed ── CLOSING
//!                                 │                                  ▲
//!  OPEN ◀──── recovery elapsed ───┘           request_move(Close)    │
//!    └───────────────────────────────────────────────────────────────┘
//!                     CLOSING ── travel elapsed, Completed ──▶ CLOSED
//! ```
//!
//! A move is accepted only from a rest state (`Closed` / `Open`).  Once the
//! motor is energised nothing can interrupt it: the travel timer always runs
//! to its deadline, and the only exit from `Jammed` is the recovery timer,
//! after which the door is back where it started.
//!
//! Whether a travel jammed is not decided here.  The actuator reports an
//! [`ActuatorOutcome`] when the travel window elapses: real stall sensing on
//! hardware, an injectable entropy source in simulation.

use core::fmt;
use core::time::Duration;

use log::{debug, warn};
use serde::Serialize;

use crate::app::ports::{ActuatorOutcome, ActuatorPort};
use crate::clock::{Instant, TimerEvent, TimerService};
use crate::config::SystemConfig;
use crate::error::DoorError;
use crate::event_log::{EventSink, LogLevel};

// ---------------------------------------------------------------------------
// State identity
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
#[repr(u8)]
pub enum DoorState {
    Closed = 0,
    Opening = 1,
    Open = 2,
    Closing = 3,
    Jammed = 4,
}

impl DoorState {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Closed => "CLOSED",
            Self::Opening => "OPENING",
            Self::Open => "OPEN",
            Self::Closing => "CLOSING",
            Self::Jammed => "JAMMED",
        }
    }

    /// `Closed` and `Open` are the only rest states.
    pub const fn is_stable(self) -> bool {
        matches!(self, Self::Closed | Self::Open)
    }
}

impl fmt::Display for DoorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Requested direction of travel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Direction {
    Open,
    Close,
}

impl Direction {
    /// Rest state reached when travel completes.
    pub const fn target(self) -> DoorState {
        match self {
            Self::Open => DoorState::Open,
            Self::Close => DoorState::Closed,
        }
    }

    /// In-flight state while travelling.
    pub const fn transient(self) -> DoorState {
        match self {
            Self::Open => DoorState::Opening,
            Self::Close => DoorState::Closing,
        }
    }

    /// Rest state the travel started from (and auto-reverse returns to).
    pub const fn origin(self) -> DoorState {
        self.reverse().target()
    }

    pub const fn reverse(self) -> Self {
        match self {
            Self::Open => Self::Close,
            Self::Close => Self::Open,
        }
    }
}

// ---------------------------------------------------------------------------
// Controller
// ---------------------------------------------------------------------------

pub struct DoorController {
    state: DoorState,
    /// Direction of the travel in progress; `Some` exactly when the state
    /// is `Opening`, `Closing` or `Jammed`.
    motion: Option<Direction>,
    travel: Duration,
    recovery: Duration,
    jam_count: u32,
}

impl DoorController {
    /// A controller at rest in `Closed`.
    pub fn new(travel: Duration, recovery: Duration) -> Self {
        Self {
            state: DoorState::Closed,
            motion: None,
            travel,
            recovery,
            jam_count: 0,
        }
    }

    pub fn from_config(config: &SystemConfig) -> Self {
        Self::new(config.door_travel(), config.door_recovery())
    }

    /// Apply new travel / recovery windows.  A travel already in flight
    /// keeps the deadline it was scheduled with.
    pub fn set_timing(&mut self, travel: Duration, recovery: Duration) {
        self.travel = travel;
        self.recovery = recovery;
    }

    pub fn state(&self) -> DoorState {
        self.state
    }

    /// Direction of the travel in progress, if any.
    pub fn in_flight(&self) -> Option<Direction> {
        self.motion
    }

    /// Jams seen since boot.
    pub fn jam_count(&self) -> u32 {
        self.jam_count
    }

    /// Start moving the door.
    ///
    /// On success the state is already `Opening` / `Closing` when this
    /// returns, the motor is energised and the travel timer is pending.
    pub fn request_move(
        &mut self,
        direction: Direction,
        now: Instant,
        timers: &mut TimerService,
        hw: &mut impl ActuatorPort,
        sink: &mut impl EventSink,
    ) -> Result<(), DoorError> {
        self.start_move(direction, now, None, timers, hw, sink)
    }

    /// [`request_move`](Self::request_move) on behalf of a caller that
    /// explains itself.  `reason` is appended only if the move is accepted,
    /// ahead of the transient-state entry.
    pub fn request_move_because(
        &mut self,
        direction: Direction,
        now: Instant,
        reason: (LogLevel, fmt::Arguments<'_>),
        timers: &mut TimerService,
        hw: &mut impl ActuatorPort,
        sink: &mut impl EventSink,
    ) -> Result<(), DoorError> {
        self.start_move(direction, now, Some(reason), timers, hw, sink)
    }

    /// Handle a door-channel timer.
    ///
    /// Returns the new state when the door has come to rest, so the caller
    /// can re-run automation against it.
    pub fn on_timer(
        &mut self,
        event: TimerEvent,
        now: Instant,
        timers: &mut TimerService,
        hw: &mut impl ActuatorPort,
        sink: &mut impl EventSink,
    ) -> Option<DoorState> {
        match (event, self.state, self.motion) {
            (TimerEvent::DoorTravel, DoorState::Opening | DoorState::Closing, Some(dir)) => {
                match hw.door_outcome(dir) {
                    ActuatorOutcome::Completed => {
                        hw.stop_door();
                        self.state = dir.target();
                        self.motion = None;
                        sink.append(
                            now,
                            LogLevel::Info,
                            format_args!("Door movement complete: {}", self.state),
                        );
                        Some(self.state)
                    }
                    ActuatorOutcome::Jammed => self.enter_jammed(dir, now, timers, hw, sink),
                }
            }
            (TimerEvent::DoorRecovery, DoorState::Jammed, Some(dir)) => {
                Some(self.finish_reverse(dir, now, hw, sink))
            }
            (event, state, _) => {
                warn!("door: ignoring stray {:?} in {}", event, state);
                None
            }
        }
    }

    // -----------------------------------------------------------------------
    // Internal
    // -----------------------------------------------------------------------

    fn start_move(
        &mut self,
        direction: Direction,
        now: Instant,
        reason: Option<(LogLevel, fmt::Arguments<'_>)>,
        timers: &mut TimerService,
        hw: &mut impl ActuatorPort,
        sink: &mut impl EventSink,
    ) -> Result<(), DoorError> {
        match self.state {
            DoorState::Opening | DoorState::Closing | DoorState::Jammed => {
                debug!("door: {:?} refused, busy in {}", direction, self.state);
                return Err(DoorError::Busy);
            }
            s if s == direction.target() => return Err(DoorError::NoOp),
            DoorState::Closed | DoorState::Open => {}
        }

        timers
            .after(now, self.travel, TimerEvent::DoorTravel)
            .map_err(|e| {
                warn!("door: travel timer unavailable ({}), refusing move", e);
                DoorError::Busy
            })?;

        if let Some((level, why)) = reason {
            sink.append(now, level, why);
        }
        self.state = direction.transient();
        self.motion = Some(direction);
        hw.drive_door(direction);
        sink.append(
            now,
            LogLevel::Debug,
            format_args!(
                "Door {} (travel window {} ms)",
                self.state,
                self.travel.as_millis()
            ),
        );
        Ok(())
    }

    fn enter_jammed(
        &mut self,
        dir: Direction,
        now: Instant,
        timers: &mut TimerService,
        hw: &mut impl ActuatorPort,
        sink: &mut impl EventSink,
    ) -> Option<DoorState> {
        let during = self.state;
        self.state = DoorState::Jammed;
        self.jam_count = self.jam_count.saturating_add(1);
        sink.append(
            now,
            LogLevel::Error,
            format_args!(
                "CRITICAL: High motor load / obstruction during {}. Door JAMMED.",
                during
            ),
        );

        // Back the door off the obstruction for the recovery window.
        hw.drive_door(dir.reverse());
        match timers.after(now, self.recovery, TimerEvent::DoorRecovery) {
            Ok(_) => None,
            Err(e) => {
                warn!("door: recovery timer unavailable ({}), reversing now", e);
                Some(self.finish_reverse(dir, now, hw, sink))
            }
        }
    }

    fn finish_reverse(
        &mut self,
        dir: Direction,
        now: Instant,
        hw: &mut impl ActuatorPort,
        sink: &mut impl EventSink,
    ) -> DoorState {
        hw.stop_door();
        self.state = dir.origin();
        self.motion = None;
        sink.append(
            now,
            LogLevel::Warn,
            format_args!(
                "SAFETY: Obstruction logic engaged. Reverted to {}.",
                self.state
            ),
        );
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event_log::EventLog;
    use std::collections::VecDeque;

    const TRAVEL: Duration = Duration::from_millis(3000);
    const RECOVERY: Duration = Duration::from_millis(3000);

    #[derive(Debug, PartialEq)]
    enum Call {
        Drive(Direction),
        Stop,
    }

    /// Replays queued outcomes; defaults to `Completed` when empty.
    #[derive(Default)]
    struct Scripted {
        outcomes: VecDeque<ActuatorOutcome>,
        calls: Vec<Call>,
    }

    impl ActuatorPort for Scripted {
        fn drive_door(&mut self, direction: Direction) {
            self.calls.push(Call::Drive(direction));
        }
        fn door_outcome(&mut self, _direction: Direction) -> ActuatorOutcome {
            self.outcomes.pop_front().unwrap_or(ActuatorOutcome::Completed)
        }
        fn stop_door(&mut self) {
            self.calls.push(Call::Stop);
        }
        fn drive_feeder(&mut self, _on: bool) {}
    }

    struct Rig {
        door: DoorController,
        timers: TimerService,
        hw: Scripted,
        log: EventLog,
    }

    impl Rig {
        fn new() -> Self {
            Self {
                door: DoorController::new(TRAVEL, RECOVERY),
                timers: TimerService::new(),
                hw: Scripted::default(),
                log: EventLog::new(),
            }
        }

        fn request(&mut self, dir: Direction, ms: u64) -> Result<(), DoorError> {
            self.door.request_move(
                dir,
                Instant::from_millis(ms),
                &mut self.timers,
                &mut self.hw,
                &mut self.log,
            )
        }

        /// Fire every door timer due at `ms`.
        fn advance(&mut self, ms: u64) -> Option<DoorState> {
            let now = Instant::from_millis(ms);
            let mut settled = None;
            while let Some(ev) = self.timers.pop_due(now) {
                settled = self
                    .door
                    .on_timer(ev, now, &mut self.timers, &mut self.hw, &mut self.log);
            }
            settled
        }

        fn levels(&self) -> Vec<LogLevel> {
            self.log.subscribe().map(|e| e.level()).collect()
        }
    }

    #[test]
    fn starts_closed() {
        let door = DoorController::new(TRAVEL, RECOVERY);
        assert_eq!(door.state(), DoorState::Closed);
        assert_eq!(door.in_flight(), None);
    }

    #[test]
    fn open_request_enters_opening_synchronously() {
        let mut rig = Rig::new();
        rig.request(Direction::Open, 0).unwrap();
        assert_eq!(rig.door.state(), DoorState::Opening);
        assert_eq!(rig.hw.calls, [Call::Drive(Direction::Open)]);
        assert_eq!(rig.timers.next_due(), Some(Instant::from_millis(3000)));
    }

    #[test]
    fn travel_completes_into_target() {
        let mut rig = Rig::new();
        rig.request(Direction::Open, 0).unwrap();
        assert_eq!(rig.advance(2999), None);
        assert_eq!(rig.advance(3000), Some(DoorState::Open));
        assert_eq!(rig.door.state(), DoorState::Open);
        assert_eq!(rig.hw.calls.last(), Some(&Call::Stop));
        assert_eq!(rig.log.latest().unwrap().message(), "Door movement complete: OPEN");
    }

    #[test]
    fn request_to_current_rest_state_is_noop() {
        let mut rig = Rig::new();
        assert_eq!(rig.request(Direction::Close, 0), Err(DoorError::NoOp));
        assert!(rig.timers.is_empty());
        assert!(rig.hw.calls.is_empty());
    }

    #[test]
    fn requests_while_moving_are_busy() {
        let mut rig = Rig::new();
        rig.request(Direction::Open, 0).unwrap();
        assert_eq!(rig.request(Direction::Open, 10), Err(DoorError::Busy));
        assert_eq!(rig.request(Direction::Close, 20), Err(DoorError::Busy));
        assert_eq!(rig.door.state(), DoorState::Opening);
        assert_eq!(rig.timers.len(), 1);
    }

    #[test]
    fn jam_while_opening_reverses_to_closed() {
        let mut rig = Rig::new();
        rig.hw.outcomes.push_back(ActuatorOutcome::Jammed);
        rig.request(Direction::Open, 0).unwrap();

        assert_eq!(rig.advance(3000), None);
        assert_eq!(rig.door.state(), DoorState::Jammed);
        assert_eq!(rig.door.jam_count(), 1);
        assert_eq!(rig.request(Direction::Close, 3100), Err(DoorError::Busy));

        assert_eq!(rig.advance(6000), Some(DoorState::Closed));
        assert_eq!(
            rig.hw.calls,
            [
                Call::Drive(Direction::Open),
                Call::Drive(Direction::Close),
                Call::Stop
            ]
        );
        assert_eq!(
            rig.levels(),
            [LogLevel::Debug, LogLevel::Error, LogLevel::Warn]
        );
    }

    #[test]
    fn jam_while_closing_reverses_to_open() {
        let mut rig = Rig::new();
        rig.request(Direction::Open, 0).unwrap();
        rig.advance(3000);
        rig.hw.outcomes.push_back(ActuatorOutcome::Jammed);
        rig.request(Direction::Close, 4000).unwrap();

        rig.advance(7000);
        assert_eq!(rig.door.state(), DoorState::Jammed);
        assert_eq!(rig.advance(10_000), Some(DoorState::Open));
        assert!(rig
            .log
            .latest()
            .unwrap()
            .message()
            .contains("Reverted to OPEN"));
    }

    #[test]
    fn jam_message_names_transient_state() {
        let mut rig = Rig::new();
        rig.hw.outcomes.push_back(ActuatorOutcome::Jammed);
        rig.request(Direction::Open, 0).unwrap();
        rig.advance(3000);
        let msg = rig.log.latest().unwrap().message();
        assert!(msg.contains("during OPENING"), "{msg}");
    }

    #[test]
    fn stray_timer_is_ignored() {
        let mut rig = Rig::new();
        let now = Instant::ZERO;
        let settled = rig.door.on_timer(
            TimerEvent::DoorRecovery,
            now,
            &mut rig.timers,
            &mut rig.hw,
            &mut rig.log,
        );
        assert_eq!(settled, None);
        assert_eq!(rig.door.state(), DoorState::Closed);
    }

    #[test]
    fn direction_helpers_are_consistent() {
        for dir in [Direction::Open, Direction::Close] {
            assert!(dir.target().is_stable());
            assert!(dir.origin().is_stable());
            assert!(!dir.transient().is_stable());
            assert_ne!(dir.target(), dir.origin());
            assert_eq!(dir.reverse().reverse(), dir);
        }
    }

    #[test]
    fn accepted_reason_precedes_transient_entry() {
        let mut rig = Rig::new();
        rig.door
            .request_move_because(
                Direction::Open,
                Instant::ZERO,
                (LogLevel::Info, format_args!("because {}", 7)),
                &mut rig.timers,
                &mut rig.hw,
                &mut rig.log,
            )
            .unwrap();

        let messages: Vec<&str> = rig.log.subscribe().map(|e| e.message()).collect();
        assert_eq!(messages[0], "because 7");
        assert!(messages[1].starts_with("Door OPENING"), "{}", messages[1]);
        assert_eq!(rig.levels(), [LogLevel::Info, LogLevel::Debug]);
    }

    #[test]
    fn refused_move_drops_its_reason() {
        let mut rig = Rig::new();
        rig.request(Direction::Open, 0).unwrap();
        let before = rig.log.len();

        let res = rig.door.request_move_because(
            Direction::Close,
            Instant::from_millis(10),
            (LogLevel::Warn, format_args!("operator")),
            &mut rig.timers,
            &mut rig.hw,
            &mut rig.log,
        );
        assert_eq!(res, Err(DoorError::Busy));
        assert_eq!(rig.log.len(), before);
    }
}
