use std::{cell::RefCell, rc::Rc, time::Duration};

use anyhow::anyhow;
use territory_core::{CellCoord, ClockState, Direction, Event, RoundOutcome};
use territory_rendering::{OutputSink, Scene};
use territory_system_builder::{LevelBuilder, LevelPlan};
use territory_system_driver::{Cadence, Session, SessionError, SessionEvent, SessionState};
use territory_world::query;

#[derive(Clone, Default)]
struct RecordingSink {
    scenes: Rc<RefCell<Vec<Scene>>>,
}

impl OutputSink for RecordingSink {
    fn present(&mut self, scene: &Scene) -> anyhow::Result<()> {
        self.scenes.borrow_mut().push(scene.clone());
        Ok(())
    }
}

struct FailingSink;

impl OutputSink for FailingSink {
    fn present(&mut self, _scene: &Scene) -> anyhow::Result<()> {
        Err(anyhow!("display disconnected"))
    }
}

fn open_plan() -> LevelPlan {
    LevelBuilder::new()
        .resize(5, 5)
        .claim_border(1)
        .set_default_player_position(CellCoord::new(1, 0))
        .win_ratio(0.9)
        .into_plan()
}

fn started(plan: LevelPlan) -> (Session, RecordingSink, Vec<SessionEvent>) {
    let mut session = Session::new(plan).expect("plan builds");
    let sink = RecordingSink::default();
    session.attach_sink(Box::new(sink.clone()));
    let mut events = Vec::new();
    session.start(&mut events);
    (session, sink, events)
}

fn tick_times(session: &mut Session, times: usize) -> Vec<SessionEvent> {
    let mut events = Vec::new();
    for _ in 0..times {
        session.tick(&mut events).expect("tick succeeds");
    }
    events
}

#[test]
fn ticking_without_a_sink_is_rejected() {
    let mut session = Session::new(open_plan()).expect("plan builds");
    let mut events = Vec::new();
    session.start(&mut events);

    let error = session.tick(&mut events).expect_err("no sink attached");

    assert!(matches!(error, SessionError::NoOutputSink));
}

#[test]
fn every_tick_is_presented() {
    let (mut session, sink, events) = started(open_plan());
    assert_eq!(
        events,
        vec![
            SessionEvent::RoundStarted { round: 1 },
            SessionEvent::Level(Event::ClockStateChanged {
                state: ClockState::Running,
            }),
        ]
    );

    let _ = tick_times(&mut session, 3);

    let scenes = sink.scenes.borrow();
    assert_eq!(scenes.len(), 3);
    let last = scenes.last().expect("a presented scene");
    assert_eq!((last.width, last.height), (5, 5));
    assert_eq!(last.hud.round, 1);
    assert_eq!(last.hud.clock, "00:00");
    assert_eq!(last.cells.len(), 25);
}

#[test]
fn pausing_suspends_ticks_and_gates_the_clock() {
    let (mut session, sink, _) = started(open_plan());
    let mut events = Vec::new();

    session.pause(&mut events);
    session.tick(&mut events).expect("paused tick is a no-op");
    session.second(&mut events).expect("paused second is a no-op");

    assert_eq!(session.state(), SessionState::Paused);
    assert!(sink.scenes.borrow().is_empty(), "paused ticks present nothing");
    assert_eq!(query::clock(session.level()).to_string(), "00:00");

    session.resume(&mut events);
    session.second(&mut events).expect("second succeeds");
    assert_eq!(query::clock(session.level()).to_string(), "00:01");
}

#[test]
fn winning_starts_a_fresh_round_with_the_remaining_lives() {
    let (mut session, _sink, _) = started(open_plan());

    session.steer(Direction::SOUTH);
    let _ = tick_times(&mut session, 2);
    session.steer(Direction::NORTH);
    let events = tick_times(&mut session, 1);
    assert!(events.contains(&SessionEvent::Level(Event::PlayerDied { lives: 2 })));

    session.steer(Direction::SOUTH);
    let events = tick_times(&mut session, 4);

    assert!(events.contains(&SessionEvent::RoundFinished {
        round: 1,
        outcome: RoundOutcome::Won,
    }));
    assert!(events.contains(&SessionEvent::RoundStarted { round: 2 }));
    assert_eq!(session.round(), 2);
    assert_eq!(session.rounds_won(), 1);

    let level = session.level();
    assert_eq!(query::player(level).lives, 2, "lives carry over");
    assert_eq!(query::outcome(level), None);
    assert!((query::claimed_ratio(level) - 16.0 / 25.0).abs() < f32::EPSILON);
    assert_eq!(query::clock_state(level), ClockState::Running);
}

#[test]
fn expired_countdown_ends_the_game() {
    let plan = LevelPlan {
        countdown: Some(0),
        ..open_plan()
    };
    let (mut session, sink, _) = started(plan);
    let mut events = Vec::new();

    session.second(&mut events).expect("second succeeds");

    assert_eq!(
        events,
        vec![
            SessionEvent::Level(Event::TimeUp),
            SessionEvent::Level(Event::RoundLost),
            SessionEvent::RoundFinished {
                round: 1,
                outcome: RoundOutcome::Lost,
            },
            SessionEvent::GameOver { rounds_won: 0 },
        ]
    );
    assert_eq!(session.state(), SessionState::Over);

    events.clear();
    session.tick(&mut events).expect("ticks after game over are no-ops");
    assert!(events.is_empty());
    assert!(sink.scenes.borrow().is_empty());
}

#[test]
fn sink_failures_surface_as_errors() {
    let mut session = Session::new(open_plan()).expect("plan builds");
    session.attach_sink(Box::new(FailingSink));
    let mut events = Vec::new();
    session.start(&mut events);

    let error = session.tick(&mut events).expect_err("sink fails");

    assert!(matches!(error, SessionError::Present { round: 1, .. }));
    assert!(error.to_string().contains("display disconnected"));
}

#[test]
fn cadence_converts_elapsed_time_into_ticks_and_seconds() {
    let (mut session, sink, _) = started(open_plan());
    let mut cadence = Cadence::new(Duration::from_millis(50), 30);
    let mut events = Vec::new();

    let steps = session
        .advance(&mut cadence, Duration::from_millis(1_100), &mut events)
        .expect("advance succeeds");

    assert_eq!(steps.ticks, 22);
    assert_eq!(steps.seconds, 1);
    assert_eq!(sink.scenes.borrow().len(), 22);
    assert_eq!(query::tick_index(session.level()), 22);
    assert_eq!(query::clock(session.level()).to_string(), "00:01");
}

#[test]
fn stopping_discards_later_schedules() {
    let (mut session, sink, _) = started(open_plan());
    let mut events = Vec::new();

    session.stop(&mut events);
    session.tick(&mut events).expect("stopped tick is a no-op");
    session.second(&mut events).expect("stopped second is a no-op");

    assert_eq!(
        events,
        vec![SessionEvent::Level(Event::ClockStateChanged {
            state: ClockState::Stopped,
        })]
    );
    assert_eq!(session.state(), SessionState::Stopped);
    assert!(sink.scenes.borrow().is_empty());
}
