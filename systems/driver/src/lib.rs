#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Cooperative scheduling boundary around Territory levels.
//!
//! A [`Session`] owns the active level, the output sink it presents to and
//! the round counter. External schedulers call [`Session::tick`] and
//! [`Session::second`] on their own cadences, or hand measured wall-clock
//! time to [`Session::advance`] together with a [`Cadence`].

mod cadence;
mod scene;

use std::time::Duration;

use territory_core::{Command, Direction, Event, RoundOutcome};
use territory_rendering::{OutputSink, Scene};
use territory_system_builder::{build_level, BuildError, LevelPlan};
use territory_world::{apply, query, Level};
use thiserror::Error;
use tracing::{debug, info};

pub use cadence::{Cadence, CadenceSteps};
pub use scene::capture_scene;

/// Notifications reported by a session.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SessionEvent {
    /// Event reported by the active level.
    Level(Event),
    /// A fresh level began.
    RoundStarted {
        /// Round number, starting at one.
        round: u32,
    },
    /// The active level was decided.
    RoundFinished {
        /// Round that was decided.
        round: u32,
        /// How the round ended.
        outcome: RoundOutcome,
    },
    /// No further rounds will be played.
    GameOver {
        /// Number of rounds the player won.
        rounds_won: u32,
    },
}

/// Lifecycle of a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    /// Created but not started yet.
    Ready,
    /// Ticks and seconds are processed.
    Running,
    /// Ticks are suspended; seconds still arrive but the clock ignores them.
    Paused,
    /// Stopped by the caller; nothing is processed any more.
    Stopped,
    /// A round was lost and the game ended.
    Over,
}

/// Failures raised while driving a session.
#[derive(Debug, Error)]
pub enum SessionError {
    /// A tick was driven before an output sink was attached.
    #[error("no output sink attached to the session")]
    NoOutputSink,
    /// The output sink failed to present a frame.
    #[error("output sink failed to present round {round}: {error:#}")]
    Present {
        /// Round whose frame was rejected.
        round: u32,
        /// Failure reported by the sink.
        error: anyhow::Error,
    },
    /// The level for the next round could not be assembled.
    #[error("failed to build round {round}")]
    NextRound {
        /// Round that failed to build.
        round: u32,
        /// Validation failure.
        #[source]
        source: BuildError,
    },
}

/// Drives consecutive rounds and presents each tick to an output sink.
pub struct Session {
    plan: LevelPlan,
    level: Level,
    sink: Option<Box<dyn OutputSink>>,
    state: SessionState,
    round: u32,
    rounds_won: u32,
    events: Vec<Event>,
}

impl Session {
    /// Builds the first round from the provided plan.
    pub fn new(plan: LevelPlan) -> Result<Self, BuildError> {
        let level = build_level(&plan)?;
        Ok(Self {
            plan,
            level,
            sink: None,
            state: SessionState::Ready,
            round: 1,
            rounds_won: 0,
            events: Vec::new(),
        })
    }

    /// Attaches the sink every tick is presented to, replacing any previous one.
    pub fn attach_sink(&mut self, sink: Box<dyn OutputSink>) {
        self.sink = Some(sink);
    }

    /// Starts the session and the first round's clock.
    pub fn start(&mut self, out: &mut Vec<SessionEvent>) {
        if self.state != SessionState::Ready {
            return;
        }
        self.state = SessionState::Running;
        info!(round = self.round, "round_started");
        out.push(SessionEvent::RoundStarted { round: self.round });
        self.run(Command::Start, out);
    }

    /// Points the player in the provided direction.
    pub fn steer(&mut self, direction: Direction) {
        if self.state == SessionState::Running {
            self.run(Command::SteerPlayer { direction }, &mut Vec::new());
        }
    }

    /// Runs one simulation step and presents the result.
    ///
    /// Ticks are ignored unless the session is running, but a sink must be
    /// attached regardless.
    pub fn tick(&mut self, out: &mut Vec<SessionEvent>) -> Result<(), SessionError> {
        if self.sink.is_none() {
            return Err(SessionError::NoOutputSink);
        }
        if self.state != SessionState::Running {
            return Ok(());
        }

        self.run(Command::Tick, out);
        self.present()?;
        self.settle(out)
    }

    /// Delivers one clock second.
    ///
    /// Seconds keep arriving while paused; the clock gate turns them into
    /// no-ops.
    pub fn second(&mut self, out: &mut Vec<SessionEvent>) -> Result<(), SessionError> {
        if !matches!(self.state, SessionState::Running | SessionState::Paused) {
            return Ok(());
        }
        self.run(Command::AdvanceSecond, out);
        self.settle(out)
    }

    /// Runs every tick and second owed for `elapsed` wall-clock time.
    pub fn advance(
        &mut self,
        cadence: &mut Cadence,
        elapsed: Duration,
        out: &mut Vec<SessionEvent>,
    ) -> Result<CadenceSteps, SessionError> {
        let steps = cadence.advance(elapsed);
        for _ in 0..steps.ticks {
            self.tick(out)?;
        }
        for _ in 0..steps.seconds {
            self.second(out)?;
        }
        Ok(steps)
    }

    /// Suspends ticking and pauses the round clock.
    pub fn pause(&mut self, out: &mut Vec<SessionEvent>) {
        if self.state != SessionState::Running {
            return;
        }
        self.state = SessionState::Paused;
        self.run(Command::Pause, out);
    }

    /// Resumes ticking and the round clock after a pause.
    pub fn resume(&mut self, out: &mut Vec<SessionEvent>) {
        if self.state != SessionState::Paused {
            return;
        }
        self.state = SessionState::Running;
        self.run(Command::Start, out);
    }

    /// Stops the session. Later ticks and seconds are ignored.
    pub fn stop(&mut self, out: &mut Vec<SessionEvent>) {
        if matches!(self.state, SessionState::Stopped | SessionState::Over) {
            return;
        }
        self.state = SessionState::Stopped;
        self.run(Command::Stop, out);
        info!(round = self.round, "session_stopped");
    }

    /// Lifecycle state of the session.
    #[must_use]
    pub const fn state(&self) -> SessionState {
        self.state
    }

    /// Current round number, starting at one.
    #[must_use]
    pub const fn round(&self) -> u32 {
        self.round
    }

    /// Number of rounds won so far.
    #[must_use]
    pub const fn rounds_won(&self) -> u32 {
        self.rounds_won
    }

    /// Active level.
    #[must_use]
    pub const fn level(&self) -> &Level {
        &self.level
    }

    /// Presentation snapshot of the active level.
    #[must_use]
    pub fn scene(&self) -> Scene {
        capture_scene(&self.level, self.round)
    }

    fn run(&mut self, command: Command, out: &mut Vec<SessionEvent>) {
        apply(&mut self.level, command, &mut self.events);
        out.extend(self.events.drain(..).map(SessionEvent::Level));
    }

    fn present(&mut self) -> Result<(), SessionError> {
        let scene = capture_scene(&self.level, self.round);
        let round = self.round;
        match self.sink.as_mut() {
            Some(sink) => sink
                .present(&scene)
                .map_err(|error| SessionError::Present { round, error }),
            None => Err(SessionError::NoOutputSink),
        }
    }

    /// Reacts to a decided round: wins advance to a fresh level, losses end the game.
    fn settle(&mut self, out: &mut Vec<SessionEvent>) -> Result<(), SessionError> {
        let Some(outcome) = self.level.outcome() else {
            return Ok(());
        };
        out.push(SessionEvent::RoundFinished {
            round: self.round,
            outcome,
        });

        match outcome {
            RoundOutcome::Lost => {
                self.state = SessionState::Over;
                info!(rounds_won = self.rounds_won, "game_over");
                out.push(SessionEvent::GameOver {
                    rounds_won: self.rounds_won,
                });
                Ok(())
            }
            RoundOutcome::Won => {
                self.rounds_won += 1;
                let next_round = self.round + 1;
                let lives = query::player(&self.level).lives.max(1);
                let plan = LevelPlan {
                    lives,
                    ..self.plan.clone()
                };
                self.level = build_level(&plan).map_err(|source| SessionError::NextRound {
                    round: next_round,
                    source,
                })?;
                self.round = next_round;
                debug!(round = self.round, lives, "lives_carried_over");
                info!(round = self.round, "round_started");
                out.push(SessionEvent::RoundStarted { round: self.round });
                self.run(Command::Start, out);
                Ok(())
            }
        }
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("state", &self.state)
            .field("round", &self.round)
            .field("rounds_won", &self.rounds_won)
            .field("has_sink", &self.sink.is_some())
            .finish_non_exhaustive()
    }
}
