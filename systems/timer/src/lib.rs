#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Round clock that counts whole seconds up or down.
//!
//! The clock never owns a schedule. Whoever drives the simulation delivers
//! one call to [`Timer::advance_second`] per logical second. Pausing only
//! gates those calls: seconds keep arriving while paused and are ignored.

use std::fmt;

use territory_core::{ClockState, TimerMode};
use tracing::debug;

/// Result of delivering a single second to the clock.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SecondOutcome {
    /// The clock is not running, so the second had no effect.
    Ignored,
    /// The clock moved to the provided value.
    Advanced {
        /// Clock value after the second was applied.
        seconds: i64,
    },
    /// The countdown dropped below zero; the clock paused itself.
    Expired,
}

/// Independent seconds counter with pause/resume semantics.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Timer {
    seconds: i64,
    mode: TimerMode,
    state: ClockState,
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

impl Timer {
    /// Creates a stopped count-up clock at zero.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            seconds: 0,
            mode: TimerMode::CountUp,
            state: ClockState::Stopped,
        }
    }

    /// Starts the clock.
    ///
    /// A paused clock resumes from its current value and keeps its mode; the
    /// arguments are ignored in that case. Otherwise the clock restarts at
    /// `start_seconds` counting in the requested direction.
    pub fn start(&mut self, mode: TimerMode, start_seconds: i64) {
        if self.state == ClockState::Paused {
            self.state = ClockState::Running;
            debug!(seconds = self.seconds, "timer_resumed");
            return;
        }

        self.seconds = start_seconds;
        self.mode = mode;
        self.state = ClockState::Running;
        debug!(seconds = start_seconds, ?mode, "timer_started");
    }

    /// Pauses a running clock. Has no effect in any other state.
    pub fn pause(&mut self) {
        if self.state == ClockState::Running {
            self.state = ClockState::Paused;
        }
    }

    /// Stops the clock; a later [`Timer::start`] restarts from scratch.
    pub fn stop(&mut self) {
        self.state = ClockState::Stopped;
    }

    /// Applies one logical second.
    pub fn advance_second(&mut self) -> SecondOutcome {
        if self.state != ClockState::Running {
            return SecondOutcome::Ignored;
        }

        self.seconds += self.mode.step();
        if self.mode == TimerMode::CountDown && self.seconds < 0 {
            self.state = ClockState::Paused;
            debug!("timer_expired");
            return SecondOutcome::Expired;
        }

        SecondOutcome::Advanced {
            seconds: self.seconds,
        }
    }

    /// Current raw clock value; may be negative after a countdown expired.
    #[must_use]
    pub const fn seconds(&self) -> i64 {
        self.seconds
    }

    /// Direction the clock counts in.
    #[must_use]
    pub const fn mode(&self) -> TimerMode {
        self.mode
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> ClockState {
        self.state
    }
}

/// Formats the clock as `mm:ss`, never rendering a negative duration.
impl fmt::Display for Timer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let total = self.seconds.max(0);
        write!(f, "{:02}:{:02}", total / 60, total % 60)
    }
}
