use std::time::Duration;

use tracing::warn;

const ONE_SECOND: Duration = Duration::from_secs(1);

/// Whole steps owed to a session after some wall-clock time elapsed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CadenceSteps {
    /// Simulation ticks to run.
    pub ticks: u32,
    /// Clock seconds to deliver.
    pub seconds: u32,
}

/// Accumulator converting measured elapsed time into ticks and clock seconds.
///
/// Ticks and seconds are scheduled independently. Ticks owed beyond the
/// per-advance cap are dropped instead of replayed; seconds are never dropped.
#[derive(Clone, Debug)]
pub struct Cadence {
    tick_interval: Duration,
    max_ticks_per_advance: u32,
    tick_backlog: Duration,
    second_backlog: Duration,
}

impl Cadence {
    /// Interval between ticks when none is configured.
    pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(50);
    /// Upper bound on ticks run for a single advance when none is configured.
    pub const DEFAULT_MAX_TICKS_PER_ADVANCE: u32 = 5;

    /// Creates a cadence. A zero interval or cap falls back to the defaults.
    #[must_use]
    pub fn new(tick_interval: Duration, max_ticks_per_advance: u32) -> Self {
        let tick_interval = if tick_interval.is_zero() {
            Self::DEFAULT_TICK_INTERVAL
        } else {
            tick_interval
        };
        let max_ticks_per_advance = if max_ticks_per_advance == 0 {
            Self::DEFAULT_MAX_TICKS_PER_ADVANCE
        } else {
            max_ticks_per_advance
        };
        Self {
            tick_interval,
            max_ticks_per_advance,
            tick_backlog: Duration::ZERO,
            second_backlog: Duration::ZERO,
        }
    }

    /// Interval between consecutive ticks.
    #[must_use]
    pub const fn tick_interval(&self) -> Duration {
        self.tick_interval
    }

    /// Accounts for `elapsed` wall-clock time and reports the steps now due.
    pub fn advance(&mut self, elapsed: Duration) -> CadenceSteps {
        self.tick_backlog = self.tick_backlog.saturating_add(elapsed);
        self.second_backlog = self.second_backlog.saturating_add(elapsed);

        let mut steps = CadenceSteps::default();
        while self.tick_backlog >= self.tick_interval && steps.ticks < self.max_ticks_per_advance {
            self.tick_backlog -= self.tick_interval;
            steps.ticks += 1;
        }
        if self.tick_backlog >= self.tick_interval {
            warn!(
                dropped_backlog_ms = self.tick_backlog.as_millis() as u64,
                max_ticks = self.max_ticks_per_advance,
                "tick_backlog_dropped"
            );
            self.tick_backlog = Duration::ZERO;
        }

        while self.second_backlog >= ONE_SECOND {
            self.second_backlog -= ONE_SECOND;
            steps.seconds += 1;
        }
        steps
    }

    /// Forgets any partially accumulated time.
    pub fn reset(&mut self) {
        self.tick_backlog = Duration::ZERO;
        self.second_backlog = Duration::ZERO;
    }
}

impl Default for Cadence {
    fn default() -> Self {
        Self::new(
            Self::DEFAULT_TICK_INTERVAL,
            Self::DEFAULT_MAX_TICKS_PER_ADVANCE,
        )
    }
}
