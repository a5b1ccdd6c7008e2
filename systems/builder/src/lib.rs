#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Validated construction of ready-to-run Territory levels.
//!
//! A [`LevelPlan`] is a plain parameter struct that can be deserialized from
//! configuration files. [`LevelBuilder`] offers the fluent configuration
//! surface on top of it, and [`build_level`] turns a plan into a
//! [`Level`] after checking the few preconditions the simulation relies on.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use territory_core::{CellCoord, Direction, EntityKind, Palette, Rgb};
use territory_world::{EnemySeed, Field, Level, LevelSettings};
use thiserror::Error;
use tracing::debug;

/// Placement of a single hostile entity inside a plan.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct HostilePlan {
    /// Behaviour of the hostile; must be `Enemy` or `Destroyer`.
    pub kind: EntityKind,
    /// Cell the hostile starts in.
    pub cell: CellCoord,
    /// Initial heading; defaults to the diagonal heading.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<Direction>,
    /// Initial speed in cells per step; defaults to half a cell.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<f32>,
}

impl HostilePlan {
    /// Hostile of the provided kind that uses the default motion.
    #[must_use]
    pub const fn new(kind: EntityKind, cell: CellCoord) -> Self {
        Self {
            kind,
            cell,
            direction: None,
            speed: None,
        }
    }

    fn seed(&self) -> EnemySeed {
        let seed = match self.kind {
            EntityKind::Destroyer => EnemySeed::destroyer(self.cell),
            EntityKind::Enemy | EntityKind::Player => EnemySeed::enemy(self.cell),
        };
        if self.direction.is_none() && self.speed.is_none() {
            return seed;
        }
        seed.with_motion(
            self.direction.unwrap_or(EnemySeed::DEFAULT_DIRECTION),
            self.speed.unwrap_or(EnemySeed::DEFAULT_SPEED),
        )
    }
}

/// Parameters describing a level before it is assembled.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelPlan {
    /// Number of columns in the grid.
    pub width: u32,
    /// Number of rows in the grid.
    pub height: u32,
    /// Thickness of the claimed perimeter.
    pub border: u32,
    /// Cell the player starts in and respawns at.
    pub spawn: CellCoord,
    /// Lives the player starts with.
    pub lives: i32,
    /// Claimed ratio that must be exceeded to win.
    pub win_ratio: f32,
    /// Countdown length in seconds; absent means the clock counts up.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub countdown: Option<u32>,
    /// Presentation colors.
    pub palette: Palette,
    /// Hostile placements in creation order.
    pub hostiles: Vec<HostilePlan>,
}

impl LevelPlan {
    /// Default grid width.
    pub const DEFAULT_WIDTH: u32 = 40;
    /// Default grid height.
    pub const DEFAULT_HEIGHT: u32 = 30;
    /// Default border thickness.
    pub const DEFAULT_BORDER: u32 = 2;
    /// Default starting lives.
    pub const DEFAULT_LIVES: i32 = 3;
    /// Default win threshold.
    pub const DEFAULT_WIN_RATIO: f32 = 0.75;
}

impl Default for LevelPlan {
    fn default() -> Self {
        Self {
            width: Self::DEFAULT_WIDTH,
            height: Self::DEFAULT_HEIGHT,
            border: Self::DEFAULT_BORDER,
            spawn: CellCoord::new(0, 0),
            lives: Self::DEFAULT_LIVES,
            win_ratio: Self::DEFAULT_WIN_RATIO,
            countdown: None,
            palette: Palette::default(),
            hostiles: Vec::new(),
        }
    }
}

/// Reasons a plan cannot be assembled into a level.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum BuildError {
    /// The grid has no cells.
    #[error("grid must have at least one cell, got {width}x{height}")]
    EmptyGrid {
        /// Requested width.
        width: u32,
        /// Requested height.
        height: u32,
    },
    /// The player spawn lies outside the grid.
    #[error("player spawn {cell:?} lies outside the grid")]
    SpawnOutOfBounds {
        /// Offending spawn cell.
        cell: CellCoord,
    },
    /// A hostile placement lies outside the grid.
    #[error("hostile #{index} at {cell:?} lies outside the grid")]
    HostileOutOfBounds {
        /// Position of the placement in the plan.
        index: usize,
        /// Offending cell.
        cell: CellCoord,
    },
    /// A hostile placement names the player kind.
    #[error("hostile #{index} must be an enemy or a destroyer")]
    NotHostile {
        /// Position of the placement in the plan.
        index: usize,
    },
    /// Two entities start in the same cell.
    #[error("more than one entity starts at {cell:?}")]
    OverlappingPlacement {
        /// Cell shared by the placements.
        cell: CellCoord,
    },
    /// The win threshold lies outside `(0, 1]`.
    #[error("win ratio must lie in (0, 1], got {ratio}")]
    InvalidWinRatio {
        /// Offending threshold.
        ratio: f32,
    },
    /// The player would start without any lives.
    #[error("starting lives must be positive, got {lives}")]
    InvalidLives {
        /// Offending amount.
        lives: i32,
    },
}

/// Validates the plan and assembles a level from it.
pub fn build_level(plan: &LevelPlan) -> Result<Level, BuildError> {
    validate(plan)?;

    let mut field = Field::new(plan.width, plan.height);
    field.claim_border(plan.border);

    let settings = LevelSettings {
        spawn: plan.spawn,
        lives: plan.lives,
        win_ratio: plan.win_ratio,
        countdown: plan.countdown,
        palette: plan.palette,
    };
    let seeds = plan.hostiles.iter().map(HostilePlan::seed).collect();

    debug!(
        width = plan.width,
        height = plan.height,
        hostiles = plan.hostiles.len(),
        "level_built"
    );
    Ok(Level::new(field, settings, seeds))
}

fn validate(plan: &LevelPlan) -> Result<(), BuildError> {
    if plan.width == 0 || plan.height == 0 {
        return Err(BuildError::EmptyGrid {
            width: plan.width,
            height: plan.height,
        });
    }
    if plan.lives <= 0 {
        return Err(BuildError::InvalidLives { lives: plan.lives });
    }
    if !(plan.win_ratio > 0.0 && plan.win_ratio <= 1.0) {
        return Err(BuildError::InvalidWinRatio {
            ratio: plan.win_ratio,
        });
    }

    let inside = |cell: CellCoord| {
        u32::try_from(cell.column()).is_ok_and(|column| column < plan.width)
            && u32::try_from(cell.row()).is_ok_and(|row| row < plan.height)
    };
    if !inside(plan.spawn) {
        return Err(BuildError::SpawnOutOfBounds { cell: plan.spawn });
    }

    let mut occupied = HashSet::from([plan.spawn]);
    for (index, hostile) in plan.hostiles.iter().enumerate() {
        if !hostile.kind.is_hostile() {
            return Err(BuildError::NotHostile { index });
        }
        if !inside(hostile.cell) {
            return Err(BuildError::HostileOutOfBounds {
                index,
                cell: hostile.cell,
            });
        }
        if !occupied.insert(hostile.cell) {
            return Err(BuildError::OverlappingPlacement { cell: hostile.cell });
        }
    }
    Ok(())
}

/// Fluent configuration surface producing validated levels.
#[derive(Clone, Debug, Default)]
pub struct LevelBuilder {
    plan: LevelPlan,
}

impl LevelBuilder {
    /// Creates a builder seeded with the default plan.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a builder that continues from an existing plan.
    #[must_use]
    pub fn from_plan(plan: LevelPlan) -> Self {
        Self { plan }
    }

    /// Sets the grid dimensions.
    #[must_use]
    pub fn resize(mut self, width: u32, height: u32) -> Self {
        self.plan.width = width;
        self.plan.height = height;
        self
    }

    /// Claims a perimeter of the provided thickness before play starts.
    #[must_use]
    pub fn claim_border(mut self, thickness: u32) -> Self {
        self.plan.border = thickness;
        self
    }

    /// Sets the cell the player starts in and respawns at.
    #[must_use]
    pub fn set_default_player_position(mut self, cell: CellCoord) -> Self {
        self.plan.spawn = cell;
        self
    }

    /// Adds a plain enemy using the default motion.
    #[must_use]
    pub fn add_enemy(mut self, cell: CellCoord) -> Self {
        self.plan
            .hostiles
            .push(HostilePlan::new(EntityKind::Enemy, cell));
        self
    }

    /// Adds a destroyer using the default motion.
    #[must_use]
    pub fn add_destroyer(mut self, cell: CellCoord) -> Self {
        self.plan
            .hostiles
            .push(HostilePlan::new(EntityKind::Destroyer, cell));
        self
    }

    /// Adds a hostile with an explicit heading and speed.
    #[must_use]
    pub fn add_enemy_with_motion(
        mut self,
        kind: EntityKind,
        cell: CellCoord,
        direction: Direction,
        speed: f32,
    ) -> Self {
        self.plan.hostiles.push(HostilePlan {
            kind,
            cell,
            direction: Some(direction),
            speed: Some(speed),
        });
        self
    }

    /// Color drawn around the grid.
    #[must_use]
    pub fn background_color(mut self, color: Rgb) -> Self {
        self.plan.palette.background = color;
        self
    }

    /// Color of unclaimed cells.
    #[must_use]
    pub fn unclaimed_color(mut self, color: Rgb) -> Self {
        self.plan.palette.unclaimed = color;
        self
    }

    /// Color of claimed cells.
    #[must_use]
    pub fn claimed_color(mut self, color: Rgb) -> Self {
        self.plan.palette.claimed = color;
        self
    }

    /// Color of the player's trail.
    #[must_use]
    pub fn claiming_color(mut self, color: Rgb) -> Self {
        self.plan.palette.claiming = color;
        self
    }

    /// Switches the clock to count down from the provided number of seconds.
    #[must_use]
    pub fn countdown_time(mut self, seconds: u32) -> Self {
        self.plan.countdown = Some(seconds);
        self
    }

    /// Sets the lives the player starts with.
    #[must_use]
    pub fn lives(mut self, lives: i32) -> Self {
        self.plan.lives = lives;
        self
    }

    /// Sets the claimed ratio that must be exceeded to win.
    #[must_use]
    pub fn win_ratio(mut self, ratio: f32) -> Self {
        self.plan.win_ratio = ratio;
        self
    }

    /// Plan accumulated so far.
    #[must_use]
    pub fn plan(&self) -> &LevelPlan {
        &self.plan
    }

    /// Consumes the builder, yielding the accumulated plan.
    #[must_use]
    pub fn into_plan(self) -> LevelPlan {
        self.plan
    }

    /// Validates the accumulated plan and assembles a level.
    pub fn build(&self) -> Result<Level, BuildError> {
        build_level(&self.plan)
    }
}
