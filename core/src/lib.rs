#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Territory engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative level, and the surrounding systems. Adapters submit
//! [`Command`] values describing desired mutations, the level executes those
//! commands via its `apply` entry point, and then reports [`Event`] values
//! describing what happened during the step. Renderers only ever read
//! snapshots; they never mutate the simulation.

use serde::{Deserialize, Serialize};

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Territory.";

/// Ownership status of a single grid cell.
///
/// `OutOfBounds` is never stored inside a field; it is only produced by
/// boundary lookups so that callers can treat the area around the grid as a
/// distinct state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellState {
    /// Coordinate lies outside the playable grid.
    OutOfBounds,
    /// Territory that has not been sealed yet and that enemies roam freely.
    Unclaimed,
    /// Territory sealed by the player.
    Claimed,
    /// Trail painted by the player that has not been sealed yet.
    Claiming,
}

impl CellState {
    /// States that can be stored inside a field, in counting order.
    pub const STORED: [CellState; 3] = [Self::Unclaimed, Self::Claimed, Self::Claiming];

    /// Reports whether the state describes a cell inside the grid.
    #[must_use]
    pub const fn is_in_bounds(self) -> bool {
        !matches!(self, Self::OutOfBounds)
    }
}

/// Location of a single grid cell expressed as column and row coordinates.
///
/// Coordinates are signed because rounded entity positions and collision
/// candidates may lie outside the grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: i32,
    row: i32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: i32, row: i32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> i32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> i32 {
        self.row
    }
}

/// Heading of an entity; each component is one of `-1`, `0` or `1`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "(i8, i8)", into = "(i8, i8)")]
pub struct Direction {
    dx: i8,
    dy: i8,
}

impl Direction {
    /// Heading that does not move.
    pub const NONE: Self = Self::new(0, 0);
    /// Movement toward decreasing row indices.
    pub const NORTH: Self = Self::new(0, -1);
    /// Movement toward increasing column indices.
    pub const EAST: Self = Self::new(1, 0);
    /// Movement toward increasing row indices.
    pub const SOUTH: Self = Self::new(0, 1);
    /// Movement toward decreasing column indices.
    pub const WEST: Self = Self::new(-1, 0);

    /// Creates a heading, clamping each component to its sign.
    #[must_use]
    pub const fn new(dx: i8, dy: i8) -> Self {
        Self {
            dx: dx.signum(),
            dy: dy.signum(),
        }
    }

    /// Horizontal component.
    #[must_use]
    pub const fn dx(&self) -> i8 {
        self.dx
    }

    /// Vertical component.
    #[must_use]
    pub const fn dy(&self) -> i8 {
        self.dy
    }

    /// Returns the heading with the horizontal component reflected.
    #[must_use]
    pub const fn reflect_x(self) -> Self {
        Self {
            dx: -self.dx,
            dy: self.dy,
        }
    }

    /// Returns the heading with the vertical component reflected.
    #[must_use]
    pub const fn reflect_y(self) -> Self {
        Self {
            dx: self.dx,
            dy: -self.dy,
        }
    }
}

impl From<(i8, i8)> for Direction {
    fn from((dx, dy): (i8, i8)) -> Self {
        Self::new(dx, dy)
    }
}

impl From<Direction> for (i8, i8) {
    fn from(direction: Direction) -> Self {
        (direction.dx, direction.dy)
    }
}

/// Unique identifier assigned to an entity within a level.
///
/// The player always receives identifier zero; enemies are numbered in
/// creation order starting at one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(u32);

impl EntityId {
    /// Identifier reserved for the player.
    pub const PLAYER: Self = Self(0);

    /// Creates a new entity identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Closed set of entity behaviours.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    /// Player-controlled marker that paints and seals territory.
    Player,
    /// Roaming hostile that bounces off obstacles and kills the player.
    Enemy,
    /// Enemy that additionally erases claimed cells it touches.
    Destroyer,
}

impl EntityKind {
    /// Reports whether the kind roams on its own and blocks claiming.
    #[must_use]
    pub const fn is_hostile(self) -> bool {
        matches!(self, Self::Enemy | Self::Destroyer)
    }
}

/// Counting direction of the round clock.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimerMode {
    /// Counts elapsed seconds upward without limit.
    CountUp,
    /// Counts remaining seconds down and expires below zero.
    CountDown,
}

impl TimerMode {
    /// Signed amount applied to the clock on every second.
    #[must_use]
    pub const fn step(self) -> i64 {
        match self {
            Self::CountUp => 1,
            Self::CountDown => -1,
        }
    }
}

/// Lifecycle state of the round clock.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClockState {
    /// The clock has not been started or was stopped.
    Stopped,
    /// The clock advances on every second.
    Running,
    /// Seconds still arrive but are ignored.
    Paused,
}

/// Final result of a level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoundOutcome {
    /// The claimed ratio crossed the configured threshold.
    Won,
    /// The player ran out of lives or the countdown expired.
    Lost,
}

/// Display color expressed as byte RGB components.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    red: u8,
    green: u8,
    blue: u8,
}

impl Rgb {
    /// Creates a new color from byte RGB components.
    #[must_use]
    pub const fn from_rgb(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// Red component of the color.
    #[must_use]
    pub const fn red(&self) -> u8 {
        self.red
    }

    /// Green component of the color.
    #[must_use]
    pub const fn green(&self) -> u8 {
        self.green
    }

    /// Blue component of the color.
    #[must_use]
    pub const fn blue(&self) -> u8 {
        self.blue
    }
}

/// Display colors carried by a level for presentation purposes only.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct Palette {
    /// Color drawn around the grid.
    pub background: Rgb,
    /// Color of unclaimed cells.
    pub unclaimed: Rgb,
    /// Color of claimed cells.
    pub claimed: Rgb,
    /// Color of the player's trail.
    pub claiming: Rgb,
    /// Color of the player marker.
    pub player: Rgb,
    /// Color of plain enemies.
    pub enemy: Rgb,
    /// Color of destroyers.
    pub destroyer: Rgb,
}

impl Palette {
    /// Color assigned to an entity of the provided kind.
    #[must_use]
    pub const fn entity(&self, kind: EntityKind) -> Rgb {
        match kind {
            EntityKind::Player => self.player,
            EntityKind::Enemy => self.enemy,
            EntityKind::Destroyer => self.destroyer,
        }
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            background: Rgb::from_rgb(0x10, 0x10, 0x18),
            unclaimed: Rgb::from_rgb(0x00, 0x00, 0x00),
            claimed: Rgb::from_rgb(0x2f, 0x95, 0x32),
            claiming: Rgb::from_rgb(0xff, 0xc1, 0x07),
            player: Rgb::from_rgb(0xff, 0xff, 0xff),
            enemy: Rgb::from_rgb(0xc8, 0x2a, 0x36),
            destroyer: Rgb::from_rgb(0x58, 0x47, 0xff),
        }
    }
}

/// Commands that express all permissible level mutations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    /// Points the player toward the provided heading at unit speed.
    SteerPlayer {
        /// Heading requested by the input device.
        direction: Direction,
    },
    /// Advances every entity by one fixed logical step.
    Tick,
    /// Delivers one second to the round clock.
    AdvanceSecond,
    /// Starts the round clock, resuming it when paused.
    Start,
    /// Pauses the round clock.
    Pause,
    /// Stops the round clock.
    Stop,
}

/// Events reported by the level after processing commands.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Event {
    /// The player's rounded position changed.
    PlayerAdvanced {
        /// Cell the player occupied before moving.
        from: CellCoord,
        /// Cell the player occupies after moving.
        to: CellCoord,
    },
    /// The player lost a life and was returned to the spawn point.
    PlayerDied {
        /// Lives left after the death.
        lives: i32,
    },
    /// The player sealed a trail and territory was claimed.
    TerritoryClaimed {
        /// Number of cells converted to `Claimed` by the seal.
        claimed: u32,
        /// Fraction of the field claimed after the seal.
        ratio: f32,
    },
    /// A destroyer reverted a claimed cell to unclaimed.
    CellErased {
        /// Cell that was reverted.
        cell: CellCoord,
    },
    /// The round clock moved to a new value.
    ClockAdvanced {
        /// Clock value after advancing.
        seconds: i64,
    },
    /// The round clock changed lifecycle state.
    ClockStateChanged {
        /// State that became active.
        state: ClockState,
    },
    /// The countdown expired.
    TimeUp,
    /// The claimed ratio crossed the win threshold.
    RoundWon,
    /// The player can no longer continue the round.
    RoundLost,
}

#[cfg(test)]
mod tests {
    use super::{CellCoord, CellState, Direction, EntityId, Palette};
    use serde::{de::DeserializeOwned, Serialize};

    fn assert_round_trip<T>(value: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    #[test]
    fn direction_components_are_clamped_to_unit_steps() {
        let direction = Direction::new(5, -3);
        assert_eq!(direction.dx(), 1);
        assert_eq!(direction.dy(), -1);
        assert_eq!(Direction::from((0, 9)), Direction::SOUTH);
    }

    #[test]
    fn reflection_flips_a_single_axis() {
        let diagonal = Direction::new(1, 1);
        assert_eq!(diagonal.reflect_x(), Direction::new(-1, 1));
        assert_eq!(diagonal.reflect_y(), Direction::new(1, -1));
        assert_eq!(Direction::NONE.reflect_x(), Direction::NONE);
    }

    #[test]
    fn out_of_bounds_is_the_only_unstored_state() {
        assert!(!CellState::OutOfBounds.is_in_bounds());
        assert!(CellState::STORED.iter().all(|state| state.is_in_bounds()));
    }

    #[test]
    fn negative_cell_coordinates_round_trip_through_bincode() {
        assert_round_trip(&CellCoord::new(-1, 7));
        assert_round_trip(&EntityId::new(3));
    }

    #[test]
    fn palette_round_trips_through_bincode() {
        assert_round_trip(&Palette::default());
    }
}
