#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Territory adapters.

use anyhow::Result as AnyResult;
use glam::Vec2;
use std::{error::Error, fmt};
use territory_core::{CellCoord, CellState, EntityId, EntityKind, Palette, Rgb};

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }
}

impl From<Rgb> for Color {
    fn from(rgb: Rgb) -> Self {
        Self::from_rgb_u8(rgb.red(), rgb.green(), rgb.blue())
    }
}

/// Display color of a stored cell state.
///
/// `OutOfBounds` has no color because it never appears inside a field.
pub fn cell_color(palette: &Palette, state: CellState) -> Result<Color, RenderingError> {
    let rgb = match state {
        CellState::Unclaimed => palette.unclaimed,
        CellState::Claimed => palette.claimed,
        CellState::Claiming => palette.claiming,
        CellState::OutOfBounds => return Err(RenderingError::UncoloredCellState { state }),
    };
    Ok(rgb.into())
}

/// Entity drawn on top of the grid.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneEntity {
    /// Identifier assigned by the level.
    pub id: EntityId,
    /// Behaviour of the entity.
    pub kind: EntityKind,
    /// Rounded cell the entity occupies.
    pub cell: CellCoord,
    /// Continuous position, for renderers that interpolate.
    pub position: Vec2,
    /// Color the entity is drawn with.
    pub color: Color,
}

/// Heads-up values shown next to the grid.
#[derive(Clone, Debug, PartialEq)]
pub struct Hud {
    /// Round number, starting at one.
    pub round: u32,
    /// Lives the player has left.
    pub lives: i32,
    /// Fraction of the field currently claimed.
    pub claimed_ratio: f32,
    /// Clock formatted as `mm:ss`.
    pub clock: String,
}

impl Hud {
    /// Claimed ratio expressed as a whole percentage.
    #[must_use]
    pub fn claimed_percent(&self) -> u32 {
        (self.claimed_ratio.clamp(0.0, 1.0) * 100.0).round() as u32
    }
}

/// Snapshot of everything a sink needs to present one frame.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    /// Number of columns in the grid.
    pub width: u32,
    /// Number of rows in the grid.
    pub height: u32,
    /// Cell states in row-major order.
    pub cells: Vec<CellState>,
    /// Entities in update order, player first.
    pub entities: Vec<SceneEntity>,
    /// Colors used for cells and the surrounding frame.
    pub palette: Palette,
    /// Heads-up values.
    pub hud: Hud,
}

impl Scene {
    /// State of the cell at the coordinate, `OutOfBounds` outside the grid.
    #[must_use]
    pub fn cell(&self, cell: CellCoord) -> CellState {
        let (Ok(column), Ok(row)) = (u32::try_from(cell.column()), u32::try_from(cell.row()))
        else {
            return CellState::OutOfBounds;
        };
        if column >= self.width || row >= self.height {
            return CellState::OutOfBounds;
        }
        let index = row as usize * self.width as usize + column as usize;
        self.cells
            .get(index)
            .copied()
            .unwrap_or(CellState::OutOfBounds)
    }

    /// Display color of the cell at the coordinate.
    pub fn cell_color(&self, cell: CellCoord) -> Result<Color, RenderingError> {
        cell_color(&self.palette, self.cell(cell))
    }

    /// Color drawn around the grid.
    #[must_use]
    pub fn background(&self) -> Color {
        self.palette.background.into()
    }

    /// Entity occupying the cell, if any. Earlier entities take precedence.
    #[must_use]
    pub fn entity_at(&self, cell: CellCoord) -> Option<&SceneEntity> {
        self.entities.iter().find(|entity| entity.cell == cell)
    }
}

/// Destination that presents captured scenes.
///
/// The simulation refuses to advance without one attached.
pub trait OutputSink {
    /// Presents a single frame.
    fn present(&mut self, scene: &Scene) -> AnyResult<()>;
}

/// Errors that can occur when mapping simulation state to colors.
#[derive(Debug, PartialEq, Eq)]
pub enum RenderingError {
    /// The cell state has no display color.
    UncoloredCellState {
        /// State that failed the lookup.
        state: CellState,
    },
}

impl fmt::Display for RenderingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UncoloredCellState { state } => {
                write!(f, "cell state {state:?} has no display color")
            }
        }
    }
}

impl Error for RenderingError {}
