use std::{fs, path::PathBuf, time::Duration};

use anyhow::{bail, Context, Result};
use clap::Parser;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use territory_core::{CellCoord, Direction, EntityKind};
use territory_system_builder::{HostilePlan, LevelPlan};

use crate::layout_transfer;

/// Headless territory-claiming simulation driven by a seeded autopilot.
#[derive(Debug, Parser)]
#[command(name = "territory", version, about)]
pub(crate) struct Args {
    /// TOML level description used as the base plan.
    #[arg(long, value_name = "PATH", conflicts_with = "layout")]
    pub(crate) config: Option<PathBuf>,
    /// Layout string (`claim:v1:<W>x<H>:<payload>`) used as the base plan.
    #[arg(long, value_name = "LAYOUT")]
    pub(crate) layout: Option<String>,
    /// Number of grid columns.
    #[arg(long)]
    pub(crate) width: Option<u32>,
    /// Number of grid rows.
    #[arg(long)]
    pub(crate) height: Option<u32>,
    /// Thickness of the claimed perimeter.
    #[arg(long)]
    pub(crate) border: Option<u32>,
    /// Enemies scattered over the interior when the plan places none.
    #[arg(long, default_value_t = 2)]
    pub(crate) enemies: usize,
    /// Destroyers scattered over the interior when the plan places none.
    #[arg(long, default_value_t = 0)]
    pub(crate) destroyers: usize,
    /// Countdown length in seconds; the clock counts up without it.
    #[arg(long, value_name = "SECONDS")]
    pub(crate) countdown: Option<u32>,
    /// Lives the player starts with.
    #[arg(long)]
    pub(crate) lives: Option<i32>,
    /// Claimed ratio that must be exceeded to win a round.
    #[arg(long)]
    pub(crate) win_ratio: Option<f32>,
    /// Seed for hostile placement and the autopilot.
    #[arg(long, default_value_t = 0)]
    pub(crate) seed: u64,
    /// Stops the run after this many ticks.
    #[arg(long, default_value_t = 5_000)]
    pub(crate) max_ticks: u64,
    /// Interval between ticks in milliseconds.
    #[arg(long, default_value_t = 50)]
    pub(crate) tick_ms: u64,
    /// Sleeps between ticks instead of simulating as fast as possible.
    #[arg(long)]
    pub(crate) realtime: bool,
    /// Draws every Nth tick to stdout; 0 only draws the final frame.
    #[arg(long, default_value_t = 0, value_name = "N")]
    pub(crate) render_every: u32,
    /// Colors the terminal output with 24-bit ANSI escapes.
    #[arg(long)]
    pub(crate) color: bool,
    /// Prints the resolved plan as a layout string and exits.
    #[arg(long)]
    pub(crate) export_layout: bool,
    /// Emits logs as JSON lines.
    #[arg(long)]
    pub(crate) log_json: bool,
}

impl Args {
    /// Interval between consecutive ticks.
    pub(crate) fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_ms.max(1))
    }

    /// Resolves the plan from the configured source, flag overrides and
    /// seeded hostile placement.
    pub(crate) fn level_plan(&self, rng: &mut ChaCha8Rng) -> Result<LevelPlan> {
        let mut plan = self.base_plan()?;

        if let Some(width) = self.width {
            plan.width = width;
        }
        if let Some(height) = self.height {
            plan.height = height;
        }
        if let Some(border) = self.border {
            plan.border = border;
        }
        if let Some(countdown) = self.countdown {
            plan.countdown = Some(countdown);
        }
        if let Some(lives) = self.lives {
            plan.lives = lives;
        }
        if let Some(win_ratio) = self.win_ratio {
            plan.win_ratio = win_ratio;
        }

        if plan.hostiles.is_empty() {
            plan.hostiles = scatter_hostiles(&plan, self.enemies, self.destroyers, rng)?;
        }
        Ok(plan)
    }

    fn base_plan(&self) -> Result<LevelPlan> {
        if let Some(path) = &self.config {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("failed to read level config {}", path.display()))?;
            return toml::from_str(&raw)
                .with_context(|| format!("failed to parse level config {}", path.display()));
        }
        if let Some(layout) = &self.layout {
            return layout_transfer::decode(layout).context("failed to import layout string");
        }
        Ok(LevelPlan::default())
    }
}

/// Places hostiles on distinct interior cells, heading diagonally.
fn scatter_hostiles(
    plan: &LevelPlan,
    enemies: usize,
    destroyers: usize,
    rng: &mut ChaCha8Rng,
) -> Result<Vec<HostilePlan>> {
    let wanted = enemies + destroyers;
    let candidates: Vec<CellCoord> = interior_cells(plan)
        .filter(|cell| *cell != plan.spawn)
        .collect();
    if candidates.len() < wanted {
        bail!(
            "cannot place {wanted} hostiles on {} free interior cells",
            candidates.len()
        );
    }

    let diagonals = [
        Direction::new(1, 1),
        Direction::new(1, -1),
        Direction::new(-1, 1),
        Direction::new(-1, -1),
    ];
    let cells: Vec<CellCoord> = candidates.choose_multiple(rng, wanted).copied().collect();
    let hostiles = cells
        .into_iter()
        .enumerate()
        .map(|(index, cell)| {
            let kind = if index < enemies {
                EntityKind::Enemy
            } else {
                EntityKind::Destroyer
            };
            HostilePlan {
                direction: diagonals.choose(rng).copied(),
                ..HostilePlan::new(kind, cell)
            }
        })
        .collect();
    Ok(hostiles)
}

fn interior_cells(plan: &LevelPlan) -> impl Iterator<Item = CellCoord> + '_ {
    let border = plan.border;
    (0..plan.height).flat_map(move |row| {
        (0..plan.width).filter_map(move |column| {
            let edge = column
                .min(row)
                .min(plan.width - 1 - column)
                .min(plan.height - 1 - row);
            (edge >= border).then(|| CellCoord::new(column as i32, row as i32))
        })
    })
}
