#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative level state for Territory.
//!
//! A [`Level`] exclusively owns the claim [`Field`], the player, the enemies
//! and the round clock. Callers drive it through [`apply`] (or the matching
//! methods) and observe the results through the returned [`Event`] buffer
//! and the read-only [`query`] functions.

mod entity;
mod field;

use territory_core::{
    CellCoord, Command, Direction, EntityId, EntityKind, Event, Palette, RoundOutcome, TimerMode,
};
use territory_system_timer::{SecondOutcome, Timer};
use tracing::{debug, info, trace};

pub use entity::EnemySeed;
pub use field::Field;

use entity::{cell_origin, Body, Player};

/// Distance multiplier applied to every entity on each tick.
///
/// Motion is defined in cells per tick; the wall-clock interval between ticks
/// never influences it.
pub const LOGICAL_STEP: f32 = 1.0;

/// Simulation parameters that stay fixed for the lifetime of a level.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LevelSettings {
    /// Cell the player starts in and returns to after dying.
    pub spawn: CellCoord,
    /// Lives the player starts with.
    pub lives: i32,
    /// Claimed ratio that must be exceeded to win.
    pub win_ratio: f32,
    /// Countdown length in seconds; `None` counts elapsed time upward.
    pub countdown: Option<u32>,
    /// Presentation colors carried for renderers.
    pub palette: Palette,
}

/// Represents one round of Territory.
#[derive(Debug)]
pub struct Level {
    field: Field,
    player: Player,
    enemies: Vec<Body>,
    settings: LevelSettings,
    timer: Timer,
    outcome: Option<RoundOutcome>,
    tick_index: u64,
}

impl Level {
    /// Assembles a level from a prepared field, its settings and enemy placements.
    ///
    /// Enemies receive identifiers in the order they are provided, starting
    /// after the player.
    #[must_use]
    pub fn new(field: Field, settings: LevelSettings, enemies: Vec<EnemySeed>) -> Self {
        let player = Player {
            body: Body {
                id: EntityId::PLAYER,
                kind: EntityKind::Player,
                position: cell_origin(settings.spawn),
                direction: Direction::NONE,
                speed: 0.0,
            },
            lives: settings.lives,
            claiming: false,
        };
        let enemies = enemies
            .into_iter()
            .zip(1u32..)
            .map(|(seed, id)| seed.into_body(EntityId::new(id)))
            .collect();

        Self {
            field,
            player,
            enemies,
            settings,
            timer: Timer::new(),
            outcome: None,
            tick_index: 0,
        }
    }

    /// Points the player in the provided direction at unit speed.
    pub fn steer_player(&mut self, direction: Direction) {
        self.player.body.direction = direction;
        self.player.body.speed = 1.0;
    }

    /// Advances every entity by one fixed logical step.
    ///
    /// The player moves first, then enemies in creation order; later entities
    /// observe the positions earlier entities reached in the same tick. Ticks
    /// are ignored once the round is decided.
    pub fn tick(&mut self, out_events: &mut Vec<Event>) {
        if self.outcome.is_some() {
            return;
        }
        self.tick_index = self.tick_index.saturating_add(1);
        trace!(tick = self.tick_index, "level_tick");

        let ids: Vec<EntityId> = self.bodies().map(|body| body.id).collect();
        for id in ids {
            self.step_entity(id, LOGICAL_STEP, out_events);
        }
    }

    /// Moves a single entity by `dt` logical units.
    pub fn update_entity(&mut self, id: EntityId, dt: f32, out_events: &mut Vec<Event>) {
        self.step_entity(id, dt, out_events);
    }

    /// Costs the player a life and resets it to the spawn point.
    ///
    /// The unfinished trail is discarded. Dropping below zero lives loses
    /// the round.
    pub fn die(&mut self, out_events: &mut Vec<Event>) {
        self.player.lives -= 1;
        self.player.claiming = false;
        self.player.body.speed = 0.0;
        self.player.body.position = cell_origin(self.settings.spawn);
        self.field.clear_claiming();

        let lives = self.player.lives;
        info!(lives, "player_died");
        out_events.push(Event::PlayerDied { lives });

        if lives < 0 {
            self.finish(RoundOutcome::Lost, out_events);
        }
    }

    /// Seals the trail and claims every region no enemy can reach.
    pub fn claim(&mut self, out_events: &mut Vec<Event>) {
        let enemy_cells: Vec<CellCoord> = self.enemies.iter().map(Body::cell).collect();
        let claimed = self.field.claim(&enemy_cells);
        let ratio = self.field.claimed_ratio();
        info!(claimed, ratio, "territory_claimed");
        out_events.push(Event::TerritoryClaimed { claimed, ratio });

        if ratio > self.settings.win_ratio {
            self.finish(RoundOutcome::Won, out_events);
        }
    }

    /// Starts the round clock, resuming it when paused.
    pub fn start(&mut self, out_events: &mut Vec<Event>) {
        match self.settings.countdown {
            Some(seconds) => self.timer.start(TimerMode::CountDown, i64::from(seconds)),
            None => self.timer.start(TimerMode::CountUp, 0),
        }
        self.report_clock_state(out_events);
    }

    /// Pauses the round clock; delivered seconds are ignored until resumed.
    pub fn pause(&mut self, out_events: &mut Vec<Event>) {
        self.timer.pause();
        self.report_clock_state(out_events);
    }

    /// Stops the round clock.
    pub fn stop(&mut self, out_events: &mut Vec<Event>) {
        self.timer.stop();
        self.report_clock_state(out_events);
    }

    /// Delivers one logical second to the round clock.
    ///
    /// An expired countdown loses the round.
    pub fn advance_second(&mut self, out_events: &mut Vec<Event>) {
        match self.timer.advance_second() {
            SecondOutcome::Ignored => {}
            SecondOutcome::Advanced { seconds } => {
                out_events.push(Event::ClockAdvanced { seconds });
            }
            SecondOutcome::Expired => {
                info!("time_up");
                out_events.push(Event::TimeUp);
                self.finish(RoundOutcome::Lost, out_events);
            }
        }
    }

    /// Result of the round, once decided.
    #[must_use]
    pub const fn outcome(&self) -> Option<RoundOutcome> {
        self.outcome
    }

    fn finish(&mut self, outcome: RoundOutcome, out_events: &mut Vec<Event>) {
        if self.outcome.is_some() {
            return;
        }
        self.outcome = Some(outcome);
        self.timer.stop();
        info!(?outcome, ratio = self.field.claimed_ratio(), "round_finished");
        out_events.push(match outcome {
            RoundOutcome::Won => Event::RoundWon,
            RoundOutcome::Lost => Event::RoundLost,
        });
    }

    fn report_clock_state(&self, out_events: &mut Vec<Event>) {
        let state = self.timer.state();
        debug!(?state, "clock_state_changed");
        out_events.push(Event::ClockStateChanged { state });
    }

    /// Player first, then enemies in creation order.
    fn bodies(&self) -> impl Iterator<Item = &Body> {
        std::iter::once(&self.player.body).chain(self.enemies.iter())
    }

    fn body(&self, id: EntityId) -> Option<&Body> {
        match id.get() {
            0 => Some(&self.player.body),
            index => self.enemies.get(usize::try_from(index - 1).ok()?),
        }
    }

    fn body_mut(&mut self, id: EntityId) -> Option<&mut Body> {
        match id.get() {
            0 => Some(&mut self.player.body),
            index => self.enemies.get_mut(usize::try_from(index - 1).ok()?),
        }
    }
}

/// Applies the provided command to the level, mutating state deterministically.
pub fn apply(level: &mut Level, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::SteerPlayer { direction } => level.steer_player(direction),
        Command::Tick => level.tick(out_events),
        Command::AdvanceSecond => level.advance_second(out_events),
        Command::Start => level.start(out_events),
        Command::Pause => level.pause(out_events),
        Command::Stop => level.stop(out_events),
    }
}

/// Query functions that provide read-only access to the level state.
pub mod query {
    use glam::Vec2;
    use territory_core::{
        CellCoord, CellState, ClockState, Direction, EntityId, EntityKind, Palette, RoundOutcome,
    };
    use territory_system_timer::Timer;

    use super::{Field, Level, LevelSettings};

    /// Provides read-only access to the claim field.
    #[must_use]
    pub fn field(level: &Level) -> &Field {
        &level.field
    }

    /// State of a single cell, `OutOfBounds` outside the field.
    #[must_use]
    pub fn cell_state(level: &Level, cell: CellCoord) -> CellState {
        level.field.get(cell)
    }

    /// Fraction of the field currently claimed.
    #[must_use]
    pub fn claimed_ratio(level: &Level) -> f32 {
        level.field.claimed_ratio()
    }

    /// Captures the player's round state.
    #[must_use]
    pub fn player(level: &Level) -> PlayerSnapshot {
        PlayerSnapshot {
            cell: level.player.body.cell(),
            lives: level.player.lives,
            claiming: level.player.claiming,
            speed: level.player.body.speed,
        }
    }

    /// Captures every entity, player first then enemies in creation order.
    #[must_use]
    pub fn entities(level: &Level) -> EntityView {
        let snapshots = level
            .bodies()
            .map(|body| EntitySnapshot {
                id: body.id,
                kind: body.kind,
                cell: body.cell(),
                position: body.position,
                direction: body.direction,
                speed: body.speed,
            })
            .collect();
        EntityView { snapshots }
    }

    /// Provides read-only access to the round clock.
    #[must_use]
    pub fn clock(level: &Level) -> &Timer {
        &level.timer
    }

    /// Lifecycle state of the round clock.
    #[must_use]
    pub fn clock_state(level: &Level) -> ClockState {
        level.timer.state()
    }

    /// Parameters the level was assembled with.
    #[must_use]
    pub fn settings(level: &Level) -> &LevelSettings {
        &level.settings
    }

    /// Presentation colors carried by the level.
    #[must_use]
    pub fn palette(level: &Level) -> &Palette {
        &level.settings.palette
    }

    /// Result of the round, once decided.
    #[must_use]
    pub fn outcome(level: &Level) -> Option<RoundOutcome> {
        level.outcome
    }

    /// Number of ticks processed so far.
    #[must_use]
    pub fn tick_index(level: &Level) -> u64 {
        level.tick_index
    }

    /// Immutable representation of the player's round state.
    #[derive(Clone, Copy, Debug, PartialEq)]
    pub struct PlayerSnapshot {
        /// Rounded cell the player occupies.
        pub cell: CellCoord,
        /// Lives left; negative once the round is lost.
        pub lives: i32,
        /// Whether the player is painting a trail.
        pub claiming: bool,
        /// Current speed multiplier.
        pub speed: f32,
    }

    /// Immutable representation of a single entity used for queries.
    #[derive(Clone, Copy, Debug, PartialEq)]
    pub struct EntitySnapshot {
        /// Identifier assigned by the level.
        pub id: EntityId,
        /// Behaviour of the entity.
        pub kind: EntityKind,
        /// Rounded cell the entity occupies.
        pub cell: CellCoord,
        /// Continuous position of the entity.
        pub position: Vec2,
        /// Current heading.
        pub direction: Direction,
        /// Current speed multiplier.
        pub speed: f32,
    }

    /// Read-only snapshot describing every entity in the level.
    #[derive(Clone, Debug)]
    pub struct EntityView {
        snapshots: Vec<EntitySnapshot>,
    }

    impl EntityView {
        /// Iterator over the captured snapshots in update order.
        pub fn iter(&self) -> impl Iterator<Item = &EntitySnapshot> {
            self.snapshots.iter()
        }

        /// Snapshot of the entity with the provided identifier.
        #[must_use]
        pub fn get(&self, id: EntityId) -> Option<&EntitySnapshot> {
            self.snapshots.iter().find(|snapshot| snapshot.id == id)
        }

        /// Consumes the view, yielding the underlying snapshots.
        #[must_use]
        pub fn into_vec(self) -> Vec<EntitySnapshot> {
            self.snapshots
        }
    }
}
