//! Entity bodies, collision probing and per-kind collision responses.
//!
//! Movement is continuous but every consequence fires when an entity tries
//! to cross into a different cell. Candidates are probed one axis at a time
//! before the diagonal, which is what lets enemies reflect off walls and
//! corners correctly.

use glam::Vec2;
use territory_core::{CellCoord, CellState, Direction, EntityId, EntityKind, Event};
use tracing::trace;

use crate::{field::Field, Level};

/// Motion state shared by every entity kind.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Body {
    pub(crate) id: EntityId,
    pub(crate) kind: EntityKind,
    pub(crate) position: Vec2,
    pub(crate) direction: Direction,
    pub(crate) speed: f32,
}

impl Body {
    pub(crate) fn cell(&self) -> CellCoord {
        cell_at(self.position)
    }

    fn next_position(&self, dt: f32) -> Vec2 {
        self.position + heading(self.direction) * self.speed * dt
    }
}

/// Player body plus the state that only the player carries.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Player {
    pub(crate) body: Body,
    pub(crate) lives: i32,
    pub(crate) claiming: bool,
}

/// Placement of a hostile entity supplied when a level is assembled.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemySeed {
    kind: EntityKind,
    cell: CellCoord,
    direction: Direction,
    speed: f32,
}

impl EnemySeed {
    /// Speed assigned to enemies that do not specify one, in cells per step.
    pub const DEFAULT_SPEED: f32 = 0.5;
    /// Heading assigned to enemies that do not specify one.
    pub const DEFAULT_DIRECTION: Direction = Direction::new(1, 1);

    /// Plain enemy placed at the provided cell.
    #[must_use]
    pub const fn enemy(cell: CellCoord) -> Self {
        Self::new(EntityKind::Enemy, cell)
    }

    /// Destroyer placed at the provided cell.
    #[must_use]
    pub const fn destroyer(cell: CellCoord) -> Self {
        Self::new(EntityKind::Destroyer, cell)
    }

    const fn new(kind: EntityKind, cell: CellCoord) -> Self {
        Self {
            kind,
            cell,
            direction: Self::DEFAULT_DIRECTION,
            speed: Self::DEFAULT_SPEED,
        }
    }

    /// Overrides the initial heading and speed. Negative speeds are clamped to zero.
    #[must_use]
    pub fn with_motion(mut self, direction: Direction, speed: f32) -> Self {
        self.direction = direction;
        self.speed = speed.max(0.0);
        self
    }

    pub(crate) fn into_body(self, id: EntityId) -> Body {
        Body {
            id,
            kind: self.kind,
            position: cell_origin(self.cell),
            direction: self.direction,
            speed: self.speed,
        }
    }
}

/// Entity found at a probed candidate cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Contact {
    pub(crate) id: EntityId,
    pub(crate) kind: EntityKind,
}

/// Details of the first candidate cell that produced a collision.
///
/// `target_state` is only set when the candidate's state differs from the
/// mover's cell; a hit on an entity alone leaves it empty.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Collision {
    pub(crate) target: CellCoord,
    pub(crate) current_state: CellState,
    pub(crate) target_state: Option<CellState>,
    pub(crate) other: Option<Contact>,
}

/// Probes the three candidate cells of a move in their fixed order.
///
/// A candidate collides when its state differs from the mover's current cell
/// or when another entity occupies it. The first colliding candidate wins.
pub(crate) fn probe<F>(field: &Field, mover: &Body, next: Vec2, entity_at: F) -> Option<Collision>
where
    F: Fn(CellCoord, EntityId) -> Option<Contact>,
{
    let current = mover.cell();
    let target = cell_at(next);
    let current_state = field.get(current);
    let candidates = [
        CellCoord::new(target.column(), current.row()),
        CellCoord::new(current.column(), target.row()),
        target,
    ];

    candidates.into_iter().find_map(|candidate| {
        let target_state = Some(field.get(candidate)).filter(|state| *state != current_state);
        let other = entity_at(candidate, mover.id);
        (target_state.is_some() || other.is_some()).then_some(Collision {
            target: candidate,
            current_state,
            target_state,
            other,
        })
    })
}

pub(crate) fn cell_at(position: Vec2) -> CellCoord {
    let floored = position.floor();
    CellCoord::new(floored.x as i32, floored.y as i32)
}

pub(crate) fn cell_origin(cell: CellCoord) -> Vec2 {
    Vec2::new(cell.column() as f32, cell.row() as f32)
}

fn heading(direction: Direction) -> Vec2 {
    Vec2::new(f32::from(direction.dx()), f32::from(direction.dy()))
}

impl Level {
    /// Moves one entity by `dt` logical units, resolving collisions on the way.
    pub(crate) fn step_entity(&mut self, id: EntityId, dt: f32, out_events: &mut Vec<Event>) {
        let Some(body) = self.body(id).cloned() else {
            return;
        };
        let next = body.next_position(dt);
        let collision = probe(&self.field, &body, next, |cell, mover| {
            self.entity_at(cell, mover)
        });

        match collision {
            Some(collision) => self.respond(&body, collision, out_events),
            None => self.advance(&body, next, out_events),
        }
    }

    fn entity_at(&self, cell: CellCoord, mover: EntityId) -> Option<Contact> {
        self.bodies()
            .find(|body| body.id != mover && body.cell() == cell)
            .map(|body| Contact {
                id: body.id,
                kind: body.kind,
            })
    }

    fn advance(&mut self, body: &Body, next: Vec2, out_events: &mut Vec<Event>) {
        if let Some(moving) = self.body_mut(body.id) {
            moving.position = next;
        }
        if body.kind != EntityKind::Player {
            return;
        }

        let from = body.cell();
        let to = cell_at(next);
        if from == to {
            return;
        }
        if self.player.claiming && self.field.get(from) != CellState::Claimed {
            self.field.set(CellState::Claiming, from);
        }
        out_events.push(Event::PlayerAdvanced { from, to });
    }

    fn respond(&mut self, body: &Body, collision: Collision, out_events: &mut Vec<Event>) {
        match body.kind {
            EntityKind::Player => self.player_collided(body, collision, out_events),
            EntityKind::Enemy => self.enemy_collided(body, collision, out_events),
            EntityKind::Destroyer => {
                self.enemy_collided(body, collision, out_events);
                self.erase_claimed(collision, out_events);
            }
        }
    }

    fn player_collided(&mut self, body: &Body, collision: Collision, out_events: &mut Vec<Event>) {
        let from = body.cell();
        let Some(target_state) = collision.target_state else {
            return;
        };
        match target_state {
            CellState::OutOfBounds => {
                self.player.body.speed = 0.0;
            }
            CellState::Unclaimed => {
                self.snap_player(from, collision.target, out_events);
                self.player.claiming = true;
            }
            CellState::Claimed => {
                self.snap_player(from, collision.target, out_events);
                if collision.current_state != CellState::Claimed {
                    self.field.set(CellState::Claiming, from);
                }
                self.claim(out_events);
                self.player.claiming = false;
            }
            CellState::Claiming => {
                self.player.claiming = false;
                self.die(out_events);
            }
        }
    }

    fn snap_player(&mut self, from: CellCoord, to: CellCoord, out_events: &mut Vec<Event>) {
        self.player.body.position = cell_origin(to);
        if from != to {
            out_events.push(Event::PlayerAdvanced { from, to });
        }
    }

    fn enemy_collided(&mut self, body: &Body, collision: Collision, out_events: &mut Vec<Event>) {
        let current = body.cell();
        let mut direction = body.direction;
        if collision.target.column() != current.column() {
            direction = direction.reflect_x();
        }
        if collision.target.row() != current.row() {
            direction = direction.reflect_y();
        }
        if let Some(enemy) = self.body_mut(body.id) {
            enemy.direction = direction;
        }

        if let Some(contact) = collision.other {
            trace!(
                enemy = body.id.get(),
                other = contact.id.get(),
                "enemy_contact"
            );
        }
        let touched_player = collision
            .other
            .is_some_and(|contact| contact.kind == EntityKind::Player);
        if collision.target_state == Some(CellState::Claiming) || touched_player {
            self.die(out_events);
        }
    }

    fn erase_claimed(&mut self, collision: Collision, out_events: &mut Vec<Event>) {
        if collision.target_state != Some(CellState::Claimed) {
            return;
        }
        self.field.set(CellState::Unclaimed, collision.target);
        out_events.push(Event::CellErased {
            cell: collision.target,
        });
    }
}
