use territory_core::{
    CellCoord, CellState, Direction, EntityId, EntityKind, Event, Palette, RoundOutcome,
};
use territory_world::{query, EnemySeed, Field, Level, LevelSettings};

fn settings(spawn: CellCoord, lives: i32) -> LevelSettings {
    LevelSettings {
        spawn,
        lives,
        win_ratio: 0.9,
        countdown: None,
        palette: Palette::default(),
    }
}

fn bordered_field() -> Field {
    let mut field = Field::new(5, 5);
    field.claim_border(1);
    field
}

fn parked(cell: CellCoord) -> EnemySeed {
    EnemySeed::enemy(cell).with_motion(Direction::NONE, 0.0)
}

fn run_ticks(level: &mut Level, ticks: usize) -> Vec<Event> {
    let mut events = Vec::new();
    for _ in 0..ticks {
        level.tick(&mut events);
    }
    events
}

fn assert_field_consistent(level: &Level) {
    let field = query::field(level);
    let total: u32 = CellState::STORED.iter().map(|state| field.count(*state)).sum();
    assert_eq!(total, field.area(), "per-state counts must cover the field");
    let ratio = query::claimed_ratio(level);
    assert!((0.0..=1.0).contains(&ratio), "claimed ratio {ratio} out of range");
}

#[test]
fn claiming_with_an_enemy_in_the_interior_claims_nothing() {
    let mut level = Level::new(
        bordered_field(),
        settings(CellCoord::new(0, 0), 3),
        vec![parked(CellCoord::new(2, 2))],
    );
    let mut events = Vec::new();

    level.claim(&mut events);

    assert_eq!(
        events,
        vec![Event::TerritoryClaimed {
            claimed: 0,
            ratio: 16.0 / 25.0,
        }]
    );
    for row in 1..=3 {
        for column in 1..=3 {
            assert_eq!(
                query::cell_state(&level, CellCoord::new(column, row)),
                CellState::Unclaimed,
                "interior cell ({column}, {row}) is reachable from the enemy",
            );
        }
    }
    assert_field_consistent(&level);
}

#[test]
fn separated_pocket_is_claimed_while_enemy_region_stays_open() {
    let mut field = bordered_field();
    field.set(CellState::Claiming, CellCoord::new(2, 1));
    field.set(CellState::Claiming, CellCoord::new(1, 2));
    let ratio_before = field.claimed_ratio();

    let claimed = field.claim(&[CellCoord::new(2, 2)]);

    assert_eq!(claimed, 3, "the two trail cells plus the pocket at (1, 1)");
    assert_eq!(field.get(CellCoord::new(1, 1)), CellState::Claimed);
    assert_eq!(field.get(CellCoord::new(2, 2)), CellState::Unclaimed);
    assert_eq!(field.get(CellCoord::new(3, 3)), CellState::Unclaimed);
    assert!(field.claimed_ratio() > ratio_before);
}

#[test]
fn player_trail_seals_a_column_of_territory() {
    let mut level = Level::new(
        bordered_field(),
        settings(CellCoord::new(1, 0), 3),
        vec![parked(CellCoord::new(2, 2))],
    );
    level.steer_player(Direction::SOUTH);

    let events = run_ticks(&mut level, 3);
    assert_eq!(
        query::cell_state(&level, CellCoord::new(1, 1)),
        CellState::Claiming
    );
    assert_eq!(
        query::cell_state(&level, CellCoord::new(1, 2)),
        CellState::Claiming
    );
    assert!(query::player(&level).claiming);
    assert_eq!(
        events.first(),
        Some(&Event::PlayerAdvanced {
            from: CellCoord::new(1, 0),
            to: CellCoord::new(1, 1),
        })
    );

    let events = run_ticks(&mut level, 1);

    assert!(events.contains(&Event::TerritoryClaimed {
        claimed: 3,
        ratio: 19.0 / 25.0,
    }));
    for row in 1..=3 {
        assert_eq!(
            query::cell_state(&level, CellCoord::new(1, row)),
            CellState::Claimed
        );
    }
    assert_eq!(
        query::cell_state(&level, CellCoord::new(2, 2)),
        CellState::Unclaimed
    );
    let player = query::player(&level);
    assert_eq!(player.cell, CellCoord::new(1, 4));
    assert!(!player.claiming);
    assert_field_consistent(&level);
}

#[test]
fn touching_the_own_trail_costs_a_life() {
    let mut level = Level::new(
        bordered_field(),
        settings(CellCoord::new(1, 0), 2),
        vec![parked(CellCoord::new(3, 3))],
    );
    level.steer_player(Direction::SOUTH);
    let _ = run_ticks(&mut level, 2);

    level.steer_player(Direction::NORTH);
    let events = run_ticks(&mut level, 1);

    assert_eq!(events, vec![Event::PlayerDied { lives: 1 }]);
    let player = query::player(&level);
    assert_eq!(player.cell, CellCoord::new(1, 0));
    assert_eq!(player.speed, 0.0);
    assert_eq!(query::field(&level).count(CellState::Claiming), 0);
    assert_eq!(level.outcome(), None);
}

#[test]
fn enemy_touching_the_player_kills_it() {
    let mut level = Level::new(
        bordered_field(),
        settings(CellCoord::new(1, 0), 3),
        vec![EnemySeed::enemy(CellCoord::new(3, 2)).with_motion(Direction::WEST, 1.0)],
    );
    level.steer_player(Direction::SOUTH);

    let events = run_ticks(&mut level, 2);

    assert!(events.contains(&Event::PlayerDied { lives: 2 }));
    assert_eq!(query::player(&level).cell, CellCoord::new(1, 0));
    assert_eq!(query::field(&level).count(CellState::Claiming), 0);
    let enemy = *query::entities(&level)
        .get(EntityId::new(1))
        .expect("enemy snapshot");
    assert_eq!(enemy.direction, Direction::EAST, "the enemy bounces off the player");
    assert_eq!(enemy.cell, CellCoord::new(2, 2));
}

#[test]
fn player_walking_into_a_parked_enemy_stays_put() {
    let mut level = Level::new(
        Field::new(6, 3),
        settings(CellCoord::new(1, 1), 3),
        vec![parked(CellCoord::new(3, 1))],
    );
    level.steer_player(Direction::EAST);

    let events = run_ticks(&mut level, 3);

    assert_eq!(
        events,
        vec![Event::PlayerAdvanced {
            from: CellCoord::new(1, 1),
            to: CellCoord::new(2, 1),
        }]
    );
    let player = query::player(&level);
    assert_eq!(player.cell, CellCoord::new(2, 1), "the enemy's cell blocks the move");
    assert_eq!(player.lives, 3);
    assert!(!player.claiming, "an entity hit does not start a trail");
    assert_eq!(query::field(&level).count(CellState::Claiming), 0);
}

#[test]
fn player_bumping_an_enemy_on_claimed_ground_does_not_claim() {
    let mut level = Level::new(
        bordered_field(),
        settings(CellCoord::new(0, 0), 3),
        vec![parked(CellCoord::new(2, 0))],
    );
    level.steer_player(Direction::EAST);

    let events = run_ticks(&mut level, 3);

    assert_eq!(
        events,
        vec![Event::PlayerAdvanced {
            from: CellCoord::new(0, 0),
            to: CellCoord::new(1, 0),
        }]
    );
    assert_eq!(query::player(&level).cell, CellCoord::new(1, 0));
    assert_eq!(query::claimed_ratio(&level), 16.0 / 25.0);
}

#[test]
fn enemy_reflects_only_the_axis_that_hit_a_wall() {
    let mut level = Level::new(
        bordered_field(),
        settings(CellCoord::new(0, 0), 3),
        vec![EnemySeed::enemy(CellCoord::new(2, 2)).with_motion(Direction::new(1, 1), 1.0)],
    );
    let enemy = EntityId::new(1);
    let mut events = Vec::new();

    level.update_entity(enemy, 1.0, &mut events);
    assert_eq!(
        query::entities(&level).get(enemy).map(|snapshot| snapshot.cell),
        Some(CellCoord::new(3, 3))
    );

    level.update_entity(enemy, 1.0, &mut events);
    let snapshot = *query::entities(&level).get(enemy).expect("enemy snapshot");

    assert_eq!(snapshot.direction, Direction::new(-1, 1));
    assert_eq!(snapshot.cell, CellCoord::new(3, 3), "bouncing does not move");
    assert!(events.is_empty());
}

#[test]
fn enemy_reflects_both_axes_on_a_corner_hit() {
    let mut field = Field::new(5, 5);
    field.set(CellState::Claimed, CellCoord::new(3, 3));
    let mut level = Level::new(
        field,
        settings(CellCoord::new(0, 0), 3),
        vec![EnemySeed::enemy(CellCoord::new(2, 2)).with_motion(Direction::new(1, 1), 1.0)],
    );
    let mut events = Vec::new();

    level.update_entity(EntityId::new(1), 1.0, &mut events);

    let snapshot = *query::entities(&level)
        .get(EntityId::new(1))
        .expect("enemy snapshot");
    assert_eq!(snapshot.direction, Direction::new(-1, -1));
    assert_eq!(snapshot.cell, CellCoord::new(2, 2));
}

#[test]
fn fractional_speeds_keep_continuous_positions() {
    let mut level = Level::new(
        bordered_field(),
        settings(CellCoord::new(0, 0), 3),
        vec![EnemySeed::enemy(CellCoord::new(1, 1))],
    );

    let _ = run_ticks(&mut level, 1);

    let enemy = *query::entities(&level)
        .get(EntityId::new(1))
        .expect("enemy snapshot");
    assert_eq!(enemy.kind, EntityKind::Enemy);
    assert_eq!(enemy.position.x, 1.5);
    assert_eq!(enemy.position.y, 1.5);
    assert_eq!(enemy.cell, CellCoord::new(1, 1));
}

#[test]
fn destroyer_erases_claimed_cells_it_touches() {
    let mut level = Level::new(
        bordered_field(),
        settings(CellCoord::new(0, 0), 3),
        vec![EnemySeed::destroyer(CellCoord::new(3, 2)).with_motion(Direction::EAST, 1.0)],
    );
    let mut events = Vec::new();

    level.update_entity(EntityId::new(1), 1.0, &mut events);

    assert_eq!(
        events,
        vec![Event::CellErased {
            cell: CellCoord::new(4, 2),
        }]
    );
    assert_eq!(
        query::cell_state(&level, CellCoord::new(4, 2)),
        CellState::Unclaimed
    );
    assert_field_consistent(&level);
}

#[test]
fn destroyer_erases_even_when_the_contact_kills() {
    let mut level = Level::new(
        bordered_field(),
        settings(CellCoord::new(4, 2), 3),
        vec![EnemySeed::destroyer(CellCoord::new(3, 2)).with_motion(Direction::EAST, 1.0)],
    );
    let mut events = Vec::new();

    level.update_entity(EntityId::new(1), 1.0, &mut events);

    assert_eq!(
        events,
        vec![
            Event::PlayerDied { lives: 2 },
            Event::CellErased {
                cell: CellCoord::new(4, 2),
            },
        ]
    );
    assert_eq!(
        query::cell_state(&level, CellCoord::new(4, 2)),
        CellState::Unclaimed
    );
}

#[test]
fn player_stops_at_the_edge_of_the_grid() {
    let mut level = Level::new(bordered_field(), settings(CellCoord::new(0, 0), 3), Vec::new());
    level.steer_player(Direction::WEST);

    let events = run_ticks(&mut level, 1);

    assert!(events.is_empty());
    let player = query::player(&level);
    assert_eq!(player.cell, CellCoord::new(0, 0));
    assert_eq!(player.speed, 0.0);
}

#[test]
fn death_below_zero_lives_loses_exactly_once() {
    let mut level = Level::new(bordered_field(), settings(CellCoord::new(0, 0), 1), Vec::new());
    let mut events = Vec::new();

    level.die(&mut events);
    assert_eq!(events, vec![Event::PlayerDied { lives: 0 }]);

    events.clear();
    level.die(&mut events);
    assert_eq!(
        events,
        vec![Event::PlayerDied { lives: -1 }, Event::RoundLost]
    );

    events.clear();
    level.die(&mut events);
    assert_eq!(events, vec![Event::PlayerDied { lives: -2 }]);
    assert_eq!(level.outcome(), Some(RoundOutcome::Lost));
}

#[test]
fn sealing_the_whole_field_wins_once() {
    let mut level = Level::new(bordered_field(), settings(CellCoord::new(1, 0), 3), Vec::new());
    level.steer_player(Direction::SOUTH);

    let events = run_ticks(&mut level, 4);

    assert!(events.contains(&Event::TerritoryClaimed {
        claimed: 9,
        ratio: 1.0,
    }));
    assert_eq!(
        events.iter().filter(|event| **event == Event::RoundWon).count(),
        1
    );
    assert_eq!(level.outcome(), Some(RoundOutcome::Won));

    let mut later = Vec::new();
    level.claim(&mut later);
    assert!(!later.contains(&Event::RoundWon));
}

#[test]
fn expired_countdown_loses_the_round() {
    let mut level = Level::new(
        bordered_field(),
        LevelSettings {
            countdown: Some(1),
            ..settings(CellCoord::new(0, 0), 3)
        },
        Vec::new(),
    );
    let mut events = Vec::new();
    level.start(&mut events);
    events.clear();

    level.advance_second(&mut events);
    level.advance_second(&mut events);

    assert_eq!(
        events,
        vec![
            Event::ClockAdvanced { seconds: 0 },
            Event::TimeUp,
            Event::RoundLost,
        ]
    );
    assert_eq!(query::clock(&level).to_string(), "00:00");
}
