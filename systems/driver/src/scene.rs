use territory_rendering::{Color, Hud, Scene, SceneEntity};
use territory_world::{query, Level};

/// Captures a presentation snapshot of the level.
#[must_use]
pub fn capture_scene(level: &Level, round: u32) -> Scene {
    let field = query::field(level);
    let palette = *query::palette(level);
    let entities = query::entities(level)
        .iter()
        .map(|snapshot| SceneEntity {
            id: snapshot.id,
            kind: snapshot.kind,
            cell: snapshot.cell,
            position: snapshot.position,
            color: Color::from(palette.entity(snapshot.kind)),
        })
        .collect();

    Scene {
        width: field.width(),
        height: field.height(),
        cells: field.iter().map(|(_, state)| state).collect(),
        entities,
        palette,
        hud: Hud {
            round,
            lives: query::player(level).lives,
            claimed_ratio: query::claimed_ratio(level),
            clock: query::clock(level).to_string(),
        },
    }
}
