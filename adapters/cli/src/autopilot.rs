use rand::{seq::SliceRandom, Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use territory_core::Direction;

const CARDINALS: [Direction; 4] = [
    Direction::NORTH,
    Direction::EAST,
    Direction::SOUTH,
    Direction::WEST,
];

/// Seeded stand-in for keyboard input.
///
/// Wanders in cardinal directions and never reverses straight into the
/// trail it just painted.
#[derive(Debug)]
pub(crate) struct Autopilot {
    rng: ChaCha8Rng,
    heading: Direction,
    turn_chance: f64,
}

impl Autopilot {
    pub(crate) const DEFAULT_TURN_CHANCE: f64 = 0.15;

    pub(crate) fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            heading: Direction::NONE,
            turn_chance: Self::DEFAULT_TURN_CHANCE,
        }
    }

    /// Next steering command, if the autopilot decides to turn this tick.
    pub(crate) fn steer(&mut self) -> Option<Direction> {
        if self.heading != Direction::NONE && !self.rng.gen_bool(self.turn_chance) {
            return None;
        }
        let reverse = self.heading.reflect_x().reflect_y();
        let options: Vec<Direction> = CARDINALS
            .into_iter()
            .filter(|direction| *direction != reverse)
            .collect();
        let heading = *options.choose(&mut self.rng)?;
        self.heading = heading;
        Some(heading)
    }
}
