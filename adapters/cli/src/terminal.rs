use std::{fmt::Write as _, io::Write};

use anyhow::{Context, Result};
use territory_core::{CellCoord, CellState, EntityKind};
use territory_rendering::{Color, OutputSink, RenderingError, Scene};

/// Output sink that draws scenes as text.
pub(crate) struct TerminalSink<W: Write> {
    out: W,
    color: bool,
    every: u32,
    frames: u64,
}

impl<W: Write> TerminalSink<W> {
    /// Creates a sink drawing every `every`th presented frame; zero draws none.
    pub(crate) fn new(out: W, color: bool, every: u32) -> Self {
        Self {
            out,
            color,
            every,
            frames: 0,
        }
    }

    /// Draws a scene regardless of the frame interval.
    pub(crate) fn draw(&mut self, scene: &Scene) -> Result<()> {
        let frame = render(scene, self.color)?;
        self.out
            .write_all(frame.as_bytes())
            .and_then(|()| self.out.flush())
            .context("failed to write frame to the terminal")
    }
}

impl<W: Write> OutputSink for TerminalSink<W> {
    fn present(&mut self, scene: &Scene) -> Result<()> {
        self.frames += 1;
        if self.every == 0 || self.frames % u64::from(self.every) != 0 {
            return Ok(());
        }
        self.draw(scene)
    }
}

/// Renders the grid followed by a heads-up line.
fn render(scene: &Scene, color: bool) -> Result<String, RenderingError> {
    let mut frame = String::new();
    for row in 0..scene.height as i32 {
        for column in 0..scene.width as i32 {
            let cell = CellCoord::new(column, row);
            let entity = scene.entity_at(cell);
            let glyph = match entity {
                Some(entity) => entity_glyph(entity.kind),
                None => cell_glyph(scene.cell(cell)),
            };
            if color {
                let background = scene.cell_color(cell)?;
                let foreground = entity.map_or(background, |entity| entity.color);
                push_colored(&mut frame, glyph, foreground, background);
            } else {
                frame.push(glyph);
            }
        }
        if color {
            frame.push_str("\x1b[0m");
        }
        frame.push('\n');
    }

    let hud = &scene.hud;
    let _ = writeln!(
        frame,
        "round {} | lives {} | claimed {}% | {}",
        hud.round,
        hud.lives,
        hud.claimed_percent(),
        hud.clock
    );
    Ok(frame)
}

fn cell_glyph(state: CellState) -> char {
    match state {
        CellState::Unclaimed => '.',
        CellState::Claimed => '#',
        CellState::Claiming => '+',
        CellState::OutOfBounds => ' ',
    }
}

fn entity_glyph(kind: EntityKind) -> char {
    match kind {
        EntityKind::Player => '@',
        EntityKind::Enemy => 'o',
        EntityKind::Destroyer => 'X',
    }
}

fn push_colored(frame: &mut String, glyph: char, foreground: Color, background: Color) {
    let [fr, fg, fb] = channels(foreground);
    let [br, bg, bb] = channels(background);
    let _ = write!(
        frame,
        "\x1b[38;2;{fr};{fg};{fb}m\x1b[48;2;{br};{bg};{bb}m{glyph}"
    );
}

fn channels(color: Color) -> [u8; 3] {
    [color.red, color.green, color.blue]
        .map(|channel| (channel.clamp(0.0, 1.0) * 255.0).round() as u8)
}
