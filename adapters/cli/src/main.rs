#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs Territory headless in a terminal.

mod args;
mod autopilot;
mod layout_transfer;
mod terminal;

use std::{io, thread, time::Instant};

use anyhow::{Context, Result};
use clap::Parser;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use territory_core::{Event, WELCOME_BANNER};
use territory_system_driver::{Cadence, Session, SessionEvent, SessionState};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::{args::Args, autopilot::Autopilot, terminal::TerminalSink};

/// Entry point for the Territory command-line interface.
fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.log_json);

    let mut rng = ChaCha8Rng::seed_from_u64(args.seed);
    let plan = args.level_plan(&mut rng)?;
    if args.export_layout {
        println!("{}", layout_transfer::encode(&plan)?);
        return Ok(());
    }

    println!("{WELCOME_BANNER}");
    let mut session = Session::new(plan).context("level plan is invalid")?;
    session.attach_sink(Box::new(TerminalSink::new(
        io::stdout(),
        args.color,
        args.render_every,
    )));

    let summary = run(&mut session, &args)?;
    TerminalSink::new(io::stdout(), args.color, 1).draw(&session.scene())?;
    info!(
        ticks = summary.ticks,
        deaths = summary.deaths,
        rounds_won = session.rounds_won(),
        state = ?session.state(),
        "run_finished"
    );
    Ok(())
}

#[derive(Debug, Default)]
struct RunSummary {
    ticks: u64,
    deaths: u32,
}

fn run(session: &mut Session, args: &Args) -> Result<RunSummary> {
    let mut autopilot = Autopilot::new(args.seed);
    let mut cadence = Cadence::new(args.tick_interval(), Cadence::DEFAULT_MAX_TICKS_PER_ADVANCE);
    let mut summary = RunSummary::default();
    let mut events = Vec::new();

    session.start(&mut events);
    let mut last_frame = Instant::now();
    while session.state() == SessionState::Running && summary.ticks < args.max_ticks {
        if let Some(direction) = autopilot.steer() {
            session.steer(direction);
        }

        let elapsed = if args.realtime {
            thread::sleep(cadence.tick_interval());
            let now = Instant::now();
            let elapsed = now.duration_since(last_frame);
            last_frame = now;
            elapsed
        } else {
            cadence.tick_interval()
        };
        let steps = session.advance(&mut cadence, elapsed, &mut events)?;
        summary.ticks += u64::from(steps.ticks);

        for event in events.drain(..) {
            report(event, &mut summary);
        }
    }

    if session.state() == SessionState::Running {
        session.stop(&mut events);
        for event in events.drain(..) {
            report(event, &mut summary);
        }
    }
    Ok(summary)
}

fn report(event: SessionEvent, summary: &mut RunSummary) {
    match event {
        SessionEvent::Level(Event::PlayerDied { .. }) => summary.deaths += 1,
        SessionEvent::Level(event) => debug!(?event, "level_event"),
        SessionEvent::RoundStarted { .. } | SessionEvent::RoundFinished { .. } => {}
        SessionEvent::GameOver { rounds_won } => {
            println!("Game over after {rounds_won} won rounds.");
        }
    }
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(io::stderr)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(io::stderr)
            .compact()
            .init();
    }
}
