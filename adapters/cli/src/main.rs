#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plays Balloon Defence waves headlessly.

mod config;
mod session;

use std::{path::PathBuf, time::Duration};

use anyhow::{ensure, Result};
use balloon_defence_core::WELCOME_BANNER;
use clap::Parser;

use crate::session::{Session, DEFAULT_LIVES};

/// Simulated time allowed per wave before it is abandoned.
const WAVE_TIME_LIMIT: Duration = Duration::from_secs(600);

/// Plays balloon waves against an automatic turret and reports the results.
#[derive(Debug, Parser)]
#[command(name = "balloon-defence", version)]
struct Args {
    /// Number of waves to play.
    #[arg(long, default_value_t = 3)]
    waves: u32,
    /// Seed for spawn placement and wave shuffling.
    #[arg(long, default_value_t = 0x0ba1_1007)]
    seed: u64,
    /// TOML file with balloon settings.
    #[arg(long)]
    config: Option<PathBuf>,
    /// TOML file with a custom balloon registry.
    #[arg(long)]
    registry: Option<PathBuf>,
    /// Simulated frame length in milliseconds.
    #[arg(long, default_value_t = 16)]
    frame_ms: u64,
    /// Lives at the start of the session.
    #[arg(long, default_value_t = DEFAULT_LIVES)]
    lives: u32,
}

/// Entry point for the Balloon Defence command-line interface.
fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    ensure!(args.frame_ms > 0, "--frame-ms must be positive");

    let settings = config::load_settings(args.config.as_deref())?;
    let registry = config::load_registry(args.registry.as_deref())?;
    log::info!(
        "loaded {} balloon types, settings {settings:?}",
        registry.len()
    );

    println!("{WELCOME_BANNER}");
    let mut session = Session::new(registry, settings, args.seed, args.lives);
    let frame = Duration::from_millis(args.frame_ms);

    for _ in 0..args.waves {
        let report = session.play_wave(frame, WAVE_TIME_LIMIT);
        let status = if report.completed { "cleared" } else { "failed" };
        println!(
            "wave {:>2} {status:<7} {:<16} pops {:>4}  escapes {:>3}  lives lost {:>3}",
            report.wave.get(),
            report.description,
            report.pops,
            report.escapes,
            report.lives_lost,
        );
        if session.is_game_over() {
            println!("game over");
            break;
        }
    }

    println!("score {}  lives {}", session.score(), session.lives());
    Ok(())
}
