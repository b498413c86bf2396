#![deny(clippy::all, clippy::pedantic)]

use anyhow::{Context, Result};
use clap::Parser;
use lockstep::ProtocolConfig;
use std::path::PathBuf;
use tether::app;

/// Demo harness for the Tether lock-step RL protocol.
#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// Run the population optimizer instead of a single scripted episode.
    #[arg(long)]
    evolve: bool,

    /// Tick budget for the scripted episode's clock.
    #[arg(long, default_value_t = 2000)]
    ticks: u64,

    /// Generations to evolve.
    #[arg(long, default_value_t = 10)]
    generations: u32,

    /// Candidates per generation.
    #[arg(long, default_value_t = 16)]
    population: usize,

    /// Path to a JSON protocol configuration.
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            ProtocolConfig::from_str(&text)?
        }
        None => ProtocolConfig::default(),
    };

    if args.evolve {
        let best = app::run_evolution(args.generations, args.population, &config)?;
        tracing::info!(best, "evolution finished");
    } else {
        let report = app::run_episode(args.ticks, &config)?;
        tracing::info!(
            steps = report.steps,
            score = report.score,
            final_distance = report.final_distance,
            done = report.done,
            "episode finished"
        );
    }
    Ok(())
}
