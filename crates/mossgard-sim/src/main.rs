//! Mossgard Simulation Runner
//!
//! Loads behaviour trees and a tuning config, then runs the world
//! headless for a fixed number of ticks.

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use mossgard_behaviour::TreeLibrary;
use mossgard_sim::{ActionLogger, RunError, Runner, SimConfig};

/// Command line arguments for the simulation
#[derive(Parser, Debug)]
#[command(name = "mossgard-sim")]
#[command(about = "A behaviour-tree driven actor simulation")]
struct Args {
    /// Random seed (overrides the tuning file)
    #[arg(long)]
    seed: Option<u64>,

    /// Number of ticks to simulate (overrides the tuning file)
    #[arg(long)]
    ticks: Option<u64>,

    /// Directory holding the behaviour tree sources
    #[arg(long, default_value = "trees")]
    trees: PathBuf,

    /// Tuning configuration file
    #[arg(long, default_value = "tuning.toml")]
    tuning: PathBuf,

    /// Write every committed action to this JSONL file
    #[arg(long)]
    actions_log: Option<PathBuf>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    if let Err(error) = run(args) {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<(), RunError> {
    let mut config = SimConfig::from_file(&args.tuning)?;
    if let Some(seed) = args.seed {
        config.simulation.seed = seed;
    }
    if let Some(ticks) = args.ticks {
        config.simulation.ticks = ticks;
    }

    println!("Mossgard Simulation");
    println!("===================");
    println!("Seed: {}", config.simulation.seed);
    println!("Ticks: {}", config.simulation.ticks);
    println!("Trees: {}", args.trees.display());
    println!();

    let library = TreeLibrary::load_dir(&args.trees)?;
    println!("Loaded {} behaviour trees", library.len());

    let logger = match &args.actions_log {
        Some(path) => ActionLogger::new(path)?,
        None => ActionLogger::null(),
    };

    let mut runner = Runner::new(&config, library, logger)?;
    println!("Spawned {} actors", runner.game().actors().count());

    let summary = runner.run(config.simulation.ticks)?;

    println!();
    println!("Simulation complete");
    println!("  ticks:     {}", summary.ticks);
    println!("  actions:   {}", summary.actions);
    println!("  deaths:    {}", summary.deaths);
    println!("  survivors: {}", summary.survivors);

    for actor in runner.game().actors() {
        println!(
            "  {} at ({}, {}) hp {}/{}",
            actor.name, actor.position.x, actor.position.y, actor.hp, actor.max_hp
        );
    }
    Ok(())
}
