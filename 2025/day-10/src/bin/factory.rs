use std::path::PathBuf;

use clap::Parser;
use miette::*;
use tracing_subscriber::EnvFilter;

use aoc2025_factory::{parse_machines, FactoryError, Fleet, FleetOptions, Strategy};

/// Fewest button presses to bring every factory machine online.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Machine descriptions, one per line.
    input: PathBuf,

    /// More logging (-v debug, -vv trace). `RUST_LOG` takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count, conflicts_with = "quiet")]
    verbose: u8,

    /// Only log warnings and errors.
    #[arg(short, long)]
    quiet: bool,

    /// Worker threads for the toggle search (defaults to one per core).
    #[arg(short, long)]
    workers: Option<usize>,

    /// Show a progress bar per round.
    #[arg(long)]
    progress: bool,
}

impl Args {
    fn log_filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            let level = match (self.quiet, self.verbose) {
                (true, _) => "warn",
                (false, 0) => "info",
                (false, 1) => "debug",
                (false, _) => "trace",
            };
            EnvFilter::new(level)
        })
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_env_filter(args.log_filter())
        .with_writer(std::io::stderr)
        .init();

    let input = std::fs::read_to_string(&args.input).map_err(|source| FactoryError::Io {
        path: args.input.clone(),
        source,
    })?;
    let machines = parse_machines(&input)?;
    tracing::debug!(machines = machines.len(), path = %args.input.display(), "loaded factory");

    let options = FleetOptions {
        workers: args.workers,
        progress: args.progress,
    };
    let fleet = Fleet::new(&machines, &options)?;

    let round_one = fleet.solve(Strategy::Toggle)?;
    tracing::info!("Total button presses for round 1 : {round_one}");
    let round_two = fleet.solve(Strategy::Linear)?;
    tracing::info!("Total button presses for round 2 : {round_two}");

    println!("Result: {round_one}");
    println!("Result: {round_two}");
    Ok(())
}
