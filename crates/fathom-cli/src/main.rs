//! Headless frontend for the Fathom simulation.

mod autopilot;
mod commands;
mod store;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "fathom",
    about = "Fathom: grow, hunt, and survive in a simulated ocean",
    version,
    propagate_version = true
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a level headlessly with the autopilot at the controls
    Run {
        /// Number of frames to simulate
        #[arg(short, long, default_value = "3600")]
        ticks: u64,

        /// RNG seed for a reproducible run
        #[arg(short, long, default_value = "42")]
        seed: u64,

        /// Frames per second of the simulated frame clock
        #[arg(long, default_value = "60")]
        fps: f64,

        /// Level file (JSON); the built-in level when omitted
        #[arg(short, long)]
        level: Option<PathBuf>,

        /// Run record file (JSON); progress is kept in memory when omitted
        #[arg(long)]
        store: Option<PathBuf>,

        /// Show every event, not just the notable ones
        #[arg(short, long)]
        verbose: bool,
    },

    /// List the creatures a level can spawn
    Pool {
        /// Level file (JSON); the built-in level when omitted
        #[arg(short, long)]
        level: Option<PathBuf>,
    },

    /// Write the built-in level to a JSON file for editing
    InitLevel {
        /// Output path
        path: PathBuf,

        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },

    /// Show the essence balance in a run record
    Essence {
        /// Run record file (JSON)
        #[arg(long)]
        store: PathBuf,
    },
}

fn main() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .try_init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run {
            ticks,
            seed,
            fps,
            level,
            store,
            verbose,
        } => commands::run::run(&commands::run::RunOptions {
            ticks,
            seed,
            fps,
            level,
            store,
            verbose,
        }),
        Commands::Pool { level } => commands::pool::run(level.as_deref()),
        Commands::InitLevel { path, force } => commands::init_level::run(&path, force),
        Commands::Essence { store } => commands::essence::run(&store),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}
