//! Developer CLI for the patchgraph engine: not a product surface, a
//! smoke-test harness that loads a project file, drives it through
//! routing/compile/runtime/bridge, and reports what came out.

mod pipeline;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "patchgraph")]
#[command(author, version, about = "patchgraph engine smoke-test CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a project file, route and compile it, and report errors/warnings.
    Validate(ValidateArgs),

    /// Validate a project, then run it through the runtime and audio bridge
    /// for a bounded window, printing the encoded events that come out.
    Simulate(SimulateArgs),
}

#[derive(Args)]
struct ValidateArgs {
    /// Path to a project JSON file.
    file: PathBuf,
}

#[derive(Args)]
struct SimulateArgs {
    /// Path to a project JSON file.
    file: PathBuf,

    /// Simulated wall-clock window to pull events for, in seconds.
    #[arg(long, default_value_t = 2.0)]
    window_sec: f64,

    /// Tempo override in beats per minute; defaults to the project's
    /// `settings.tempo`, or 120 if unset.
    #[arg(long)]
    bpm: Option<f64>,
}

fn main() -> anyhow::Result<()> {
    use tracing_subscriber::EnvFilter;

    tracing_subscriber::fmt().with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into())).init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Validate(args) => pipeline::validate(&args.file),
        Commands::Simulate(args) => pipeline::simulate(&args.file, args.window_sec, args.bpm),
    }
}
