//! Lanefall - Development Tools

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use lanefall_core::math::Fixed;
use lanefall_tools::simulate::{self, SimulateOptions};
use lanefall_tools::validate;
use lanefall_tools::{ToolError, ToolResult};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "lanefall-tools")]
#[command(about = "Development tools for Lanefall")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a match config file, or every .ron file in a directory
    Validate {
        /// Path to a RON file or data directory
        #[arg(default_value = "data")]
        path: PathBuf,
    },
    /// Run a headless match with a scripted player and print a JSON summary
    Simulate {
        /// Match config (RON); the built-in default match when omitted
        path: Option<PathBuf>,
        /// Maximum number of ticks
        #[arg(long, default_value_t = 6000)]
        ticks: u64,
        /// Seconds per tick
        #[arg(long, default_value_t = 0.0625)]
        delta: f64,
        /// Override the config's RNG seed
        #[arg(long)]
        seed: Option<u64>,
        /// Save the recorded replay here
        #[arg(long)]
        replay: Option<PathBuf>,
    },
    /// Play back a saved replay and check its final hash
    VerifyReplay {
        /// Replay file
        path: PathBuf,
    },
    /// Write the built-in default match config as RON
    ExportDefault {
        /// Output file
        path: PathBuf,
    },
}

fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli.command) {
        tracing::error!("{e}");
        std::process::exit(1);
    }
}

fn run(command: Commands) -> ToolResult<()> {
    match command {
        Commands::Validate { path } => {
            tracing::info!("Validating match data in: {}", path.display());
            let report = validate::validate_path(&path)?;
            for (file, reason) in &report.failed {
                tracing::error!("{}: {reason}", file.display());
            }
            let report = report.into_result()?;
            tracing::info!("Validation passed ({} file(s))", report.checked());
        }
        Commands::Simulate {
            path,
            ticks,
            delta,
            seed,
            replay,
        } => {
            let config = match &path {
                Some(path) => validate::load_match_config(path)?,
                None => lanefall_core::data::MatchConfig::default(),
            };
            let delta = Fixed::checked_from_num(delta)
                .filter(|d| *d > Fixed::ZERO)
                .ok_or_else(|| ToolError::InvalidArgument(format!("--delta {delta} must be > 0")))?;
            let options = SimulateOptions {
                max_ticks: ticks,
                delta,
                seed,
            };
            let source = path.unwrap_or_else(|| PathBuf::from("<default>"));
            let (summary, recorded) = simulate::run_match(config, options)
                .map_err(|e| ToolError::Game {
                    path: source,
                    source: e,
                })?;
            if let Some(out) = replay {
                simulate::save_replay(&recorded, &out)?;
                tracing::info!("Replay saved to {}", out.display());
            }
            println!("{}", simulate::summary_json(&summary)?);
        }
        Commands::VerifyReplay { path } => {
            let frames = simulate::verify_replay_file(&path)?;
            tracing::info!("Replay verified ({frames} frames)");
        }
        Commands::ExportDefault { path } => {
            validate::write_default_config(&path)?;
            tracing::info!("Default match written to {}", path.display());
        }
    }
    Ok(())
}
