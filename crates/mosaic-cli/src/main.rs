//! Mosaic command-line tool
//!
//! Runs the bundled sample catalog against the object model, inspects how the
//! sample classes were composed, and reports the effective configuration.

mod catalog;
mod commands;
mod config;
mod logging;
mod output;

use clap::{Parser, Subcommand};
use config::{parse_level, CliConfig};
use logging::LogFormat;
use output::{ColorMode, StyledOutput};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "mosaic")]
#[command(about = "Runtime classes and interfaces for native hosts", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file (defaults to ./mosaic.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Default log level (error, warn, info, debug, trace)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Log output format
    #[arg(long, global = true, value_enum, default_value = "compact")]
    log_format: LogFormat,

    /// Color output
    #[arg(long, global = true, value_enum, default_value = "auto")]
    color: ColorMode,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the bundled sample scenarios
    Samples {
        /// Sample name pattern to match
        pattern: Option<String>,
        /// Stop after first failure
        #[arg(long)]
        bail: bool,
    },

    /// Show how a sample class or interface was composed
    Inspect {
        /// Class or interface name
        name: String,
    },

    /// Display version and effective configuration
    Info,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = CliConfig::load(cli.config.as_deref())?;
    if let Some(level) = cli.log_level.as_deref() {
        config.log.global = parse_level(level)?;
    }
    logging::init(&config.log, cli.log_format);
    tracing::debug!(target: "mosaic::cli", config = ?config.runtime, "configuration loaded");

    let mut out = StyledOutput::new(output::resolve_color_choice(cli.color));

    match cli.command {
        Commands::Samples { pattern, bail } => commands::samples::execute(
            commands::samples::SamplesArgs { pattern, bail },
            &config.runtime,
            &mut out,
        ),
        Commands::Inspect { name } => commands::inspect::execute(&name, &config.runtime, &mut out),
        Commands::Info => commands::info::execute(&config, cli.config.as_deref(), &mut out),
    }
}
