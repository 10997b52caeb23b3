//! CLI entry for comment-monitor, defining clap subcommands, installing the log subscriber, and dispatching each command handler.
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::command;

// The Cli struct represents the root of the command line interface.
#[derive(Parser, Debug)]
#[command(
    name = "comment-monitor",
    about = "comment-monitor: watches issue and PR comments for '/<prefix> [<command>] [<args>]' commands",
    version
)]
struct Cli {
    /// Logging level: trace, debug, info, warn or error. RUST_LOG takes precedence.
    #[arg(long = "log.level", alias = "log-level", global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(about = "Validate a command config file and print the commands it accepts")]
    Check(command::check::CheckArgs),
    #[command(about = "Extract the command carried by a comment")]
    Extract(command::extract::ExtractArgs),
    #[command(about = "Render the success comment for a command")]
    Render(command::render::RenderArgs),
}

/// Parses the command-line arguments and executes the corresponding handler.
/// - `args`: parse from command line if it's `None`, otherwise parse from the given args
pub fn parse(args: Option<&[&str]>) -> Result<ExitCode> {
    let cli = match args {
        Some(args) => Cli::try_parse_from(args)?,
        None => Cli::parse(),
    };
    init_logging(&cli.log_level)?;

    match cli.command {
        Commands::Check(args) => command::check::execute(args),
        Commands::Extract(args) => command::extract::execute(args),
        Commands::Render(args) => command::render::execute(args),
    }
}

/// Install a stderr `fmt` subscriber. A second call (e.g. from tests) keeps the first one.
fn init_logging(level: &str) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(level)
            .with_context(|| format!("failed to parse --log.level flag '{level}'"))?,
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
    Ok(())
}
