//! TravelSafe CLI - Command-line interface
//!
//! Runs a navigation session with hazard proximity warnings and provides the
//! admin commands for maintaining the hazard list.

mod commands;
mod error;
mod runner;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use console::style;

use commands::config::ConfigCommands;
use commands::hazards::HazardCommands;
use commands::passcode::PasscodeCommands;
use error::CliError;

#[derive(Debug, Parser)]
#[command(name = "travelsafe", version, about = "Hazard-aware navigation with proximity voice warnings")]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Start a navigation session with live hazard alerts
    Run {
        /// Fixed position as "lat,lng"
        #[arg(long, value_name = "LAT,LNG", conflicts_with = "replay", allow_hyphen_values = true)]
        at: Option<String>,

        /// Replay a JSON track file of {"lat", "lng"} points
        #[arg(long, value_name = "FILE")]
        replay: Option<PathBuf>,

        /// Log announcements instead of speaking them
        #[arg(long)]
        no_speech: bool,

        /// Override the alert radius in meters
        #[arg(long)]
        radius: Option<f64>,
    },

    /// View and edit the hazard list
    Hazards {
        #[command(subcommand)]
        command: HazardCommands,
    },

    /// Manage the admin passcode
    Passcode {
        #[command(subcommand)]
        command: PasscodeCommands,
    },

    /// Search for a location by name
    Search {
        /// Free-text place name or address
        query: String,
    },

    /// Plan a route between two points
    Route {
        /// Start as "lat,lng"
        #[arg(allow_hyphen_values = true)]
        from: String,
        /// Destination as "lat,lng"
        #[arg(allow_hyphen_values = true)]
        to: String,
    },

    /// View and modify configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match dispatch(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

fn dispatch(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Commands::Run {
            at,
            replay,
            no_speech,
            radius,
        } => commands::run::run(commands::run::RunArgs {
            verbose: cli.verbose,
            at,
            replay,
            no_speech,
            radius,
        }),
        Commands::Hazards { command } => commands::hazards::run(command, cli.verbose),
        Commands::Passcode { command } => commands::passcode::run(command, cli.verbose),
        Commands::Search { query } => commands::search::run(&query, cli.verbose),
        Commands::Route { from, to } => commands::route::run(&from, &to, cli.verbose),
        Commands::Config { command } => commands::config::run(command),
    }
}
