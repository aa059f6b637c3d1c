//! Hazard list commands.
//!
//! Listing is open to everyone; adding and removing require the admin
//! passcode.

use clap::Subcommand;
use console::style;
use travelsafe::hazard::{Hazard, HazardDraft, HazardId, HazardStore};
use travelsafe::storage::{self, KeyValueStore};

use super::common::{authenticate, open_store};
use crate::error::CliError;
use crate::runner::CliRunner;

/// Hazard subcommands.
#[derive(Debug, Subcommand)]
pub enum HazardCommands {
    /// List all hazards
    List,

    /// Add a hazard at a position
    Add {
        /// Hazard name shown in warnings
        name: String,
        /// Latitude in degrees
        #[arg(allow_hyphen_values = true)]
        lat: String,
        /// Longitude in degrees
        #[arg(allow_hyphen_values = true)]
        lng: String,
        /// Admin passcode (prompted if omitted)
        #[arg(long)]
        passcode: Option<String>,
    },

    /// Remove a hazard by id
    Remove {
        /// Hazard id as shown by `hazards list`
        id: HazardId,
        /// Admin passcode (prompted if omitted)
        #[arg(long)]
        passcode: Option<String>,
    },
}

/// Run a hazards subcommand.
pub fn run(command: HazardCommands, verbose: bool) -> Result<(), CliError> {
    let runner = CliRunner::new(verbose, false)?;
    runner.log_startup("hazards");
    let store = open_store(runner.config())?;

    match command {
        HazardCommands::List => run_list(&store),
        HazardCommands::Add {
            name,
            lat,
            lng,
            passcode,
        } => {
            authenticate(&store, passcode.as_deref())?;
            run_add(&store, HazardDraft::new(name, lat, lng))
        }
        HazardCommands::Remove { id, passcode } => {
            authenticate(&store, passcode.as_deref())?;
            run_remove(&store, id)
        }
    }
}

fn run_list(store: &dyn KeyValueStore) -> Result<(), CliError> {
    let hazards = storage::load_hazards(store)?;

    if hazards.is_empty() {
        println!("No hazards defined.");
        return Ok(());
    }

    println!("Active Hazards ({})", hazards.len());
    println!("==================");
    for hazard in &hazards {
        print_hazard(hazard);
    }
    Ok(())
}

fn run_add(store: &dyn KeyValueStore, draft: HazardDraft) -> Result<(), CliError> {
    let mut hazards = HazardStore::from_hazards(storage::load_hazards(store)?);
    let id = hazards.add(&draft)?;
    storage::save_hazards(store, hazards.as_slice())?;

    if let Some(hazard) = hazards.get(id) {
        println!("{}", style("Hazard added").green());
        print_hazard(hazard);
    }
    Ok(())
}

fn run_remove(store: &dyn KeyValueStore, id: HazardId) -> Result<(), CliError> {
    let mut hazards = HazardStore::from_hazards(storage::load_hazards(store)?);
    let removed = hazards
        .remove(id)
        .ok_or_else(|| CliError::NotFound(format!("No hazard with id {}", id)))?;
    storage::save_hazards(store, hazards.as_slice())?;

    println!("{} {}", style("Removed").green(), removed.name);
    Ok(())
}

fn print_hazard(hazard: &Hazard) {
    println!(
        "  [{}] {}  ({})",
        style(hazard.id).cyan(),
        style(&hazard.name).bold(),
        hazard.position
    );
}
