//! `travelsafe config` - inspect and edit `config.ini` from the shell.

use clap::Subcommand;
use console::style;
use travelsafe::config::{config_file_path, ConfigFile, ConfigKey};

use crate::error::CliError;

/// Config subcommands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Print one setting
    Get {
        /// Setting name as section.key, e.g. alerts.radius_m
        key: String,
    },

    /// Change one setting and save the file
    Set {
        /// Setting name as section.key, e.g. alerts.cooldown_secs
        key: String,

        /// New value
        value: String,
    },

    /// Print every setting grouped by section
    List,

    /// Print where the configuration file lives
    Path,
}

/// Run a config subcommand.
pub fn run(command: ConfigCommands) -> Result<(), CliError> {
    match command {
        ConfigCommands::Get { key } => {
            let key = parse_key(&key)?;
            println!("{}", key.get(&ConfigFile::load()?));
            Ok(())
        }
        ConfigCommands::Set { key, value } => set(&key, &value),
        ConfigCommands::List => {
            list(&ConfigFile::load()?);
            Ok(())
        }
        ConfigCommands::Path => {
            let path = config_file_path();
            let note = if path.exists() { "" } else { " (not created yet)" };
            println!("{}{}", path.display(), note);
            Ok(())
        }
    }
}

fn parse_key(key: &str) -> Result<ConfigKey, CliError> {
    key.parse().map_err(|_| {
        CliError::Config(format!(
            "No setting named '{}'. Run 'travelsafe config list' for the available names.",
            key
        ))
    })
}

fn set(key: &str, value: &str) -> Result<(), CliError> {
    let key = parse_key(key)?;

    // A file that no longer parses is replaced instead of blocking the fix
    let mut config = match ConfigFile::load() {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!(error = %e, "Starting from defaults");
            ConfigFile::default()
        }
    };
    key.set(&mut config, value)?;
    config.save()?;

    println!("{} = {}", style(key).cyan(), key.get(&config));
    Ok(())
}

fn list(config: &ConfigFile) {
    let mut section = None;
    for key in ConfigKey::all() {
        if section != Some(key.section()) {
            if section.is_some() {
                println!();
            }
            println!("{}", style(format!("[{}]", key.section())).bold());
            section = Some(key.section());
        }

        let value = key.get(config);
        let shown = if value.is_empty() { "(unset)".to_string() } else { value };
        println!("  {:<20} {}", key.key_name(), shown);
    }
}
