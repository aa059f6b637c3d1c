//! Common types and utilities shared across CLI commands.

use std::sync::Arc;

use console::style;
use dialoguer::Password;
use travelsafe::admin::{AdminGate, GateOutcome};
use travelsafe::announce::{AnnouncementSink, CommandSink, LogSink};
use travelsafe::config::ConfigFile;
use travelsafe::coord::Coordinate;
use travelsafe::storage::{self, JsonFileStore, KeyValueStore};

use crate::error::CliError;

/// Passcode prompts allowed before giving up.
const MAX_PASSCODE_ATTEMPTS: usize = 3;

/// Parse a `lat,lng` argument.
pub fn parse_coordinate(arg: &str) -> Result<Coordinate, CliError> {
    Ok(arg.parse::<Coordinate>()?)
}

/// Open the state file named by the configuration.
pub fn open_store(config: &ConfigFile) -> Result<JsonFileStore, CliError> {
    Ok(JsonFileStore::open(config.storage_path())?)
}

/// Pick the speech output for a session.
///
/// Falls back to logging when speech is disabled, unconfigured or the
/// configured program cannot be run.
pub fn select_sink(config: &ConfigFile, no_speech: bool) -> Arc<dyn AnnouncementSink> {
    let command = config.speech.command.trim();
    if no_speech || command.is_empty() {
        return Arc::new(LogSink);
    }

    let sink = CommandSink::probe(command);
    if sink.is_available() {
        Arc::new(sink)
    } else {
        Arc::new(LogSink)
    }
}

/// Require the admin passcode before a hazard edit.
///
/// With `preset` the passcode is checked once without prompting. Otherwise
/// the operator is prompted, and entering the recovery code walks through
/// setting a new passcode before logging in.
pub fn authenticate(store: &dyn KeyValueStore, preset: Option<&str>) -> Result<(), CliError> {
    let mut gate = AdminGate::new(storage::load_passcode(store)?);

    if let Some(code) = preset {
        return match gate.submit(code) {
            GateOutcome::Granted => Ok(()),
            _ => Err(CliError::AccessDenied),
        };
    }

    for _ in 0..MAX_PASSCODE_ATTEMPTS {
        let input = Password::new()
            .with_prompt(gate.mode().to_string())
            .allow_empty_password(true)
            .interact()?;

        let outcome = gate.submit(&input);
        match &outcome {
            GateOutcome::Granted | GateOutcome::AlreadyGranted => return Ok(()),
            GateOutcome::PasscodeUpdated(passcode) => {
                storage::save_passcode(store, passcode)?;
                println!("{}", style(outcome.message()).green());
            }
            GateOutcome::RecoveryMode | GateOutcome::InvalidPasscode => {
                println!("{}", style(outcome.message()).yellow());
            }
            GateOutcome::Denied => println!("{}", style(outcome.message()).red()),
        }
    }

    Err(CliError::AccessDenied)
}
