//! Admin passcode commands.

use clap::Subcommand;
use console::style;
use dialoguer::Password;
use travelsafe::admin::{is_valid_passcode, AdminGate, GateMode, GateOutcome};
use travelsafe::storage::{self, KeyValueStore};

use super::common::open_store;
use crate::error::CliError;
use crate::runner::CliRunner;

/// Passcode subcommands.
#[derive(Debug, Subcommand)]
pub enum PasscodeCommands {
    /// Set a new passcode, authorised by the current passcode or the recovery code
    Reset,
}

/// Run a passcode subcommand.
pub fn run(command: PasscodeCommands, verbose: bool) -> Result<(), CliError> {
    let runner = CliRunner::new(verbose, false)?;
    runner.log_startup("passcode");
    let store = open_store(runner.config())?;

    match command {
        PasscodeCommands::Reset => run_reset(&store),
    }
}

fn run_reset(store: &dyn KeyValueStore) -> Result<(), CliError> {
    let mut gate = AdminGate::new(storage::load_passcode(store)?);

    let code = Password::new()
        .with_prompt("Current passcode or recovery code")
        .interact()?;

    match gate.submit(&code) {
        GateOutcome::Granted | GateOutcome::RecoveryMode => {}
        outcome => {
            println!("{}", style(outcome.message()).red());
            return Err(CliError::AccessDenied);
        }
    }

    let new_passcode = Password::new()
        .with_prompt("New passcode (4 digits)")
        .with_confirmation("Confirm passcode", "Passcodes do not match")
        .validate_with(|input: &String| -> Result<(), &str> {
            if is_valid_passcode(input) {
                Ok(())
            } else {
                Err("Passcode must be 4 digits.")
            }
        })
        .interact()?;

    let passcode = apply_new_passcode(&mut gate, &new_passcode)?;
    storage::save_passcode(store, &passcode)?;
    println!("{}", style("Passcode updated.").green());
    Ok(())
}

/// Move an authorised gate to the new passcode and return it.
fn apply_new_passcode(gate: &mut AdminGate, new_passcode: &str) -> Result<String, CliError> {
    if gate.mode() == GateMode::Granted {
        gate.begin_reset();
    }

    match gate.submit(new_passcode) {
        GateOutcome::PasscodeUpdated(passcode) => Ok(passcode),
        outcome => Err(CliError::Config(outcome.message().to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use travelsafe::admin::RECOVERY_CODE;

    #[test]
    fn test_apply_after_recovery() {
        let mut gate = AdminGate::new("0142");
        gate.submit(RECOVERY_CODE);
        assert_eq!(apply_new_passcode(&mut gate, "9090").unwrap(), "9090");
    }

    #[test]
    fn test_apply_after_login() {
        let mut gate = AdminGate::new("0142");
        gate.submit("0142");
        assert_eq!(apply_new_passcode(&mut gate, "1234").unwrap(), "1234");
        assert_eq!(gate.passcode(), "1234");
    }

    #[test]
    fn test_apply_rejects_bad_passcode() {
        let mut gate = AdminGate::new("0142");
        gate.submit(RECOVERY_CODE);
        assert!(apply_new_passcode(&mut gate, "12345").is_err());
    }
}
