//! Admin passcode gate.
//!
//! Guards the hazard editing commands behind a 4-digit passcode. This is a
//! convenience lock against accidental edits, not a security boundary: the
//! passcode is stored in plain text and the recovery code is fixed.
//!
//! # State Machine
//!
//! ```text
//! Locked --[passcode]--> Granted
//! Locked --[recovery code]--> Resetting
//! Locked --[anything else]--> Locked (denied)
//! Resetting --[4 digits]--> Locked (passcode replaced)
//! Resetting --[anything else]--> Resetting (rejected)
//! Resetting --[cancel]--> Locked
//! Granted --[begin_reset]--> Resetting
//! Granted --[lock]--> Locked
//! ```
//!
//! # Example
//!
//! ```
//! use travelsafe::admin::{AdminGate, GateOutcome};
//!
//! let mut gate = AdminGate::new("0142");
//! assert_eq!(gate.submit("1111"), GateOutcome::Denied);
//! assert_eq!(gate.submit("0142"), GateOutcome::Granted);
//! assert!(gate.is_granted());
//! ```

use std::fmt;

/// Code that switches the gate into passcode reset.
pub const RECOVERY_CODE: &str = "0135";

/// Required passcode length.
pub const PASSCODE_LEN: usize = 4;

/// Current gate mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateMode {
    /// Waiting for the passcode.
    Locked,
    /// Waiting for a replacement passcode.
    Resetting,
    /// Admin access open.
    Granted,
}

impl fmt::Display for GateMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GateMode::Locked => write!(f, "Admin Access"),
            GateMode::Resetting => write!(f, "Reset Passcode"),
            GateMode::Granted => write!(f, "Admin"),
        }
    }
}

/// Result of submitting input to the gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateOutcome {
    /// Correct passcode, access granted.
    Granted,
    /// Recovery code accepted; the next submission sets a new passcode.
    RecoveryMode,
    /// Wrong passcode.
    Denied,
    /// New passcode accepted. The caller must persist it.
    PasscodeUpdated(String),
    /// Replacement passcode was not 4 digits.
    InvalidPasscode,
    /// Submission while already granted; nothing changed.
    AlreadyGranted,
}

impl GateOutcome {
    /// Message shown to the operator.
    pub fn message(&self) -> &'static str {
        match self {
            GateOutcome::Granted | GateOutcome::AlreadyGranted => "Access granted.",
            GateOutcome::RecoveryMode => "Recovery mode activated. Enter new passcode.",
            GateOutcome::Denied => "Invalid passcode",
            GateOutcome::PasscodeUpdated(_) => "Passcode updated successfully. Please login.",
            GateOutcome::InvalidPasscode => "Passcode must be 4 digits.",
        }
    }
}

/// Whether `candidate` is an acceptable passcode.
pub fn is_valid_passcode(candidate: &str) -> bool {
    candidate.len() == PASSCODE_LEN && candidate.bytes().all(|b| b.is_ascii_digit())
}

/// Passcode gate for admin commands.
#[derive(Debug, Clone)]
pub struct AdminGate {
    passcode: String,
    mode: GateMode,
}

impl AdminGate {
    /// Create a locked gate with the stored passcode.
    pub fn new(passcode: impl Into<String>) -> Self {
        Self {
            passcode: passcode.into(),
            mode: GateMode::Locked,
        }
    }

    /// Current mode.
    pub fn mode(&self) -> GateMode {
        self.mode
    }

    pub fn is_granted(&self) -> bool {
        self.mode == GateMode::Granted
    }

    /// The passcode currently in effect.
    pub fn passcode(&self) -> &str {
        &self.passcode
    }

    /// Submit operator input in the current mode.
    pub fn submit(&mut self, input: &str) -> GateOutcome {
        let input = input.trim();
        match self.mode {
            GateMode::Granted => GateOutcome::AlreadyGranted,
            GateMode::Locked if input == self.passcode => {
                self.mode = GateMode::Granted;
                tracing::info!("Admin access granted");
                GateOutcome::Granted
            }
            GateMode::Locked if input == RECOVERY_CODE => {
                self.mode = GateMode::Resetting;
                tracing::warn!("Admin recovery mode activated");
                GateOutcome::RecoveryMode
            }
            GateMode::Locked => {
                tracing::warn!("Admin passcode rejected");
                GateOutcome::Denied
            }
            GateMode::Resetting if is_valid_passcode(input) => {
                self.passcode = input.to_string();
                self.mode = GateMode::Locked;
                tracing::info!("Admin passcode replaced");
                GateOutcome::PasscodeUpdated(self.passcode.clone())
            }
            GateMode::Resetting => GateOutcome::InvalidPasscode,
        }
    }

    /// Start changing the passcode from a granted session.
    ///
    /// Returns `false` (and changes nothing) unless access is granted.
    pub fn begin_reset(&mut self) -> bool {
        if self.mode != GateMode::Granted {
            return false;
        }
        self.mode = GateMode::Resetting;
        true
    }

    /// Abandon a reset and return to the locked state.
    pub fn cancel(&mut self) {
        if self.mode == GateMode::Resetting {
            self.mode = GateMode::Locked;
        }
    }

    /// Close admin access.
    pub fn lock(&mut self) {
        self.mode = GateMode::Locked;
    }
}
