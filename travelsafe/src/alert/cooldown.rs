//! Per-hazard voice announcement cooldown.
//!
//! # State Machine
//!
//! Each hazard id is independently in one of two states:
//!
//! ```text
//! Silent --[announced]--> Cooling
//! Cooling --[elapsed > cooldown]--> Silent   (checked lazily, no timer)
//! ```
//!
//! Hazards that have never been announced are `Silent`. Entries are never
//! deleted; an entry for a removed hazard is simply never looked up again.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::hazard::HazardId;

/// Cooldown state of one hazard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CooldownState {
    /// The hazard may be announced.
    Silent,
    /// The hazard was announced recently and must stay quiet.
    Cooling {
        /// Time left until the hazard may be announced again.
        remaining: Duration,
    },
}

/// Last-announced instants keyed by hazard id.
#[derive(Debug, Clone)]
pub struct CooldownTracker {
    window: Duration,
    last_announced: HashMap<HazardId, Instant>,
}

impl CooldownTracker {
    /// Create a tracker with the given cooldown window.
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last_announced: HashMap::new(),
        }
    }

    /// The cooldown window.
    pub fn window(&self) -> Duration {
        self.window
    }

    /// Current state of a hazard at `now`.
    ///
    /// A hazard leaves `Cooling` only once the elapsed time strictly exceeds
    /// the window.
    pub fn state(&self, id: HazardId, now: Instant) -> CooldownState {
        match self.last_announced.get(&id) {
            None => CooldownState::Silent,
            Some(&last) => {
                let elapsed = now.saturating_duration_since(last);
                if elapsed > self.window {
                    CooldownState::Silent
                } else {
                    CooldownState::Cooling {
                        remaining: self.window - elapsed,
                    }
                }
            }
        }
    }

    /// If the hazard is `Silent`, move it to `Cooling` as of `now` and return
    /// `true`. Otherwise leave it untouched and return `false`.
    pub fn try_begin(&mut self, id: HazardId, now: Instant) -> bool {
        match self.state(id, now) {
            CooldownState::Silent => {
                self.last_announced.insert(id, now);
                true
            }
            CooldownState::Cooling { .. } => false,
        }
    }

    /// When the hazard was last announced, if ever.
    pub fn last_announced(&self, id: HazardId) -> Option<Instant> {
        self.last_announced.get(&id).copied()
    }

    /// Number of hazards that have ever been announced.
    pub fn len(&self) -> usize {
        self.last_announced.len()
    }

    /// Whether no hazard has been announced yet.
    pub fn is_empty(&self) -> bool {
        self.last_announced.is_empty()
    }
}
