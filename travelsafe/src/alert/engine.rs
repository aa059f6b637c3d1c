//! The evaluation routine.

use std::sync::Arc;
use std::time::Instant;

use super::{announcement_text, is_in_range, ActiveAlert, AlertConfig, CooldownTracker};
use crate::announce::AnnouncementSink;
use crate::coord::{self, Coordinate};
use crate::hazard::{Hazard, HazardId};
use crate::position::PositionReading;

/// Outcome of one evaluation pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Evaluation {
    /// The banner after this pass.
    pub active_alert: Option<ActiveAlert>,
    /// Hazards announced during this pass, in snapshot order.
    pub announced: Vec<HazardId>,
    /// Number of hazards inside the radius.
    pub in_range: usize,
    /// Announcements the sink failed to start.
    pub announce_failures: usize,
}

/// Proximity alert engine.
///
/// Owns the cooldown map and the current banner. Every call to
/// [`AlertEngine::evaluate_at`] recomputes from scratch from the reading and
/// hazard slice it is given; the only state carried between calls is the
/// cooldown map.
pub struct AlertEngine {
    config: AlertConfig,
    cooldowns: CooldownTracker,
    sink: Arc<dyn AnnouncementSink>,
    active: Option<ActiveAlert>,
}

impl std::fmt::Debug for AlertEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlertEngine")
            .field("config", &self.config)
            .field("cooldowns", &self.cooldowns)
            .field("sink", &self.sink.name())
            .field("active", &self.active)
            .finish()
    }
}

impl AlertEngine {
    /// Create an engine speaking through `sink`.
    pub fn new(config: AlertConfig, sink: Arc<dyn AnnouncementSink>) -> Self {
        let cooldowns = CooldownTracker::new(config.cooldown);
        Self {
            config,
            cooldowns,
            sink,
            active: None,
        }
    }

    /// Evaluate against the current clock.
    pub fn evaluate(&mut self, reading: Option<&PositionReading>, hazards: &[Hazard]) -> Evaluation {
        self.evaluate_at(reading, hazards, Instant::now())
    }

    /// Evaluate the latest reading against a hazard snapshot at `now`.
    ///
    /// Never fails: an absent or unknown reading clears the banner, and sink
    /// failures are logged and counted.
    pub fn evaluate_at(
        &mut self,
        reading: Option<&PositionReading>,
        hazards: &[Hazard],
        now: Instant,
    ) -> Evaluation {
        let Some(position) = reading.and_then(PositionReading::coordinate) else {
            if let Some(previous) = self.active.take() {
                tracing::debug!(
                    hazard_id = %previous.hazard_id,
                    "No position fix, clearing hazard alert"
                );
            }
            return Evaluation::default();
        };

        let mut evaluation = Evaluation::default();
        let mut nearest: Option<(&Hazard, f64)> = None;

        for hazard in hazards {
            let distance_m = coord::distance(position, hazard.position);
            if !is_in_range(distance_m, self.config.radius_m) {
                continue;
            }
            evaluation.in_range += 1;

            // Strictly less: ties keep the first hazard in snapshot order
            if nearest.map_or(true, |(_, best)| distance_m < best) {
                nearest = Some((hazard, distance_m));
            }

            if self.cooldowns.try_begin(hazard.id, now) {
                evaluation.announced.push(hazard.id);
                if !self.announce(hazard, position, distance_m) {
                    evaluation.announce_failures += 1;
                }
            }
        }

        let active = nearest.map(|(hazard, distance_m)| ActiveAlert {
            hazard_id: hazard.id,
            hazard_name: hazard.name.clone(),
            distance_m,
        });
        self.log_transition(active.as_ref());
        self.active = active.clone();
        evaluation.active_alert = active;

        evaluation
    }

    /// Speak the warning for one hazard. Returns `false` if the sink failed.
    fn announce(&self, hazard: &Hazard, position: Coordinate, distance_m: f64) -> bool {
        let direction = coord::compass_point(coord::bearing(position, hazard.position));
        tracing::info!(
            hazard_id = %hazard.id,
            name = %hazard.name,
            distance_m = format!("{:.1}", distance_m),
            direction,
            "Announcing hazard"
        );

        if !self.sink.is_available() {
            tracing::debug!(sink = self.sink.name(), "Speech unavailable, skipping voice alert");
            return true;
        }

        self.sink.cancel_current();
        match self
            .sink
            .speak(&announcement_text(&hazard.name), &self.config.speech)
        {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(
                    hazard_id = %hazard.id,
                    sink = self.sink.name(),
                    error = %e,
                    "Voice announcement failed"
                );
                false
            }
        }
    }

    fn log_transition(&self, next: Option<&ActiveAlert>) {
        match (self.active.as_ref(), next) {
            (None, Some(alert)) => tracing::info!(
                hazard_id = %alert.hazard_id,
                name = %alert.hazard_name,
                distance_m = format!("{:.1}", alert.distance_m),
                "Hazard alert raised"
            ),
            (Some(prev), Some(alert)) if prev.hazard_id != alert.hazard_id => tracing::info!(
                from = %prev.hazard_id,
                to = %alert.hazard_id,
                name = %alert.hazard_name,
                "Nearest hazard changed"
            ),
            (Some(prev), None) => tracing::info!(
                hazard_id = %prev.hazard_id,
                "Hazard alert cleared"
            ),
            _ => {}
        }
    }

    /// The banner from the most recent evaluation.
    pub fn active_alert(&self) -> Option<&ActiveAlert> {
        self.active.as_ref()
    }

    /// Cooldown bookkeeping.
    pub fn cooldowns(&self) -> &CooldownTracker {
        &self.cooldowns
    }

    /// Engine configuration.
    pub fn config(&self) -> &AlertConfig {
        &self.config
    }
}
