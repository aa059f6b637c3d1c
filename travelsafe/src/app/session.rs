//! The session event loop.
//!
//! One task owns the hazard store, the alert engine and the position source.
//! Readings, admin commands and shutdown are serialised through a single
//! `select!`, so every evaluation runs to completion against a consistent
//! hazard list and no locks are needed between them.

use std::sync::Arc;

use chrono::{DateTime, Local};
use tokio::sync::{mpsc, oneshot, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::{AppConfig, AppError, SessionStatus};
use crate::alert::AlertEngine;
use crate::announce::AnnouncementSink;
use crate::hazard::{Hazard, HazardDraft, HazardId, HazardSnapshot, HazardStore};
use crate::position::{LocationProvider, PositionReading, PositionSource};
use crate::storage::{self, KeyValueStore};
use crate::telemetry::{SessionMetrics, TelemetrySnapshot};

/// Queued admin commands between handles and the loop.
const COMMAND_CHANNEL_CAPACITY: usize = 32;

/// Requests handled by the session loop.
#[derive(Debug)]
pub enum SessionCommand {
    AddHazard {
        draft: HazardDraft,
        reply: oneshot::Sender<Result<HazardId, AppError>>,
    },
    RemoveHazard {
        id: HazardId,
        reply: oneshot::Sender<Option<Hazard>>,
    },
    SetTracking(bool),
    ListHazards {
        reply: oneshot::Sender<HazardSnapshot>,
    },
}

/// A navigation session: position tracking, hazard alerts and admin edits.
///
/// # Example
///
/// ```ignore
/// let (session, handle) = Session::new(config, store, provider, sink)?;
/// let task = tokio::spawn(session.run());
///
/// handle.add_hazard(HazardDraft::new("Flood", "13.75", "100.50")).await?;
/// println!("{:?}", handle.status().banner());
///
/// handle.shutdown();
/// let summary = task.await?;
/// ```
pub struct Session {
    config: AppConfig,
    store: Arc<dyn KeyValueStore>,
    hazards: HazardStore,
    engine: AlertEngine,
    source: PositionSource,
    last_reading: Option<PositionReading>,
    last_fix_at: Option<DateTime<Local>>,
    metrics: Arc<SessionMetrics>,
    status: watch::Sender<SessionStatus>,
    commands: mpsc::Receiver<SessionCommand>,
    shutdown: CancellationToken,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("config", &self.config)
            .field("hazards", &self.hazards.len())
            .field("tracking", &self.source.is_tracking())
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Load persisted hazards and wire up a session.
    ///
    /// Nothing runs until [`run`](Self::run) is awaited.
    pub fn new(
        config: AppConfig,
        store: Arc<dyn KeyValueStore>,
        provider: Arc<dyn LocationProvider>,
        sink: Arc<dyn AnnouncementSink>,
    ) -> Result<(Self, SessionHandle), AppError> {
        let hazards = HazardStore::from_hazards(storage::load_hazards(store.as_ref())?);
        info!(
            hazards = hazards.len(),
            provider = provider.name(),
            sink = sink.name(),
            "Session created"
        );

        let engine = AlertEngine::new(config.alerts.clone(), sink);
        let source = PositionSource::new(provider, config.tracking.clone());
        let metrics = Arc::new(SessionMetrics::new());
        let (status_tx, status_rx) = watch::channel(SessionStatus {
            hazard_count: hazards.len(),
            ..Default::default()
        });
        let (command_tx, command_rx) = mpsc::channel(COMMAND_CHANNEL_CAPACITY);
        let shutdown = CancellationToken::new();

        let handle = SessionHandle {
            commands: command_tx,
            status: status_rx,
            shutdown: shutdown.clone(),
            metrics: Arc::clone(&metrics),
        };

        let session = Self {
            config,
            store,
            hazards,
            engine,
            source,
            last_reading: None,
            last_fix_at: None,
            metrics,
            status: status_tx,
            commands: command_rx,
            shutdown,
        };

        Ok((session, handle))
    }

    /// Run until shutdown is requested or every handle is dropped.
    ///
    /// Returns the session counters.
    pub async fn run(mut self) -> TelemetrySnapshot {
        if self.config.start_tracking {
            self.source.enable();
        }
        self.publish();

        loop {
            tokio::select! {
                biased;

                _ = self.shutdown.cancelled() => {
                    debug!("Session shutdown requested");
                    break;
                }

                command = self.commands.recv() => match command {
                    Some(command) => self.handle_command(command),
                    None => {
                        debug!("All session handles dropped");
                        break;
                    }
                },

                reading = self.source.next_reading() => self.handle_reading(reading),
            }
        }

        self.source.disable();
        let summary = self.metrics.snapshot();
        info!(
            readings = summary.total_readings(),
            evaluations = summary.evaluations,
            announcements = summary.announcements,
            "Session stopped"
        );
        summary
    }

    fn handle_reading(&mut self, reading: PositionReading) {
        self.metrics.reading_received(reading.is_known());

        match (&self.last_reading, &reading) {
            (_, PositionReading::Unknown { reason }) => {
                warn!(reason = %reason, "Position reading failed");
            }
            (Some(PositionReading::Unknown { .. }), PositionReading::Known { coordinate, .. }) => {
                info!(position = %coordinate, "Position fix recovered");
            }
            (_, PositionReading::Known { coordinate, .. }) => {
                debug!(position = %coordinate, "Position fix");
            }
        }

        if reading.is_known() {
            self.last_fix_at = Some(Local::now());
        }
        self.last_reading = Some(reading);
        self.reevaluate();
    }

    fn handle_command(&mut self, command: SessionCommand) {
        match command {
            SessionCommand::AddHazard { draft, reply } => {
                let result = self.hazards.add(&draft).map_err(AppError::from);
                if result.is_ok() {
                    self.metrics.hazard_added();
                    self.persist_hazards();
                    self.reevaluate();
                }
                // Receiver may have given up waiting
                let _ = reply.send(result);
            }
            SessionCommand::RemoveHazard { id, reply } => {
                let removed = self.hazards.remove(id);
                if removed.is_some() {
                    self.metrics.hazard_removed();
                    self.persist_hazards();
                    self.reevaluate();
                }
                let _ = reply.send(removed);
            }
            SessionCommand::SetTracking(enabled) => {
                if self.source.set_tracking(enabled) {
                    self.publish();
                }
            }
            SessionCommand::ListHazards { reply } => {
                let _ = reply.send(self.hazards.snapshot());
            }
        }
    }

    /// Save the hazard list. A failure keeps the in-memory change and is
    /// reported through the status.
    fn persist_hazards(&mut self) {
        match storage::save_hazards(self.store.as_ref(), self.hazards.as_slice()) {
            Ok(()) => {
                self.status.send_modify(|status| status.storage_error = None);
            }
            Err(e) => {
                error!(error = %e, "Failed to save hazards");
                self.status
                    .send_modify(|status| status.storage_error = Some(e.to_string()));
            }
        }
    }

    fn reevaluate(&mut self) {
        let evaluation = self
            .engine
            .evaluate(self.last_reading.as_ref(), self.hazards.as_slice());

        self.metrics
            .evaluation_completed(evaluation.active_alert.is_some());
        let failed = evaluation.announce_failures;
        let made = evaluation.announced.len().saturating_sub(failed);
        (0..made).for_each(|_| self.metrics.announcement_made());
        (0..failed).for_each(|_| self.metrics.announcement_failed());

        self.publish();
    }

    fn publish(&self) {
        let tracking = self.source.is_tracking();
        let hazard_count = self.hazards.len();
        let active_alert = self.engine.active_alert().cloned();
        let reading = self.last_reading.clone();
        let last_fix_at = self.last_fix_at;

        self.status.send_modify(|status| {
            status.tracking = tracking;
            status.hazard_count = hazard_count;
            status.active_alert = active_alert;
            status.last_fix_at = last_fix_at;

            match reading {
                Some(PositionReading::Known { coordinate, .. }) => {
                    status.position = Some(coordinate);
                    status.position_error = None;
                }
                Some(PositionReading::Unknown { reason }) => {
                    status.position_error = Some(reason);
                }
                None => {}
            }
        });
    }
}

/// Cloneable control surface for a running [`Session`].
#[derive(Debug, Clone)]
pub struct SessionHandle {
    commands: mpsc::Sender<SessionCommand>,
    status: watch::Receiver<SessionStatus>,
    shutdown: CancellationToken,
    metrics: Arc<SessionMetrics>,
}

impl SessionHandle {
    /// Validate and add a hazard. It is persisted and alerts are re-evaluated.
    pub async fn add_hazard(&self, draft: HazardDraft) -> Result<HazardId, AppError> {
        let (reply, response) = oneshot::channel();
        self.send(SessionCommand::AddHazard { draft, reply }).await?;
        response.await.map_err(|_| AppError::SessionClosed)?
    }

    /// Remove a hazard by id. Returns the removed hazard, if it existed.
    pub async fn remove_hazard(&self, id: HazardId) -> Result<Option<Hazard>, AppError> {
        let (reply, response) = oneshot::channel();
        self.send(SessionCommand::RemoveHazard { id, reply }).await?;
        response.await.map_err(|_| AppError::SessionClosed)
    }

    /// Current hazard list.
    pub async fn hazards(&self) -> Result<HazardSnapshot, AppError> {
        let (reply, response) = oneshot::channel();
        self.send(SessionCommand::ListHazards { reply }).await?;
        response.await.map_err(|_| AppError::SessionClosed)
    }

    /// Turn position tracking on or off.
    pub async fn set_tracking(&self, enabled: bool) -> Result<(), AppError> {
        self.send(SessionCommand::SetTracking(enabled)).await
    }

    /// Latest published status.
    pub fn status(&self) -> SessionStatus {
        self.status.borrow().clone()
    }

    /// A receiver notified on every status change.
    pub fn subscribe(&self) -> watch::Receiver<SessionStatus> {
        self.status.clone()
    }

    /// Current session counters.
    pub fn telemetry(&self) -> TelemetrySnapshot {
        self.metrics.snapshot()
    }

    /// Ask the session loop to stop.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }

    /// Token cancelled when shutdown is requested.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    async fn send(&self, command: SessionCommand) -> Result<(), AppError> {
        self.commands
            .send(command)
            .await
            .map_err(|_| AppError::SessionClosed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::announce::RecordingSink;
    use crate::coord::Coordinate;
    use crate::position::{FixedLocation, NoLocation, ReadingFailure};
    use crate::storage::MemoryStore;
    use std::time::Duration;

    const ORIGIN: Coordinate = Coordinate::new(13.7563, 100.5018);

    fn fast_config() -> AppConfig {
        let mut config = AppConfig::default();
        config.tracking.poll_interval = Duration::from_millis(10);
        config
    }

    fn empty_store() -> Arc<MemoryStore> {
        let store = Arc::new(MemoryStore::new());
        storage::save_hazards(store.as_ref(), &[]).unwrap();
        store
    }

    async fn wait_for<F>(handle: &SessionHandle, mut predicate: F) -> SessionStatus
    where
        F: FnMut(&SessionStatus) -> bool,
    {
        let mut rx = handle.subscribe();
        tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                let status = rx.borrow_and_update().clone();
                if predicate(&status) {
                    return status;
                }
                rx.changed().await.unwrap();
            }
        })
        .await
        .expect("status condition not reached")
    }

    #[tokio::test]
    async fn test_loads_default_hazards() {
        let store = Arc::new(MemoryStore::new());
        let (session, handle) = Session::new(
            AppConfig::default().with_start_tracking(false),
            store,
            Arc::new(NoLocation),
            Arc::new(RecordingSink::new()),
        )
        .unwrap();
        let task = tokio::spawn(session.run());

        let hazards = handle.hazards().await.unwrap();
        assert_eq!(hazards.len(), 1);
        assert_eq!(hazards[0].name, "Construction Zone");

        handle.shutdown();
        task.await.unwrap();
    }

    #[tokio::test]
    async fn test_add_hazard_raises_alert_and_persists() {
        let store = empty_store();
        let sink = Arc::new(RecordingSink::new());
        let (session, handle) = Session::new(
            fast_config(),
            store.clone(),
            Arc::new(FixedLocation::new(ORIGIN)),
            sink.clone(),
        )
        .unwrap();
        let task = tokio::spawn(session.run());

        wait_for(&handle, |s| s.position.is_some()).await;
        assert!(handle.status().active_alert.is_none());

        let near = ORIGIN.offset_by_meters(200.0, 0.0);
        let id = handle
            .add_hazard(HazardDraft::at("Pothole", near))
            .await
            .unwrap();

        let status = wait_for(&handle, |s| s.active_alert.is_some()).await;
        assert_eq!(status.active_alert.unwrap().hazard_id, id);
        assert_eq!(sink.spoken().len(), 1);

        let saved = storage::load_hazards(store.as_ref()).unwrap();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].id, id);

        handle.shutdown();
        let summary = task.await.unwrap();
        assert_eq!(summary.hazards_added, 1);
        assert!(summary.announcements >= 1);
    }

    #[tokio::test]
    async fn test_invalid_hazard_rejected() {
        let (session, handle) = Session::new(
            AppConfig::default().with_start_tracking(false),
            empty_store(),
            Arc::new(NoLocation),
            Arc::new(RecordingSink::new()),
        )
        .unwrap();
        let task = tokio::spawn(session.run());

        let result = handle
            .add_hazard(HazardDraft::new("  ", "13.7", "100.5"))
            .await;
        assert!(matches!(result, Err(AppError::InvalidHazard(_))));
        assert!(handle.hazards().await.unwrap().is_empty());

        handle.shutdown();
        task.await.unwrap();
    }

    #[tokio::test]
    async fn test_remove_active_hazard_clears_alert() {
        let store = empty_store();
        let (session, handle) = Session::new(
            fast_config(),
            store.clone(),
            Arc::new(FixedLocation::new(ORIGIN)),
            Arc::new(RecordingSink::new()),
        )
        .unwrap();
        let task = tokio::spawn(session.run());

        let id = handle
            .add_hazard(HazardDraft::at("Flood", ORIGIN.offset_by_meters(100.0, 0.0)))
            .await
            .unwrap();
        wait_for(&handle, |s| s.active_alert.is_some()).await;

        let removed = handle.remove_hazard(id).await.unwrap();
        assert_eq!(removed.map(|h| h.id), Some(id));
        wait_for(&handle, |s| s.active_alert.is_none()).await;
        assert!(storage::load_hazards(store.as_ref()).unwrap().is_empty());

        assert_eq!(handle.remove_hazard(id).await.unwrap(), None);

        handle.shutdown();
        task.await.unwrap();
    }

    #[tokio::test]
    async fn test_unsupported_host_reports_error() {
        let (session, handle) = Session::new(
            fast_config(),
            empty_store(),
            Arc::new(NoLocation),
            Arc::new(RecordingSink::new()),
        )
        .unwrap();
        let task = tokio::spawn(session.run());

        let status = wait_for(&handle, |s| s.position_error.is_some()).await;
        assert_eq!(status.position_error, Some(ReadingFailure::Unsupported));
        assert!(status.position.is_none());

        handle.shutdown();
        let summary = task.await.unwrap();
        assert_eq!(summary.readings_failed, 1);
    }

    #[tokio::test]
    async fn test_tracking_toggle() {
        let (session, handle) = Session::new(
            fast_config(),
            empty_store(),
            Arc::new(FixedLocation::new(ORIGIN)),
            Arc::new(RecordingSink::new()),
        )
        .unwrap();
        let task = tokio::spawn(session.run());

        wait_for(&handle, |s| s.tracking).await;
        handle.set_tracking(false).await.unwrap();
        wait_for(&handle, |s| !s.tracking).await;
        handle.set_tracking(true).await.unwrap();
        wait_for(&handle, |s| s.tracking).await;

        handle.shutdown();
        task.await.unwrap();
    }

    #[tokio::test]
    async fn test_dropping_handles_stops_session() {
        let (session, handle) = Session::new(
            AppConfig::default().with_start_tracking(false),
            empty_store(),
            Arc::new(NoLocation),
            Arc::new(RecordingSink::new()),
        )
        .unwrap();
        let task = tokio::spawn(session.run());
        drop(handle);

        tokio::time::timeout(Duration::from_secs(5), task)
            .await
            .expect("session did not stop")
            .unwrap();
    }

    #[tokio::test]
    async fn test_commands_fail_after_shutdown() {
        let (session, handle) = Session::new(
            AppConfig::default().with_start_tracking(false),
            empty_store(),
            Arc::new(NoLocation),
            Arc::new(RecordingSink::new()),
        )
        .unwrap();
        let task = tokio::spawn(session.run());
        handle.shutdown();
        task.await.unwrap();

        assert!(matches!(
            handle.hazards().await,
            Err(AppError::SessionClosed)
        ));
    }
}
