//! Restartable stream of position readings.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use super::{FixRequest, LocationProvider, PositionReading, ReadingFailure};

/// Default oldest cached fix accepted.
pub const DEFAULT_MAX_CACHE_AGE: Duration = Duration::from_secs(5);

/// Default time allowed for one fix attempt.
pub const DEFAULT_FIX_TIMEOUT: Duration = Duration::from_secs(15);

/// Default interval between fix attempts.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Buffered readings between the polling task and the consumer.
const READING_CHANNEL_CAPACITY: usize = 16;

/// Tracking parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackingConfig {
    /// Ask the provider for its most accurate fix.
    pub high_accuracy: bool,
    /// Fixes older than this are reported as stale.
    pub max_cache_age: Duration,
    /// A fix attempt taking longer than this is reported as a timeout.
    pub timeout: Duration,
    /// Delay between fix attempts.
    pub poll_interval: Duration,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            high_accuracy: true,
            max_cache_age: DEFAULT_MAX_CACHE_AGE,
            timeout: DEFAULT_FIX_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

impl TrackingConfig {
    /// The fix request sent to the provider on every attempt.
    pub fn fix_request(&self) -> FixRequest {
        FixRequest {
            high_accuracy: self.high_accuracy,
            max_cache_age: self.max_cache_age,
            timeout: self.timeout,
        }
    }
}

/// One live subscription: the polling task and the receiving end of its
/// channel. Dropping the receiver discards anything still queued.
struct Subscription {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
    readings: mpsc::Receiver<PositionReading>,
}

/// Produces position readings while tracking is enabled.
///
/// # Lifecycle
///
/// ```text
/// Disabled --enable()--> Enabled (one polling task, one channel)
/// Enabled --disable()--> Disabled (task cancelled, queue dropped)
/// ```
///
/// When disabled the source holds no task and no channel. Enabling an
/// enabled source and disabling a disabled one are no-ops, so there is never
/// more than one subscription. [`enable`](Self::enable) spawns onto the
/// current Tokio runtime.
pub struct PositionSource {
    provider: Arc<dyn LocationProvider>,
    config: TrackingConfig,
    subscription: Option<Subscription>,
    subscriptions_started: u64,
}

impl std::fmt::Debug for PositionSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PositionSource")
            .field("provider", &self.provider.name())
            .field("config", &self.config)
            .field("tracking", &self.is_tracking())
            .finish()
    }
}

impl PositionSource {
    /// Create a disabled source over `provider`.
    pub fn new(provider: Arc<dyn LocationProvider>, config: TrackingConfig) -> Self {
        Self {
            provider,
            config,
            subscription: None,
            subscriptions_started: 0,
        }
    }

    /// Whether tracking is enabled.
    pub fn is_tracking(&self) -> bool {
        self.subscription.is_some()
    }

    /// Number of subscriptions started over the source's lifetime.
    pub fn subscriptions_started(&self) -> u64 {
        self.subscriptions_started
    }

    /// Tracking configuration.
    pub fn config(&self) -> &TrackingConfig {
        &self.config
    }

    /// Enable or disable tracking. Returns `true` if the state changed.
    pub fn set_tracking(&mut self, enabled: bool) -> bool {
        if enabled {
            self.enable()
        } else {
            self.disable()
        }
    }

    /// Start tracking. The first fix attempt happens immediately.
    pub fn enable(&mut self) -> bool {
        if self.subscription.is_some() {
            return false;
        }

        let (tx, rx) = mpsc::channel(READING_CHANNEL_CAPACITY);
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(poll_provider(
            Arc::clone(&self.provider),
            self.config.clone(),
            tx,
            cancel.clone(),
        ));

        self.subscriptions_started += 1;
        tracing::info!(
            provider = self.provider.name(),
            subscription = self.subscriptions_started,
            "Position tracking enabled"
        );

        self.subscription = Some(Subscription {
            cancel,
            handle,
            readings: rx,
        });
        true
    }

    /// Stop tracking. No reading produced before this call is delivered after it.
    pub fn disable(&mut self) -> bool {
        let Some(subscription) = self.subscription.take() else {
            return false;
        };

        subscription.cancel.cancel();
        subscription.handle.abort();
        tracing::info!(provider = self.provider.name(), "Position tracking disabled");
        true
    }

    /// Wait for the next reading.
    ///
    /// Never resolves while tracking is disabled or after the provider has
    /// reported a permanent failure, so it can sit in a `select!` loop
    /// unconditionally. Cancel-safe.
    pub async fn next_reading(&mut self) -> PositionReading {
        match self.subscription.as_mut() {
            Some(subscription) => match subscription.readings.recv().await {
                Some(reading) => reading,
                None => std::future::pending().await,
            },
            None => std::future::pending().await,
        }
    }
}

impl Drop for PositionSource {
    fn drop(&mut self) {
        self.disable();
    }
}

/// Polling task body for one subscription.
async fn poll_provider(
    provider: Arc<dyn LocationProvider>,
    config: TrackingConfig,
    tx: mpsc::Sender<PositionReading>,
    cancel: CancellationToken,
) {
    if !provider.is_supported() {
        tracing::warn!(provider = provider.name(), "Location capability not supported");
        let _ = tx
            .send(PositionReading::unknown(ReadingFailure::Unsupported))
            .await;
        return;
    }

    // First tick completes immediately
    let mut interval = tokio::time::interval(config.poll_interval);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let request = config.fix_request();

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = interval.tick() => {}
        }

        let reading = tokio::select! {
            _ = cancel.cancelled() => break,
            reading = attempt_fix(provider.as_ref(), &request) => reading,
        };

        let permanent = reading
            .failure()
            .is_some_and(|reason| !reason.is_recoverable());

        match reading.failure() {
            Some(reason) => tracing::debug!(reason = %reason, "Position reading failed"),
            None => tracing::trace!(?reading, "Position reading"),
        }

        if tx.send(reading).await.is_err() || permanent {
            break;
        }
    }

    tracing::debug!(provider = provider.name(), "Position polling stopped");
}

/// Make one fix attempt, applying the timeout and staleness rules.
async fn attempt_fix(provider: &dyn LocationProvider, request: &FixRequest) -> PositionReading {
    match tokio::time::timeout(request.timeout, provider.current_fix(request)).await {
        Err(_) => PositionReading::unknown(ReadingFailure::Timeout),
        Ok(Err(e)) => PositionReading::unknown(e.into()),
        Ok(Ok(fix)) => {
            let age = fix.timestamp.elapsed();
            if age > request.max_cache_age {
                tracing::debug!(age_ms = age.as_millis() as u64, "Discarding stale fix");
                PositionReading::unknown(ReadingFailure::Stale)
            } else {
                PositionReading::Known {
                    coordinate: fix.coordinate,
                    timestamp: fix.timestamp,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::Coordinate;
    use crate::position::{Fix, FixedLocation, LocationError, NoLocation};
    use futures::future::BoxFuture;
    use parking_lot::Mutex;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Instant;

    const WAIT: Duration = Duration::from_secs(2);

    fn fast_config() -> TrackingConfig {
        TrackingConfig {
            poll_interval: Duration::from_millis(10),
            timeout: Duration::from_millis(50),
            ..Default::default()
        }
    }

    /// Provider that plays back scripted outcomes, then repeats the last one.
    struct ScriptedLocation {
        script: Mutex<VecDeque<Script>>,
        calls: AtomicUsize,
    }

    #[derive(Clone)]
    enum Script {
        Fix(Coordinate),
        StaleFix(Coordinate),
        Fail(LocationError),
        Hang,
    }

    impl ScriptedLocation {
        fn new(script: Vec<Script>) -> Self {
            Self {
                script: Mutex::new(script.into()),
                calls: AtomicUsize::new(0),
            }
        }

        fn next(&self) -> Script {
            let mut script = self.script.lock();
            if script.len() > 1 {
                script.pop_front().unwrap()
            } else {
                script.front().cloned().unwrap()
            }
        }
    }

    impl LocationProvider for ScriptedLocation {
        fn is_supported(&self) -> bool {
            true
        }

        fn current_fix<'a>(
            &'a self,
            _request: &'a FixRequest,
        ) -> BoxFuture<'a, Result<Fix, LocationError>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let step = self.next();
            Box::pin(async move {
                match step {
                    Script::Fix(c) => Ok(Fix::now(c)),
                    Script::StaleFix(c) => Ok(Fix {
                        coordinate: c,
                        timestamp: Instant::now()
                            .checked_sub(Duration::from_secs(60))
                            .unwrap_or_else(Instant::now),
                        accuracy_m: None,
                    }),
                    Script::Fail(e) => Err(e),
                    Script::Hang => {
                        tokio::time::sleep(Duration::from_secs(3600)).await;
                        Err(LocationError::Unavailable("unreachable".into()))
                    }
                }
            })
        }

        fn name(&self) -> &'static str {
            "scripted"
        }
    }

    async fn next(source: &mut PositionSource) -> PositionReading {
        tokio::time::timeout(WAIT, source.next_reading())
            .await
            .expect("reading should arrive")
    }

    #[tokio::test]
    async fn test_disabled_source_is_inert() {
        let mut source = PositionSource::new(
            Arc::new(FixedLocation::new(Coordinate::new(1.0, 2.0))),
            fast_config(),
        );
        assert!(!source.is_tracking());

        let result = tokio::time::timeout(Duration::from_millis(50), source.next_reading()).await;
        assert!(result.is_err(), "disabled source must not produce readings");
    }

    #[tokio::test]
    async fn test_first_reading_is_immediate() {
        let config = TrackingConfig {
            poll_interval: Duration::from_secs(3600),
            ..fast_config()
        };
        let mut source = PositionSource::new(
            Arc::new(FixedLocation::new(Coordinate::new(1.0, 2.0))),
            config,
        );
        source.enable();

        let reading = next(&mut source).await;
        assert_eq!(reading.coordinate(), Some(Coordinate::new(1.0, 2.0)));
    }

    #[tokio::test]
    async fn test_unsupported_is_permanent() {
        let mut source = PositionSource::new(Arc::new(NoLocation), fast_config());
        source.enable();

        let reading = next(&mut source).await;
        assert_eq!(reading.failure(), Some(&ReadingFailure::Unsupported));

        // No further attempts
        let result = tokio::time::timeout(Duration::from_millis(100), source.next_reading()).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_timeout_is_recoverable() {
        let provider = Arc::new(ScriptedLocation::new(vec![
            Script::Hang,
            Script::Fix(Coordinate::new(5.0, 5.0)),
        ]));
        let mut source = PositionSource::new(provider, fast_config());
        source.enable();

        let first = next(&mut source).await;
        assert_eq!(first.failure(), Some(&ReadingFailure::Timeout));

        let second = next(&mut source).await;
        assert_eq!(second.coordinate(), Some(Coordinate::new(5.0, 5.0)));
    }

    #[tokio::test]
    async fn test_transient_error_then_recovery() {
        let provider = Arc::new(ScriptedLocation::new(vec![
            Script::Fail(LocationError::Unavailable("no satellites".into())),
            Script::Fix(Coordinate::new(5.0, 5.0)),
        ]));
        let mut source = PositionSource::new(provider, fast_config());
        source.enable();

        assert_eq!(
            next(&mut source).await.failure(),
            Some(&ReadingFailure::Unavailable("no satellites".into()))
        );
        assert!(next(&mut source).await.is_known());
    }

    #[tokio::test]
    async fn test_stale_fix_rejected() {
        let provider = Arc::new(ScriptedLocation::new(vec![
            Script::StaleFix(Coordinate::new(5.0, 5.0)),
            Script::Fix(Coordinate::new(6.0, 6.0)),
        ]));
        let mut source = PositionSource::new(provider, fast_config());
        source.enable();

        assert_eq!(
            next(&mut source).await.failure(),
            Some(&ReadingFailure::Stale)
        );
        assert_eq!(
            next(&mut source).await.coordinate(),
            Some(Coordinate::new(6.0, 6.0))
        );
    }

    #[tokio::test]
    async fn test_enable_twice_keeps_one_subscription() {
        let mut source = PositionSource::new(
            Arc::new(FixedLocation::new(Coordinate::new(1.0, 2.0))),
            fast_config(),
        );
        assert!(source.enable());
        assert!(!source.enable());
        assert_eq!(source.subscriptions_started(), 1);
    }

    #[tokio::test]
    async fn test_toggle_releases_and_reacquires() {
        let provider = Arc::new(ScriptedLocation::new(vec![Script::Fix(Coordinate::new(
            1.0, 2.0,
        ))]));
        let mut source = PositionSource::new(provider.clone(), fast_config());

        source.set_tracking(true);
        next(&mut source).await;

        assert!(source.set_tracking(false));
        assert!(!source.set_tracking(false), "disable is idempotent");
        assert!(!source.is_tracking());

        // Polling has stopped: the call count settles
        tokio::time::sleep(Duration::from_millis(30)).await;
        let calls_after_disable = provider.calls.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(60)).await;
        assert_eq!(provider.calls.load(Ordering::SeqCst), calls_after_disable);

        let result = tokio::time::timeout(Duration::from_millis(50), source.next_reading()).await;
        assert!(result.is_err(), "no readings after cancellation");

        source.set_tracking(true);
        assert!(next(&mut source).await.is_known());
        assert_eq!(source.subscriptions_started(), 2);
    }
}
