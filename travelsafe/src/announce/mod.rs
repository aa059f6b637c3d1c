//! Announcement sinks for audible hazard warnings.
//!
//! The alert engine depends on the [`AnnouncementSink`] trait rather than any
//! concrete speech backend. A sink owns the no-overlap discipline: the engine
//! always calls [`AnnouncementSink::cancel_current`] before
//! [`AnnouncementSink::speak`], and each implementation decides what cancel
//! means for it.
//!
//! # Implementors
//!
//! - [`CommandSink`] - speaks through an external TTS program (e.g. `espeak`)
//! - [`LogSink`] - writes announcements to the log only
//! - [`SilentSink`] - a host with no speech capability
//! - [`RecordingSink`] - records announcements in memory (tests, dry runs)

mod command;

pub use command::CommandSink;

use parking_lot::Mutex;
use thiserror::Error;

/// Default speaking rate (1.0 = normal speed).
pub const DEFAULT_SPEECH_RATE: f32 = 1.0;

/// Default speech language tag.
pub const DEFAULT_SPEECH_LANG: &str = "en-US";

/// Voice parameters for an announcement.
#[derive(Debug, Clone, PartialEq)]
pub struct SpeechOptions {
    /// Speaking rate multiplier (1.0 = normal).
    pub rate: f32,
    /// BCP 47 language tag.
    pub lang: String,
}

impl Default for SpeechOptions {
    fn default() -> Self {
        Self {
            rate: DEFAULT_SPEECH_RATE,
            lang: DEFAULT_SPEECH_LANG.to_string(),
        }
    }
}

/// Errors reported by a sink. The alert engine logs and drops these.
#[derive(Debug, Error)]
pub enum AnnounceError {
    /// The host has no speech capability.
    #[error("Speech capability unavailable")]
    Unavailable,

    /// The speech backend failed to start.
    #[error("Failed to start speech: {0}")]
    SpawnFailed(#[from] std::io::Error),
}

/// Speech capability used by the alert engine.
pub trait AnnouncementSink: Send + Sync {
    /// Whether the host can speak at all.
    fn is_available(&self) -> bool;

    /// Stop any announcement currently in progress.
    fn cancel_current(&self);

    /// Start speaking `text`. Returns once the announcement has started.
    fn speak(&self, text: &str, options: &SpeechOptions) -> Result<(), AnnounceError>;

    /// Short name for logs.
    fn name(&self) -> &'static str;
}

/// Sink that only logs announcements.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl AnnouncementSink for LogSink {
    fn is_available(&self) -> bool {
        true
    }

    fn cancel_current(&self) {}

    fn speak(&self, text: &str, options: &SpeechOptions) -> Result<(), AnnounceError> {
        tracing::warn!(rate = options.rate, lang = %options.lang, "{}", text);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "log"
    }
}

/// Sink for a host without any speech capability.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentSink;

impl AnnouncementSink for SilentSink {
    fn is_available(&self) -> bool {
        false
    }

    fn cancel_current(&self) {}

    fn speak(&self, _text: &str, _options: &SpeechOptions) -> Result<(), AnnounceError> {
        Err(AnnounceError::Unavailable)
    }

    fn name(&self) -> &'static str {
        "silent"
    }
}

/// Sink that records every call, for tests and dry runs.
#[derive(Debug, Default)]
pub struct RecordingSink {
    spoken: Mutex<Vec<String>>,
    cancels: Mutex<usize>,
}

impl RecordingSink {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Texts spoken so far, oldest first.
    pub fn spoken(&self) -> Vec<String> {
        self.spoken.lock().clone()
    }

    /// Number of `cancel_current` calls.
    pub fn cancel_count(&self) -> usize {
        *self.cancels.lock()
    }

    /// Forget everything recorded so far.
    pub fn clear(&self) {
        self.spoken.lock().clear();
        *self.cancels.lock() = 0;
    }
}

impl AnnouncementSink for RecordingSink {
    fn is_available(&self) -> bool {
        true
    }

    fn cancel_current(&self) {
        *self.cancels.lock() += 1;
    }

    fn speak(&self, text: &str, _options: &SpeechOptions) -> Result<(), AnnounceError> {
        self.spoken.lock().push(text.to_string());
        Ok(())
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}
