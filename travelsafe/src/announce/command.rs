//! Speech through an external text-to-speech program.

use std::process::{Child, Command, Stdio};

use parking_lot::Mutex;

use super::{AnnounceError, AnnouncementSink, SpeechOptions};

/// Words per minute that `espeak` uses at rate 1.0.
const ESPEAK_BASE_WPM: f32 = 175.0;

/// Speaks announcements by spawning a TTS command with the text as its last
/// argument.
///
/// Only one utterance runs at a time: `cancel_current` kills the previous
/// child process. For `espeak`/`espeak-ng` the rate and language are passed
/// as `-s` and `-v`; other programs receive the text only.
#[derive(Debug)]
pub struct CommandSink {
    program: String,
    available: bool,
    current: Mutex<Option<Child>>,
}

impl CommandSink {
    /// Create a sink for `program`, probing whether it can be run.
    pub fn probe(program: impl Into<String>) -> Self {
        let program = program.into();
        let available = Command::new(&program)
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .is_ok();

        if !available {
            tracing::warn!(program = %program, "Speech command not found, voice alerts disabled");
        }

        Self {
            program,
            available,
            current: Mutex::new(None),
        }
    }

    /// The configured program.
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Wait on the last utterance if it has exited, so no zombie is left
    /// behind between announcements.
    ///
    /// Returns `true` when a finished child was collected.
    pub fn reap_finished(&self) -> bool {
        let mut current = self.current.lock();
        let finished = match current.as_mut().map(Child::try_wait) {
            Some(Ok(Some(status))) => {
                tracing::debug!(program = %self.program, %status, "Speech finished");
                true
            }
            Some(Err(e)) => {
                tracing::warn!(program = %self.program, error = %e, "Lost track of speech process");
                true
            }
            Some(Ok(None)) | None => false,
        };
        if finished {
            *current = None;
        }
        finished
    }

    fn is_speaking(&self) -> bool {
        self.current.lock().is_some()
    }

    fn is_espeak(&self) -> bool {
        let base = std::path::Path::new(&self.program)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default();
        base == "espeak" || base == "espeak-ng"
    }

    /// Build the argument list for one utterance.
    fn build_args(&self, text: &str, options: &SpeechOptions) -> Vec<String> {
        let mut args = Vec::new();
        if self.is_espeak() {
            let wpm = (ESPEAK_BASE_WPM * options.rate).round().max(80.0) as u32;
            args.push("-s".to_string());
            args.push(wpm.to_string());
            args.push("-v".to_string());
            args.push(espeak_voice(&options.lang));
        }
        args.push(text.to_string());
        args
    }
}

/// Map a BCP 47 tag to an espeak voice name (`en-US` → `en-us`).
fn espeak_voice(lang: &str) -> String {
    lang.to_ascii_lowercase()
}

impl AnnouncementSink for CommandSink {
    fn is_available(&self) -> bool {
        self.reap_finished();
        self.available
    }

    fn cancel_current(&self) {
        if let Some(mut child) = self.current.lock().take() {
            // Already-finished children report an error here; nothing to do
            let _ = child.kill();
            let _ = child.wait();
        }
    }

    fn speak(&self, text: &str, options: &SpeechOptions) -> Result<(), AnnounceError> {
        if !self.available {
            return Err(AnnounceError::Unavailable);
        }

        // A replaced Child is never waited on by std
        self.cancel_current();

        let child = Command::new(&self.program)
            .args(self.build_args(text, options))
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;

        *self.current.lock() = Some(child);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "command"
    }
}

impl Drop for CommandSink {
    fn drop(&mut self) {
        self.cancel_current();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sink(program: &str) -> CommandSink {
        CommandSink {
            program: program.to_string(),
            available: true,
            current: Mutex::new(None),
        }
    }

    #[test]
    fn test_espeak_args() {
        let args = sink("/usr/bin/espeak-ng").build_args(
            "Warning",
            &SpeechOptions {
                rate: 1.2,
                lang: "en-GB".to_string(),
            },
        );
        assert_eq!(args, vec!["-s", "210", "-v", "en-gb", "Warning"]);
    }

    #[test]
    fn test_other_program_gets_text_only() {
        let args = sink("say").build_args("Warning", &SpeechOptions::default());
        assert_eq!(args, vec!["Warning"]);
    }

    #[test]
    fn test_missing_program_is_unavailable() {
        let sink = CommandSink::probe("definitely-not-a-tts-program-xyz");
        assert!(!sink.is_available());
        assert!(matches!(
            sink.speak("hi", &SpeechOptions::default()),
            Err(AnnounceError::Unavailable)
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_finished_utterance_is_reaped() {
        let sink = sink("true");
        sink.speak("done", &SpeechOptions::default()).unwrap();
        assert!(sink.is_speaking());

        let deadline = std::time::Instant::now() + std::time::Duration::from_secs(5);
        while !sink.reap_finished() {
            assert!(std::time::Instant::now() < deadline, "child never exited");
            std::thread::sleep(std::time::Duration::from_millis(10));
        }
        assert!(!sink.is_speaking());
        assert!(!sink.reap_finished());
    }

    #[cfg(unix)]
    #[test]
    fn test_speak_replaces_previous_utterance() {
        let sink = sink("sleep");
        sink.speak("5", &SpeechOptions::default()).unwrap();
        sink.speak("5", &SpeechOptions::default()).unwrap();
        assert!(sink.is_speaking());
        assert!(!sink.reap_finished());

        sink.cancel_current();
        assert!(!sink.is_speaking());
    }

    #[test]
    fn test_cancel_without_child_is_noop() {
        let sink = sink("espeak");
        sink.cancel_current();
        sink.cancel_current();
    }
}
