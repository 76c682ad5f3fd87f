//! Voice recording state machine with a hard duration ceiling.
//!
//! The session owns a cancellable 1-second tick deadline instead of a
//! detached timer: the session loop passes `now` into [`RecorderSession::tick`]
//! and the deadline is cleared on every exit transition, so a stale tick can
//! never fire after the capture is released.

use super::{encode_wav_clip, AudioCapture, AudioClip, MediaError, Microphone};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Hard ceiling on recorded duration.
pub const MAX_CLIP_SECS: u64 = 15;

/// Granularity of the recording progress tick.
pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Recorder widget phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecorderPhase {
    Idle,
    Recording,
    Recorded,
}

impl RecorderPhase {
    /// Compact label used in logs and errors.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Recording => "recording",
            Self::Recorded => "recorded",
        }
    }
}

/// Why a recording stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopCause {
    /// User pressed stop.
    Manual,
    /// The 15-second ceiling was reached.
    Ceiling,
}

impl StopCause {
    /// Compact label used in logs and notices.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Manual => "manual",
            Self::Ceiling => "ceiling",
        }
    }
}

/// Per-widget voice recording session.
pub struct RecorderSession {
    phase: RecorderPhase,
    capture: Option<Box<dyn AudioCapture>>,
    samples: Vec<f32>,
    sample_rate: u32,
    elapsed_secs: u64,
    next_tick_at: Option<Instant>,
    clip: Option<AudioClip>,
    confirmed: bool,
}

impl RecorderSession {
    #[must_use]
    pub fn new() -> Self {
        Self {
            phase: RecorderPhase::Idle,
            capture: None,
            samples: Vec::new(),
            sample_rate: super::TARGET_SAMPLE_RATE,
            elapsed_secs: 0,
            next_tick_at: None,
            clip: None,
            confirmed: false,
        }
    }

    #[must_use]
    pub fn phase(&self) -> RecorderPhase {
        self.phase
    }

    /// Whole seconds recorded so far; never exceeds [`MAX_CLIP_SECS`].
    #[must_use]
    pub fn elapsed_secs(&self) -> u64 {
        self.elapsed_secs
    }

    /// The finished clip awaiting confirm, if any.
    #[must_use]
    pub fn clip(&self) -> Option<&AudioClip> {
        self.clip.as_ref()
    }

    #[must_use]
    pub fn has_open_capture(&self) -> bool {
        self.capture.as_ref().is_some_and(|c| c.is_open())
    }

    /// Open the microphone and start recording. Valid from `Idle`, and from
    /// `Recorded` as the re-record path. On access denial the session stays
    /// where it was and the caller surfaces a blocking notice.
    pub fn start(&mut self, mic: &mut dyn Microphone, now: Instant) -> Result<(), MediaError> {
        if self.phase == RecorderPhase::Recording {
            return Err(MediaError::Failed("already recording".to_string()));
        }
        let capture = mic.open()?;
        self.sample_rate = capture.sample_rate();
        self.capture = Some(capture);
        self.samples.clear();
        self.clip = None;
        self.confirmed = false;
        self.elapsed_secs = 0;
        self.next_tick_at = Some(now + TICK_INTERVAL);
        self.phase = RecorderPhase::Recording;
        debug!(sample_rate = self.sample_rate, "voice recording started");
        Ok(())
    }

    /// Advance the recording clock. Returns `Some(StopCause::Ceiling)` the
    /// single time the ceiling fires; the auto-stop cannot race a manual
    /// stop because both paths go through the same one-shot transition.
    pub fn tick(&mut self, now: Instant) -> Option<StopCause> {
        if self.phase != RecorderPhase::Recording {
            return None;
        }
        if let Some(capture) = self.capture.as_mut() {
            self.samples.extend(capture.drain());
        }
        while let Some(deadline) = self.next_tick_at {
            if now < deadline {
                break;
            }
            self.elapsed_secs += 1;
            self.next_tick_at = Some(deadline + TICK_INTERVAL);
            if self.elapsed_secs >= MAX_CLIP_SECS {
                self.finish_recording(StopCause::Ceiling);
                return Some(StopCause::Ceiling);
            }
        }
        None
    }

    /// User-initiated stop. A no-op when nothing is recording, so stopping
    /// an already-stopped session is safe.
    pub fn stop(&mut self) -> Option<StopCause> {
        if self.phase != RecorderPhase::Recording {
            return None;
        }
        self.finish_recording(StopCause::Manual);
        Some(StopCause::Manual)
    }

    /// Hand the finished clip to the caller. One-shot per recording.
    pub fn confirm(&mut self) -> Result<AudioClip, MediaError> {
        if self.phase != RecorderPhase::Recorded {
            return Err(MediaError::Failed(format!(
                "cannot confirm while {}",
                self.phase.label()
            )));
        }
        if self.confirmed {
            return Err(MediaError::Failed("recording already confirmed".to_string()));
        }
        let clip = self
            .clip
            .clone()
            .ok_or_else(|| MediaError::Failed("no finished clip".to_string()))?;
        self.confirmed = true;
        Ok(clip)
    }

    /// Explicit reset back to `Idle`, releasing any live capture.
    pub fn reset(&mut self) {
        self.release_capture();
        self.next_tick_at = None;
        self.samples.clear();
        self.clip = None;
        self.confirmed = false;
        self.elapsed_secs = 0;
        self.phase = RecorderPhase::Idle;
    }

    /// Widget unmount: the capture and its tick must not survive this call.
    pub fn teardown(&mut self) {
        self.release_capture();
        self.next_tick_at = None;
    }

    fn finish_recording(&mut self, cause: StopCause) {
        if let Some(capture) = self.capture.as_mut() {
            self.samples.extend(capture.drain());
        }
        self.release_capture();
        self.next_tick_at = None;
        self.elapsed_secs = self.elapsed_secs.min(MAX_CLIP_SECS);
        match encode_wav_clip(&self.samples, self.sample_rate) {
            Ok(wav) => {
                self.clip = Some(AudioClip {
                    wav,
                    duration_secs: self.elapsed_secs,
                });
            }
            Err(err) => {
                warn!(cause = cause.label(), error = %err, "clip encoding failed");
                self.clip = None;
            }
        }
        self.phase = RecorderPhase::Recorded;
        debug!(
            cause = cause.label(),
            secs = self.elapsed_secs,
            "voice recording stopped"
        );
    }

    fn release_capture(&mut self) {
        if let Some(mut capture) = self.capture.take() {
            capture.release();
        }
    }
}

impl Default for RecorderSession {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for RecorderSession {
    fn drop(&mut self) {
        self.release_capture();
        self.next_tick_at = None;
    }
}
