//! Media acquisition seams shared by the capture flows.
//!
//! Camera and microphone hardware are collaborators behind the traits in
//! this module; the capture state machines in [`camera`] and [`recorder`]
//! own the stream lifecycle and guarantee release on every exit path.

pub mod camera;
mod clip;
#[cfg(feature = "mic")]
pub mod mic;
pub mod recorder;

pub use clip::encode_wav_clip;

use serde::Serialize;
use std::env;

/// Mono sample rate every audio capture is normalized to.
pub const TARGET_SAMPLE_RATE: u32 = 16_000;

/// Media failure taxonomy. Access denial is recoverable (upload fallback or
/// blocking notice); anything else is a capture fault.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaError {
    /// Permission refused or device unavailable.
    AccessDenied(String),
    /// Capture started but failed mid-flight.
    Failed(String),
}

impl MediaError {
    /// Compact label used in logs and notices.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::AccessDenied(_) => "access_denied",
            Self::Failed(_) => "failed",
        }
    }
}

impl std::fmt::Display for MediaError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AccessDenied(reason) => write!(f, "media access denied: {reason}"),
            Self::Failed(reason) => write!(f, "media capture failed: {reason}"),
        }
    }
}

impl std::error::Error for MediaError {}

/// Requested video geometry; the device may deliver the closest match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoConstraints {
    pub facing_user: bool,
    pub ideal_width: u32,
    pub ideal_height: u32,
}

impl Default for VideoConstraints {
    fn default() -> Self {
        Self {
            facing_user: true,
            ideal_width: 1280,
            ideal_height: 720,
        }
    }
}

/// Encoded still image (JPEG at the encoder's default quality).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StillImage {
    pub jpeg: Vec<u8>,
}

impl StillImage {
    #[must_use]
    pub fn new(jpeg: Vec<u8>) -> Self {
        Self { jpeg }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.jpeg.is_empty()
    }
}

/// Encoded audio clip (WAV) with its recorded duration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AudioClip {
    pub wav: Vec<u8>,
    pub duration_secs: u64,
}

/// Camera collaborator: opens a live video stream or denies access.
pub trait CameraDevice {
    fn open(&mut self, constraints: &VideoConstraints) -> Result<Box<dyn VideoStream>, MediaError>;
}

/// A live camera stream. `release` must be idempotent and must never fail.
pub trait VideoStream {
    /// Snapshot the current frame into an encoded still image.
    fn snapshot(&mut self) -> Result<StillImage, MediaError>;

    /// Stop the underlying hardware track. Safe to call repeatedly.
    fn release(&mut self);

    fn is_open(&self) -> bool;
}

/// Microphone collaborator: opens a live capture or denies access.
pub trait Microphone {
    fn open(&mut self) -> Result<Box<dyn AudioCapture>, MediaError>;

    /// Active input-device label for diagnostics.
    fn device_name(&self) -> String;
}

/// A live microphone capture. `release` must be idempotent and must never
/// fail.
pub trait AudioCapture {
    /// Mono samples accumulated since the previous drain.
    fn drain(&mut self) -> Vec<f32>;

    fn sample_rate(&self) -> u32;

    /// Stop the underlying hardware track. Safe to call repeatedly.
    fn release(&mut self);

    fn is_open(&self) -> bool;
}

/// Camera stand-in for hosts without video hardware: every open is denied,
/// pushing callers onto the upload fallback.
#[derive(Debug, Default)]
pub struct NoCamera;

impl CameraDevice for NoCamera {
    fn open(&mut self, _constraints: &VideoConstraints) -> Result<Box<dyn VideoStream>, MediaError> {
        Err(MediaError::AccessDenied(
            "no camera attached to this backend".to_string(),
        ))
    }
}

/// Microphone stand-in for hosts without audio capture.
#[derive(Debug, Default)]
pub struct NoMicrophone;

impl Microphone for NoMicrophone {
    fn open(&mut self) -> Result<Box<dyn AudioCapture>, MediaError> {
        Err(MediaError::AccessDenied(
            "no microphone attached to this backend".to_string(),
        ))
    }

    fn device_name(&self) -> String {
        "None".to_string()
    }
}

/// Names of available audio input devices.
///
/// `VITALSCAN_TEST_DEVICES` (comma-separated) overrides real enumeration so
/// device-dependent paths stay testable on machines without microphones.
#[must_use]
pub fn list_input_devices() -> Vec<String> {
    if let Ok(raw) = env::var("VITALSCAN_TEST_DEVICES") {
        return raw
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .collect();
    }
    #[cfg(feature = "mic")]
    {
        mic::input_device_names()
    }
    #[cfg(not(feature = "mic"))]
    {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn media_error_labels_and_display() {
        let denied = MediaError::AccessDenied("no camera".to_string());
        assert_eq!(denied.label(), "access_denied");
        assert_eq!(denied.to_string(), "media access denied: no camera");

        let failed = MediaError::Failed("stream died".to_string());
        assert_eq!(failed.label(), "failed");
        assert_eq!(failed.to_string(), "media capture failed: stream died");
    }

    #[test]
    fn default_constraints_prefer_user_facing_hd() {
        let constraints = VideoConstraints::default();
        assert!(constraints.facing_user);
        assert_eq!(constraints.ideal_width, 1280);
        assert_eq!(constraints.ideal_height, 720);
    }

    #[test]
    fn still_image_emptiness() {
        assert!(StillImage::new(Vec::new()).is_empty());
        assert!(!StillImage::new(vec![0xFF, 0xD8]).is_empty());
    }

    #[test]
    fn test_device_env_overrides_enumeration() {
        env::set_var("VITALSCAN_TEST_DEVICES", "Mic A, Mic B,");
        let devices = list_input_devices();
        env::remove_var("VITALSCAN_TEST_DEVICES");
        assert_eq!(devices, vec!["Mic A".to_string(), "Mic B".to_string()]);
    }
}
