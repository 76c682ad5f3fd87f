//! Photo capture state machine over the camera collaborator.
//!
//! One session per capture widget. The only hard invariant: no hardware
//! stream outlives the `Active` phase or the session itself, and at most one
//! stream is open at any instant.

use super::{CameraDevice, MediaError, StillImage, VideoConstraints, VideoStream};
use tracing::debug;

/// Capture widget phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapturePhase {
    Idle,
    Active,
    Captured,
}

impl CapturePhase {
    /// Compact label used in logs and errors.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Active => "active",
            Self::Captured => "captured",
        }
    }
}

/// Per-widget camera capture session.
pub struct CameraSession {
    phase: CapturePhase,
    stream: Option<Box<dyn VideoStream>>,
    image: Option<StillImage>,
    confirmed: bool,
}

impl CameraSession {
    #[must_use]
    pub fn new() -> Self {
        Self {
            phase: CapturePhase::Idle,
            stream: None,
            image: None,
            confirmed: false,
        }
    }

    #[must_use]
    pub fn phase(&self) -> CapturePhase {
        self.phase
    }

    /// The captured-but-not-yet-confirmed image, if any.
    #[must_use]
    pub fn image(&self) -> Option<&StillImage> {
        self.image.as_ref()
    }

    #[must_use]
    pub fn has_open_stream(&self) -> bool {
        self.stream.as_ref().is_some_and(|s| s.is_open())
    }

    /// Open the camera and go live. Valid from `Idle`, and from `Captured`
    /// as the retake path. On access denial the session stays where it was
    /// so the caller can fall back to upload.
    pub fn start(
        &mut self,
        camera: &mut dyn CameraDevice,
        constraints: &VideoConstraints,
    ) -> Result<(), MediaError> {
        if self.phase == CapturePhase::Active {
            return Err(MediaError::Failed("camera is already live".to_string()));
        }
        let stream = camera.open(constraints)?;
        self.stream = Some(stream);
        self.image = None;
        self.confirmed = false;
        self.phase = CapturePhase::Active;
        debug!(phase = self.phase.label(), "camera session live");
        Ok(())
    }

    /// Snapshot the live stream, release the hardware, and hold the frame
    /// for confirm/retake.
    pub fn capture(&mut self) -> Result<&StillImage, MediaError> {
        if self.phase != CapturePhase::Active {
            return Err(MediaError::Failed(format!(
                "cannot capture while {}",
                self.phase.label()
            )));
        }
        let stream = self
            .stream
            .as_mut()
            .ok_or_else(|| MediaError::Failed("no live stream".to_string()))?;
        let image = stream.snapshot()?;
        self.release_stream();
        self.image = Some(image);
        self.phase = CapturePhase::Captured;
        self.image
            .as_ref()
            .ok_or_else(|| MediaError::Failed("snapshot vanished".to_string()))
    }

    /// Discard the held frame and go live again.
    pub fn retake(
        &mut self,
        camera: &mut dyn CameraDevice,
        constraints: &VideoConstraints,
    ) -> Result<(), MediaError> {
        if self.phase != CapturePhase::Captured {
            return Err(MediaError::Failed(format!(
                "cannot retake while {}",
                self.phase.label()
            )));
        }
        self.start(camera, constraints)
    }

    /// Hardware-free fallback: accept an already-encoded image file.
    /// Valid only from `Idle`.
    pub fn upload(&mut self, image: StillImage) -> Result<(), MediaError> {
        if self.phase != CapturePhase::Idle {
            return Err(MediaError::Failed(format!(
                "cannot upload while {}",
                self.phase.label()
            )));
        }
        self.image = Some(image);
        self.confirmed = false;
        self.phase = CapturePhase::Captured;
        Ok(())
    }

    /// Hand the held frame to the caller. One-shot: a second confirm on the
    /// same frame is refused.
    pub fn confirm(&mut self) -> Result<StillImage, MediaError> {
        if self.phase != CapturePhase::Captured {
            return Err(MediaError::Failed(format!(
                "cannot confirm while {}",
                self.phase.label()
            )));
        }
        if self.confirmed {
            return Err(MediaError::Failed("photo already confirmed".to_string()));
        }
        let image = self
            .image
            .clone()
            .ok_or_else(|| MediaError::Failed("no captured photo".to_string()))?;
        self.confirmed = true;
        Ok(image)
    }

    /// Explicit reset back to `Idle`, releasing any live stream.
    pub fn reset(&mut self) {
        self.release_stream();
        self.image = None;
        self.confirmed = false;
        self.phase = CapturePhase::Idle;
    }

    /// Widget unmount: the stream must not survive this call.
    pub fn teardown(&mut self) {
        self.release_stream();
    }

    fn release_stream(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            stream.release();
        }
    }
}

impl Default for CameraSession {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for CameraSession {
    fn drop(&mut self) {
        self.release_stream();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Clone, Default)]
    struct StreamProbe {
        open: Arc<AtomicBool>,
        hardware_stops: Arc<AtomicUsize>,
    }

    impl StreamProbe {
        fn open_count(&self) -> usize {
            usize::from(self.open.load(Ordering::SeqCst))
        }

        fn stops(&self) -> usize {
            self.hardware_stops.load(Ordering::SeqCst)
        }
    }

    struct FakeStream {
        probe: StreamProbe,
        snapshot_fails: bool,
    }

    impl VideoStream for FakeStream {
        fn snapshot(&mut self) -> Result<StillImage, MediaError> {
            if self.snapshot_fails {
                return Err(MediaError::Failed("frame grab failed".to_string()));
            }
            Ok(StillImage::new(vec![0xFF, 0xD8, 0xFF]))
        }

        fn release(&mut self) {
            // Idempotent: the hardware track is stopped at most once.
            if self.probe.open.swap(false, Ordering::SeqCst) {
                self.probe.hardware_stops.fetch_add(1, Ordering::SeqCst);
            }
        }

        fn is_open(&self) -> bool {
            self.probe.open.load(Ordering::SeqCst)
        }
    }

    #[derive(Default)]
    struct FakeCamera {
        deny: bool,
        snapshot_fails: bool,
        probes: Vec<StreamProbe>,
    }

    impl FakeCamera {
        fn open_streams(&self) -> usize {
            self.probes.iter().map(StreamProbe::open_count).sum()
        }
    }

    impl CameraDevice for FakeCamera {
        fn open(&mut self, _constraints: &VideoConstraints) -> Result<Box<dyn VideoStream>, MediaError> {
            if self.deny {
                return Err(MediaError::AccessDenied("permission refused".to_string()));
            }
            let probe = StreamProbe::default();
            probe.open.store(true, Ordering::SeqCst);
            self.probes.push(probe.clone());
            Ok(Box::new(FakeStream {
                probe,
                snapshot_fails: self.snapshot_fails,
            }))
        }
    }

    #[test]
    fn denied_access_keeps_session_idle() {
        let mut camera = FakeCamera {
            deny: true,
            ..FakeCamera::default()
        };
        let mut session = CameraSession::new();
        let err = session
            .start(&mut camera, &VideoConstraints::default())
            .expect_err("denied open should fail");
        assert_eq!(err.label(), "access_denied");
        assert_eq!(session.phase(), CapturePhase::Idle);
        assert!(!session.has_open_stream());
    }

    #[test]
    fn capture_releases_stream_and_holds_frame() {
        let mut camera = FakeCamera::default();
        let mut session = CameraSession::new();
        session
            .start(&mut camera, &VideoConstraints::default())
            .expect("start");
        assert_eq!(session.phase(), CapturePhase::Active);
        assert_eq!(camera.open_streams(), 1);

        session.capture().expect("capture");
        assert_eq!(session.phase(), CapturePhase::Captured);
        assert_eq!(camera.open_streams(), 0);
        assert!(session.image().is_some());
    }

    #[test]
    fn at_most_one_stream_across_full_lifecycle() {
        let mut camera = FakeCamera::default();
        let mut session = CameraSession::new();
        let constraints = VideoConstraints::default();

        session.start(&mut camera, &constraints).expect("start");
        assert_eq!(camera.open_streams(), 1);
        session.capture().expect("capture");
        session.retake(&mut camera, &constraints).expect("retake");
        assert_eq!(camera.open_streams(), 1, "retake reopens exactly one");
        session.capture().expect("capture again");
        let image = session.confirm().expect("confirm");
        assert!(!image.is_empty());
        session.teardown();
        assert_eq!(camera.open_streams(), 0);

        // Every opened stream was stopped exactly once.
        for probe in &camera.probes {
            assert_eq!(probe.stops(), 1);
        }
    }

    #[test]
    fn confirm_is_one_shot() {
        let mut camera = FakeCamera::default();
        let mut session = CameraSession::new();
        session
            .start(&mut camera, &VideoConstraints::default())
            .expect("start");
        session.capture().expect("capture");
        session.confirm().expect("first confirm");
        let err = session.confirm().expect_err("second confirm refused");
        assert_eq!(err.label(), "failed");
    }

    #[test]
    fn upload_bypasses_hardware_entirely() {
        let mut session = CameraSession::new();
        session
            .upload(StillImage::new(vec![1, 2, 3]))
            .expect("upload");
        assert_eq!(session.phase(), CapturePhase::Captured);
        assert!(!session.has_open_stream());
        let image = session.confirm().expect("confirm upload");
        assert_eq!(image.jpeg, vec![1, 2, 3]);
    }

    #[test]
    fn upload_is_refused_while_live() {
        let mut camera = FakeCamera::default();
        let mut session = CameraSession::new();
        session
            .start(&mut camera, &VideoConstraints::default())
            .expect("start");
        let err = session
            .upload(StillImage::new(vec![1]))
            .expect_err("upload while live");
        assert_eq!(err.label(), "failed");
        assert_eq!(session.phase(), CapturePhase::Active);
    }

    #[test]
    fn start_while_live_is_refused() {
        let mut camera = FakeCamera::default();
        let mut session = CameraSession::new();
        let constraints = VideoConstraints::default();
        session.start(&mut camera, &constraints).expect("start");
        assert!(session.start(&mut camera, &constraints).is_err());
        assert_eq!(camera.open_streams(), 1);
    }

    #[test]
    fn snapshot_failure_keeps_stream_for_retry() {
        let mut camera = FakeCamera {
            snapshot_fails: true,
            ..FakeCamera::default()
        };
        let mut session = CameraSession::new();
        session
            .start(&mut camera, &VideoConstraints::default())
            .expect("start");
        assert!(session.capture().is_err());
        assert_eq!(session.phase(), CapturePhase::Active);
        assert!(session.has_open_stream());

        session.teardown();
        assert_eq!(camera.open_streams(), 0);
    }

    #[test]
    fn reset_and_teardown_are_idempotent() {
        let mut camera = FakeCamera::default();
        let mut session = CameraSession::new();
        session
            .start(&mut camera, &VideoConstraints::default())
            .expect("start");
        session.reset();
        session.reset();
        session.teardown();
        assert_eq!(session.phase(), CapturePhase::Idle);
        assert_eq!(camera.probes[0].stops(), 1);
    }

    #[test]
    fn drop_releases_live_stream() {
        let mut camera = FakeCamera::default();
        {
            let mut session = CameraSession::new();
            session
                .start(&mut camera, &VideoConstraints::default())
                .expect("start");
        }
        assert_eq!(camera.open_streams(), 0);
        assert_eq!(camera.probes[0].stops(), 1);
    }
}
