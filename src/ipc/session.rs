//! Session loop orchestrating capture, wizard, and store over IPC.
//!
//! Single-threaded and event-driven: commands arrive on a channel, events
//! leave on a channel, and every loop iteration ticks the recorder clock,
//! the notice center, and the identity watch. Hardware and store calls are
//! collaborator traits injected at construction.

use super::protocol::{IpcCommand, IpcEvent};
use crate::chat::ChatLog;
use crate::identity::{SessionChange, SessionFeed, SessionWatch, UserId};
use crate::media::camera::CameraSession;
use crate::media::recorder::{RecorderSession, StopCause, MAX_CLIP_SECS};
use crate::media::{CameraDevice, MediaError, Microphone, StillImage, VideoConstraints};
use crate::notice::{NoticeCenter, Severity};
use crate::scoring::RiskLevel;
use crate::skin::{self, TREND_WINDOW};
use crate::store::{AssessmentQuery, AssessmentRecord, HealthStore, Profile, SKIN_HEALTH};
use crate::tips;
use crate::trends::{self, PROGRESS_WINDOW};
use crate::wizard::{Consent, Wizard, RESULTS_STEP};
use anyhow::Result;
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use std::fs;
use std::time::{Duration, Instant};
use tracing::debug;

const LOOP_WAIT_MS: u64 = 50;

/// Collaborators and runtime facts injected into a session.
pub struct SessionDeps {
    pub store: Box<dyn HealthStore>,
    pub camera: Box<dyn CameraDevice>,
    pub microphone: Box<dyn Microphone>,
    pub events: Sender<IpcEvent>,
    pub mic_available: bool,
    pub input_device: Option<String>,
    pub store_backend: String,
}

/// One connected client session.
pub struct Session {
    deps: SessionDeps,
    wizard: Wizard,
    camera_session: CameraSession,
    recorder: RecorderSession,
    chat: ChatLog,
    notices: NoticeCenter,
    watch: SessionWatch,
    feed: SessionFeed,
    last_reported_secs: u64,
    exit_requested: bool,
}

impl Session {
    #[must_use]
    pub fn new(deps: SessionDeps, initial_user: Option<UserId>) -> Self {
        let (feed, watch) = SessionWatch::channel(initial_user);
        Self {
            deps,
            wizard: Wizard::new(),
            camera_session: CameraSession::new(),
            recorder: RecorderSession::new(),
            chat: ChatLog::new(),
            notices: NoticeCenter::new(),
            watch,
            feed,
            last_reported_secs: 0,
            exit_requested: false,
        }
    }

    /// Identity feed for external auth pushes.
    #[must_use]
    pub fn session_feed(&self) -> SessionFeed {
        self.feed.clone()
    }

    #[must_use]
    pub fn wizard(&self) -> &Wizard {
        &self.wizard
    }

    /// Emit the startup capabilities event.
    pub fn emit_capabilities(&self) {
        self.send(IpcEvent::Capabilities {
            version: env!("CARGO_PKG_VERSION").to_string(),
            mic_available: self.deps.mic_available,
            input_device: self.deps.input_device.clone(),
            store_backend: self.deps.store_backend.clone(),
            signed_in: self.watch.is_signed_in(),
            steps: crate::wizard::STEPS.iter().map(|s| (*s).to_string()).collect(),
        });
    }

    /// Run until the command channel closes or the client asks to exit.
    /// `max_loops` bounds test runs.
    pub fn run(&mut self, commands: &Receiver<IpcCommand>, max_loops: Option<u64>) -> Result<()> {
        self.emit_capabilities();
        let mut loop_count: u64 = 0;
        loop {
            loop_count += 1;
            if let Some(limit) = max_loops {
                if loop_count > limit {
                    debug!("session loop reached test limit, exiting");
                    break;
                }
            }

            match commands.recv_timeout(Duration::from_millis(LOOP_WAIT_MS)) {
                Ok(cmd) => self.handle_command(cmd, Instant::now()),
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => {
                    debug!("command channel disconnected, exiting");
                    break;
                }
            }

            self.tick(Instant::now());

            if self.exit_requested {
                debug!("session exit requested");
                break;
            }
        }
        self.teardown();
        Ok(())
    }

    /// Apply one client command.
    pub fn handle_command(&mut self, cmd: IpcCommand, now: Instant) {
        match cmd {
            IpcCommand::AcceptConsent => {
                self.wizard.accept_consent();
                self.emit_step();
            }
            IpcCommand::Advance => self.handle_advance(now),
            IpcCommand::Back => {
                self.wizard.back();
                self.emit_step();
            }
            IpcCommand::StartCamera => {
                let constraints = VideoConstraints::default();
                let outcome = self
                    .camera_session
                    .start(self.deps.camera.as_mut(), &constraints);
                match outcome {
                    Ok(()) => self.emit_camera_phase(),
                    Err(MediaError::AccessDenied(_)) => self.notify(
                        Severity::Warning,
                        "Camera not accessible. Please enable permissions or upload an image instead.",
                        now,
                    ),
                    Err(err) => self.notify(Severity::Error, err.to_string(), now),
                }
            }
            IpcCommand::CapturePhoto => match self.camera_session.capture() {
                Ok(_) => self.emit_camera_phase(),
                Err(err) => self.notify(Severity::Error, err.to_string(), now),
            },
            IpcCommand::RetakePhoto => {
                let constraints = VideoConstraints::default();
                let outcome = self
                    .camera_session
                    .retake(self.deps.camera.as_mut(), &constraints);
                match outcome {
                    Ok(()) => self.emit_camera_phase(),
                    Err(err) => self.notify(Severity::Error, err.to_string(), now),
                }
            }
            IpcCommand::ConfirmPhoto => match self.camera_session.confirm() {
                Ok(image) => {
                    self.wizard.set_face_image(image);
                    self.notify(Severity::Success, "Photo captured successfully!", now);
                }
                Err(err) => self.notify(Severity::Error, err.to_string(), now),
            },
            IpcCommand::UploadPhoto { path } => match fs::read(&path) {
                Ok(bytes) => match self.camera_session.upload(StillImage::new(bytes)) {
                    Ok(()) => self.emit_camera_phase(),
                    Err(err) => self.notify(Severity::Error, err.to_string(), now),
                },
                Err(err) => self.notify(
                    Severity::Error,
                    format!("Could not read image file: {err}"),
                    now,
                ),
            },
            IpcCommand::StartRecording => {
                let outcome = self.recorder.start(self.deps.microphone.as_mut(), now);
                match outcome {
                    Ok(()) => {
                        self.last_reported_secs = 0;
                        self.emit_recorder_phase();
                        self.send(IpcEvent::RecordingTick {
                            elapsed_secs: 0,
                            max_secs: MAX_CLIP_SECS,
                        });
                    }
                    Err(MediaError::AccessDenied(_)) => self.notify(
                        Severity::Error,
                        "Microphone access denied. Please allow microphone permissions.",
                        now,
                    ),
                    Err(err) => self.notify(Severity::Error, err.to_string(), now),
                }
            }
            IpcCommand::StopRecording => {
                if self.recorder.stop().is_some() {
                    self.emit_recorder_phase();
                }
            }
            IpcCommand::ResetRecording => {
                self.recorder.reset();
                self.emit_recorder_phase();
            }
            IpcCommand::ConfirmRecording => match self.recorder.confirm() {
                Ok(clip) => {
                    self.wizard.set_voice_clip(clip);
                    self.notify(Severity::Success, "Voice recording saved!", now);
                }
                Err(err) => self.notify(Severity::Error, err.to_string(), now),
            },
            IpcCommand::SetAnswer { id, value } => {
                self.wizard.set_answer(&id, value);
            }
            IpcCommand::Chat { text } => {
                if let Some(reply) = self.chat.send(&text) {
                    self.send(IpcEvent::ChatReply {
                        text: reply.to_string(),
                    });
                }
            }
            IpcCommand::ConfirmSkinScan => self.handle_skin_scan(now),
            IpcCommand::ListSkinTrends => self.handle_list_skin_trends(),
            IpcCommand::SaveProfile {
                full_name,
                age,
                gender,
            } => self.handle_save_profile(full_name, age, gender, now),
            IpcCommand::ListReports => self.handle_list_reports(),
            IpcCommand::ListProgress => self.handle_list_progress(),
            IpcCommand::DailyTip => {
                let tip = tips::daily_tip(&mut rand::thread_rng());
                self.send(IpcEvent::Tip {
                    topic: tip.topic.to_string(),
                    text: tip.text.to_string(),
                });
            }
            IpcCommand::DownloadReport => {
                // PDF generation is not implemented yet; acknowledge only.
                self.notify(Severity::Success, "Generating PDF report...", now);
            }
            IpcCommand::SignIn { user_id } => {
                self.feed.signed_in(UserId(user_id));
            }
            IpcCommand::SignOut => {
                self.feed.signed_out();
            }
            IpcCommand::Exit => {
                self.exit_requested = true;
            }
        }
    }

    /// One loop iteration of timer-driven work.
    pub fn tick(&mut self, now: Instant) {
        match self.watch.drain() {
            Some(SessionChange::SignedOut) => self.handle_signed_out(now),
            Some(SessionChange::SignedIn(user)) => {
                self.notify(
                    Severity::Success,
                    format!("Signed in as {}", user.as_str()),
                    now,
                );
            }
            None => {}
        }

        if let Some(StopCause::Ceiling) = self.recorder.tick(now) {
            self.notify(
                Severity::Info,
                format!("Recording stopped at the {MAX_CLIP_SECS} second limit"),
                now,
            );
            self.emit_recorder_phase();
        }
        let elapsed = self.recorder.elapsed_secs();
        if elapsed != self.last_reported_secs {
            self.last_reported_secs = elapsed;
            self.send(IpcEvent::RecordingTick {
                elapsed_secs: elapsed,
                max_secs: MAX_CLIP_SECS,
            });
        }

        self.notices.tick(now);
    }

    /// Deterministic release of all open hardware handles.
    pub fn teardown(&mut self) {
        self.camera_session.teardown();
        self.recorder.teardown();
    }

    fn handle_advance(&mut self, now: Instant) {
        let Some(user) = self.watch.current().cloned() else {
            self.send(IpcEvent::SignedOut);
            self.send(IpcEvent::Error {
                message: "Sign in required".to_string(),
                recoverable: true,
            });
            return;
        };
        let mut rng = rand::thread_rng();
        match self.wizard.advance(self.deps.store.as_ref(), &user, &mut rng) {
            Ok(step) => {
                self.emit_step();
                if step == RESULTS_STEP {
                    if let Some(analysis) = &self.wizard.state().results {
                        let payload = serde_json::to_value(analysis).unwrap_or_default();
                        self.send(IpcEvent::Results {
                            total_risk_score: analysis.total_risk_score,
                            risk_level: RiskLevel::classify(analysis.total_risk_score)
                                .label()
                                .to_string(),
                            payload,
                        });
                    }
                }
            }
            Err(err) => self.notify(Severity::Error, err.to_string(), now),
        }
    }

    fn handle_save_profile(
        &mut self,
        full_name: String,
        age: Option<u32>,
        gender: Option<String>,
        now: Instant,
    ) {
        let Some(user) = self.watch.current().cloned() else {
            self.send(IpcEvent::SignedOut);
            return;
        };
        if let Some(age) = age {
            if !(1..=120).contains(&age) {
                self.notify(Severity::Error, "Age must be between 1 and 120", now);
                return;
            }
        }
        let profile = Profile {
            id: user,
            full_name,
            age,
            gender,
            updated_at: None,
        };
        match self.deps.store.upsert_profile(&profile) {
            Ok(()) => {
                self.send(IpcEvent::ProfileSaved);
                self.notify(Severity::Success, "Profile updated successfully!", now);
            }
            Err(err) => self.notify(Severity::Error, err.to_string(), now),
        }
    }

    fn handle_skin_scan(&mut self, now: Instant) {
        let Some(user) = self.watch.current().cloned() else {
            self.send(IpcEvent::SignedOut);
            return;
        };
        if self.wizard.consent() == Consent::Pending {
            self.notify(
                Severity::Error,
                "Please review and accept the data-use disclosure",
                now,
            );
            return;
        }
        let photo = match self.camera_session.confirm() {
            Ok(photo) => photo,
            Err(err) => {
                self.notify(Severity::Error, err.to_string(), now);
                return;
            }
        };
        let analysis = skin::analyze_skin(&photo, &mut rand::thread_rng());
        let payload = match serde_json::to_value(&analysis) {
            Ok(payload) => payload,
            Err(err) => {
                self.notify(Severity::Error, format!("Skin analysis payload: {err}"), now);
                return;
            }
        };
        let record = AssessmentRecord {
            user_id: user,
            assessment_type: SKIN_HEALTH.to_string(),
            risk_score: analysis.risk_score(),
            data: payload.clone(),
            created_at: None,
        };
        if let Err(err) = self.deps.store.insert_assessment(&record) {
            self.notify(Severity::Error, format!("Saving your skin scan failed: {err}"), now);
            return;
        }
        self.notify(Severity::Success, "Skin analysis complete!", now);
        self.send(IpcEvent::SkinResults {
            risk_score: analysis.risk_score(),
            payload,
        });
        // The history panel reloads after every insert; the store gives no
        // read-after-write guarantee beyond an explicit query.
        self.handle_list_skin_trends();
    }

    fn handle_list_skin_trends(&mut self) {
        let Some(user) = self.watch.current().cloned() else {
            self.send(IpcEvent::SignedOut);
            return;
        };
        let query = AssessmentQuery::trend(Some(SKIN_HEALTH), TREND_WINDOW);
        match self.deps.store.list_assessments(&user, &query) {
            Ok(records) => self.send(IpcEvent::SkinTrends {
                points: skin::trend_series(&records),
            }),
            Err(err) => self.send(IpcEvent::Error {
                message: err.to_string(),
                recoverable: true,
            }),
        }
    }

    fn handle_list_progress(&mut self) {
        let Some(user) = self.watch.current().cloned() else {
            self.send(IpcEvent::SignedOut);
            return;
        };
        let query = AssessmentQuery::trend(None, PROGRESS_WINDOW);
        match self.deps.store.list_assessments(&user, &query) {
            Ok(records) => self.send(IpcEvent::Progress {
                points: trends::progress_series(&records),
            }),
            Err(err) => self.send(IpcEvent::Error {
                message: err.to_string(),
                recoverable: true,
            }),
        }
    }

    fn handle_list_reports(&mut self) {
        let Some(user) = self.watch.current().cloned() else {
            self.send(IpcEvent::SignedOut);
            return;
        };
        match self
            .deps
            .store
            .list_assessments(&user, &AssessmentQuery::default())
        {
            Ok(records) => self.send(IpcEvent::Records {
                count: records.len(),
                records,
            }),
            Err(err) => self.send(IpcEvent::Error {
                message: err.to_string(),
                recoverable: true,
            }),
        }
    }

    fn handle_signed_out(&mut self, now: Instant) {
        // Identity vanished mid-flow: drop in-progress artifacts, release
        // hardware, and send the client back to sign-in.
        self.camera_session.reset();
        self.recorder.reset();
        self.wizard.reset();
        self.send(IpcEvent::SignedOut);
        self.notify(Severity::Warning, "Session ended. Please sign in again.", now);
    }

    fn emit_step(&self) {
        self.send(IpcEvent::StepChanged {
            step: self.wizard.step(),
            title: self.wizard.step_title().to_string(),
            progress_percent: self.wizard.progress_percent(),
        });
    }

    fn emit_camera_phase(&self) {
        self.send(IpcEvent::CapturePhase {
            phase: self.camera_session.phase().label().to_string(),
        });
    }

    fn emit_recorder_phase(&self) {
        self.send(IpcEvent::RecorderPhase {
            phase: self.recorder.phase().label().to_string(),
        });
    }

    fn notify(&mut self, severity: Severity, message: impl Into<String>, now: Instant) {
        let message = message.into();
        self.notices.push(severity, message.clone(), now);
        self.send(IpcEvent::Notice { severity, message });
    }

    fn send(&self, event: IpcEvent) {
        let _ = self.deps.events.send(event);
    }
}
