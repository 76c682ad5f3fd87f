//! Typed JSON IPC protocol between the session backend and UI clients.
//!
//! Messages are newline-delimited JSON. Commands carry a `"cmd"` tag,
//! events an `"event"` tag, both snake_cased for type discrimination.

use crate::notice::Severity;
use crate::skin::SkinTrendPoint;
use crate::store::AssessmentRecord;
use crate::trends::ProgressPoint;
use serde::{Deserialize, Serialize};

/// Commands accepted from the UI client (client → backend).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum IpcCommand {
    /// Acknowledge the one-time data-use disclosure.
    AcceptConsent,
    /// Attempt the wizard's forward transition.
    Advance,
    /// Step the wizard backward.
    Back,
    /// Go live with the camera for the face-photo step.
    StartCamera,
    /// Snapshot the live camera stream.
    CapturePhoto,
    /// Discard the held frame and go live again.
    RetakePhoto,
    /// Hand the held frame to the wizard.
    ConfirmPhoto,
    /// Hardware-free fallback: load an encoded image from disk.
    UploadPhoto { path: String },
    /// Open the microphone and start recording.
    StartRecording,
    /// Stop the running recording.
    StopRecording,
    /// Discard the finished recording and return to idle.
    ResetRecording,
    /// Hand the finished clip to the wizard.
    ConfirmRecording,
    /// Set one survey answer.
    SetAnswer { id: String, value: u32 },
    /// Ask the canned-response assistant.
    Chat { text: String },
    /// Analyze the held photo as a skin scan and persist the outcome.
    ConfirmSkinScan,
    /// List the skin trend chart series.
    ListSkinTrends,
    /// Upsert the signed-in user's profile.
    SaveProfile {
        full_name: String,
        age: Option<u32>,
        gender: Option<String>,
    },
    /// List the signed-in user's assessment records, newest first.
    ListReports,
    /// List the risk-score progress chart series.
    ListProgress,
    /// Pick today's dashboard tip.
    DailyTip,
    /// Request a PDF report of an assessment.
    DownloadReport,
    /// Identity push: a user signed in.
    SignIn { user_id: String },
    /// Identity push: the user signed out.
    SignOut,
    /// Request a graceful shutdown.
    Exit,
}

/// Events emitted by the backend (backend → client).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum IpcEvent {
    /// Sent once on startup with runtime capability information.
    Capabilities {
        version: String,
        mic_available: bool,
        input_device: Option<String>,
        store_backend: String,
        signed_in: bool,
        steps: Vec<String>,
    },

    /// Transient user feedback with severity.
    Notice { severity: Severity, message: String },

    /// The wizard moved to a new step.
    StepChanged {
        step: usize,
        title: String,
        progress_percent: f32,
    },

    /// The camera capture widget changed phase.
    CapturePhase { phase: String },

    /// The voice recorder widget changed phase.
    RecorderPhase { phase: String },

    /// One second of recording elapsed.
    RecordingTick { elapsed_secs: u64, max_secs: u64 },

    /// Scoring finished and the assessment record was persisted.
    Results {
        total_risk_score: u32,
        risk_level: String,
        payload: serde_json::Value,
    },

    /// Scoring finished for a skin scan and the record was persisted.
    SkinResults {
        risk_score: f64,
        payload: serde_json::Value,
    },

    /// Skin metric series for the trend chart.
    SkinTrends { points: Vec<SkinTrendPoint> },

    /// Assessment records for the reports panel.
    Records {
        count: usize,
        records: Vec<AssessmentRecord>,
    },

    /// Risk-score series for the progress chart.
    Progress { points: Vec<ProgressPoint> },

    /// Today's dashboard tip.
    Tip { topic: String, text: String },

    /// Assistant reply.
    ChatReply { text: String },

    /// Profile upsert succeeded.
    ProfileSaved,

    /// The session identity disappeared; the client should show sign-in.
    SignedOut,

    /// Command-level failure.
    Error { message: String, recoverable: bool },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commands_deserialize_from_tagged_json() {
        let cmd: IpcCommand =
            serde_json::from_str(r#"{"cmd":"set_answer","id":"sleep","value":7}"#)
                .expect("parse set_answer");
        assert_eq!(
            cmd,
            IpcCommand::SetAnswer {
                id: "sleep".to_string(),
                value: 7
            }
        );

        let cmd: IpcCommand =
            serde_json::from_str(r#"{"cmd":"accept_consent"}"#).expect("parse accept_consent");
        assert_eq!(cmd, IpcCommand::AcceptConsent);

        let cmd: IpcCommand = serde_json::from_str(r#"{"cmd":"upload_photo","path":"/tmp/f.jpg"}"#)
            .expect("parse upload_photo");
        assert_eq!(
            cmd,
            IpcCommand::UploadPhoto {
                path: "/tmp/f.jpg".to_string()
            }
        );

        let cmd: IpcCommand =
            serde_json::from_str(r#"{"cmd":"confirm_skin_scan"}"#).expect("parse confirm_skin_scan");
        assert_eq!(cmd, IpcCommand::ConfirmSkinScan);

        let cmd: IpcCommand =
            serde_json::from_str(r#"{"cmd":"download_report"}"#).expect("parse download_report");
        assert_eq!(cmd, IpcCommand::DownloadReport);
    }

    #[test]
    fn command_round_trip_preserves_payload() {
        let original = IpcCommand::SaveProfile {
            full_name: "Ada".to_string(),
            age: Some(34),
            gender: None,
        };
        let json = serde_json::to_string(&original).expect("serialize");
        let parsed: IpcCommand = serde_json::from_str(&json).expect("parse");
        assert_eq!(parsed, original);
    }

    #[test]
    fn events_carry_snake_case_tags() {
        let event = IpcEvent::RecordingTick {
            elapsed_secs: 3,
            max_secs: 15,
        };
        let json = serde_json::to_value(&event).expect("serialize");
        assert_eq!(json["event"], "recording_tick");
        assert_eq!(json["elapsed_secs"], 3);

        let event = IpcEvent::Notice {
            severity: crate::notice::Severity::Warning,
            message: "careful".to_string(),
        };
        let json = serde_json::to_value(&event).expect("serialize");
        assert_eq!(json["event"], "notice");
        assert_eq!(json["severity"], "warning");
    }
}
