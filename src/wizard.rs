//! Four-step assessment wizard: face photo, voice sample, lifestyle survey,
//! results.
//!
//! Step transitions are decided by the pure [`plan_advance`] guard over
//! [`WizardState`]; the [`Wizard`] wrapper runs the scoring and persistence
//! side effects around it. Collected artifacts are cached across `back()`
//! so forward navigation never re-collects them.

use crate::identity::UserId;
use crate::media::{AudioClip, StillImage};
use crate::scoring::{self, Analysis};
use crate::store::{AssessmentRecord, HealthStore, StoreError, RISK_PREDICTION};
use crate::survey::SurveyAnswers;
use rand::Rng;
use tracing::{debug, warn};

/// Step titles, in order.
pub const STEPS: [&str; 4] = [
    "Face Analysis",
    "Voice Analysis",
    "Lifestyle Survey",
    "Results",
];

/// Index of the terminal results step.
pub const RESULTS_STEP: usize = 3;

/// One-time data-use disclosure gate. Not persisted: every freshly entered
/// wizard starts at `Pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Consent {
    #[default]
    Pending,
    Accepted,
}

/// Wizard-local state, one per run.
#[derive(Debug, Clone, Default)]
pub struct WizardState {
    pub step: usize,
    pub consent: Consent,
    pub face_image: Option<StillImage>,
    pub voice_clip: Option<AudioClip>,
    pub answers: SurveyAnswers,
    pub results: Option<Analysis>,
}

/// Why a transition was refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WizardError {
    ConsentPending,
    MissingFacePhoto,
    MissingVoiceClip,
    AlreadyComplete,
    Persistence(StoreError),
}

impl WizardError {
    /// Compact label used in logs.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::ConsentPending => "consent_pending",
            Self::MissingFacePhoto => "missing_face_photo",
            Self::MissingVoiceClip => "missing_voice_clip",
            Self::AlreadyComplete => "already_complete",
            Self::Persistence(_) => "persistence",
        }
    }
}

impl std::fmt::Display for WizardError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ConsentPending => write!(f, "Please review and accept the data-use disclosure"),
            Self::MissingFacePhoto => write!(f, "Please capture a face photo"),
            Self::MissingVoiceClip => write!(f, "Please record a voice sample"),
            Self::AlreadyComplete => write!(f, "Assessment is already complete"),
            Self::Persistence(err) => write!(f, "Saving your assessment failed: {err}"),
        }
    }
}

impl std::error::Error for WizardError {}

/// What `advance()` must do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvanceAction {
    /// Move forward one step.
    Move,
    /// Run scoring and persistence, then land on the results step.
    RunAnalysis,
}

/// Pure transition guard: decide the next action from state alone.
pub fn plan_advance(state: &WizardState) -> Result<AdvanceAction, WizardError> {
    if state.consent == Consent::Pending {
        return Err(WizardError::ConsentPending);
    }
    match state.step {
        0 => match &state.face_image {
            Some(image) if !image.is_empty() => Ok(AdvanceAction::Move),
            _ => Err(WizardError::MissingFacePhoto),
        },
        1 => match &state.voice_clip {
            Some(_) => Ok(AdvanceAction::Move),
            None => Err(WizardError::MissingVoiceClip),
        },
        2 => {
            // Survey answers are always fully populated; re-check the
            // earlier artifacts since scoring consumes them.
            match &state.face_image {
                Some(image) if !image.is_empty() => {}
                _ => return Err(WizardError::MissingFacePhoto),
            }
            if state.voice_clip.is_none() {
                return Err(WizardError::MissingVoiceClip);
            }
            Ok(AdvanceAction::RunAnalysis)
        }
        _ => Err(WizardError::AlreadyComplete),
    }
}

/// The assessment orchestrator.
#[derive(Debug, Default)]
pub struct Wizard {
    state: WizardState,
}

impl Wizard {
    /// A freshly entered wizard: step 0, consent pending, nothing collected.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn state(&self) -> &WizardState {
        &self.state
    }

    #[must_use]
    pub fn step(&self) -> usize {
        self.state.step
    }

    #[must_use]
    pub fn step_title(&self) -> &'static str {
        STEPS[self.state.step.min(RESULTS_STEP)]
    }

    /// Wizard progress for the header bar, as a percentage.
    #[must_use]
    pub fn progress_percent(&self) -> f32 {
        ((self.state.step + 1) as f32 / STEPS.len() as f32) * 100.0
    }

    #[must_use]
    pub fn consent(&self) -> Consent {
        self.state.consent
    }

    /// Acknowledge the data-use disclosure, unlocking the wizard.
    pub fn accept_consent(&mut self) {
        self.state.consent = Consent::Accepted;
    }

    pub fn set_face_image(&mut self, image: StillImage) {
        self.state.face_image = Some(image);
    }

    pub fn set_voice_clip(&mut self, clip: AudioClip) {
        self.state.voice_clip = Some(clip);
    }

    pub fn set_answer(&mut self, id: &str, value: u32) {
        self.state.answers.set(id, value);
    }

    /// Attempt the forward transition. On the survey step this runs the
    /// analysis and persists the assessment record; the step only advances
    /// once the record is stored.
    pub fn advance(
        &mut self,
        store: &dyn HealthStore,
        user: &UserId,
        rng: &mut impl Rng,
    ) -> Result<usize, WizardError> {
        match plan_advance(&self.state)? {
            AdvanceAction::Move => {
                self.state.step += 1;
                debug!(step = self.state.step, "wizard advanced");
                Ok(self.state.step)
            }
            AdvanceAction::RunAnalysis => {
                let face = self
                    .state
                    .face_image
                    .as_ref()
                    .ok_or(WizardError::MissingFacePhoto)?;
                let voice = self
                    .state
                    .voice_clip
                    .as_ref()
                    .ok_or(WizardError::MissingVoiceClip)?;
                let analysis = scoring::analyze(face, voice, &self.state.answers, rng);

                let payload = serde_json::to_value(&analysis).map_err(|err| {
                    WizardError::Persistence(StoreError::Rejected(format!("payload: {err}")))
                })?;
                let record = AssessmentRecord {
                    user_id: user.clone(),
                    assessment_type: RISK_PREDICTION.to_string(),
                    risk_score: f64::from(analysis.total_risk_score),
                    data: payload,
                    created_at: None,
                };
                if let Err(err) = store.insert_assessment(&record) {
                    warn!(error = %err, "assessment persistence failed");
                    return Err(WizardError::Persistence(err));
                }

                self.state.results = Some(analysis);
                self.state.step = RESULTS_STEP;
                debug!(step = self.state.step, "wizard completed");
                Ok(self.state.step)
            }
        }
    }

    /// Step backward, floor-clamped at 0. No collected state is discarded.
    pub fn back(&mut self) {
        self.state.step = self.state.step.saturating_sub(1);
    }

    /// Abandon the run entirely, e.g. when the identity disappears
    /// mid-flow. Nothing collected survives; consent returns to `Pending`.
    pub fn reset(&mut self) {
        self.state = WizardState::default();
    }
}
