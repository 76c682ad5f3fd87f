//! Persistence contracts for the hosted health-data store.
//!
//! The store is an external collaborator: authoritative, append-only for
//! assessment records, and schema-agnostic beyond the fields modeled here.
//! Callers that need fresh data after an insert reload explicitly; no
//! read-after-write guarantee is assumed.

mod memory;
mod rest;

pub use memory::MemoryStore;
pub use rest::RestStore;

use crate::identity::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Assessment type tag for the four-step risk wizard.
pub const RISK_PREDICTION: &str = "disease_risk_prediction";

/// Assessment type tag for the skin tracker flow.
pub const SKIN_HEALTH: &str = "skin_health";

/// One persisted assessment outcome. Immutable after creation; `created_at`
/// is assigned by the store on insert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentRecord {
    pub user_id: UserId,
    pub assessment_type: String,
    pub risk_score: f64,
    pub data: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// User profile row, upserted by id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: UserId,
    pub full_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Filter/order/limit applied to assessment listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssessmentQuery {
    pub assessment_type: Option<String>,
    pub newest_first: bool,
    pub limit: Option<usize>,
}

impl Default for AssessmentQuery {
    fn default() -> Self {
        Self {
            assessment_type: None,
            newest_first: true,
            limit: None,
        }
    }
}

impl AssessmentQuery {
    /// Oldest-first query for trend charts, bounded to the chart window.
    #[must_use]
    pub fn trend(assessment_type: Option<&str>, limit: usize) -> Self {
        Self {
            assessment_type: assessment_type.map(str::to_string),
            newest_first: false,
            limit: Some(limit),
        }
    }
}

/// Store failure taxonomy: transport-level vs. server-side rejection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The store could not be reached (network, DNS, timeout).
    Unavailable(String),
    /// The store answered but refused the operation.
    Rejected(String),
}

impl StoreError {
    /// Compact label used in logs and notices.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Unavailable(_) => "unavailable",
            Self::Rejected(_) => "rejected",
        }
    }
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unavailable(reason) => write!(f, "store unavailable: {reason}"),
            Self::Rejected(reason) => write!(f, "store rejected request: {reason}"),
        }
    }
}

impl std::error::Error for StoreError {}

/// The three logical operations the app consumes, plus profile readback.
pub trait HealthStore {
    fn upsert_profile(&self, profile: &Profile) -> Result<(), StoreError>;

    fn fetch_profile(&self, user: &UserId) -> Result<Option<Profile>, StoreError>;

    fn insert_assessment(&self, record: &AssessmentRecord) -> Result<(), StoreError>;

    fn list_assessments(
        &self,
        user: &UserId,
        query: &AssessmentQuery,
    ) -> Result<Vec<AssessmentRecord>, StoreError>;
}
