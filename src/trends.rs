//! Progress and report shaping over persisted assessment records.

use crate::store::AssessmentRecord;
use serde::Serialize;

/// Number of historical assessments shown in the progress charts.
pub const PROGRESS_WINDOW: usize = 10;

/// Risk score above which a report renders the high-risk badge.
pub const HIGH_RISK_THRESHOLD: f64 = 50.0;

/// One point of the risk-score progress chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressPoint {
    pub name: String,
    pub date: String,
    pub risk_score: f64,
    pub assessment_type: String,
}

/// Shape oldest-first assessments into the progress chart series.
#[must_use]
pub fn progress_series(records: &[AssessmentRecord]) -> Vec<ProgressPoint> {
    records
        .iter()
        .enumerate()
        .map(|(index, record)| ProgressPoint {
            name: format!("Scan {}", index + 1),
            date: record
                .created_at
                .map(|at| at.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            risk_score: record.risk_score,
            assessment_type: record.assessment_type.clone(),
        })
        .collect()
}

/// Whether a report row renders with the high-risk badge.
#[must_use]
pub fn high_risk(score: f64) -> bool {
    score > HIGH_RISK_THRESHOLD
}
