//! Skin tracker flow: single-photo mock analysis and trend shaping.
//!
//! Like the risk wizard's scoring, the metric draws ignore the photo
//! content; the photo argument only witnesses that a scan was captured.

use crate::media::StillImage;
use crate::store::AssessmentRecord;
use rand::Rng;
use serde::Serialize;
use std::ops::Range;

/// Draw range for the dark-circles metric.
pub const DARK_CIRCLES_RANGE: Range<u32> = 20..60;

/// Draw range for the dehydration metric.
pub const DEHYDRATION_RANGE: Range<u32> = 15..50;

/// Draw range for the redness metric.
pub const REDNESS_RANGE: Range<u32> = 10..40;

/// Draw range for the fatigue metric.
pub const FATIGUE_RANGE: Range<u32> = 20..65;

/// Number of historical scans shown in the trend chart.
pub const TREND_WINDOW: usize = 10;

/// One skin scan outcome persisted as the assessment payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkinAnalysis {
    pub dark_circles: u32,
    pub dehydration: u32,
    pub redness: u32,
    pub fatigue: u32,
    pub insights: Vec<String>,
}

impl SkinAnalysis {
    /// Overall scan score: the mean of the four metrics.
    #[must_use]
    pub fn risk_score(&self) -> f64 {
        f64::from(self.dark_circles + self.dehydration + self.redness + self.fatigue) / 4.0
    }
}

/// Whether a metric renders with the high-severity badge.
#[must_use]
pub fn metric_is_high(value: u32) -> bool {
    value > 50
}

/// Run the mock skin analysis over one captured photo.
pub fn analyze_skin(_photo: &StillImage, rng: &mut impl Rng) -> SkinAnalysis {
    SkinAnalysis {
        dark_circles: rng.gen_range(DARK_CIRCLES_RANGE),
        dehydration: rng.gen_range(DEHYDRATION_RANGE),
        redness: rng.gen_range(REDNESS_RANGE),
        fatigue: rng.gen_range(FATIGUE_RANGE),
        insights: vec![
            "Dark circles have improved compared to last scan".to_string(),
            "Slight dehydration detected - increase water intake".to_string(),
            "Skin appears well-rested".to_string(),
        ],
    }
}

/// One point of the skin trend chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkinTrendPoint {
    pub name: String,
    pub date: String,
    pub dark_circles: u32,
    pub dehydration: u32,
    pub redness: u32,
    pub fatigue: u32,
}

/// Shape oldest-first skin assessments into the trend chart series.
/// Metrics missing from a payload default to zero.
#[must_use]
pub fn trend_series(records: &[AssessmentRecord]) -> Vec<SkinTrendPoint> {
    records
        .iter()
        .enumerate()
        .map(|(index, record)| {
            let metric = |key: &str| {
                record
                    .data
                    .get(key)
                    .and_then(serde_json::Value::as_u64)
                    .unwrap_or(0) as u32
            };
            SkinTrendPoint {
                name: format!("Scan {}", index + 1),
                date: record
                    .created_at
                    .map(|at| at.format("%Y-%m-%d").to_string())
                    .unwrap_or_default(),
                dark_circles: metric("darkCircles"),
                dehydration: metric("dehydration"),
                redness: metric("redness"),
                fatigue: metric("fatigue"),
            }
        })
        .collect()
}
