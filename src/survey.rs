//! Lifestyle survey collector with a fixed question set and clamped answers.
//!
//! Updates are synchronous: every slider change lands in the aggregate
//! mapping immediately, clamped to the question's declared bounds. The
//! mapping is always fully populated; untouched questions sit at their
//! declared minimum.

use serde_json::{json, Value};
use std::collections::BTreeMap;
use tracing::warn;

/// One bounded-integer survey question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Question {
    pub id: &'static str,
    pub label: &'static str,
    pub min: u32,
    pub max: u32,
    pub unit: &'static str,
}

/// The fixed question set. No identifier may be added or removed at runtime.
pub const QUESTIONS: [Question; 6] = [
    Question {
        id: "sleep",
        label: "Sleep Quality (hours per night)",
        min: 0,
        max: 12,
        unit: "hours",
    },
    Question {
        id: "exercise",
        label: "Exercise Frequency (days per week)",
        min: 0,
        max: 7,
        unit: "days",
    },
    Question {
        id: "stress",
        label: "Stress Level",
        min: 0,
        max: 10,
        unit: "",
    },
    Question {
        id: "water",
        label: "Water Intake (glasses per day)",
        min: 0,
        max: 15,
        unit: "glasses",
    },
    Question {
        id: "smoking",
        label: "Smoking (cigarettes per day)",
        min: 0,
        max: 40,
        unit: "cigarettes",
    },
    Question {
        id: "alcohol",
        label: "Alcohol Consumption (drinks per week)",
        min: 0,
        max: 20,
        unit: "drinks",
    },
];

/// Look up a question by identifier.
#[must_use]
pub fn question(id: &str) -> Option<&'static Question> {
    QUESTIONS.iter().find(|q| q.id == id)
}

/// Fully-populated answer mapping for the fixed question set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurveyAnswers {
    values: BTreeMap<&'static str, u32>,
}

impl SurveyAnswers {
    /// All questions at their declared minimum.
    #[must_use]
    pub fn new() -> Self {
        let values = QUESTIONS.iter().map(|q| (q.id, q.min)).collect();
        Self { values }
    }

    /// Set an answer, clamped to the question's `[min, max]`. Unknown
    /// identifiers are ignored; the question set is fixed.
    pub fn set(&mut self, id: &str, value: u32) {
        let Some(question) = question(id) else {
            warn!(id, "ignoring answer for unknown survey question");
            return;
        };
        let clamped = value.clamp(question.min, question.max);
        self.values.insert(question.id, clamped);
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<u32> {
        self.values.get(id).copied()
    }

    /// Number of answered questions; always the full question count.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Answers as a JSON object keyed by question id.
    #[must_use]
    pub fn to_json(&self) -> Value {
        let mut object = serde_json::Map::new();
        for (id, value) in &self.values {
            object.insert((*id).to_string(), json!(value));
        }
        Value::Object(object)
    }
}

impl Default for SurveyAnswers {
    fn default() -> Self {
        Self::new()
    }
}
