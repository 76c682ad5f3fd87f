//! Canned-response health assistant.
//!
//! First keyword contained in the lowercased input wins; anything else gets
//! the fixed fallback pointing at the supported topics.

use serde::Serialize;

/// Opening message shown when the assistant panel opens.
pub const GREETING: &str = "Hi! I'm your health assistant. How can I help you today?";

/// Reply used when no keyword matches.
pub const FALLBACK: &str = "I can help with questions about sleep, dark circles, dehydration, \
stress, diet, and exercise. What would you like to know?";

const RESPONSES: [(&str, &str); 6] = [
    (
        "sleep",
        "Aim for 7-8 hours of quality sleep each night. Maintain a consistent sleep schedule \
         and create a relaxing bedtime routine.",
    ),
    (
        "dark circles",
        "Dark circles can form due to lack of sleep, dehydration, or genetics. Try getting \
         more rest, staying hydrated, and using a cold compress.",
    ),
    (
        "dehydration",
        "Dehydration occurs when you don't drink enough water. Aim for 8-10 glasses daily \
         and increase intake during exercise.",
    ),
    (
        "stress",
        "Manage stress through regular exercise, meditation, deep breathing, and maintaining \
         a healthy work-life balance.",
    ),
    (
        "diet",
        "A balanced diet includes fruits, vegetables, whole grains, lean proteins, and \
         healthy fats. Limit processed foods and sugar.",
    ),
    (
        "exercise",
        "Aim for at least 150 minutes of moderate exercise per week. Include cardio, \
         strength training, and flexibility exercises.",
    ),
];

/// Pick the canned reply for a user message.
#[must_use]
pub fn reply(input: &str) -> &'static str {
    let lowered = input.to_lowercase();
    for (keyword, response) in &RESPONSES {
        if lowered.contains(keyword) {
            return response;
        }
    }
    FALLBACK
}

/// Who authored a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatRole {
    User,
    Bot,
}

/// One transcript entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub text: String,
}

/// Assistant transcript, seeded with the greeting.
#[derive(Debug, Clone)]
pub struct ChatLog {
    messages: Vec<ChatMessage>,
}

impl ChatLog {
    #[must_use]
    pub fn new() -> Self {
        Self {
            messages: vec![ChatMessage {
                role: ChatRole::Bot,
                text: GREETING.to_string(),
            }],
        }
    }

    /// Append a user message and the assistant's reply. Blank input is
    /// ignored and produces no reply.
    pub fn send(&mut self, input: &str) -> Option<&'static str> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return None;
        }
        self.messages.push(ChatMessage {
            role: ChatRole::User,
            text: trimmed.to_string(),
        });
        let response = reply(trimmed);
        self.messages.push(ChatMessage {
            role: ChatRole::Bot,
            text: response.to_string(),
        });
        Some(response)
    }

    #[must_use]
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }
}

impl Default for ChatLog {
    fn default() -> Self {
        Self::new()
    }
}
