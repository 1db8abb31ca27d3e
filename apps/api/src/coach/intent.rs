//! Intent routing — decides whether a message asks for a career roadmap.
//!
//! Matching is a plain substring test on the lowercased message, not a token
//! match. "how to start" inside "how to start feeling better" still routes to
//! `Roadmap`. This imprecision is accepted; tests pin it so a change is deliberate.

use serde::{Deserialize, Serialize};

/// Phrases that route a message to the roadmap generator.
pub const ROADMAP_KEYWORDS: &[&str] = &[
    "roadmap",
    "career path",
    "career plan",
    "how do i become",
    "how to become",
    "how can i become",
    "how do i start",
    "how to start",
    "guide me",
    "learning path",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Roadmap,
    EmotionalSupport,
}

/// Routes raw user text to an intent. Pure and infallible.
pub fn route_intent(text: &str) -> Intent {
    let lowered = text.to_lowercase();
    if ROADMAP_KEYWORDS.iter().any(|k| lowered.contains(k)) {
        Intent::Roadmap
    } else {
        Intent::EmotionalSupport
    }
}
