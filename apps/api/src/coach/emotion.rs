//! Emotion classification — one deterministic LLM call, then a parse-or-fallback
//! boundary that maps free-text model output onto the closed label set.
//!
//! The model is asked for one word but nothing enforces it. Anything that cannot
//! be read as exactly one known label becomes `Emotion::Unknown`; the raw text is
//! kept on the reading so callers can show what the model actually said.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::coach::prompts::EMOTION_TEMPLATE;
use crate::errors::AppError;
use crate::llm_client::prompts::TemplateRegistry;
use crate::llm_client::CompletionBackend;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Emotion {
    Anxiety,
    Confusion,
    Motivation,
    Confidence,
    Fear,
    Sadness,
    Excitement,
    /// Model output did not name exactly one known label.
    Unknown,
}

impl Emotion {
    /// The seven labels the classifier may return.
    pub const KNOWN: [Emotion; 7] = [
        Emotion::Anxiety,
        Emotion::Confusion,
        Emotion::Motivation,
        Emotion::Confidence,
        Emotion::Fear,
        Emotion::Sadness,
        Emotion::Excitement,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Emotion::Anxiety => "Anxiety",
            Emotion::Confusion => "Confusion",
            Emotion::Motivation => "Motivation",
            Emotion::Confidence => "Confidence",
            Emotion::Fear => "Fear",
            Emotion::Sadness => "Sadness",
            Emotion::Excitement => "Excitement",
            Emotion::Unknown => "Unknown",
        }
    }

    /// Normalizes raw classifier output.
    ///
    /// 1. Trimmed of whitespace, quotes and punctuation, compared case-insensitively.
    /// 2. Failing that, the output is split into words; if exactly one distinct
    ///    known label appears among them, that label wins.
    /// 3. Otherwise `Unknown`.
    pub fn parse_label(raw: &str) -> Emotion {
        let cleaned = raw.trim().trim_matches(|c: char| !c.is_alphanumeric());
        if let Some(exact) = Self::match_word(cleaned) {
            return exact;
        }

        let mut found: Vec<Emotion> = cleaned
            .split(|c: char| !c.is_alphanumeric())
            .filter_map(Self::match_word)
            .collect();
        found.sort_by_key(|e| e.as_str());
        found.dedup();

        match found.as_slice() {
            [single] => *single,
            _ => Emotion::Unknown,
        }
    }

    fn match_word(word: &str) -> Option<Emotion> {
        Self::KNOWN
            .iter()
            .copied()
            .find(|e| e.as_str().eq_ignore_ascii_case(word))
    }
}

impl fmt::Display for Emotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the support reply should sound for a detected emotion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    Calming,
    Supportive,
    StepByStep,
    Energetic,
    Celebratory,
    Neutral,
}

/// Maps an emotion to the reply tone. Mirrors the rules written into the
/// revision-2 support persona.
pub fn tone_for(emotion: Emotion) -> Tone {
    match emotion {
        Emotion::Anxiety | Emotion::Fear => Tone::Calming,
        Emotion::Sadness => Tone::Supportive,
        Emotion::Confusion => Tone::StepByStep,
        Emotion::Motivation | Emotion::Confidence => Tone::Energetic,
        Emotion::Excitement => Tone::Celebratory,
        Emotion::Unknown => Tone::Neutral,
    }
}

/// Result of one classification call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmotionReading {
    pub label: Emotion,
    /// Model output, trimmed but otherwise verbatim.
    pub raw: String,
}

/// Classifies the dominant emotion of `user_text` with a single LLM call.
pub async fn detect_emotion(
    user_text: &str,
    llm: &dyn CompletionBackend,
    templates: &TemplateRegistry,
) -> Result<EmotionReading, AppError> {
    let template = templates
        .latest(EMOTION_TEMPLATE)
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("emotion template not registered")))?;
    let request = template.render(&[("user_text", user_text)]);

    let output = llm
        .complete(&request)
        .await
        .map_err(|e| AppError::Llm(format!("Emotion detection failed: {e}")))?;

    let raw = output.trim().to_string();
    let label = Emotion::parse_label(&raw);
    if label == Emotion::Unknown {
        warn!("Classifier output {raw:?} is not a known emotion, using Unknown");
    } else {
        info!("Detected emotion: {label}");
    }

    Ok(EmotionReading { label, raw })
}
