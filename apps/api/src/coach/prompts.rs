// All LLM prompt templates for the coaching pipeline.
// Revision 1 is the original short-form prompt set; revision 2 asks for long,
// phase-structured roadmaps and emotion-specific tone. Selected via PROMPT_REVISION.

use crate::llm_client::prompts::{PromptTemplate, TemplateRegistry};

pub const EMOTION_TEMPLATE: &str = "emotion";
pub const ROADMAP_TEMPLATE: &str = "roadmap";
pub const SUPPORT_TEMPLATE: &str = "support";

/// Emotion classification prompt. Replace `{user_text}` before sending.
pub const EMOTION_PROMPT: &str = "Analyze the user's message and detect the MAIN emotion.
Possible emotions:
Anxiety, Confusion, Motivation, Confidence, Fear, Sadness, Excitement
Return ONLY the emotion name, as exactly one word.
Message: {user_text}";

/// Original roadmap prompt. Replace `{user_text}` before sending.
pub const ROADMAP_PROMPT_V1: &str = "Create a clear step-by-step career roadmap.
Include:
- Skills to learn
- Timeline (months)
- Projects to build
- Job preparation tips
User request: {user_text}";

/// Long-form roadmap prompt. Replace `{user_text}` before sending.
pub const ROADMAP_PROMPT_V2: &str = "Create a detailed, step-by-step 12-month career roadmap \
for the request below. The roadmap MUST be at least 1200 words.

Structure it in exactly four phases:
- Phase 1 (Months 1-3): Foundations
- Phase 2 (Months 4-6): Core Skills
- Phase 3 (Months 7-9): Real-World Projects
- Phase 4 (Months 10-12): Job Readiness

For EVERY phase include all of:
- Skills to learn
- Tools and technologies
- Projects to build
- Daily or weekly practice routine
- Interview preparation

Finish with a short motivational note. Use headings and bullet points.

User request: {user_text}";

/// Coach persona used by the original support prompt.
pub const SUPPORT_SYSTEM_V1: &str = "You are InnerVoice AI, an emotionally intelligent life coach.
You will be given:
1) User message
2) Detected emotion

Respond like therapist + career mentor.";

/// Coach persona plus tone-mapping rules.
pub const SUPPORT_SYSTEM_V2: &str = "You are InnerVoice AI, an emotionally intelligent life coach, \
supportive therapist and career mentor.
You will be given:
1) Detected emotion
2) User message

Adapt your tone to the detected emotion:
- Anxiety or Fear: calm, grounding and reassuring
- Sadness: gentle, warm and supportive
- Confusion: clear and structured, step by step
- Motivation or Confidence: energetic and action-oriented
- Excitement: celebratory, then help channel the energy
- Unknown: warm and neutral

Validate the feeling first, then give practical next steps. Never be dismissive.";

/// User turn for support replies. Replace `{emotion}` and `{user_text}` before sending.
pub const SUPPORT_USER: &str = "Emotion: {emotion}\nMessage: {user_text}";

/// Returns a registry holding every coaching template revision.
pub fn coach_templates() -> TemplateRegistry {
    let mut registry = TemplateRegistry::new();

    registry.register(PromptTemplate {
        name: EMOTION_TEMPLATE,
        version: 1,
        system: None,
        user: EMOTION_PROMPT,
        temperature: 0.0,
        max_tokens: 10,
    });

    registry.register(PromptTemplate {
        name: ROADMAP_TEMPLATE,
        version: 1,
        system: None,
        user: ROADMAP_PROMPT_V1,
        temperature: 0.6,
        max_tokens: 500,
    });
    registry.register(PromptTemplate {
        name: ROADMAP_TEMPLATE,
        version: 2,
        system: None,
        user: ROADMAP_PROMPT_V2,
        temperature: 0.7,
        max_tokens: 1800,
    });

    registry.register(PromptTemplate {
        name: SUPPORT_TEMPLATE,
        version: 1,
        system: Some(SUPPORT_SYSTEM_V1),
        user: SUPPORT_USER,
        temperature: 0.7,
        max_tokens: 500,
    });
    registry.register(PromptTemplate {
        name: SUPPORT_TEMPLATE,
        version: 2,
        system: Some(SUPPORT_SYSTEM_V2),
        user: SUPPORT_USER,
        temperature: 0.8,
        max_tokens: 900,
    });

    registry
}
