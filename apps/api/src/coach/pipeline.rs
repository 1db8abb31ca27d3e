//! Conversation turn — orchestrates routing, classification and generation.
//!
//! Flow: append user message → route_intent →
//!       Roadmap: generate_roadmap (1 call)
//!       EmotionalSupport: detect_emotion → generate_support_reply (2 calls, in order)
//!       → append assistant message.
//!
//! If a remote call fails the user message stays in the transcript, no assistant
//! message is added, and the error is returned. The session remains usable.

use serde::Serialize;
use tracing::info;

use crate::coach::emotion::{detect_emotion, EmotionReading};
use crate::coach::intent::{route_intent, Intent};
use crate::coach::responder::{generate_roadmap, generate_support_reply};
use crate::errors::AppError;
use crate::llm_client::prompts::TemplateRegistry;
use crate::llm_client::CompletionBackend;
use crate::session::{Role, Session};

/// Everything the caller needs to show the result of one turn.
#[derive(Debug, Clone, Serialize)]
pub struct TurnOutcome {
    pub intent: Intent,
    /// Present only for emotional-support turns.
    pub emotion: Option<EmotionReading>,
    pub reply: String,
}

/// Runs one user turn against the session.
pub async fn take_turn(
    session: &mut Session,
    llm: &dyn CompletionBackend,
    templates: &TemplateRegistry,
    revision: u32,
    user_text: &str,
) -> Result<TurnOutcome, AppError> {
    session.transcript.append(Role::User, user_text);

    let intent = route_intent(user_text);
    info!("Session {}: routed turn to {:?}", session.id, intent);

    let (emotion, reply) = match intent {
        Intent::Roadmap => {
            let roadmap = generate_roadmap(user_text, llm, templates, revision).await?;
            (None, roadmap)
        }
        Intent::EmotionalSupport => {
            let reading = detect_emotion(user_text, llm, templates).await?;
            let reply =
                generate_support_reply(reading.label, user_text, llm, templates, revision).await?;
            (Some(reading), reply)
        }
    };

    session.transcript.append(Role::Assistant, reply.clone());

    Ok(TurnOutcome {
        intent,
        emotion,
        reply,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coach::emotion::Emotion;
    use crate::coach::prompts::coach_templates;
    use crate::llm_client::testing::ScriptedBackend;

    #[tokio::test]
    async fn test_roadmap_turn_makes_one_call() {
        let mut session = Session::new();
        let llm = ScriptedBackend::new(["Month 1: Python"]);

        let outcome = take_turn(
            &mut session,
            &llm,
            &coach_templates(),
            2,
            "How do I become a data scientist?",
        )
        .await
        .unwrap();

        assert_eq!(outcome.intent, Intent::Roadmap);
        assert!(outcome.emotion.is_none());
        assert_eq!(outcome.reply, "Month 1: Python");
        assert_eq!(llm.requests().len(), 1);

        let messages = session.transcript.all();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, Role::User);
        assert_eq!(messages[0].content, "How do I become a data scientist?");
        assert_eq!(messages[1].role, Role::Assistant);
        assert_eq!(messages[1].content, "Month 1: Python");
    }

    #[tokio::test]
    async fn test_support_turn_classifies_then_generates() {
        let mut session = Session::new();
        let llm = ScriptedBackend::new(["Confusion", "Let's break it down."]);

        let outcome = take_turn(
            &mut session,
            &llm,
            &coach_templates(),
            2,
            "I don't know what I want anymore",
        )
        .await
        .unwrap();

        assert_eq!(outcome.intent, Intent::EmotionalSupport);
        assert_eq!(outcome.emotion.as_ref().unwrap().label, Emotion::Confusion);
        assert_eq!(outcome.reply, "Let's break it down.");

        let requests = llm.requests();
        assert_eq!(requests.len(), 2);
        // First call is the classifier, second embeds its label.
        assert_eq!(requests[0].max_tokens, 10);
        assert_eq!(
            requests[1].user_content().unwrap(),
            "Emotion: Confusion\nMessage: I don't know what I want anymore"
        );
    }

    #[tokio::test]
    async fn test_empty_generation_still_appends_assistant_message() {
        let mut session = Session::new();
        let llm = ScriptedBackend::new(["Sadness", ""]);

        let outcome = take_turn(&mut session, &llm, &coach_templates(), 2, "I feel down")
            .await
            .unwrap();

        assert_eq!(outcome.reply, "");
        let messages = session.transcript.all();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[1].role, Role::Assistant);
        assert_eq!(messages[1].content, "");
    }

    #[tokio::test]
    async fn test_remote_failure_keeps_user_turn_only() {
        let mut session = Session::new();
        let llm = ScriptedBackend::failing();

        let err = take_turn(&mut session, &llm, &coach_templates(), 2, "I feel down")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Llm(_)));

        let messages = session.transcript.all();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].role, Role::User);

        // The session is still usable afterwards.
        let llm = ScriptedBackend::new(["roadmap text"]);
        take_turn(&mut session, &llm, &coach_templates(), 2, "guide me into UX")
            .await
            .unwrap();
        assert_eq!(session.transcript.len(), 3);
    }

    #[tokio::test]
    async fn test_unknown_label_is_embedded_as_unknown() {
        let mut session = Session::new();
        let llm = ScriptedBackend::new(["I think the user is happy", "Glad to hear it"]);

        let outcome = take_turn(&mut session, &llm, &coach_templates(), 2, "Great day!")
            .await
            .unwrap();

        let reading = outcome.emotion.unwrap();
        assert_eq!(reading.label, Emotion::Unknown);
        assert_eq!(reading.raw, "I think the user is happy");
        assert!(llm.requests()[1]
            .user_content()
            .unwrap()
            .starts_with("Emotion: Unknown\n"));
    }
}
