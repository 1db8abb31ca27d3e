//! Axum route handlers for the coaching API.

use axum::{
    extract::State,
    http::header,
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::coach::emotion::Emotion;
use crate::coach::intent::Intent;
use crate::coach::pipeline::take_turn;
use crate::errors::AppError;
use crate::export::{export_transcript, DOWNLOAD_FILE_NAME};
use crate::session::{Message, Session};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub intent: Intent,
    /// Normalized label; absent for roadmap turns.
    pub detected_emotion: Option<Emotion>,
    /// What the classifier actually returned, for display next to the label.
    pub raw_emotion: Option<String>,
    pub reply: String,
    pub transcript_len: usize,
}

#[derive(Debug, Serialize)]
pub struct TranscriptResponse {
    pub session_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub messages: Vec<Message>,
    pub can_export: bool,
}

#[derive(Debug, Serialize)]
pub struct ResetResponse {
    pub session_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct Capability {
    pub title: &'static str,
    pub description: &'static str,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/capabilities
///
/// What the assistant offers, for a client's landing view.
pub async fn handle_capabilities() -> Json<Vec<Capability>> {
    Json(vec![
        Capability {
            title: "Emotional Support",
            description: "Talk when you feel lost or stressed",
        },
        Capability {
            title: "Career Roadmaps",
            description: "Get step-by-step career plans",
        },
        Capability {
            title: "Download Growth Plan",
            description: "Save your progress as PDF",
        },
    ])
}

/// POST /api/v1/chat
///
/// Runs one conversation turn: route → (classify →) generate → append.
/// Holds the session lock for the whole turn.
pub async fn handle_chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    if request.message.trim().is_empty() {
        return Err(AppError::Validation("message cannot be empty".to_string()));
    }

    let mut session = state.session.lock().await;
    let outcome = take_turn(
        &mut session,
        state.llm.as_ref(),
        &state.templates,
        state.config.prompt_revision,
        &request.message,
    )
    .await?;

    Ok(Json(ChatResponse {
        intent: outcome.intent,
        detected_emotion: outcome.emotion.as_ref().map(|r| r.label),
        raw_emotion: outcome.emotion.map(|r| r.raw),
        reply: outcome.reply,
        transcript_len: session.transcript.len(),
    }))
}

/// GET /api/v1/transcript
pub async fn handle_get_transcript(State(state): State<AppState>) -> Json<TranscriptResponse> {
    let session = state.session.lock().await;
    Json(TranscriptResponse {
        session_id: session.id,
        created_at: session.created_at,
        messages: session.transcript.all().to_vec(),
        can_export: session.transcript.can_export(),
    })
}

/// POST /api/v1/export
///
/// Writes the growth plan to the configured path and returns it as a download.
/// Requires at least one full exchange.
pub async fn handle_export(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let session = state.session.lock().await;
    if !session.transcript.can_export() {
        return Err(AppError::UnprocessableEntity(
            "At least one full exchange is needed before exporting".to_string(),
        ));
    }

    let plan = export_transcript(
        &session.transcript,
        &state.config.export_path,
        &state.page_setup,
    )
    .await?;

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{DOWNLOAD_FILE_NAME}\""),
            ),
        ],
        plan.pdf,
    ))
}

/// DELETE /api/v1/session
///
/// Discards the current conversation and starts a fresh, empty one.
pub async fn handle_reset_session(State(state): State<AppState>) -> Json<ResetResponse> {
    let mut session = state.session.lock().await;
    let previous = std::mem::replace(&mut *session, Session::new());
    info!(
        "Discarded session {} ({} messages), started {}",
        previous.id,
        previous.transcript.len(),
        session.id
    );
    Json(ResetResponse {
        session_id: session.id,
    })
}
