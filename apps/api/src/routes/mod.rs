pub mod health;

use axum::{
    routing::{delete, get, post},
    Router,
};

use crate::coach::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/capabilities", get(handlers::handle_capabilities))
        // Conversation
        .route("/api/v1/chat", post(handlers::handle_chat))
        .route("/api/v1/transcript", get(handlers::handle_get_transcript))
        .route("/api/v1/session", delete(handlers::handle_reset_session))
        // Growth plan download
        .route("/api/v1/export", post(handlers::handle_export))
        .with_state(state)
}
