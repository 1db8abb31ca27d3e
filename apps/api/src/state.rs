use std::sync::Arc;

use tokio::sync::Mutex;

use crate::config::Config;
use crate::export::PageSetup;
use crate::llm_client::prompts::TemplateRegistry;
use crate::llm_client::CompletionBackend;
use crate::session::Session;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Completion backend. Production: `LlmClient`. Tests: a scripted backend.
    pub llm: Arc<dyn CompletionBackend>,
    /// The single conversation this process hosts. The lock is held for a whole
    /// turn, so one interaction finishes before the next one starts.
    pub session: Arc<Mutex<Session>>,
    pub templates: Arc<TemplateRegistry>,
    pub config: Config,
    /// Page geometry for growth-plan exports.
    pub page_setup: PageSetup,
}
