//! Response generation — one LLM call per reply, in roadmap or support mode.
//!
//! Output is returned exactly as the model produced it. Length and structure
//! requested by the roadmap prompt are a best-effort contract and are not checked.

use tracing::{debug, info};

use crate::coach::emotion::{tone_for, Emotion};
use crate::coach::prompts::{ROADMAP_TEMPLATE, SUPPORT_TEMPLATE};
use crate::errors::AppError;
use crate::llm_client::prompts::{PromptTemplate, TemplateRegistry};
use crate::llm_client::CompletionBackend;

/// Roadmaps shorter than this were very likely truncated or ignored the prompt.
const SHORT_ROADMAP_WORDS: usize = 300;

fn resolve_template<'a>(
    templates: &'a TemplateRegistry,
    name: &str,
    revision: u32,
) -> Result<&'a PromptTemplate, AppError> {
    templates.resolve(name, revision).ok_or_else(|| {
        AppError::Internal(anyhow::anyhow!(
            "no '{name}' template at or below revision {revision}"
        ))
    })
}

/// Generates a career roadmap for the raw user request.
pub async fn generate_roadmap(
    user_text: &str,
    llm: &dyn CompletionBackend,
    templates: &TemplateRegistry,
    revision: u32,
) -> Result<String, AppError> {
    let template = resolve_template(templates, ROADMAP_TEMPLATE, revision)?;
    info!("Generating roadmap (template v{})", template.version);

    let request = template.render(&[("user_text", user_text)]);
    let roadmap = llm
        .complete(&request)
        .await
        .map_err(|e| AppError::Llm(format!("Roadmap generation failed: {e}")))?;

    let words = roadmap.split_whitespace().count();
    if words < SHORT_ROADMAP_WORDS {
        debug!("Roadmap is only {words} words");
    }

    Ok(roadmap)
}

/// Generates an emotionally tailored reply.
///
/// `user_text` is substituted last so placeholder-like text in the message is
/// never expanded.
pub async fn generate_support_reply(
    emotion: Emotion,
    user_text: &str,
    llm: &dyn CompletionBackend,
    templates: &TemplateRegistry,
    revision: u32,
) -> Result<String, AppError> {
    let template = resolve_template(templates, SUPPORT_TEMPLATE, revision)?;
    info!(
        "Generating support reply (template v{}, tone {:?})",
        template.version,
        tone_for(emotion)
    );

    let request = template.render(&[("emotion", emotion.as_str()), ("user_text", user_text)]);
    llm.complete(&request)
        .await
        .map_err(|e| AppError::Llm(format!("Support reply failed: {e}")))
}
