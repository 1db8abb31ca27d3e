// Coaching engine: intent routing, emotion classification, reply generation.
// All LLM calls go through llm_client — no direct HTTP calls here.

pub mod emotion;
pub mod handlers;
pub mod intent;
pub mod pipeline;
pub mod prompts;
pub mod responder;
