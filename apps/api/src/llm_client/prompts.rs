// Prompt template machinery shared by every service that calls the LLM.
// Each service defines its own template constants in a prompts.rs alongside it
// and registers them here; routing and call code only refer to templates by name.

use std::collections::BTreeMap;

use crate::llm_client::{ChatTurn, CompletionRequest};

/// A named, versioned prompt: text plus the sampling settings it was tuned for.
///
/// Placeholders use `{name}` syntax and are substituted by `render`.
#[derive(Debug, Clone, PartialEq)]
pub struct PromptTemplate {
    pub name: &'static str,
    pub version: u32,
    pub system: Option<&'static str>,
    pub user: &'static str,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl PromptTemplate {
    /// Builds a completion request, substituting every `(placeholder, value)` pair
    /// into both the system and user text.
    pub fn render(&self, vars: &[(&str, &str)]) -> CompletionRequest {
        let fill = |text: &str| {
            vars.iter().fold(text.to_string(), |acc, (key, value)| {
                acc.replace(&format!("{{{key}}}"), value)
            })
        };

        let mut turns = Vec::with_capacity(2);
        if let Some(system) = self.system {
            turns.push(ChatTurn::system(fill(system)));
        }
        turns.push(ChatTurn::user(fill(self.user)));

        CompletionRequest {
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            turns,
        }
    }
}

/// Lookup table of templates keyed by name, then version.
#[derive(Debug, Clone, Default)]
pub struct TemplateRegistry {
    templates: BTreeMap<&'static str, BTreeMap<u32, PromptTemplate>>,
}

impl TemplateRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a template. A later registration of the same name and version replaces it.
    pub fn register(&mut self, template: PromptTemplate) {
        self.templates
            .entry(template.name)
            .or_default()
            .insert(template.version, template);
    }

    /// Returns the newest version of `name` that is not newer than `max_version`.
    pub fn resolve(&self, name: &str, max_version: u32) -> Option<&PromptTemplate> {
        self.templates
            .get(name)?
            .range(..=max_version)
            .next_back()
            .map(|(_, t)| t)
    }

    pub fn latest(&self, name: &str) -> Option<&PromptTemplate> {
        self.resolve(name, u32::MAX)
    }
}
