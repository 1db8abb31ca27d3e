use std::path::PathBuf;

use anyhow::{bail, Context, Result};

use crate::llm_client::GROQ_API_URL;

/// Application configuration loaded from environment variables.
/// Startup fails if the Groq credential is missing or blank.
#[derive(Debug, Clone)]
pub struct Config {
    pub groq_api_key: String,
    pub groq_api_url: String,
    pub port: u16,
    pub rust_log: String,
    /// Fixed location the growth-plan PDF is written to on every export.
    pub export_path: PathBuf,
    /// Which revision of the roadmap/support templates to use (1 or 2).
    pub prompt_revision: u32,
}

impl Config {
    /// Reads configuration from the process environment.
    /// `.env` loading happens in `main` before this is called.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds configuration from any key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let groq_api_key = lookup("GROQ_API_KEY")
            .context("Required environment variable 'GROQ_API_KEY' is not set")?;
        if groq_api_key.trim().is_empty() {
            bail!("Environment variable 'GROQ_API_KEY' is set but empty");
        }

        let prompt_revision = lookup("PROMPT_REVISION")
            .unwrap_or_else(|| "2".to_string())
            .parse::<u32>()
            .context("PROMPT_REVISION must be a positive integer")?;
        if prompt_revision == 0 {
            bail!("PROMPT_REVISION must be 1 or greater");
        }

        Ok(Config {
            groq_api_key,
            groq_api_url: lookup("GROQ_API_URL").unwrap_or_else(|| GROQ_API_URL.to_string()),
            port: lookup("PORT")
                .unwrap_or_else(|| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            export_path: lookup("EXPORT_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("growth_plan.pdf")),
            prompt_revision,
        })
    }
}
