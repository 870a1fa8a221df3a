use std::path::PathBuf;

use anyhow::{Context, Result};

const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_PERPLEXITY_BASE_URL: &str = "https://api.perplexity.ai";

/// Application configuration loaded from environment variables.
/// Fails at startup if `OPENAI_API_KEY` is missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub openai_api_key: String,
    pub openai_base_url: String,
    /// Search-augmented provider. Precedent research is skipped when absent.
    pub perplexity_api_key: Option<String>,
    pub perplexity_base_url: String,
    pub data_dir: PathBuf,
    pub templates_dir: PathBuf,
    pub llm_timeout_secs: u64,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            openai_api_key: require_env("OPENAI_API_KEY")?,
            openai_base_url: env_or("OPENAI_BASE_URL", DEFAULT_OPENAI_BASE_URL),
            perplexity_api_key: optional_env("PERPLEXITY_API_KEY"),
            perplexity_base_url: env_or("PERPLEXITY_BASE_URL", DEFAULT_PERPLEXITY_BASE_URL),
            data_dir: PathBuf::from(env_or("DEMAND_DATA_DIR", "data")),
            templates_dir: PathBuf::from(env_or("DEMAND_TEMPLATES_DIR", "templates")),
            llm_timeout_secs: env_or("LLM_TIMEOUT_SECS", "300")
                .parse::<u64>()
                .context("LLM_TIMEOUT_SECS must be a whole number of seconds")?,
            rust_log: env_or("RUST_LOG", "info"),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    optional_env(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

/// Treats an empty value the same as an unset one.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn env_or(key: &str, default: &str) -> String {
    optional_env(key).unwrap_or_else(|| default.to_string())
}
