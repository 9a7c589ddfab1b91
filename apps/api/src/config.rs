use std::time::Duration;

use anyhow::{bail, Context, Result};

use crate::github_client::DEFAULT_API_URL;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmProvider {
    Anthropic,
    Gemini,
}

/// Application configuration loaded from environment variables.
/// Startup fails if a required variable is missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub llm_provider: LlmProvider,
    /// Key for the selected provider.
    pub llm_api_key: String,
    /// Overrides the provider's base URL (proxies, gateways).
    pub llm_api_url: Option<String>,
    pub llm_timeout: Duration,
    pub github_token: Option<String>,
    pub github_api_url: String,
    pub github_max_pages: u32,
    pub github_max_repositories: usize,
    pub github_timeout: Duration,
    pub max_upload_bytes: usize,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any variable source. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let require = |key: &str| {
            get(key).with_context(|| format!("Required environment variable '{key}' is not set"))
        };

        let provider = get("LLM_PROVIDER").map(|v| v.trim().to_ascii_lowercase());
        let llm_provider = match provider.as_deref() {
            None | Some("anthropic") => LlmProvider::Anthropic,
            Some("gemini") => LlmProvider::Gemini,
            Some(other) => bail!("LLM_PROVIDER must be 'anthropic' or 'gemini', got '{other}'"),
        };
        let llm_api_key = match llm_provider {
            LlmProvider::Anthropic => require("ANTHROPIC_API_KEY")?,
            LlmProvider::Gemini => require("GEMINI_API_KEY")?,
        };

        Ok(Config {
            database_url: require("DATABASE_URL")?,
            llm_provider,
            llm_api_key,
            llm_api_url: get("LLM_API_URL"),
            llm_timeout: Duration::from_secs(parse_or(&get, "LLM_TIMEOUT_SECS", 120)?),
            github_token: get("GITHUB_TOKEN"),
            github_api_url: get("GITHUB_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            github_max_pages: parse_or(&get, "GITHUB_MAX_PAGES", 10)?,
            github_max_repositories: parse_or(&get, "GITHUB_MAX_REPOSITORIES", 500)?,
            github_timeout: Duration::from_secs(parse_or(&get, "GITHUB_TIMEOUT_SECS", 30)?),
            max_upload_bytes: parse_or(&get, "MAX_UPLOAD_BYTES", 10 * 1024 * 1024)?,
            port: parse_or(&get, "PORT", 8080)?,
            rust_log: get("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }
}

fn parse_or<T, G>(get: &G, key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| anyhow::anyhow!("{key} must be a valid number, got '{raw}'")),
        None => Ok(default),
    }
}
