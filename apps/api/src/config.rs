use std::time::Duration;

use anyhow::{bail, Context, Result};

use crate::llm_client::ProviderSettings;

const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";
const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_ANTHROPIC_MODEL: &str = "claude-3-5-haiku-latest";
const DEFAULT_ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com/v1";
const DEFAULT_DEV_BASE_URL: &str = "http://localhost:3000";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    fn parse(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "production" | "prod" => Ok(Environment::Production),
            other => bail!("APP_ENV must be 'development' or 'production', got '{other}'"),
        }
    }
}

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub environment: Environment,
    pub database_url: String,
    pub auth_url: String,
    pub auth_anon_key: String,
    pub public_base_url: String,
    pub extension_origin: Option<String>,
    pub openai: Option<ProviderSettings>,
    pub anthropic: Option<ProviderSettings>,
    pub provider_timeout: Duration,
    pub heuristic_noise: bool,
    pub rate_limit_max_attempts: u32,
    pub rate_limit_window: Duration,
    pub redis_url: Option<String>,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let environment = Environment::parse(&env_or("APP_ENV", "development"))?;
        let provider_timeout = Duration::from_secs(parse_env("PROVIDER_TIMEOUT_SECS", 30)?);

        let public_base_url = match (optional_env("PUBLIC_BASE_URL"), environment) {
            (Some(url), _) => url,
            (None, Environment::Development) => DEFAULT_DEV_BASE_URL.to_string(),
            (None, Environment::Production) => {
                bail!("PUBLIC_BASE_URL is required when APP_ENV=production")
            }
        };

        Ok(Config {
            environment,
            database_url: require_env("DATABASE_URL")?,
            auth_url: require_env("AUTH_URL")?,
            auth_anon_key: require_env("AUTH_ANON_KEY")?,
            public_base_url,
            extension_origin: optional_env("EXTENSION_ORIGIN"),
            openai: provider_settings(
                "OPENAI",
                DEFAULT_OPENAI_MODEL,
                DEFAULT_OPENAI_BASE_URL,
                provider_timeout,
            ),
            anthropic: provider_settings(
                "ANTHROPIC",
                DEFAULT_ANTHROPIC_MODEL,
                DEFAULT_ANTHROPIC_BASE_URL,
                provider_timeout,
            ),
            provider_timeout,
            heuristic_noise: parse_env("HEURISTIC_NOISE", false)?,
            rate_limit_max_attempts: parse_env("RATE_LIMIT_MAX_ATTEMPTS", 5)?,
            rate_limit_window: Duration::from_secs(parse_env("RATE_LIMIT_WINDOW_SECS", 900)?),
            redis_url: optional_env("REDIS_URL"),
            port: parse_env("PORT", 8080)?,
            rust_log: env_or("RUST_LOG", "info"),
        })
    }
}

/// `None` when `{PREFIX}_API_KEY` is unset, which leaves the provider out of the cascade.
fn provider_settings(
    prefix: &str,
    default_model: &str,
    default_base_url: &str,
    timeout: Duration,
) -> Option<ProviderSettings> {
    let api_key = optional_env(&format!("{prefix}_API_KEY"))?;
    Some(ProviderSettings {
        api_key,
        model: optional_env(&format!("{prefix}_MODEL")).unwrap_or_else(|| default_model.to_string()),
        base_url: optional_env(&format!("{prefix}_BASE_URL"))
            .unwrap_or_else(|| default_base_url.to_string()),
        timeout,
    })
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_or(key: &str, default: &str) -> String {
    optional_env(key).unwrap_or_else(|| default.to_string())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional_env(key) {
        Some(raw) => raw
            .parse::<T>()
            .with_context(|| format!("{key} has an invalid value '{raw}'")),
        None => Ok(default),
    }
}
