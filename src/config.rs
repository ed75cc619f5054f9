//! Configuration types.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;

use crate::error::ConfigError;

/// Service configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// HTTP listen port.
    pub port: u16,
    /// JSON file of raw messages to triage at startup (empty queue if unset).
    pub messages_path: Option<PathBuf>,
    /// Insights client settings.
    pub insights: InsightsConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            messages_path: None,
            insights: InsightsConfig::default(),
        }
    }
}

impl AppConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup (the environment in
    /// production, a map in tests). Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();
        let insights_defaults = InsightsConfig::default();

        let port = match get("SUPPORT_TRIAGE_PORT") {
            Some(raw) => parse_value("SUPPORT_TRIAGE_PORT", &raw)?,
            None => defaults.port,
        };

        let timeout = match get("SUPPORT_TRIAGE_INSIGHTS_TIMEOUT_SECS") {
            Some(raw) => Duration::from_secs(parse_value(
                "SUPPORT_TRIAGE_INSIGHTS_TIMEOUT_SECS",
                &raw,
            )?),
            None => insights_defaults.request_timeout,
        };

        let insights = InsightsConfig {
            api_key: get("ANTHROPIC_API_KEY").map(SecretString::from),
            model: get("ANTHROPIC_MODEL").unwrap_or(insights_defaults.model),
            anthropic_version: get("ANTHROPIC_VERSION")
                .unwrap_or(insights_defaults.anthropic_version),
            base_url: get("ANTHROPIC_BASE_URL")
                .map(|u| u.trim_end_matches('/').to_string())
                .unwrap_or(insights_defaults.base_url),
            request_timeout: timeout,
            ..insights_defaults
        };

        Ok(Self {
            port,
            messages_path: get("SUPPORT_TRIAGE_MESSAGES").map(PathBuf::from),
            insights,
        })
    }
}

/// Settings for the Anthropic Messages API call that produces queue insights.
#[derive(Debug, Clone)]
pub struct InsightsConfig {
    /// API key. `None` means insights report `not_configured`.
    pub api_key: Option<SecretString>,
    pub model: String,
    /// Value of the `anthropic-version` header.
    pub anthropic_version: String,
    /// API origin without trailing slash.
    pub base_url: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub request_timeout: Duration,
    /// Message bodies are cut to this many characters before sending.
    pub max_body_chars: usize,
}

impl Default for InsightsConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: "claude-sonnet-4-5-20250929".to_string(),
            anthropic_version: "2023-06-01".to_string(),
            base_url: "https://api.anthropic.com".to_string(),
            max_tokens: 800,
            temperature: 0.2,
            request_timeout: Duration::from_secs(30),
            max_body_chars: 500,
        }
    }
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
        key: key.to_string(),
        message: format!("{raw:?}: {e}"),
    })
}
