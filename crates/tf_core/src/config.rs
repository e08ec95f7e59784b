use std::fmt;
use std::time::Duration;

use crate::freshness::FreshnessPolicy;
use crate::{Error, Result};

pub const DEFAULT_ANTHROPIC_MODEL: &str = "claude-3-5-sonnet-20241022";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_TABLE_NAME: &str = "analysis-results";
pub const DEFAULT_SQLITE_PATH: &str = "analysis-results.db";
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Which analysis backend the process talks to. Resolved once from [`Config`].
#[derive(Clone, PartialEq, Eq)]
pub enum Provider {
    None,
    Anthropic { api_key: String, model: String },
    OpenAi { api_key: String, model: String },
}

impl Provider {
    pub fn name(&self) -> &str {
        match self {
            Provider::None => "none",
            Provider::Anthropic { .. } => "anthropic",
            Provider::OpenAi { .. } => "openai",
        }
    }
}

impl fmt::Debug for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provider::None => f.write_str("None"),
            Provider::Anthropic { model, .. } => f
                .debug_struct("Anthropic")
                .field("api_key", &"<redacted>")
                .field("model", model)
                .finish(),
            Provider::OpenAi { model, .. } => f
                .debug_struct("OpenAi")
                .field("api_key", &"<redacted>")
                .field("model", model)
                .finish(),
        }
    }
}

/// Process-wide settings, read once at startup.
#[derive(Clone)]
pub struct Config {
    pub anthropic_api_key: Option<String>,
    pub openai_api_key: Option<String>,
    pub anthropic_model: String,
    pub openai_model: String,
    pub table_name: String,
    pub dynamodb_endpoint: Option<String>,
    pub sqlite_path: String,
    pub fetch_timeout: Duration,
    pub analysis_timeout: Option<Duration>,
    pub freshness: FreshnessPolicy,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("provider", &self.provider())
            .field("table_name", &self.table_name)
            .field("dynamodb_endpoint", &self.dynamodb_endpoint)
            .field("sqlite_path", &self.sqlite_path)
            .field("fetch_timeout", &self.fetch_timeout)
            .field("analysis_timeout", &self.analysis_timeout)
            .field("freshness", &self.freshness)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            anthropic_api_key: None,
            openai_api_key: None,
            anthropic_model: DEFAULT_ANTHROPIC_MODEL.to_string(),
            openai_model: DEFAULT_OPENAI_MODEL.to_string(),
            table_name: DEFAULT_TABLE_NAME.to_string(),
            dynamodb_endpoint: None,
            sqlite_path: DEFAULT_SQLITE_PATH.to_string(),
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            analysis_timeout: None,
            freshness: FreshnessPolicy::default(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary variable source. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let mut freshness = defaults.freshness;
        if let Some(days) = parse_number(&get, "TF_CACHE_MAX_AGE_DAYS")? {
            freshness = FreshnessPolicy::with_max_age(max_age_days(days)?);
        }

        Ok(Self {
            anthropic_api_key: get("ANTHROPIC_API_KEY"),
            openai_api_key: get("OPENAI_API_KEY"),
            anthropic_model: get("ANTHROPIC_MODEL").unwrap_or(defaults.anthropic_model),
            openai_model: get("OPENAI_MODEL").unwrap_or(defaults.openai_model),
            table_name: get("DYNAMODB_TABLE").unwrap_or(defaults.table_name),
            dynamodb_endpoint: get("DYNAMODB_ENDPOINT"),
            sqlite_path: get("TF_SQLITE_PATH").unwrap_or(defaults.sqlite_path),
            fetch_timeout: parse_number(&get, "TF_FETCH_TIMEOUT_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.fetch_timeout),
            analysis_timeout: parse_number(&get, "TF_ANALYSIS_TIMEOUT_SECS")?.map(Duration::from_secs),
            freshness,
        })
    }

    /// Anthropic wins over OpenAI when both keys are present.
    pub fn provider(&self) -> Provider {
        if let Some(api_key) = &self.anthropic_api_key {
            Provider::Anthropic {
                api_key: api_key.clone(),
                model: self.anthropic_model.clone(),
            }
        } else if let Some(api_key) = &self.openai_api_key {
            Provider::OpenAi {
                api_key: api_key.clone(),
                model: self.openai_model.clone(),
            }
        } else {
            Provider::None
        }
    }
}

/// Longest cache window accepted, about a century.
pub const MAX_CACHE_AGE_DAYS: u64 = 36_500;

fn max_age_days(days: u64) -> Result<chrono::Duration> {
    i64::try_from(days)
        .ok()
        .filter(|_| days <= MAX_CACHE_AGE_DAYS)
        .and_then(chrono::Duration::try_days)
        .ok_or_else(|| {
            Error::Config(format!(
                "TF_CACHE_MAX_AGE_DAYS must be at most {} days, got {}",
                MAX_CACHE_AGE_DAYS, days
            ))
        })
}

fn parse_number<F>(get: &F, key: &str) -> Result<Option<u64>>
where
    F: Fn(&str) -> Option<String>,
{
    get(key)
        .map(|raw| {
            raw.trim()
                .parse::<u64>()
                .map_err(|e| Error::Config(format!("{} must be a whole number: {}", key, e)))
        })
        .transpose()
}
