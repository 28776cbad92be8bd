//! Environment-driven configuration
//!
//! Every setting has a default, so an empty environment yields a working
//! offline setup: rule-based advisor, mock scenario source, log-only billing.

use std::collections::HashMap;
use std::time::Duration;

use crate::error::AdvisorError;
use crate::llm::{is_usable_api_key, DEFAULT_API_URL, DEFAULT_MODEL};

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_LLM_TIMEOUT_SECS: u64 = 15;
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    /// `None` when missing or left at the sample placeholder
    pub openai_api_key: Option<String>,
    pub openai_api_url: String,
    pub openai_model: String,
    pub llm_timeout: Duration,
    /// Pathway data API; the mock source is used when unset
    pub pathway_api_url: Option<String>,
    pub pathway_api_key: Option<String>,
    /// Flexprice billing API; usage is only logged when unset
    pub flexprice_api_url: Option<String>,
    pub billing_user_id: String,
    pub http_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            openai_api_key: None,
            openai_api_url: DEFAULT_API_URL.to_string(),
            openai_model: DEFAULT_MODEL.to_string(),
            llm_timeout: Duration::from_secs(DEFAULT_LLM_TIMEOUT_SECS),
            pathway_api_url: None,
            pathway_api_key: None,
            flexprice_api_url: None,
            billing_user_id: crate::billing::DEFAULT_BILLING_USER.to_string(),
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
        }
    }
}

impl Config {
    /// Load `.env` if present, then read the process environment
    pub fn from_env() -> crate::Result<Self> {
        dotenv::dotenv().ok();
        Self::from_env_map(std::env::vars().collect())
    }

    pub fn from_env_map(env_map: HashMap<String, String>) -> crate::Result<Self> {
        let defaults = Config::default();

        let port = match env_map.get("PORT").or_else(|| env_map.get("API_PORT")) {
            Some(raw) => raw.trim().parse::<u16>().map_err(|_| {
                AdvisorError::ConfigError(format!("PORT must be a valid u16, got {}", raw))
            })?,
            None => defaults.port,
        };

        let openai_api_key = non_empty(&env_map, "OPENAI_API_KEY").filter(|k| is_usable_api_key(k));

        let llm_timeout = parse_secs(&env_map, "LLM_TIMEOUT_SECS")?.unwrap_or(defaults.llm_timeout);
        let http_timeout =
            parse_secs(&env_map, "HTTP_TIMEOUT_SECS")?.unwrap_or(defaults.http_timeout);

        Ok(Config {
            port,
            openai_api_key,
            openai_api_url: non_empty(&env_map, "OPENAI_API_URL").unwrap_or(defaults.openai_api_url),
            openai_model: non_empty(&env_map, "OPENAI_MODEL").unwrap_or(defaults.openai_model),
            llm_timeout,
            pathway_api_url: non_empty(&env_map, "PATHWAY_API_URL"),
            pathway_api_key: non_empty(&env_map, "PATHWAY_API_KEY"),
            flexprice_api_url: non_empty(&env_map, "FLEXPRICE_API_URL"),
            billing_user_id: non_empty(&env_map, "BILLING_USER_ID")
                .unwrap_or(defaults.billing_user_id),
            http_timeout,
        })
    }
}

fn non_empty(env_map: &HashMap<String, String>, key: &str) -> Option<String> {
    env_map
        .get(key)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn parse_secs(env_map: &HashMap<String, String>, key: &str) -> crate::Result<Option<Duration>> {
    match non_empty(env_map, key) {
        Some(raw) => {
            let secs = raw.parse::<u64>().ok().filter(|s| *s > 0).ok_or_else(|| {
                AdvisorError::ConfigError(format!("{} must be a positive integer, got {}", key, raw))
            })?;
            Ok(Some(Duration::from_secs(secs)))
        }
        None => Ok(None),
    }
}
