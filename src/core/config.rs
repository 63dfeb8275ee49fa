//! Configuration management

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

use crate::core::retry::{RetryPolicy, DEFAULT_BASE_DELAY_MS, DEFAULT_MAX_ATTEMPTS};

/// Environment variables that can hold the API key, highest priority first
pub const API_KEY_SOURCES: &[&str] = &[
    "GEMINI_API_KEY",
    "VITE_API_KEY",
    "NEXT_PUBLIC_API_KEY",
    "REACT_APP_API_KEY",
    "API_KEY",
];

pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-3-flash-preview";

/// How strictly the `Korean` echo of each record is checked
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EchoCheck {
    /// Return decoded records untouched
    Trust,
    /// Require one record per item and restore the source text where it drifted
    #[default]
    Repair,
    /// Fail the call on any count or echo mismatch
    Reject,
}

impl FromStr for EchoCheck {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "trust" => Ok(EchoCheck::Trust),
            "repair" => Ok(EchoCheck::Repair),
            "reject" => Ok(EchoCheck::Reject),
            other => Err(format!("unknown echo check mode: {}", other)),
        }
    }
}

/// Configuration for translator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslatorConfig {
    pub api_key: Option<String>,
    pub api_endpoint: String,
    pub model: String,
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub timeout_ms: u64,
    pub echo_check: EchoCheck,
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay_ms: DEFAULT_BASE_DELAY_MS,
            timeout_ms: 120_000,
            echo_check: EchoCheck::default(),
        }
    }
}

/// First non-blank value among `sources`, with the name it came from
pub fn resolve_credential<F>(sources: &[&str], lookup: F) -> Option<(String, String)>
where
    F: Fn(&str) -> Option<String>,
{
    sources.iter().find_map(|name| {
        lookup(name)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .map(|value| (name.to_string(), value))
    })
}

impl TranslatorConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let api_key = match resolve_credential(API_KEY_SOURCES, &lookup) {
            Some((source, key)) => {
                info!("Using API key from {}", source);
                Some(key)
            }
            None => {
                debug!("No API key found in {:?}", API_KEY_SOURCES);
                None
            }
        };

        let parse = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let max_attempts = match parse("MAX_ATTEMPTS") {
            Some(raw) => raw.parse::<u32>()?,
            None => defaults.max_attempts,
        };
        let base_delay_ms = match parse("RETRY_BASE_DELAY_MS") {
            Some(raw) => raw.parse::<u64>()?,
            None => defaults.base_delay_ms,
        };
        let timeout_ms = match parse("REQUEST_TIMEOUT_MS") {
            Some(raw) => raw.parse::<u64>()?,
            None => defaults.timeout_ms,
        };
        let echo_check = match parse("ECHO_CHECK") {
            Some(raw) => raw.parse::<EchoCheck>().map_err(|e| anyhow::anyhow!(e))?,
            None => defaults.echo_check,
        };

        Ok(Self {
            api_key,
            api_endpoint: parse("GEMINI_API_ENDPOINT").unwrap_or(defaults.api_endpoint),
            model: parse("GEMINI_MODEL").unwrap_or(defaults.model),
            max_attempts,
            base_delay_ms,
            timeout_ms,
            echo_check,
        })
    }

    /// Load from JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate configuration.
    ///
    /// A missing API key is not an error here; the client reports it on the
    /// first translate call.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.api_endpoint.trim().is_empty() {
            return Err(anyhow::anyhow!("API endpoint is required"));
        }

        if self.model.trim().is_empty() {
            return Err(anyhow::anyhow!("model is required"));
        }

        if self.max_attempts == 0 {
            return Err(anyhow::anyhow!("max_attempts must be greater than 0"));
        }

        if self.timeout_ms == 0 {
            return Err(anyhow::anyhow!("timeout_ms must be greater than 0"));
        }

        Ok(())
    }

    /// Override the API key (CLI `--api-key`)
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        let key = api_key.into();
        if !key.trim().is_empty() {
            self.api_key = Some(key.trim().to_string());
        }
        self
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_attempts, Duration::from_millis(self.base_delay_ms))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Guidance shown when no API key is configured
    pub fn missing_key_message() -> String {
        format!(
            "API key is missing. Set one of {} (or pass --api-key).",
            API_KEY_SOURCES.join(", ")
        )
    }
}
