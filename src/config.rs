//! Environment configuration
//!
//! Values come from the process environment (after `.env` has been loaded by
//! the binary). `from_lookup` takes any key lookup so tests never touch the
//! real environment.

use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use crate::generation::openai::DEFAULT_BASE_URL;
use crate::generation::orchestrator::DEFAULT_MODEL;
use crate::generation::RetryPolicy;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_BODY_LIMIT_BYTES: usize = 50 * 1024 * 1024;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

fn parse_or<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(key).filter(|v| !v.trim().is_empty()) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value }),
        None => Ok(default),
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct GenerationConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub max_attempts: u32,
    pub backoff: Duration,
    pub attempt_timeout: Duration,
}

impl std::fmt::Debug for GenerationConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenerationConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("max_attempts", &self.max_attempts)
            .field("backoff", &self.backoff)
            .field("attempt_timeout", &self.attempt_timeout)
            .finish()
    }
}

impl GenerationConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let api_key = lookup("OPENAI_API_KEY")
            .filter(|k| !k.trim().is_empty())
            .ok_or(ConfigError::Missing("OPENAI_API_KEY"))?;

        let max_attempts: u32 = parse_or(&lookup, "GENERATION_MAX_ATTEMPTS", 2)?;
        if max_attempts == 0 {
            return Err(ConfigError::Invalid {
                key: "GENERATION_MAX_ATTEMPTS",
                value: "0".to_string(),
            });
        }

        Ok(Self {
            api_key,
            base_url: parse_or(&lookup, "OPENAI_BASE_URL", DEFAULT_BASE_URL.to_string())?,
            model: parse_or(&lookup, "IMAGE_MODEL", DEFAULT_MODEL.to_string())?,
            max_attempts,
            backoff: Duration::from_millis(parse_or(&lookup, "GENERATION_BACKOFF_MS", 1000)?),
            attempt_timeout: Duration::from_secs(parse_or(
                &lookup,
                "GENERATION_ATTEMPT_TIMEOUT_SECS",
                30,
            )?),
        })
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_attempts, self.backoff, self.attempt_timeout)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub port: u16,
    pub body_limit_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            body_limit_bytes: DEFAULT_BODY_LIMIT_BYTES,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        Ok(Self {
            port: parse_or(&lookup, "PORT", DEFAULT_PORT)?,
            body_limit_bytes: parse_or(&lookup, "BODY_LIMIT_BYTES", DEFAULT_BODY_LIMIT_BYTES)?,
        })
    }
}
