//! Configuration management for the Botsmith services.
//!
//! Settings are read from the environment. Relevant variables:
//!
//! - `GEMINI_API_KEY` — provider credential
//! - `GEMINI_MODEL` — single preferred model
//! - `GEMINI_MODELS` — comma-separated preference list (overrides `GEMINI_MODEL`)
//! - `BOTSMITH_STORE_PATH` — snapshot file; empty or `:memory:` keeps the
//!   store memory-only
//! - `BOTSMITH_MAX_SESSIONS_PER_BOT` / `BOTSMITH_MAX_TURNS_PER_SESSION`
//! - `BOTSMITH_BIND` / `BOTSMITH_PORT`
//! - `FRONTEND_ORIGINS` — comma-separated CORS origins
//! - `BOTSMITH_REQUEST_TIMEOUT_SECS` — per provider call
//! - `BOTSMITH_LOG_LEVEL` / `BOTSMITH_LOG_FORMAT`

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

const DEFAULT_MODEL: &str = "gemini-flash-latest";

/// Runtime settings for all Botsmith services.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Gemini API key. Absent means provider calls fail with a
    /// configuration error.
    pub gemini_api_key: Option<String>,

    /// Single preferred model, used when `gemini_models` is empty.
    pub gemini_model: String,

    /// Ordered model preference list. Overrides `gemini_model` when set.
    pub gemini_models: Vec<String>,

    /// Snapshot file path. `None` keeps the store memory-only.
    pub store_path: Option<PathBuf>,

    /// Maximum bound sessions per bot before LRU eviction.
    pub max_sessions_per_bot: usize,

    /// Maximum retained turns per (bot, session) history.
    pub max_turns_per_session: usize,

    /// Bind address for the HTTP server.
    pub bind: String,

    /// Port for the HTTP server.
    pub port: u16,

    /// Origins allowed by CORS.
    pub frontend_origins: String,

    /// Timeout for a single provider call, in seconds.
    pub request_timeout_secs: u64,

    /// Base log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format: "json" or "pretty".
    pub log_format: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            gemini_api_key: None,
            gemini_model: DEFAULT_MODEL.to_string(),
            gemini_models: Vec::new(),
            store_path: None,
            max_sessions_per_bot: 50,
            max_turns_per_session: 40,
            bind: "127.0.0.1".to_string(),
            port: 8000,
            frontend_origins: "http://localhost:3000".to_string(),
            request_timeout_secs: 120,
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
        }
    }
}

impl Settings {
    /// Load settings from the environment, falling back to defaults.
    ///
    /// Returns a configuration error when a numeric variable fails to
    /// parse or a capacity is zero.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let settings = Self {
            gemini_api_key: env_non_empty("GEMINI_API_KEY"),
            gemini_model: env_non_empty("GEMINI_MODEL").unwrap_or(defaults.gemini_model),
            gemini_models: env_non_empty("GEMINI_MODELS")
                .map(|raw| split_csv(&raw))
                .unwrap_or_default(),
            store_path: env_non_empty("BOTSMITH_STORE_PATH")
                .filter(|raw| !raw.eq_ignore_ascii_case(":memory:"))
                .map(PathBuf::from),
            max_sessions_per_bot: env_parse(
                "BOTSMITH_MAX_SESSIONS_PER_BOT",
                defaults.max_sessions_per_bot,
            )?,
            max_turns_per_session: env_parse(
                "BOTSMITH_MAX_TURNS_PER_SESSION",
                defaults.max_turns_per_session,
            )?,
            bind: env_non_empty("BOTSMITH_BIND").unwrap_or(defaults.bind),
            port: env_parse("BOTSMITH_PORT", defaults.port)?,
            frontend_origins: env_non_empty("FRONTEND_ORIGINS").unwrap_or(defaults.frontend_origins),
            request_timeout_secs: env_parse(
                "BOTSMITH_REQUEST_TIMEOUT_SECS",
                defaults.request_timeout_secs,
            )?,
            log_level: env_non_empty("BOTSMITH_LOG_LEVEL").unwrap_or(defaults.log_level),
            log_format: env_non_empty("BOTSMITH_LOG_FORMAT").unwrap_or(defaults.log_format),
        };

        settings.validate()?;
        Ok(settings)
    }

    /// Validate capacity limits.
    pub fn validate(&self) -> Result<()> {
        if self.max_sessions_per_bot == 0 || self.max_turns_per_session == 0 {
            return Err(Error::Config(
                "Storage limits must be positive integers".to_string(),
            ));
        }
        Ok(())
    }

    /// Ordered, de-duplicated model preference list.
    ///
    /// `gemini_models` wins when non-empty, otherwise the single
    /// `gemini_model`. First occurrence wins on duplicates.
    pub fn preferred_models(&self) -> Vec<String> {
        let source: Vec<String> = if self.gemini_models.is_empty() {
            vec![self.gemini_model.clone()]
        } else {
            self.gemini_models.clone()
        };

        let mut ordered = Vec::new();
        for model in source {
            if !model.is_empty() && !ordered.contains(&model) {
                ordered.push(model);
            }
        }
        ordered
    }

    /// Normalized list of origins allowed by CORS.
    pub fn allowed_origins(&self) -> Vec<String> {
        split_csv(&self.frontend_origins)
    }
}

/// Read an environment variable, treating empty values as absent.
fn env_non_empty(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Parse an environment variable, falling back to a default when unset.
fn env_parse<T: std::str::FromStr>(name: &str, default: T) -> Result<T> {
    match env_non_empty(name) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| Error::Config(format!("Invalid value for {name}: {raw}"))),
        None => Ok(default),
    }
}

/// Split a comma-separated list, trimming and dropping empty entries.
fn split_csv(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let settings = Settings::default();
        assert_eq!(settings.gemini_model, "gemini-flash-latest");
        assert!(settings.gemini_api_key.is_none());
        assert!(settings.store_path.is_none());
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn preferred_models_falls_back_to_single_model() {
        let settings = Settings::default();
        assert_eq!(settings.preferred_models(), vec!["gemini-flash-latest"]);
    }

    #[test]
    fn preferred_models_dedupes_first_occurrence_wins() {
        let settings = Settings {
            gemini_models: vec![
                "gemini-1.5-pro".to_string(),
                "gemini-2.0-flash".to_string(),
                "gemini-1.5-pro".to_string(),
                "gemini-1.5-flash".to_string(),
            ],
            ..Settings::default()
        };
        assert_eq!(
            settings.preferred_models(),
            vec!["gemini-1.5-pro", "gemini-2.0-flash", "gemini-1.5-flash"]
        );
    }

    #[test]
    fn zero_caps_are_rejected() {
        let settings = Settings {
            max_turns_per_session: 0,
            ..Settings::default()
        };
        assert!(matches!(settings.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn allowed_origins_splits_and_trims() {
        let settings = Settings {
            frontend_origins: "http://localhost:3000, https://app.example.com ,".to_string(),
            ..Settings::default()
        };
        assert_eq!(
            settings.allowed_origins(),
            vec!["http://localhost:3000", "https://app.example.com"]
        );
    }

    #[test]
    fn split_csv_drops_empty_entries() {
        assert_eq!(split_csv("a,,b , ,c"), vec!["a", "b", "c"]);
        assert!(split_csv("").is_empty());
    }
}
