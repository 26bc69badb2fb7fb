use std::path::Path;

use chrono_tz::Tz;
use serde::Deserialize;

use crate::errors::ConfigError;

/// Environment variables consulted, in order, by [`NormalizerConfig::from_env`].
pub const TIMEZONE_ENV_VARS: [&str; 2] = ["PUMPSYNC_TIMEZONE", "TIMEZONE_NAME"];

/// Immutable settings shared by every mapper call.
///
/// Built once before the first conversion and passed by reference afterwards;
/// it is `Copy` so worker threads can each hold their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NormalizerConfig {
    canonical_timezone: Tz,
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    timezone: Option<String>,
}

impl NormalizerConfig {
    pub fn new(canonical_timezone: Tz) -> Self {
        Self { canonical_timezone }
    }

    pub fn canonical_timezone(&self) -> Tz {
        self.canonical_timezone
    }

    pub fn from_timezone_name(name: &str) -> Result<Self, ConfigError> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(ConfigError::MissingTimezone);
        }
        let tz: Tz = trimmed.parse().map_err(|err| ConfigError::InvalidTimezone {
            name: trimmed.to_string(),
            reason: format!("{err}"),
        })?;
        Ok(Self::new(tz))
    }

    /// Reads the timezone from `PUMPSYNC_TIMEZONE`, then `TIMEZONE_NAME`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`NormalizerConfig::from_env`], reading variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let name = TIMEZONE_ENV_VARS
            .iter()
            .filter_map(|key| lookup(key))
            .find(|value| !value.trim().is_empty())
            .ok_or(ConfigError::MissingTimezone)?;
        Self::from_timezone_name(&name)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile = toml::from_str(content)?;
        let name = file.timezone.ok_or(ConfigError::MissingTimezone)?;
        Self::from_timezone_name(&name)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }
}
