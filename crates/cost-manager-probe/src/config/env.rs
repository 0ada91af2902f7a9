// crates/cost-manager-probe/src/config/env.rs
// ============================================================================
// Module: Conformance Environment
// Description: Environment-backed overrides for the conformance suite.
// Purpose: Centralize env parsing with strict UTF-8 validation.
// Dependencies: url
// ============================================================================

//! ## Overview
//! `COST_MANAGER_*` variables override the profile defaults and the config
//! file. Values are parsed with strict UTF-8 enforcement; invalid or empty
//! values fail closed instead of being ignored.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use super::suite::ConfigError;
use super::suite::ServiceKind;
use super::suite::SuiteConfig;
use super::suite::parse_url;

// ============================================================================
// SECTION: Environment Constants
// ============================================================================

/// Environment keys read by the suite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConformanceEnv {
    /// Path of a TOML config file.
    Config,
    /// Users service base URL.
    UsersUrl,
    /// Costs service base URL.
    CostsUrl,
    /// Logs service base URL.
    LogsUrl,
    /// Admin service base URL.
    AdminUrl,
    /// Per-request timeout in seconds (positive integer).
    TimeoutSeconds,
    /// Attempts per request (positive integer).
    Attempts,
    /// Delete fixture data after the run (`true`/`false` or `1`/`0`).
    Teardown,
    /// Artifact output directory.
    ArtifactsDir,
}

impl ConformanceEnv {
    /// Every key, in documentation order.
    pub const ALL: [Self; 9] = [
        Self::Config,
        Self::UsersUrl,
        Self::CostsUrl,
        Self::LogsUrl,
        Self::AdminUrl,
        Self::TimeoutSeconds,
        Self::Attempts,
        Self::Teardown,
        Self::ArtifactsDir,
    ];

    /// Returns the canonical environment variable name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Config => "COST_MANAGER_CONFIG",
            Self::UsersUrl => "COST_MANAGER_USERS_URL",
            Self::CostsUrl => "COST_MANAGER_COSTS_URL",
            Self::LogsUrl => "COST_MANAGER_LOGS_URL",
            Self::AdminUrl => "COST_MANAGER_ADMIN_URL",
            Self::TimeoutSeconds => "COST_MANAGER_TIMEOUT_SEC",
            Self::Attempts => "COST_MANAGER_ATTEMPTS",
            Self::Teardown => "COST_MANAGER_TEARDOWN",
            Self::ArtifactsDir => "COST_MANAGER_ARTIFACTS_DIR",
        }
    }

    /// Returns the key carrying a service URL.
    #[must_use]
    pub const fn for_service(kind: ServiceKind) -> Self {
        match kind {
            ServiceKind::Users => Self::UsersUrl,
            ServiceKind::Costs => Self::CostsUrl,
            ServiceKind::Logs => Self::LogsUrl,
            ServiceKind::Admin => Self::AdminUrl,
        }
    }
}

// ============================================================================
// SECTION: Overrides
// ============================================================================

/// Typed overrides derived from environment variables.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EnvOverrides {
    /// Config file path.
    pub config_path: Option<PathBuf>,
    /// Service URL overrides.
    pub endpoints: Vec<(ServiceKind, Url)>,
    /// Per-request timeout.
    pub timeout: Option<Duration>,
    /// Attempts per request.
    pub attempts: Option<u32>,
    /// Teardown switch.
    pub teardown: Option<bool>,
    /// Artifact output directory.
    pub artifacts_dir: Option<PathBuf>,
}

impl EnvOverrides {
    /// Loads overrides from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when a value is not valid UTF-8, is
    /// empty, or fails validation.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(read_env_strict)
    }

    /// Loads overrides through `lookup`, which maps a name to its value.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when `lookup` fails or a value is
    /// empty or malformed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Result<Option<String>, String>,
    {
        let read = |key: ConformanceEnv| {
            read_nonempty(&lookup, key.as_str()).map_err(ConfigError::Invalid)
        };
        let mut endpoints = Vec::new();
        for kind in ServiceKind::ALL {
            if let Some(raw) = read(ConformanceEnv::for_service(kind))? {
                endpoints.push((kind, parse_url(kind, &raw)?));
            }
        }
        let timeout = read(ConformanceEnv::TimeoutSeconds)?
            .map(|value| parse_timeout_seconds(ConformanceEnv::TimeoutSeconds.as_str(), &value))
            .transpose()
            .map_err(ConfigError::Invalid)?;
        let attempts = read(ConformanceEnv::Attempts)?
            .map(|value| parse_attempts(ConformanceEnv::Attempts.as_str(), &value))
            .transpose()
            .map_err(ConfigError::Invalid)?;
        let teardown = read(ConformanceEnv::Teardown)?
            .map(|value| parse_bool_env(ConformanceEnv::Teardown.as_str(), &value))
            .transpose()
            .map_err(ConfigError::Invalid)?;
        Ok(Self {
            config_path: read(ConformanceEnv::Config)?.map(PathBuf::from),
            endpoints,
            timeout,
            attempts,
            teardown,
            artifacts_dir: read(ConformanceEnv::ArtifactsDir)?.map(PathBuf::from),
        })
    }

    /// Applies every set override onto `config`.
    pub fn apply(&self, config: &mut SuiteConfig) {
        for (kind, url) in &self.endpoints {
            config.endpoints.set(*kind, url.clone());
        }
        if let Some(timeout) = self.timeout {
            config.retry.timeout = timeout;
        }
        if let Some(attempts) = self.attempts {
            config.retry.attempts = attempts;
        }
        if let Some(teardown) = self.teardown {
            config.teardown = teardown;
        }
        if let Some(dir) = &self.artifacts_dir {
            config.artifacts_dir = Some(dir.clone());
        }
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Reads an environment variable and enforces UTF-8 validity.
///
/// # Errors
///
/// Returns an error when the environment variable contains invalid UTF-8.
pub fn read_env_strict(name: &str) -> Result<Option<String>, String> {
    std::env::var_os(name).map_or(Ok(None), |raw| {
        raw.into_string().map(Some).map_err(|_| format!("{name} must be valid UTF-8"))
    })
}

/// Reads a value through `lookup` and rejects empty values.
fn read_nonempty<F>(lookup: &F, name: &str) -> Result<Option<String>, String>
where
    F: Fn(&str) -> Result<Option<String>, String>,
{
    match lookup(name)? {
        Some(value) if value.trim().is_empty() => Err(format!("{name} must not be empty")),
        Some(value) => Ok(Some(value)),
        None => Ok(None),
    }
}

/// Parses a positive number of seconds.
fn parse_timeout_seconds(name: &str, raw: &str) -> Result<Duration, String> {
    let secs: u64 = raw
        .trim()
        .parse()
        .map_err(|_| format!("{name} must be a positive integer number of seconds"))?;
    if secs == 0 {
        return Err(format!("{name} must be greater than zero"));
    }
    Ok(Duration::from_secs(secs))
}

/// Parses a positive attempt count.
fn parse_attempts(name: &str, raw: &str) -> Result<u32, String> {
    let attempts: u32 =
        raw.trim().parse().map_err(|_| format!("{name} must be a positive integer"))?;
    if attempts == 0 {
        return Err(format!("{name} must be greater than zero"));
    }
    Ok(attempts)
}

/// Parses `1`, `0`, `true`, or `false`.
fn parse_bool_env(name: &str, raw: &str) -> Result<bool, String> {
    let trimmed = raw.trim();
    if trimmed.eq_ignore_ascii_case("true") || trimmed == "1" {
        return Ok(true);
    }
    if trimmed.eq_ignore_ascii_case("false") || trimmed == "0" {
        return Ok(false);
    }
    Err(format!("{name} must be 1, 0, true, or false"))
}
