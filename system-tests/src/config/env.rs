// system-tests/src/config/env.rs
// ============================================================================
// Module: System Test Environment
// Description: Environment-backed configuration for live system tests.
// Purpose: Centralize env parsing with strict UTF-8 validation.
// Dependencies: cost-manager-probe
// ============================================================================

//! ## Overview
//! Environment values are parsed with strict UTF-8 enforcement to avoid silent
//! misconfiguration. Invalid UTF-8 fails closed. Service URLs and retry
//! settings come from the `COST_MANAGER_*` variables the CLI also reads.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::PathBuf;
use std::time::Duration;

use cost_manager_probe::Profile;
use cost_manager_probe::SuiteConfig;
use cost_manager_probe::config::read_env_strict;

// ============================================================================
// SECTION: Environment Constants
// ============================================================================

/// Environment keys for system test configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemTestEnv {
    /// Optional run root override.
    RunRoot,
    /// Base profile for the live run (`local` or `remote`).
    Profile,
    /// Optional readiness timeout override in seconds (positive integer).
    ReadyTimeoutSeconds,
}

impl SystemTestEnv {
    /// Returns the canonical environment variable name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::RunRoot => "COST_MANAGER_SYSTEM_TEST_RUN_ROOT",
            Self::Profile => "COST_MANAGER_SYSTEM_TEST_PROFILE",
            Self::ReadyTimeoutSeconds => "COST_MANAGER_SYSTEM_TEST_READY_TIMEOUT_SEC",
        }
    }
}

// ============================================================================
// SECTION: Config Types
// ============================================================================

/// Typed system test configuration derived from environment variables.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SystemTestConfig {
    /// Optional run root override.
    pub run_root: Option<PathBuf>,
    /// Profile override; the suite default applies when unset.
    pub profile: Option<Profile>,
    /// Optional readiness timeout override.
    pub ready_timeout: Option<Duration>,
}

impl SystemTestConfig {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error when an environment value is not valid UTF-8, is empty,
    /// or fails validation (for example, an invalid timeout or profile).
    pub fn load() -> Result<Self, String> {
        let run_root = read_env_nonempty(SystemTestEnv::RunRoot.as_str())?.map(PathBuf::from);
        let profile = read_env_nonempty(SystemTestEnv::Profile.as_str())?
            .map(|value| parse_profile(SystemTestEnv::Profile.as_str(), &value))
            .transpose()?;
        let ready_timeout = read_env_nonempty(SystemTestEnv::ReadyTimeoutSeconds.as_str())?
            .map(|value| parse_timeout_seconds(SystemTestEnv::ReadyTimeoutSeconds.as_str(), &value))
            .transpose()?;
        Ok(Self {
            run_root,
            profile,
            ready_timeout,
        })
    }

    /// Resolves the suite configuration for the live deployment.
    ///
    /// # Errors
    ///
    /// Returns an error when the `COST_MANAGER_*` environment or the
    /// resulting configuration is invalid.
    pub fn suite_config(&self) -> Result<SuiteConfig, String> {
        SuiteConfig::load(None, self.profile).map_err(|err| err.to_string())
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Reads an environment variable and rejects empty values.
///
/// # Errors
///
/// Returns an error when the variable is set but empty or whitespace.
fn read_env_nonempty(name: &str) -> Result<Option<String>, String> {
    match read_env_strict(name)? {
        Some(value) if value.trim().is_empty() => Err(format!("{name} must not be empty")),
        Some(value) => Ok(Some(value)),
        None => Ok(None),
    }
}

/// Parses a profile name.
fn parse_profile(name: &str, raw: &str) -> Result<Profile, String> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "local" => Ok(Profile::Local),
        "remote" => Ok(Profile::Remote),
        _ => Err(format!("{name} must be local or remote")),
    }
}

/// Parses a positive timeout value from an environment variable string.
///
/// # Errors
///
/// Returns an error when the value is missing, non-numeric, or zero.
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
