// crates/cost-manager-probe/src/config/suite.rs
// ============================================================================
// Module: Suite Configuration Model
// Description: Profiles, endpoints, fixtures, and TOML loading for the suite.
// Purpose: Provide strict, fail-closed configuration parsing with hard limits.
// Dependencies: cost-manager-contract, serde, toml, url
// ============================================================================

//! ## Overview
//! [`SuiteConfig`] is the resolved configuration. [`ConfigFile`] is its TOML
//! form: every field optional, unknown fields rejected. Loading reads at most
//! [`MAX_CONFIG_FILE_SIZE`] bytes of UTF-8.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use cost_manager_contract::Category;
use cost_manager_contract::UserIdField;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;
use url::Url;

use crate::RetryPolicy;
use crate::config::EnvOverrides;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum configuration file size in bytes.
pub const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Upper bound for backoff and settle delays.
pub const MAX_DELAY: Duration = Duration::from_secs(60);
/// Delay that lets asynchronous request logging land before re-reading logs.
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(300);

// ============================================================================
// SECTION: Enums
// ============================================================================

/// Base set of defaults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    /// Services on `localhost:3001..=3004`; single attempt; tolerant setup.
    #[default]
    Local,
    /// Cold-starting hosted services; retries; strict setup and teardown.
    Remote,
}

impl Profile {
    /// Returns the profile name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Remote => "remote",
        }
    }
}

/// How the fixture user is provisioned before the probes run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SetupMode {
    /// Create the user, accepting an already-existing one; ignore transport errors.
    #[default]
    Tolerant,
    /// Remove the user, then create it; creation must succeed.
    Strict,
}

/// One of the four services under test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ServiceKind {
    /// User management.
    Users,
    /// Cost tracking and reports.
    Costs,
    /// Request logs.
    Logs,
    /// Admin and about.
    Admin,
}

impl ServiceKind {
    /// Every service.
    pub const ALL: [Self; 4] = [Self::Users, Self::Costs, Self::Logs, Self::Admin];

    /// Returns the service name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Users => "users",
            Self::Costs => "costs",
            Self::Logs => "logs",
            Self::Admin => "admin",
        }
    }

    /// Port the service listens on in a local deployment.
    #[must_use]
    pub const fn local_port(self) -> u16 {
        match self {
            Self::Users => 3001,
            Self::Costs => 3002,
            Self::Logs => 3003,
            Self::Admin => 3004,
        }
    }
}

// ============================================================================
// SECTION: Endpoints and Fixtures
// ============================================================================

/// Base URL of each service. Unset entries fail validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceEndpoints {
    /// Users service.
    pub users: Option<Url>,
    /// Costs service.
    pub costs: Option<Url>,
    /// Logs service.
    pub logs: Option<Url>,
    /// Admin service.
    pub admin: Option<Url>,
}

impl ServiceEndpoints {
    /// Endpoints of a local deployment.
    #[must_use]
    pub fn local() -> Self {
        let mut endpoints = Self::default();
        for kind in ServiceKind::ALL {
            let url = Url::parse(&format!("http://localhost:{}", kind.local_port())).ok();
            if let Some(url) = url {
                endpoints.set(kind, url);
            }
        }
        endpoints
    }

    /// Returns the URL of a service, if configured.
    #[must_use]
    pub const fn get(&self, kind: ServiceKind) -> Option<&Url> {
        match kind {
            ServiceKind::Users => self.users.as_ref(),
            ServiceKind::Costs => self.costs.as_ref(),
            ServiceKind::Logs => self.logs.as_ref(),
            ServiceKind::Admin => self.admin.as_ref(),
        }
    }

    /// Sets the URL of a service.
    pub fn set(&mut self, kind: ServiceKind, url: Url) {
        let slot = match kind {
            ServiceKind::Users => &mut self.users,
            ServiceKind::Costs => &mut self.costs,
            ServiceKind::Logs => &mut self.logs,
            ServiceKind::Admin => &mut self.admin,
        };
        *slot = Some(url);
    }

    /// Returns the URL of a service.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when the service is not configured.
    pub fn require(&self, kind: ServiceKind) -> Result<&Url, ConfigError> {
        self.get(kind).ok_or_else(|| {
            ConfigError::Invalid(format!(
                "endpoint `{}` is not configured (set [endpoints].{} or the matching environment variable)",
                kind.as_str(),
                kind.as_str()
            ))
        })
    }
}

/// Test user and expense submitted by the suite.
#[derive(Debug, Clone, PartialEq)]
pub struct FixtureConfig {
    /// Id of the test user.
    pub user_id: u64,
    /// Given name of the test user.
    pub first_name: String,
    /// Family name of the test user.
    pub last_name: String,
    /// Birthday of the test user, `YYYY-MM-DD`.
    pub birthday: String,
    /// Id guaranteed not to exist on the users service.
    pub unknown_user_id: u64,
    /// Description of the fixture expense.
    pub description: String,
    /// Category of the fixture expense.
    pub category: Category,
    /// Amount of the fixture expense.
    pub sum: f64,
}

impl Default for FixtureConfig {
    fn default() -> Self {
        Self {
            user_id: 111_111,
            first_name: "bot".to_string(),
            last_name: "bot".to_string(),
            birthday: "1999-03-12".to_string(),
            unknown_user_id: 9_999_998,
            description: "test-food".to_string(),
            category: Category::Food,
            sum: 100.0,
        }
    }
}

// ============================================================================
// SECTION: Suite Configuration
// ============================================================================

/// Resolved suite configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct SuiteConfig {
    /// Profile the defaults came from.
    pub profile: Profile,
    /// Service base URLs.
    pub endpoints: ServiceEndpoints,
    /// Timeout and retry bounds applied to every request.
    pub retry: RetryPolicy,
    /// Fixture provisioning mode.
    pub setup: SetupMode,
    /// Fixture values.
    pub fixture: FixtureConfig,
    /// Field name carrying the user id on cost submissions.
    pub user_id_field: UserIdField,
    /// Whether the cost echo must carry `_id`.
    pub require_cost_id: bool,
    /// Whether to delete fixture data after the run.
    pub teardown: bool,
    /// Wait before re-reading logs.
    pub settle_delay: Duration,
    /// Directory for `summary.json` and `summary.md`.
    pub artifacts_dir: Option<PathBuf>,
}

impl Default for SuiteConfig {
    fn default() -> Self {
        Self::for_profile(Profile::Local)
    }
}

impl SuiteConfig {
    /// Returns the defaults of a profile.
    #[must_use]
    pub fn for_profile(profile: Profile) -> Self {
        match profile {
            Profile::Local => Self {
                profile,
                endpoints: ServiceEndpoints::local(),
                retry: RetryPolicy::default(),
                setup: SetupMode::Tolerant,
                fixture: FixtureConfig::default(),
                user_id_field: UserIdField::UserId,
                require_cost_id: false,
                teardown: false,
                settle_delay: DEFAULT_SETTLE_DELAY,
                artifacts_dir: None,
            },
            Profile::Remote => Self {
                profile,
                endpoints: ServiceEndpoints::default(),
                retry: RetryPolicy::cold_start(),
                setup: SetupMode::Strict,
                fixture: FixtureConfig::default(),
                user_id_field: UserIdField::UserId,
                require_cost_id: true,
                teardown: true,
                settle_delay: DEFAULT_SETTLE_DELAY,
                artifacts_dir: None,
            },
        }
    }

    /// Loads configuration from an optional file and the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the environment, the file, or the
    /// resulting configuration is invalid.
    pub fn load(path: Option<&Path>, profile: Option<Profile>) -> Result<Self, ConfigError> {
        let env = EnvOverrides::load()?;
        Self::load_with(path, profile, &env)
    }

    /// Loads configuration with explicit environment overrides.
    ///
    /// The file path falls back to `COST_MANAGER_CONFIG`; without either, the
    /// profile defaults are used. An explicit `profile` wins over the file's.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the file or the resulting configuration
    /// is invalid.
    pub fn load_with(
        path: Option<&Path>,
        profile: Option<Profile>,
        env: &EnvOverrides,
    ) -> Result<Self, ConfigError> {
        let path = path.map(Path::to_path_buf).or_else(|| env.config_path.clone());
        let file = path.as_deref().map(ConfigFile::read).transpose()?;
        let profile = profile
            .or_else(|| file.as_ref().and_then(|file| file.profile))
            .unwrap_or_default();
        let mut config = Self::for_profile(profile);
        if let Some(file) = file {
            file.apply(&mut config)?;
        }
        env.apply(&mut config);
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first offending setting.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for kind in ServiceKind::ALL {
            let url = self.endpoints.require(kind)?;
            check_scheme(kind, url)?;
        }
        if self.retry.attempts == 0 {
            return Err(invalid("retry.attempts must be at least 1"));
        }
        if self.retry.timeout.is_zero() {
            return Err(invalid("retry.timeout_ms must be greater than zero"));
        }
        if self.retry.backoff > MAX_DELAY {
            return Err(invalid("retry.backoff_ms must not exceed 60000"));
        }
        if self.settle_delay > MAX_DELAY {
            return Err(invalid("settle_delay_ms must not exceed 60000"));
        }
        let fixture = &self.fixture;
        let names = [
            ("fixture.first_name", &fixture.first_name),
            ("fixture.last_name", &fixture.last_name),
            ("fixture.birthday", &fixture.birthday),
            ("fixture.description", &fixture.description),
        ];
        for (name, value) in names {
            if value.trim().is_empty() {
                return Err(invalid(&format!("{name} must not be empty")));
            }
        }
        if fixture.unknown_user_id == fixture.user_id {
            return Err(invalid("fixture.unknown_user_id must differ from fixture.user_id"));
        }
        if !fixture.sum.is_finite() || fixture.sum < 0.0 {
            return Err(invalid("fixture.sum must be a finite, non-negative number"));
        }
        Ok(())
    }

    /// Returns the TOML form of the configuration.
    #[must_use]
    pub fn to_file(&self) -> ConfigFile {
        let endpoint = |kind| self.endpoints.get(kind).map(ToString::to_string);
        ConfigFile {
            profile: Some(self.profile),
            setup: Some(self.setup),
            teardown: Some(self.teardown),
            require_cost_id: Some(self.require_cost_id),
            user_id_field: Some(self.user_id_field),
            settle_delay_ms: Some(millis(self.settle_delay)),
            artifacts_dir: self.artifacts_dir.clone(),
            endpoints: Some(EndpointsFile {
                users: endpoint(ServiceKind::Users),
                costs: endpoint(ServiceKind::Costs),
                logs: endpoint(ServiceKind::Logs),
                admin: endpoint(ServiceKind::Admin),
            }),
            retry: Some(RetryFile {
                attempts: Some(self.retry.attempts),
                backoff_ms: Some(millis(self.retry.backoff)),
                timeout_ms: Some(millis(self.retry.timeout)),
            }),
            fixture: Some(FixtureFile {
                user_id: Some(self.fixture.user_id),
                first_name: Some(self.fixture.first_name.clone()),
                last_name: Some(self.fixture.last_name.clone()),
                birthday: Some(self.fixture.birthday.clone()),
                unknown_user_id: Some(self.fixture.unknown_user_id),
                description: Some(self.fixture.description.clone()),
                category: Some(self.fixture.category),
                sum: Some(self.fixture.sum),
            }),
        }
    }

    /// Renders the configuration as TOML.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] when serialization fails.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string(&self.to_file()).map_err(|err| ConfigError::Parse(err.to_string()))
    }
}

// ============================================================================
// SECTION: File Form
// ============================================================================

/// TOML form of [`SuiteConfig`]. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Base profile.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<Profile>,
    /// Fixture provisioning mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub setup: Option<SetupMode>,
    /// Delete fixture data after the run.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub teardown: Option<bool>,
    /// Require `_id` in the cost echo.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub require_cost_id: Option<bool>,
    /// `userid` or `user_id`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id_field: Option<UserIdField>,
    /// Wait before re-reading logs, in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settle_delay_ms: Option<u64>,
    /// Artifact output directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artifacts_dir: Option<PathBuf>,
    /// `[endpoints]` table.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoints: Option<EndpointsFile>,
    /// `[retry]` table.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry: Option<RetryFile>,
    /// `[fixture]` table.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixture: Option<FixtureFile>,
}

/// `[endpoints]` table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EndpointsFile {
    /// Users service base URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub users: Option<String>,
    /// Costs service base URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub costs: Option<String>,
    /// Logs service base URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logs: Option<String>,
    /// Admin service base URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin: Option<String>,
}

/// `[retry]` table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RetryFile {
    /// Total attempts per request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attempts: Option<u32>,
    /// Delay between attempts, in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backoff_ms: Option<u64>,
    /// Per-attempt timeout, in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
}

/// `[fixture]` table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FixtureFile {
    /// Test user id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<u64>,
    /// Test user given name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    /// Test user family name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    /// Test user birthday.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birthday: Option<String>,
    /// Id that must not exist.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unknown_user_id: Option<u64>,
    /// Expense description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Expense category.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    /// Expense amount.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sum: Option<f64>,
}

impl ConfigFile {
    /// Reads and parses a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the file cannot be read, exceeds
    /// [`MAX_CONFIG_FILE_SIZE`], is not UTF-8, or is not valid TOML for this
    /// schema.
    pub fn read(path: &Path) -> Result<Self, ConfigError> {
        let bytes = fs::read(path).map_err(|err| ConfigError::Io(format!("{}: {err}", path.display())))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(invalid("config file exceeds size limit"));
        }
        let content =
            std::str::from_utf8(&bytes).map_err(|_| invalid("config file must be utf-8"))?;
        Self::parse(content)
    }

    /// Parses TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] on syntax errors or unknown fields.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))
    }

    /// Applies every set field onto `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when an endpoint is not a valid URL.
    pub fn apply(self, config: &mut SuiteConfig) -> Result<(), ConfigError> {
        if let Some(setup) = self.setup {
            config.setup = setup;
        }
        if let Some(teardown) = self.teardown {
            config.teardown = teardown;
        }
        if let Some(require_cost_id) = self.require_cost_id {
            config.require_cost_id = require_cost_id;
        }
        if let Some(field) = self.user_id_field {
            config.user_id_field = field;
        }
        if let Some(settle) = self.settle_delay_ms {
            config.settle_delay = Duration::from_millis(settle);
        }
        if let Some(dir) = self.artifacts_dir {
            config.artifacts_dir = Some(dir);
        }
        if let Some(endpoints) = self.endpoints {
            let entries = [
                (ServiceKind::Users, endpoints.users),
                (ServiceKind::Costs, endpoints.costs),
                (ServiceKind::Logs, endpoints.logs),
                (ServiceKind::Admin, endpoints.admin),
            ];
            for (kind, raw) in entries {
                if let Some(raw) = raw {
                    config.endpoints.set(kind, parse_url(kind, &raw)?);
                }
            }
        }
        if let Some(retry) = self.retry {
            if let Some(attempts) = retry.attempts {
                config.retry.attempts = attempts;
            }
            if let Some(backoff) = retry.backoff_ms {
                config.retry.backoff = Duration::from_millis(backoff);
            }
            if let Some(timeout) = retry.timeout_ms {
                config.retry.timeout = Duration::from_millis(timeout);
            }
        }
        if let Some(fixture) = self.fixture {
            fixture.apply(&mut config.fixture);
        }
        Ok(())
    }
}

impl FixtureFile {
    /// Applies every set field onto `fixture`.
    fn apply(self, fixture: &mut FixtureConfig) {
        if let Some(user_id) = self.user_id {
            fixture.user_id = user_id;
        }
        if let Some(first_name) = self.first_name {
            fixture.first_name = first_name;
        }
        if let Some(last_name) = self.last_name {
            fixture.last_name = last_name;
        }
        if let Some(birthday) = self.birthday {
            fixture.birthday = birthday;
        }
        if let Some(unknown_user_id) = self.unknown_user_id {
            fixture.unknown_user_id = unknown_user_id;
        }
        if let Some(description) = self.description {
            fixture.description = description;
        }
        if let Some(category) = self.category {
            fixture.category = category;
        }
        if let Some(sum) = self.sum {
            fixture.sum = sum;
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration loading or validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Parses a service base URL and checks its scheme.
pub(crate) fn parse_url(kind: ServiceKind, raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw.trim())
        .map_err(|err| invalid(&format!("endpoint `{}` is not a valid URL: {err}", kind.as_str())))?;
    check_scheme(kind, &url)?;
    Ok(url)
}

/// Rejects anything but `http` and `https`.
fn check_scheme(kind: ServiceKind, url: &Url) -> Result<(), ConfigError> {
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(invalid(&format!(
            "endpoint `{}` must use http or https, not `{other}`",
            kind.as_str()
        ))),
    }
}

/// Builds a [`ConfigError::Invalid`].
fn invalid(message: &str) -> ConfigError {
    ConfigError::Invalid(message.to_string())
}

/// Converts a duration to whole milliseconds, saturating.
fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
