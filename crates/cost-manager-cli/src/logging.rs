// crates/cost-manager-cli/src/logging.rs
// ============================================================================
// Module: CLI Logging
// Description: Tracing subscriber installation for the conformance CLI.
// Purpose: Route structured logs to stderr under an environment filter.
// Dependencies: tracing-subscriber
// ============================================================================

use tracing_subscriber::EnvFilter;

use crate::CliError;
use crate::CliResult;

/// Builds the log filter: `RUST_LOG` when set, otherwise `level`.
pub(crate) fn filter(rust_log: Option<&str>, level: &str) -> CliResult<EnvFilter> {
    let directives = rust_log.filter(|value| !value.trim().is_empty()).unwrap_or(level);
    EnvFilter::try_new(directives)
        .map_err(|err| CliError::config(format!("invalid log filter `{directives}`: {err}")))
}

/// Installs the global subscriber writing to stderr.
pub(crate) fn init(level: &str) -> CliResult<()> {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    tracing_subscriber::fmt()
        .with_env_filter(filter(rust_log.as_deref(), level)?)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|err| CliError::runtime(format!("failed to install log subscriber: {err}")))
}
