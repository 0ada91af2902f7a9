// crates/cost-manager-cli/src/main.rs
// ============================================================================
// Module: Cost Manager Conformance CLI Entry Point
// Description: Command dispatcher for conformance runs against cost-manager services.
// Purpose: Load configuration, run the suite, and report results with exit codes.
// Dependencies: clap, cost-manager-probe, serde_jcs, thiserror, time, tokio, tracing-subscriber
// ============================================================================

//! ## Overview
//! `cost-manager-conformance` resolves a [`SuiteConfig`] from a TOML file, the
//! `COST_MANAGER_*` environment, and command-line flags (in increasing
//! precedence), runs the selected probes, and prints the summary.
//!
//! Exit codes: `0` when every probe passed, `1` when any probe failed or an
//! output could not be written, `2` when the configuration is invalid.
//! Logs go to stderr; stdout carries results only.

// ============================================================================
// SECTION: Modules
// ============================================================================

mod logging;
#[cfg(test)]
mod main_tests;

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Args;
use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;
use cost_manager_probe::ConformanceSuite;
use cost_manager_probe::ProbeId;
use cost_manager_probe::Profile;
use cost_manager_probe::ServiceKind;
use cost_manager_probe::SuiteConfig;
use cost_manager_probe::SuiteSummary;
use cost_manager_probe::config::EnvOverrides;
use thiserror::Error;
use time::Date;
use time::Month;
use tracing::info;
use url::Url;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Exit code for configuration errors.
const CONFIG_EXIT_CODE: u8 = 2;
/// Exit code for runtime and output errors.
const FAILURE_EXIT_CODE: u8 = 1;
/// Width of the probe name column in `probes` output.
const PROBE_NAME_WIDTH: usize = 30;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "cost-manager-conformance", version, disable_help_subcommand = true)]
struct Cli {
    /// Log filter used when `RUST_LOG` is unset.
    #[arg(long, value_name = "FILTER", default_value = "info", global = true)]
    log_level: String,
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Commands,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the conformance suite.
    Run(RunCommand),
    /// List probe names and what they check.
    Probes,
    /// Print the effective configuration as TOML.
    Config(ConfigCommand),
}

/// Where configuration comes from.
#[derive(Args, Debug, Default)]
struct SourceArgs {
    /// TOML configuration file (overrides `COST_MANAGER_CONFIG`).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Base profile (overrides the file's `profile`).
    #[arg(long, value_enum, value_name = "PROFILE")]
    profile: Option<ProfileArg>,
    /// Users service base URL.
    #[arg(long, value_name = "URL")]
    users_url: Option<Url>,
    /// Costs service base URL.
    #[arg(long, value_name = "URL")]
    costs_url: Option<Url>,
    /// Logs service base URL.
    #[arg(long, value_name = "URL")]
    logs_url: Option<Url>,
    /// Admin service base URL.
    #[arg(long, value_name = "URL")]
    admin_url: Option<Url>,
}

/// Arguments for `run`.
#[derive(Args, Debug)]
struct RunCommand {
    /// Configuration sources.
    #[command(flatten)]
    source: SourceArgs,
    /// Probe to run; repeat to select several. Defaults to all.
    #[arg(long = "probe", value_name = "NAME")]
    probes: Vec<ProbeId>,
    /// Delete fixture data after the run.
    #[arg(long)]
    teardown: bool,
    /// Directory for `summary.json` and `summary.md`.
    #[arg(long, value_name = "DIR")]
    artifacts: Option<PathBuf>,
    /// Date the fixtures carry, as `YYYY-MM-DD`. Defaults to today in UTC.
    #[arg(long, value_name = "DATE", value_parser = parse_date)]
    date: Option<Date>,
    /// Summary format on stdout.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

/// Arguments for `config`.
#[derive(Args, Debug)]
struct ConfigCommand {
    /// Configuration sources.
    #[command(flatten)]
    source: SourceArgs,
}

/// Profiles selectable on the command line.
#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
enum ProfileArg {
    /// Services on localhost ports 3001 to 3004.
    Local,
    /// Deployed services that may cold-start.
    Remote,
}

impl From<ProfileArg> for Profile {
    fn from(value: ProfileArg) -> Self {
        match value {
            ProfileArg::Local => Self::Local,
            ProfileArg::Remote => Self::Remote,
        }
    }
}

/// Output formats for the run summary.
#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
enum OutputFormat {
    /// One line per probe.
    Text,
    /// Canonical JSON.
    Json,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error carrying its exit code.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
    /// Process exit code.
    code: u8,
}

impl CliError {
    /// Configuration error (exit code 2).
    fn config(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: CONFIG_EXIT_CODE,
        }
    }

    /// Runtime or output error (exit code 1).
    fn runtime(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: FAILURE_EXIT_CODE,
        }
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
#[tokio::main(flavor = "multi_thread")]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(err) => emit_error(&err),
    }
}

/// Executes the CLI command dispatcher.
async fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();
    logging::init(&cli.log_level)?;
    match cli.command {
        Commands::Run(command) => command_run(command).await,
        Commands::Probes => command_probes(),
        Commands::Config(command) => command_config(&command),
    }
}

// ============================================================================
// SECTION: Commands
// ============================================================================

/// Executes the `run` command.
async fn command_run(command: RunCommand) -> CliResult<ExitCode> {
    let mut env = EnvOverrides::load().map_err(|err| CliError::config(err.to_string()))?;
    layer_run_flags(&command, &mut env);
    let config = resolve_config(&command.source, &env)?;
    let mut suite =
        ConformanceSuite::new(config).map_err(|err| CliError::config(err.to_string()))?;
    if let Some(date) = command.date {
        suite = suite.with_today(date);
    }
    let summary =
        suite.run(&command.probes).await.map_err(|err| CliError::config(err.to_string()))?;

    if let Some(dir) = &suite.config().artifacts_dir {
        let written = summary.write_artifacts(dir).map_err(|err| {
            CliError::runtime(format!("failed to write artifacts to {}: {err}", dir.display()))
        })?;
        for path in written {
            info!(path = %path.display(), "wrote artifact");
        }
    }
    write_stdout_line(&render_summary(&summary, command.format)?)?;
    Ok(if summary.is_success() { ExitCode::SUCCESS } else { ExitCode::from(FAILURE_EXIT_CODE) })
}

/// Executes the `probes` command.
fn command_probes() -> CliResult<ExitCode> {
    write_stdout_line(&render_probe_list())?;
    Ok(ExitCode::SUCCESS)
}

/// Executes the `config` command.
fn command_config(command: &ConfigCommand) -> CliResult<ExitCode> {
    let mut env = EnvOverrides::load().map_err(|err| CliError::config(err.to_string()))?;
    layer_source_flags(&command.source, &mut env);
    let config = resolve_config(&command.source, &env)?;
    let rendered = config.to_toml().map_err(|err| CliError::config(err.to_string()))?;
    write_stdout_line(rendered.trim_end())?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Loads the configuration with flags already layered onto `env`.
fn resolve_config(source: &SourceArgs, env: &EnvOverrides) -> CliResult<SuiteConfig> {
    SuiteConfig::load_with(source.config.as_deref(), source.profile.map(Profile::from), env)
        .map_err(|err| CliError::config(err.to_string()))
}

/// Layers URL flags over environment overrides.
fn layer_source_flags(source: &SourceArgs, env: &mut EnvOverrides) {
    let flags = [
        (ServiceKind::Users, &source.users_url),
        (ServiceKind::Costs, &source.costs_url),
        (ServiceKind::Logs, &source.logs_url),
        (ServiceKind::Admin, &source.admin_url),
    ];
    for (kind, url) in flags {
        if let Some(url) = url {
            env.endpoints.push((kind, url.clone()));
        }
    }
}

/// Layers every `run` flag over environment overrides.
fn layer_run_flags(command: &RunCommand, env: &mut EnvOverrides) {
    layer_source_flags(&command.source, env);
    if command.teardown {
        env.teardown = Some(true);
    }
    if let Some(dir) = &command.artifacts {
        env.artifacts_dir = Some(dir.clone());
    }
}

/// Parses a `YYYY-MM-DD` calendar date.
fn parse_date(value: &str) -> Result<Date, String> {
    let invalid = || format!("invalid date `{value}`, expected YYYY-MM-DD");
    let mut parts = value.splitn(3, '-');
    let (Some(year), Some(month), Some(day)) = (parts.next(), parts.next(), parts.next()) else {
        return Err(invalid());
    };
    let year: i32 = year.parse().map_err(|_| invalid())?;
    let month: u8 = month.parse().map_err(|_| invalid())?;
    let day: u8 = day.parse().map_err(|_| invalid())?;
    let month = Month::try_from(month).map_err(|_| invalid())?;
    Date::from_calendar_date(year, month, day).map_err(|err| format!("{}: {err}", invalid()))
}

// ============================================================================
// SECTION: Rendering
// ============================================================================

/// Renders the run summary in the requested format.
fn render_summary(summary: &SuiteSummary, format: OutputFormat) -> CliResult<String> {
    match format {
        OutputFormat::Text => Ok(summary.to_text()),
        OutputFormat::Json => {
            let bytes = serde_jcs::to_vec(summary).map_err(|err| {
                CliError::runtime(format!("failed to serialize summary: {err}"))
            })?;
            String::from_utf8(bytes)
                .map_err(|err| CliError::runtime(format!("summary is not utf-8: {err}")))
        }
    }
}

/// Renders probe names with their descriptions, one per line.
fn render_probe_list() -> String {
    ProbeId::ALL
        .iter()
        .map(|probe| {
            format!("{:<width$} {}", probe.as_str(), probe.description(), width = PROBE_NAME_WIDTH)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Writes a single line to stdout.
fn write_stdout_line(message: &str) -> CliResult<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
        .map_err(|err| CliError::runtime(format!("failed to write to stdout: {err}")))
}

/// Writes a single line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Emits an error message to stderr and returns its exit code.
fn emit_error(err: &CliError) -> ExitCode {
    let _ = write_stderr_line(&format!("error: {err}"));
    ExitCode::from(err.code)
}
