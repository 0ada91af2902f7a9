// crates/cost-manager-cli/src/main_tests.rs
// ============================================================================
// Module: CLI Main Helpers Tests
// Description: Unit tests for argument parsing, flag layering, and rendering.
// Purpose: Ensure flags override the environment and outputs stay stable.
// Dependencies: cost-manager-cli main helpers, tempfile
// ============================================================================

//! ## Overview
//! Validates argument parsing, flag precedence, and output rendering.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    reason = "Test-only output and panic-based assertions are permitted."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::process::ExitCode;

use clap::Parser;
use cost_manager_probe::FailureKind;
use cost_manager_probe::ProbeId;
use cost_manager_probe::ProbeOutcome;
use cost_manager_probe::ProbeStatus;
use cost_manager_probe::Profile;
use cost_manager_probe::ServiceKind;
use cost_manager_probe::SuiteSummary;
use cost_manager_probe::config::EnvOverrides;
use time::Date;
use time::Month;
use url::Url;

use super::Cli;
use super::CliError;
use super::Commands;
use super::OutputFormat;
use super::ProfileArg;
use super::emit_error;
use super::layer_run_flags;
use super::logging;
use super::render_probe_list;
use super::render_summary;
use super::resolve_config;

// ============================================================================
// SECTION: Helpers
// ============================================================================

fn parse(args: &[&str]) -> Cli {
    Cli::try_parse_from(std::iter::once("cost-manager-conformance").chain(args.iter().copied()))
        .expect("arguments parse")
}

fn summary() -> SuiteSummary {
    SuiteSummary::new(
        10,
        40,
        vec![
            ProbeOutcome {
                probe: ProbeId::UsersListed,
                status: ProbeStatus::Passed,
                failure: None,
                message: None,
                duration_ms: 5,
            },
            ProbeOutcome {
                probe: ProbeId::LogsListed,
                status: ProbeStatus::Failed,
                failure: Some(FailureKind::Contract),
                message: Some("contract: logs is an empty list".to_string()),
                duration_ms: 7,
            },
        ],
    )
}

// ============================================================================
// SECTION: Parsing
// ============================================================================

#[test]
fn run_parses_repeated_probes_and_flags() {
    let cli = parse(&[
        "run",
        "--profile",
        "remote",
        "--users-url",
        "https://users.example.com",
        "--probe",
        "users-listed",
        "--probe",
        "about-members",
        "--teardown",
        "--format",
        "json",
    ]);
    assert_eq!(cli.log_level, "info");
    let Commands::Run(command) = cli.command else {
        panic!("expected run command");
    };
    assert_eq!(command.source.profile, Some(ProfileArg::Remote));
    assert_eq!(command.probes, vec![ProbeId::UsersListed, ProbeId::AboutMembers]);
    assert!(command.teardown);
    assert_eq!(command.format, OutputFormat::Json);
}

#[test]
fn unknown_probe_is_a_usage_error() {
    let result = Cli::try_parse_from(["cost-manager-conformance", "run", "--probe", "nope"]);
    let err = result.expect_err("unknown probe rejected");
    assert!(err.to_string().contains("unknown probe `nope`"), "{err}");
}

#[test]
fn date_flag_pins_the_fixture_date() {
    let cli = parse(&["run", "--date", "2026-03-31"]);
    let Commands::Run(command) = cli.command else {
        panic!("expected run command");
    };
    let expected = Date::from_calendar_date(2026, Month::March, 31).unwrap();
    assert_eq!(command.date, Some(expected));
    let Commands::Run(command) = parse(&["run"]).command else {
        panic!("expected run command");
    };
    assert_eq!(command.date, None);
}

#[test]
fn malformed_dates_are_usage_errors() {
    for value in ["2026-02-30", "2026-3", "31.03.2026", "2026-13-01"] {
        let result = Cli::try_parse_from(["cost-manager-conformance", "run", "--date", value]);
        let err = result.expect_err("malformed date rejected");
        assert!(err.to_string().contains("invalid date"), "{err}");
    }
}

#[test]
fn log_level_is_global() {
    let cli = parse(&["probes", "--log-level", "debug"]);
    assert_eq!(cli.log_level, "debug");
    assert!(matches!(cli.command, Commands::Probes));
}

// ============================================================================
// SECTION: Flag Layering
// ============================================================================

#[test]
fn url_flags_override_environment_urls() {
    let cli = parse(&["run", "--costs-url", "http://flag.test:9000"]);
    let Commands::Run(command) = cli.command else {
        panic!("expected run command");
    };
    let mut env = EnvOverrides {
        endpoints: vec![(ServiceKind::Costs, Url::parse("http://env.test:8000").unwrap())],
        ..EnvOverrides::default()
    };
    layer_run_flags(&command, &mut env);
    let config = resolve_config(&command.source, &env).unwrap();
    let costs = config.endpoints.get(ServiceKind::Costs).unwrap();
    assert_eq!(costs.as_str(), "http://flag.test:9000/");
}

#[test]
fn remote_profile_needs_every_url() {
    let cli = parse(&["config", "--profile", "remote", "--users-url", "https://u.example.com"]);
    let Commands::Config(command) = cli.command else {
        panic!("expected config command");
    };
    let mut env = EnvOverrides::default();
    super::layer_source_flags(&command.source, &mut env);
    let err = resolve_config(&command.source, &env).unwrap_err();
    assert_eq!(err.code, 2);
    assert!(err.to_string().contains("costs"), "{err}");
}

#[test]
fn run_flags_set_teardown_and_artifacts() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("suite.toml");
    fs::write(&config_path, "teardown = false\n").unwrap();
    let artifacts = dir.path().join("out");
    let cli = parse(&[
        "run",
        "--config",
        config_path.to_str().unwrap(),
        "--teardown",
        "--artifacts",
        artifacts.to_str().unwrap(),
    ]);
    let Commands::Run(command) = cli.command else {
        panic!("expected run command");
    };
    let mut env = EnvOverrides::default();
    layer_run_flags(&command, &mut env);
    let config = resolve_config(&command.source, &env).unwrap();
    assert_eq!(config.profile, Profile::Local);
    assert!(config.teardown);
    assert_eq!(config.artifacts_dir, Some(artifacts));
}

// ============================================================================
// SECTION: Rendering
// ============================================================================

#[test]
fn probe_list_has_one_line_per_probe() {
    let rendered = render_probe_list();
    let lines: Vec<&str> = rendered.lines().collect();
    assert_eq!(lines.len(), ProbeId::ALL.len());
    for (line, probe) in lines.iter().zip(ProbeId::ALL) {
        assert!(line.starts_with(probe.as_str()), "{line}");
        assert!(line.ends_with(probe.description()), "{line}");
    }
}

#[test]
fn json_summary_is_canonical() {
    let rendered = render_summary(&summary(), OutputFormat::Json).unwrap();
    assert!(rendered.starts_with(r#"{"ended_at_ms":40,"failed":1,"#), "{rendered}");
    assert!(!rendered.contains('\n'));
}

#[test]
fn text_summary_matches_library_rendering() {
    let summary = summary();
    assert_eq!(render_summary(&summary, OutputFormat::Text).unwrap(), summary.to_text());
}

// ============================================================================
// SECTION: Errors and Logging
// ============================================================================

#[test]
fn error_kinds_map_to_exit_codes() {
    assert_eq!(emit_error(&CliError::config("bad")), ExitCode::from(2));
    assert_eq!(emit_error(&CliError::runtime("io")), ExitCode::from(1));
}

#[test]
fn rust_log_takes_precedence_over_flag() {
    assert!(logging::filter(Some("cost_manager_probe=debug"), "info").is_ok());
    assert!(logging::filter(None, "warn").is_ok());
    assert!(logging::filter(Some("  "), "info").is_ok());
    let err = logging::filter(None, "probe=notalevel").unwrap_err();
    assert_eq!(err.code, 2);
}
