// system-tests/tests/suites/live.rs
// ============================================================================
// Module: Live Deployment Tests
// Description: Conformance runs against a real cost-manager deployment.
// Purpose: Validate the REST contract end to end on running services.
// Dependencies: system-tests, cost-manager-probe, tokio
// ============================================================================

//! ## Overview
//! Conformance runs against a real cost-manager deployment.
//! Invariants:
//! - Services are polled until ready before any probe runs.
//! - Failures are recorded in artifacts before the test fails.

use cost_manager_probe::ConformanceSuite;
use cost_manager_probe::CostManagerApi;
use cost_manager_probe::ProbeId;
use cost_manager_probe::SuiteConfig;
use cost_manager_probe::SuiteSummary;
use system_tests::config::SystemTestConfig;

use crate::helpers::artifacts::LiveRunRecord;
use crate::helpers::readiness::DEFAULT_READY_TIMEOUT;
use crate::helpers::readiness::wait_for_services_ready;

type TestResult = Result<(), Box<dyn std::error::Error>>;

/// Loads the live configuration and waits for every service.
async fn ready_config() -> Result<SuiteConfig, Box<dyn std::error::Error>> {
    let env = SystemTestConfig::load()?;
    let config = env.suite_config()?;
    let api = CostManagerApi::new(&config.endpoints, config.retry)?;
    wait_for_services_ready(&api, env.ready_timeout.unwrap_or(DEFAULT_READY_TIMEOUT)).await?;
    Ok(config)
}

/// Records the run, then fails on any failed probe.
fn report(record: &mut LiveRunRecord, summary: &SuiteSummary) -> TestResult {
    record.record(summary)?;
    if summary.is_success() {
        Ok(())
    } else {
        Err(format!("live conformance failed:\n{}", summary.to_text()).into())
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn live_deployment_passes_every_probe() -> TestResult {
    let mut record = LiveRunRecord::open("live_deployment_passes_every_probe")?;
    let config = ready_config().await?;
    let summary = ConformanceSuite::new(config)?.run(&[]).await?;
    report(&mut record, &summary)
}

#[tokio::test(flavor = "multi_thread")]
async fn live_deployment_rejects_invalid_input() -> TestResult {
    let mut record = LiveRunRecord::open("live_deployment_rejects_invalid_input")?;
    let mut config = ready_config().await?;
    config.teardown = true;
    let selection = [
        ProbeId::RejectsMissingFields,
        ProbeId::RejectsInvalidCategory,
        ProbeId::RejectsUnknownUser,
        ProbeId::RejectsReportWithoutParams,
    ];
    let summary = ConformanceSuite::new(config)?.run(&selection).await?;
    report(&mut record, &summary)
}
