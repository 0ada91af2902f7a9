// crates/cost-manager-probe/src/suite.rs
// ============================================================================
// Module: Conformance Suite
// Description: Sequential runner with fixture setup and teardown.
// Purpose: Run selected probes in order and collect their outcomes.
// Dependencies: cost-manager-contract, time, tracing
// ============================================================================

//! ## Overview
//! [`ConformanceSuite::run`] provisions the fixture user, runs each selected
//! probe in catalog order, and optionally removes what the run created.
//! Setup and teardown requests go through [`safe_request`], so an unreachable
//! host during setup never turns into a contract failure by itself. A reply
//! with an unexpected status still fails setup in either mode.
//!
//! ## Invariants
//! - Exactly one outcome per selected probe, in [`ProbeId::ALL`] order.
//! - A failed setup marks every selected probe as a setup failure.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;
use std::time::Instant;

use cost_manager_contract::CostRecord;
use time::Date;
use tracing::Instrument;
use tracing::info;
use tracing::info_span;
use tracing::warn;

use crate::ConfigError;
use crate::CostManagerApi;
use crate::Fixtures;
use crate::HttpReply;
use crate::ProbeError;
use crate::ProbeId;
use crate::ProbeOutcome;
use crate::SetupMode;
use crate::SuiteConfig;
use crate::SuiteSummary;
use crate::probes::run_probe;
use crate::safe_request;
use crate::summary::now_millis;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Statuses tolerated when the fixture user may already exist.
const TOLERATED_SETUP: &[u16] = &[200, 201, 400, 409];
/// Statuses required when the fixture user was removed first.
const STRICT_SETUP: &[u16] = &[200, 201];

// ============================================================================
// SECTION: Context
// ============================================================================

/// State shared by the probes of one run.
#[derive(Debug, Clone)]
pub struct SuiteContext {
    /// Service clients.
    pub api: CostManagerApi,
    /// Inputs for this run.
    pub fixtures: Fixtures,
    /// Whether the cost echo must carry `_id`.
    pub require_cost_id: bool,
    /// Wait before re-reading logs.
    pub settle_delay: Duration,
    /// `_id` of every cost this run created.
    pub created_cost_ids: Vec<String>,
    /// Sum of every cost this run created.
    pub added_total: f64,
}

impl SuiteContext {
    /// Remembers a created cost for the total check and for teardown.
    pub fn record_cost(&mut self, record: &CostRecord) {
        self.added_total += record.sum;
        if let Some(id) = &record.id {
            self.created_cost_ids.push(id.clone());
        }
    }
}

// ============================================================================
// SECTION: Suite
// ============================================================================

/// A validated configuration ready to run.
#[derive(Debug, Clone)]
pub struct ConformanceSuite {
    /// Validated configuration.
    config: SuiteConfig,
    /// Date the fixtures carry.
    today: Date,
}

impl ConformanceSuite {
    /// Validates `config` and dates the fixtures today (UTC).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when the configuration is invalid.
    pub fn new(config: SuiteConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            today: Fixtures::today_utc(),
        })
    }

    /// Overrides the date the fixtures carry.
    #[must_use]
    pub const fn with_today(mut self, today: Date) -> Self {
        self.today = today;
        self
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &SuiteConfig {
        &self.config
    }

    /// Runs the selected probes; an empty selection runs all of them.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the HTTP clients cannot be built. Probe
    /// failures are reported in the summary, not as errors.
    pub async fn run(&self, selection: &[ProbeId]) -> Result<SuiteSummary, ConfigError> {
        let started_at_ms = now_millis();
        let mut ctx = SuiteContext {
            api: CostManagerApi::new(&self.config.endpoints, self.config.retry)?,
            fixtures: Fixtures::new(&self.config.fixture, self.config.user_id_field, self.today),
            require_cost_id: self.config.require_cost_id,
            settle_delay: self.config.settle_delay,
            created_cost_ids: Vec::new(),
            added_total: 0.0,
        };
        let probes = select(selection);
        info!(
            profile = self.config.profile.as_str(),
            probes = probes.len(),
            user_id = ctx.fixtures.user.id,
            "starting conformance run"
        );

        let setup = self.setup(&ctx).await;
        let mut outcomes = Vec::with_capacity(probes.len());
        for probe in probes {
            let start = Instant::now();
            let result = match &setup {
                Ok(()) => {
                    let span = info_span!("probe", name = probe.as_str());
                    run_probe(probe, &mut ctx).instrument(span).await
                }
                Err(message) => Err(ProbeError::Setup(message.clone())),
            };
            let duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
            match &result {
                Ok(()) => info!(probe = probe.as_str(), duration_ms, "probe passed"),
                Err(err) => warn!(probe = probe.as_str(), duration_ms, error = %err, "probe failed"),
            }
            outcomes.push(ProbeOutcome::from_result(probe, &result, duration_ms));
        }

        if self.config.teardown {
            teardown(&ctx).await;
        }
        let summary = SuiteSummary::new(started_at_ms, now_millis(), outcomes);
        info!(passed = summary.passed, failed = summary.failed, "conformance run finished");
        Ok(summary)
    }

    /// Provisions the fixture user.
    async fn setup(&self, ctx: &SuiteContext) -> Result<(), String> {
        let user = &ctx.fixtures.user;
        match self.config.setup {
            SetupMode::Tolerant => {
                match safe_request(ctx.api.add_user(user)).await {
                    Some(reply) => require_setup_status(&reply, TOLERATED_SETUP),
                    None => Ok(()),
                }
            }
            SetupMode::Strict => {
                let _ = safe_request(ctx.api.remove_user(user.id)).await;
                let reply = ctx
                    .api
                    .add_user(user)
                    .await
                    .map_err(|err| format!("creating fixture user: {err}"))?;
                require_setup_status(&reply, STRICT_SETUP)
            }
        }
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Returns the selected probes in catalog order, without duplicates.
fn select(selection: &[ProbeId]) -> Vec<ProbeId> {
    if selection.is_empty() {
        return ProbeId::ALL.to_vec();
    }
    ProbeId::ALL.into_iter().filter(|probe| selection.contains(probe)).collect()
}

/// Fails setup unless the fixture user reply has one of `allowed`.
fn require_setup_status(reply: &HttpReply, allowed: &[u16]) -> Result<(), String> {
    if allowed.contains(&reply.status) {
        return Ok(());
    }
    warn!(status = reply.status, "unexpected status creating fixture user");
    Err(format!("creating fixture user: {} returned status {}", reply.endpoint(), reply.status))
}

/// Removes the month's report, the created costs, and the fixture user.
async fn teardown(ctx: &SuiteContext) {
    let query = ctx.fixtures.report_query();
    let _ = safe_request(ctx.api.remove_report(&query)).await;
    for cost_id in &ctx.created_cost_ids {
        let _ = safe_request(ctx.api.remove_cost(cost_id)).await;
    }
    let _ = safe_request(ctx.api.remove_user(ctx.fixtures.user.id)).await;
    info!(costs = ctx.created_cost_ids.len(), "teardown finished");
}
