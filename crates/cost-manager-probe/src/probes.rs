// crates/cost-manager-probe/src/probes.rs
// ============================================================================
// Module: Probe Catalog
// Description: Named HTTP scenarios asserting the cost-manager contract.
// Purpose: One function per scenario, selectable by a stable name.
// Dependencies: cost-manager-contract, serde, thiserror, tokio
// ============================================================================

//! ## Overview
//! Each [`ProbeId`] names a scenario: send one or more requests, then check
//! status and shape. Probes share state only through [`SuiteContext`], which
//! remembers the costs created so far.
//!
//! ## Invariants
//! - [`ProbeId::ALL`] is the execution order.
//! - Names are kebab-case and stable; the CLI and summaries use them.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::str::FromStr;

use cost_manager_contract::CostSubmission;
use cost_manager_contract::check_about;
use cost_manager_contract::check_cost_echo;
use cost_manager_contract::check_error_body;
use cost_manager_contract::check_log_growth;
use cost_manager_contract::check_log_list;
use cost_manager_contract::check_report;
use cost_manager_contract::check_report_growth;
use cost_manager_contract::check_user_details;
use cost_manager_contract::check_user_listed;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;
use tokio::time::sleep;
use tracing::debug;

use crate::HttpReply;
use crate::ProbeError;
use crate::Slash;
use crate::SuiteContext;

// ============================================================================
// SECTION: Status Sets
// ============================================================================

/// Statuses accepted for a successful read.
const OK: &[u16] = &[200];
/// Statuses accepted for a successful creation.
const CREATED: &[u16] = &[200, 201];
/// Statuses accepted for a rejected input.
const BAD_REQUEST: &[u16] = &[400];

// ============================================================================
// SECTION: Probe Identifiers
// ============================================================================

/// A named scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProbeId {
    /// `GET /api/users` lists the test user.
    UsersListed,
    /// `POST /api/add` on costs echoes the expense.
    CostAdded,
    /// `GET /api/report` has every category bucket.
    ReportComplete,
    /// `GET /api/users/:id` reports a large enough total.
    UserTotal,
    /// `GET /api/logs` returns a list.
    LogsListed,
    /// Log count never shrinks.
    LogsMonotonic,
    /// `GET /api/about` entries have exactly two fields.
    AboutMembers,
    /// `GET /api/about/` behaves like `GET /api/about`.
    AboutTrailingSlash,
    /// `POST /api/add/` behaves like `POST /api/add`.
    CostAddedTrailingSlash,
    /// `GET /api/report/` behaves like `GET /api/report`.
    ReportTrailingSlash,
    /// A new cost shows up in the next report.
    ReportReflectsNewCost,
    /// A cost without fields is rejected.
    RejectsMissingFields,
    /// A cost with an unknown category is rejected.
    RejectsInvalidCategory,
    /// A cost for an unknown user is rejected.
    RejectsUnknownUser,
    /// A report without query parameters is rejected.
    RejectsReportWithoutParams,
}

impl ProbeId {
    /// Every probe, in execution order.
    pub const ALL: [Self; 15] = [
        Self::UsersListed,
        Self::CostAdded,
        Self::ReportComplete,
        Self::UserTotal,
        Self::LogsListed,
        Self::LogsMonotonic,
        Self::AboutMembers,
        Self::AboutTrailingSlash,
        Self::CostAddedTrailingSlash,
        Self::ReportTrailingSlash,
        Self::ReportReflectsNewCost,
        Self::RejectsMissingFields,
        Self::RejectsInvalidCategory,
        Self::RejectsUnknownUser,
        Self::RejectsReportWithoutParams,
    ];

    /// Returns the stable name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::UsersListed => "users-listed",
            Self::CostAdded => "cost-added",
            Self::ReportComplete => "report-complete",
            Self::UserTotal => "user-total",
            Self::LogsListed => "logs-listed",
            Self::LogsMonotonic => "logs-monotonic",
            Self::AboutMembers => "about-members",
            Self::AboutTrailingSlash => "about-trailing-slash",
            Self::CostAddedTrailingSlash => "cost-added-trailing-slash",
            Self::ReportTrailingSlash => "report-trailing-slash",
            Self::ReportReflectsNewCost => "report-reflects-new-cost",
            Self::RejectsMissingFields => "rejects-missing-fields",
            Self::RejectsInvalidCategory => "rejects-invalid-category",
            Self::RejectsUnknownUser => "rejects-unknown-user",
            Self::RejectsReportWithoutParams => "rejects-report-without-params",
        }
    }

    /// Returns a one-line description.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::UsersListed => "GET /api/users returns a list containing the test user",
            Self::CostAdded => "POST /api/add on costs echoes userid, category, description, sum",
            Self::ReportComplete => "GET /api/report echoes the query and lists all five categories",
            Self::UserTotal => "GET /api/users/:id returns a total covering the costs added",
            Self::LogsListed => "GET /api/logs returns a list",
            Self::LogsMonotonic => "log count does not decrease across requests",
            Self::AboutMembers => "GET /api/about entries carry exactly first_name and last_name",
            Self::AboutTrailingSlash => "GET /api/about/ satisfies the about contract",
            Self::CostAddedTrailingSlash => "POST /api/add/ on costs satisfies the echo contract",
            Self::ReportTrailingSlash => "GET /api/report/ satisfies the report contract",
            Self::ReportReflectsNewCost => "a cost added between two reports appears in the second",
            Self::RejectsMissingFields => "a cost with only a user id is rejected with 400",
            Self::RejectsInvalidCategory => "a cost with category `other` is rejected with 400",
            Self::RejectsUnknownUser => "a cost for a nonexistent user is rejected with 400",
            Self::RejectsReportWithoutParams => "GET /api/report without a query is rejected with 400",
        }
    }

    /// Parses a stable name.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|probe| probe.as_str() == name)
    }
}

impl fmt::Display for ProbeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Name that matches no probe.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown probe `{0}`")]
pub struct UnknownProbe(pub String);

impl FromStr for ProbeId {
    type Err = UnknownProbe;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value).ok_or_else(|| UnknownProbe(value.to_string()))
    }
}

// ============================================================================
// SECTION: Dispatch
// ============================================================================

/// Runs one probe.
///
/// # Errors
///
/// Returns [`ProbeError`] when a request fails in transport or a reply
/// violates the contract.
pub async fn run_probe(probe: ProbeId, ctx: &mut SuiteContext) -> Result<(), ProbeError> {
    match probe {
        ProbeId::UsersListed => users_listed(ctx).await,
        ProbeId::CostAdded => cost_added(ctx, Slash::Bare).await,
        ProbeId::ReportComplete => report_complete(ctx, Slash::Bare).await,
        ProbeId::UserTotal => user_total(ctx).await,
        ProbeId::LogsListed => logs_listed(ctx).await.map(|_| ()),
        ProbeId::LogsMonotonic => logs_monotonic(ctx).await,
        ProbeId::AboutMembers => about_members(ctx, Slash::Bare).await,
        ProbeId::AboutTrailingSlash => about_members(ctx, Slash::Trailing).await,
        ProbeId::CostAddedTrailingSlash => cost_added(ctx, Slash::Trailing).await,
        ProbeId::ReportTrailingSlash => report_complete(ctx, Slash::Trailing).await,
        ProbeId::ReportReflectsNewCost => report_reflects_new_cost(ctx).await,
        ProbeId::RejectsMissingFields => {
            let body = ctx.fixtures.missing_fields_body();
            let reply = ctx.api.add_cost_raw(&body, Slash::Bare).await?;
            expect_rejection(&reply)
        }
        ProbeId::RejectsInvalidCategory => {
            let reply = ctx.api.add_cost(&ctx.fixtures.invalid_category(), Slash::Bare).await?;
            expect_rejection(&reply)
        }
        ProbeId::RejectsUnknownUser => {
            let reply = ctx.api.add_cost(&ctx.fixtures.unknown_user(), Slash::Bare).await?;
            expect_rejection(&reply)
        }
        ProbeId::RejectsReportWithoutParams => {
            let reply = ctx.api.get_report_raw(&[], Slash::Bare).await?;
            expect_rejection(&reply)
        }
    }
}

// ============================================================================
// SECTION: Probes
// ============================================================================

/// Lists users and looks for the test user.
async fn users_listed(ctx: &SuiteContext) -> Result<(), ProbeError> {
    let reply = ctx.api.list_users().await?;
    check_user_listed(reply.expect_status(OK)?.json()?, ctx.fixtures.user.id)?;
    Ok(())
}

/// Submits the fixture expense.
async fn cost_added(ctx: &mut SuiteContext, slash: Slash) -> Result<(), ProbeError> {
    let expense = ctx.fixtures.expense.clone();
    submit_cost(ctx, &expense, slash).await
}

/// Fetches the current month's report.
async fn report_complete(ctx: &SuiteContext, slash: Slash) -> Result<(), ProbeError> {
    let query = ctx.fixtures.report_query();
    let reply = ctx.api.get_report(&query, slash).await?;
    check_report(reply.expect_status(OK)?.json()?, &query)?;
    Ok(())
}

/// The user total must cover every cost this run created.
async fn user_total(ctx: &SuiteContext) -> Result<(), ProbeError> {
    let user_id = ctx.fixtures.user.id;
    let reply = ctx.api.get_user(user_id).await?;
    check_user_details(reply.expect_status(OK)?.json()?, user_id, ctx.added_total)?;
    Ok(())
}

/// Fetches the logs and returns their count.
async fn logs_listed(ctx: &SuiteContext) -> Result<usize, ProbeError> {
    let reply = ctx.api.list_logs().await?;
    Ok(check_log_list(reply.expect_status(OK)?.json()?)?)
}

/// Counts logs around an extra request.
async fn logs_monotonic(ctx: &SuiteContext) -> Result<(), ProbeError> {
    let before = logs_listed(ctx).await?;
    let extra = ctx.api.list_users().await?;
    debug!(status = extra.status, "extra request sent");
    sleep(ctx.settle_delay).await;
    let after = logs_listed(ctx).await?;
    check_log_growth(before, after)?;
    Ok(())
}

/// Fetches the team members.
async fn about_members(ctx: &SuiteContext, slash: Slash) -> Result<(), ProbeError> {
    let reply = ctx.api.about(slash).await?;
    check_about(reply.expect_status(OK)?.json()?)?;
    Ok(())
}

/// Chains report, add, report.
async fn report_reflects_new_cost(ctx: &mut SuiteContext) -> Result<(), ProbeError> {
    let query = ctx.fixtures.report_query();
    let before = ctx.api.get_report(&query, Slash::Bare).await?;
    let before = check_report(before.expect_status(OK)?.json()?, &query)?;
    let expense = ctx.fixtures.chained_expense();
    submit_cost(ctx, &expense, Slash::Bare).await?;
    let after = ctx.api.get_report(&query, Slash::Bare).await?;
    let after = check_report(after.expect_status(OK)?.json()?, &query)?;
    check_report_growth(&before, &after, ctx.fixtures.category, &expense.description)?;
    Ok(())
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Posts a cost, checks the echo, and records it in the context.
async fn submit_cost(
    ctx: &mut SuiteContext,
    expense: &CostSubmission,
    slash: Slash,
) -> Result<(), ProbeError> {
    let reply = ctx.api.add_cost(expense, slash).await?;
    let record = check_cost_echo(expense, reply.expect_status(CREATED)?.json()?, ctx.require_cost_id)?;
    ctx.record_cost(&record);
    Ok(())
}

/// A rejection is a 400 carrying `{id, message}`.
fn expect_rejection(reply: &HttpReply) -> Result<(), ProbeError> {
    check_error_body(reply.expect_status(BAD_REQUEST)?.json()?)?;
    Ok(())
}
