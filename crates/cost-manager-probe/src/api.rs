// crates/cost-manager-probe/src/api.rs
// ============================================================================
// Module: Cost Manager API
// Description: One method per endpoint of the four cost-manager services.
// Purpose: Keep routes and request bodies in one place.
// Dependencies: cost-manager-contract, reqwest, serde_json
// ============================================================================

//! ## Overview
//! [`CostManagerApi`] owns a [`ServiceClient`] per service, all sharing one
//! connection pool. Methods return the raw [`HttpReply`]; callers decide
//! which statuses and shapes are acceptable.

// ============================================================================
// SECTION: Imports
// ============================================================================

use cost_manager_contract::CostSubmission;
use cost_manager_contract::NewUser;
use cost_manager_contract::ReportQuery;
use serde_json::Value;
use serde_json::json;

use crate::ConfigError;
use crate::HttpReply;
use crate::RetryPolicy;
use crate::ServiceClient;
use crate::ServiceEndpoints;
use crate::ServiceKind;
use crate::Slash;
use crate::TransportError;

// ============================================================================
// SECTION: Routes
// ============================================================================

/// Creation route on the users and costs services.
const ADD: &str = "/api/add";
/// User list; `/{id}` appended for details.
const USERS: &str = "/api/users";
/// Monthly report.
const REPORT: &str = "/api/report";
/// Request logs.
const LOGS: &str = "/api/logs";
/// Team members.
const ABOUT: &str = "/api/about";
/// User deletion.
const REMOVE_USER: &str = "/removeuser";
/// Cost deletion by `_id`.
const REMOVE_COST: &str = "/removecost";
/// Report deletion by user and month.
const REMOVE_REPORT: &str = "/removereport";

// ============================================================================
// SECTION: API
// ============================================================================

/// Clients for the users, costs, logs, and admin services.
#[derive(Debug, Clone)]
pub struct CostManagerApi {
    /// Users service.
    users: ServiceClient,
    /// Costs service.
    costs: ServiceClient,
    /// Logs service.
    logs: ServiceClient,
    /// Admin service.
    admin: ServiceClient,
}

impl CostManagerApi {
    /// Builds the four clients.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when an endpoint is missing or the
    /// HTTP client cannot be built.
    pub fn new(endpoints: &ServiceEndpoints, retry: RetryPolicy) -> Result<Self, ConfigError> {
        let http = reqwest::Client::builder()
            .timeout(retry.timeout)
            .build()
            .map_err(|err| ConfigError::Invalid(format!("failed to build http client: {err}")))?;
        let client = |kind: ServiceKind| -> Result<ServiceClient, ConfigError> {
            let base = endpoints.require(kind)?.clone();
            Ok(ServiceClient::new(kind.as_str(), base, http.clone(), retry))
        };
        Ok(Self {
            users: client(ServiceKind::Users)?,
            costs: client(ServiceKind::Costs)?,
            logs: client(ServiceKind::Logs)?,
            admin: client(ServiceKind::Admin)?,
        })
    }

    /// Returns the client of a service.
    #[must_use]
    pub const fn service(&self, kind: ServiceKind) -> &ServiceClient {
        match kind {
            ServiceKind::Users => &self.users,
            ServiceKind::Costs => &self.costs,
            ServiceKind::Logs => &self.logs,
            ServiceKind::Admin => &self.admin,
        }
    }

    // ------------------------------------------------------------------------
    // Users
    // ------------------------------------------------------------------------

    /// `POST /api/add` on the users service.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] when the service cannot be reached.
    pub async fn add_user(&self, user: &NewUser) -> Result<HttpReply, TransportError> {
        let body = json!({
            "id": user.id,
            "first_name": user.first_name,
            "last_name": user.last_name,
            "birthday": user.birthday,
        });
        self.users.post_json(ADD, &body).await
    }

    /// `GET /api/users`.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] when the service cannot be reached.
    pub async fn list_users(&self) -> Result<HttpReply, TransportError> {
        self.users.get(USERS, &[]).await
    }

    /// `GET /api/users/:id`.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] when the service cannot be reached.
    pub async fn get_user(&self, user_id: u64) -> Result<HttpReply, TransportError> {
        self.users.get(&format!("{USERS}/{user_id}"), &[]).await
    }

    /// `DELETE /removeuser` with `{id}`.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] when the service cannot be reached.
    pub async fn remove_user(&self, user_id: u64) -> Result<HttpReply, TransportError> {
        self.users.delete_json(REMOVE_USER, &json!({ "id": user_id })).await
    }

    // ------------------------------------------------------------------------
    // Costs
    // ------------------------------------------------------------------------

    /// `POST /api/add` on the costs service.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] when the service cannot be reached.
    pub async fn add_cost(
        &self,
        submission: &CostSubmission,
        slash: Slash,
    ) -> Result<HttpReply, TransportError> {
        self.add_cost_raw(&submission.to_body(), slash).await
    }

    /// `POST /api/add` on the costs service with an arbitrary body.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] when the service cannot be reached.
    pub async fn add_cost_raw(&self, body: &Value, slash: Slash) -> Result<HttpReply, TransportError> {
        self.costs.post_json(&slash.apply(ADD), body).await
    }

    /// `GET /api/report?id&year&month`.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] when the service cannot be reached.
    pub async fn get_report(
        &self,
        query: &ReportQuery,
        slash: Slash,
    ) -> Result<HttpReply, TransportError> {
        self.get_report_raw(&query.to_pairs(), slash).await
    }

    /// `GET /api/report` with arbitrary query pairs.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] when the service cannot be reached.
    pub async fn get_report_raw(
        &self,
        query: &[(&str, String)],
        slash: Slash,
    ) -> Result<HttpReply, TransportError> {
        self.costs.get(&slash.apply(REPORT), query).await
    }

    /// `DELETE /removereport` with `{user_id, year, month}`.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] when the service cannot be reached.
    pub async fn remove_report(&self, query: &ReportQuery) -> Result<HttpReply, TransportError> {
        let body = json!({ "user_id": query.id, "year": query.year, "month": query.month });
        self.costs.delete_json(REMOVE_REPORT, &body).await
    }

    /// `DELETE /removecost` with `{_id}`.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] when the service cannot be reached.
    pub async fn remove_cost(&self, cost_id: &str) -> Result<HttpReply, TransportError> {
        self.costs.delete_json(REMOVE_COST, &json!({ "_id": cost_id })).await
    }

    // ------------------------------------------------------------------------
    // Logs and Admin
    // ------------------------------------------------------------------------

    /// `GET /api/logs`.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] when the service cannot be reached.
    pub async fn list_logs(&self) -> Result<HttpReply, TransportError> {
        self.logs.get(LOGS, &[]).await
    }

    /// `GET /api/about`.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] when the service cannot be reached.
    pub async fn about(&self, slash: Slash) -> Result<HttpReply, TransportError> {
        self.admin.get(&slash.apply(ABOUT), &[]).await
    }
}
