// crates/cost-manager-contract/src/lib.rs
// ============================================================================
// Module: Cost Manager Contract Library
// Description: Wire types and shape checks for the cost-manager REST contract.
// Purpose: Single source of truth for what the remote services must return.
// Dependencies: serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! `cost-manager-contract` models the request/response contract implied by the
//! cost-manager services (users, costs, logs, admin). It owns no I/O: every
//! check is a pure function over a decoded JSON body that either yields a
//! typed value or a [`ContractViolation`].
//!
//! Security posture: response bodies come from the services under test and are
//! treated as untrusted input; checks never panic on malformed shapes.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod category;
pub mod checks;
pub mod error;
pub mod report;
pub mod types;


// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use category::Category;
pub use category::UnknownCategory;
pub use checks::check_about;
pub use checks::check_cost_echo;
pub use checks::check_error_body;
pub use checks::check_log_growth;
pub use checks::check_log_list;
pub use checks::check_report;
pub use checks::check_report_growth;
pub use checks::check_user_details;
pub use checks::check_user_listed;
pub use checks::expect_list;
pub use checks::expect_status;
pub use error::ContractViolation;
pub use report::CategoryBuckets;
pub use report::MAX_REPORT_DAY;
pub use report::MIN_REPORT_DAY;
pub use report::MonthlyReport;
pub use report::ReportItem;
pub use report::ReportQuery;
pub use types::CostRecord;
pub use types::CostSubmission;
pub use types::ErrorBody;
pub use types::NewUser;
pub use types::TeamMember;
pub use types::UserDetails;
pub use types::UserIdField;
