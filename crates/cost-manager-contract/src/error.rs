// crates/cost-manager-contract/src/error.rs
// ============================================================================
// Module: Contract Violations
// Description: Error type for responses that deviate from the expected contract.
// Purpose: Describe every shape or status mismatch in one line.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! A [`ContractViolation`] means the service answered, but answered wrongly.
//! Violations are always fatal to the probe that observed them and are never
//! retried; transport failures live in the probe crate instead.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

use crate::Category;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// A response that does not satisfy the cost-manager contract.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ContractViolation {
    /// Status code outside the allowed set.
    #[error("{endpoint} returned status {actual}, expected one of {}", join_statuses(.expected))]
    UnexpectedStatus {
        /// Method and path of the request.
        endpoint: String,
        /// Accepted status codes.
        expected: Vec<u16>,
        /// Observed status code.
        actual: u16,
    },
    /// Body could not be interpreted at all.
    #[error("{endpoint} returned an unusable body: {reason}")]
    InvalidBody {
        /// Method and path of the request.
        endpoint: String,
        /// Why the body was rejected.
        reason: String,
    },
    /// Expected a JSON array.
    #[error("{what} is not a list")]
    NotAList {
        /// Description of the value.
        what: String,
    },
    /// Expected a non-empty JSON array.
    #[error("{what} is an empty list")]
    EmptyList {
        /// Description of the value.
        what: String,
    },
    /// Expected a JSON object.
    #[error("{what} is not an object")]
    NotAnObject {
        /// Description of the value.
        what: String,
    },
    /// Required field is absent.
    #[error("{what} is missing field `{field}`")]
    MissingField {
        /// Description of the enclosing value.
        what: String,
        /// Missing field name.
        field: String,
    },
    /// Field present but of the wrong JSON type.
    #[error("{what} field `{field}` is not {expected}")]
    WrongType {
        /// Description of the enclosing value.
        what: String,
        /// Offending field name.
        field: String,
        /// Expected JSON type.
        expected: &'static str,
    },
    /// Field present with a value other than the expected one.
    #[error("field `{field}` is {actual}, expected {expected}")]
    FieldMismatch {
        /// Offending field name.
        field: String,
        /// Expected value, rendered as JSON.
        expected: String,
        /// Observed value, rendered as JSON.
        actual: String,
    },
    /// One or more report buckets are absent.
    #[error("report is missing categories: {}", join_categories(.missing))]
    MissingCategories {
        /// Absent categories, in canonical order.
        missing: Vec<Category>,
    },
    /// Object key set differs from the exact expected set.
    #[error("{what} has keys [{}], expected exactly [{}]", .actual.join(", "), .expected.join(", "))]
    KeySetMismatch {
        /// Description of the object.
        what: String,
        /// Expected key names, sorted.
        expected: Vec<String>,
        /// Observed key names, sorted.
        actual: Vec<String>,
    },
    /// Report item day outside `1..=31`.
    #[error("report item in `{category}` has day {day}, expected 1..=31")]
    DayOutOfRange {
        /// Bucket holding the item.
        category: Category,
        /// Observed day.
        day: i64,
    },
    /// User total lower than the sum already recorded.
    #[error("user total {total} is below the recorded minimum {minimum}")]
    TotalBelowMinimum {
        /// Observed total.
        total: f64,
        /// Lower bound.
        minimum: f64,
    },
    /// Log list shrank between two reads.
    #[error("log count decreased from {before} to {after}")]
    LogCountDecreased {
        /// Count before.
        before: usize,
        /// Count after.
        after: usize,
    },
    /// User list does not contain the fixture user.
    #[error("user {user_id} is not in the user list")]
    UserMissing {
        /// Expected user id.
        user_id: u64,
    },
    /// Report bucket did not change after a cost was added.
    #[error("report bucket `{category}` did not reflect the new cost: {detail}")]
    ReportNotUpdated {
        /// Bucket that should have grown.
        category: Category,
        /// What was observed.
        detail: String,
    },
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Renders status codes as `[200, 201]`.
fn join_statuses(statuses: &[u16]) -> String {
    let joined = statuses.iter().map(u16::to_string).collect::<Vec<_>>().join(", ");
    format!("[{joined}]")
}

/// Renders categories as a comma-separated list.
fn join_categories(categories: &[Category]) -> String {
    categories.iter().map(|category| category.as_str()).collect::<Vec<_>>().join(", ")
}
