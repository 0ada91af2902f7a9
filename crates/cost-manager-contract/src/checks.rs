// crates/cost-manager-contract/src/checks.rs
// ============================================================================
// Module: Shape Checks
// Description: Pure assertions over decoded response bodies.
// Purpose: Decide whether a response satisfies the cost-manager contract.
// Dependencies: serde_json
// ============================================================================

//! ## Overview
//! Each check takes the raw JSON body (plus whatever the caller submitted)
//! and returns either the typed value or the first [`ContractViolation`]
//! found. Checks accept extra fields everywhere except where the contract
//! pins an exact key set (about entries).

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::Map;
use serde_json::Value;

use crate::Category;
use crate::CategoryBuckets;
use crate::ContractViolation;
use crate::CostRecord;
use crate::CostSubmission;
use crate::ErrorBody;
use crate::MonthlyReport;
use crate::ReportQuery;
use crate::TeamMember;
use crate::UserDetails;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Exact key set of an about entry, sorted.
const ABOUT_KEYS: [&str; 2] = ["first_name", "last_name"];
/// Tolerance when comparing echoed amounts.
const SUM_TOLERANCE: f64 = 1e-9;

// ============================================================================
// SECTION: Generic Checks
// ============================================================================

/// Fails unless `actual` is one of `allowed`.
///
/// # Errors
///
/// Returns [`ContractViolation::UnexpectedStatus`] on mismatch.
pub fn expect_status(endpoint: &str, actual: u16, allowed: &[u16]) -> Result<(), ContractViolation> {
    if allowed.contains(&actual) {
        return Ok(());
    }
    Err(ContractViolation::UnexpectedStatus {
        endpoint: endpoint.to_string(),
        expected: allowed.to_vec(),
        actual,
    })
}

/// Returns the elements of a JSON array.
///
/// # Errors
///
/// Returns [`ContractViolation::NotAList`] when `value` is not an array.
pub fn expect_list<'a>(value: &'a Value, what: &str) -> Result<&'a [Value], ContractViolation> {
    value.as_array().map(Vec::as_slice).ok_or_else(|| ContractViolation::NotAList {
        what: what.to_string(),
    })
}

/// Checks an error body carries both `id` and `message`.
///
/// # Errors
///
/// Returns [`ContractViolation`] when the body is not an object or lacks
/// either field.
pub fn check_error_body(value: &Value) -> Result<ErrorBody, ContractViolation> {
    let object = expect_object(value, "error body")?;
    let id = required(object, "error body", "id")?.clone();
    let message = match required(object, "error body", "message")? {
        Value::String(message) => message.clone(),
        other => other.to_string(),
    };
    Ok(ErrorBody {
        id,
        message,
    })
}

// ============================================================================
// SECTION: Users
// ============================================================================

/// Checks `GET /api/users` lists the given user.
///
/// # Errors
///
/// Returns [`ContractViolation`] when the body is not a list or no entry has
/// a matching `id`.
pub fn check_user_listed(value: &Value, user_id: u64) -> Result<(), ContractViolation> {
    let users = expect_list(value, "user list")?;
    let listed = users.iter().any(|user| user.get("id").and_then(Value::as_u64) == Some(user_id));
    if listed {
        Ok(())
    } else {
        Err(ContractViolation::UserMissing {
            user_id,
        })
    }
}

/// Checks `GET /api/users/:id` for the right user and a large enough total.
///
/// # Errors
///
/// Returns [`ContractViolation`] when `id` differs, `total` is absent or not
/// numeric, or `total < min_total`.
pub fn check_user_details(
    value: &Value,
    user_id: u64,
    min_total: f64,
) -> Result<UserDetails, ContractViolation> {
    let what = "user details";
    let object = expect_object(value, what)?;
    let id = u64_field(object, what, "id")?;
    expect_equal("id", &Value::from(user_id), &Value::from(id))?;
    let total = required(object, what, "total")?.as_f64().ok_or_else(|| {
        ContractViolation::WrongType {
            what: what.to_string(),
            field: "total".to_string(),
            expected: "a number",
        }
    })?;
    if total + SUM_TOLERANCE < min_total {
        return Err(ContractViolation::TotalBelowMinimum {
            total,
            minimum: min_total,
        });
    }
    Ok(UserDetails {
        id,
        first_name: object.get("first_name").and_then(Value::as_str).map(str::to_string),
        last_name: object.get("last_name").and_then(Value::as_str).map(str::to_string),
        total,
    })
}

// ============================================================================
// SECTION: Costs
// ============================================================================

/// Checks the echo of `POST /api/add` on the costs service.
///
/// The echoed user id is read from `userid`, falling back to `user_id`.
///
/// # Errors
///
/// Returns [`ContractViolation`] when `userid`, `category`, or `description`
/// differ from the submission, when `sum` is absent or differs, or when
/// `require_id` is set and `_id` is absent.
pub fn check_cost_echo(
    submission: &CostSubmission,
    value: &Value,
    require_id: bool,
) -> Result<CostRecord, ContractViolation> {
    let what = "cost record";
    let object = expect_object(value, what)?;
    let userid = object.get("userid").or_else(|| object.get("user_id")).ok_or_else(|| {
        ContractViolation::MissingField {
            what: what.to_string(),
            field: "userid".to_string(),
        }
    })?;
    expect_equal("userid", &Value::from(submission.user_id), userid)?;
    let category = required(object, what, "category")?;
    expect_equal("category", &Value::from(submission.category.clone()), category)?;
    let description = required(object, what, "description")?;
    expect_equal("description", &Value::from(submission.description.clone()), description)?;
    let sum = required(object, what, "sum")?.as_f64().ok_or_else(|| {
        ContractViolation::WrongType {
            what: what.to_string(),
            field: "sum".to_string(),
            expected: "a number",
        }
    })?;
    if (sum - submission.sum).abs() > SUM_TOLERANCE {
        return Err(ContractViolation::FieldMismatch {
            field: "sum".to_string(),
            expected: submission.sum.to_string(),
            actual: sum.to_string(),
        });
    }
    let id = match object.get("_id") {
        Some(Value::String(id)) => Some(id.clone()),
        Some(Value::Null) | None => None,
        Some(other) => Some(other.to_string()),
    };
    if require_id && id.is_none() {
        return Err(ContractViolation::MissingField {
            what: what.to_string(),
            field: "_id".to_string(),
        });
    }
    let category = submission.parsed_category().ok_or_else(|| ContractViolation::WrongType {
        what: what.to_string(),
        field: "category".to_string(),
        expected: "a known category",
    })?;
    Ok(CostRecord {
        userid: submission.user_id,
        category,
        description: submission.description.clone(),
        sum,
        id,
        year: object.get("year").and_then(Value::as_i64),
        month: object.get("month").and_then(Value::as_i64),
        day: object.get("day").and_then(Value::as_i64),
    })
}

/// Checks `GET /api/report`: echoed query, all five buckets, item days.
///
/// # Errors
///
/// Returns [`ContractViolation`] when `userid`, `year`, or `month` differ
/// from the query, when `costs` is malformed, or when any category bucket is
/// absent.
pub fn check_report(value: &Value, query: &ReportQuery) -> Result<MonthlyReport, ContractViolation> {
    let what = "report";
    let object = expect_object(value, what)?;
    let userid = required(object, what, "userid")?;
    expect_equal("userid", &Value::from(query.id), userid)?;
    let year = required(object, what, "year")?;
    expect_equal("year", &Value::from(query.year), year)?;
    let month = required(object, what, "month")?;
    expect_equal("month", &Value::from(query.month), month)?;
    let costs = CategoryBuckets::from_wire(required(object, what, "costs")?)?;
    let missing = costs.missing();
    if !missing.is_empty() {
        return Err(ContractViolation::MissingCategories {
            missing,
        });
    }
    Ok(MonthlyReport {
        userid: query.id,
        year: i64::from(query.year),
        month: i64::from(query.month),
        costs,
    })
}

/// Checks that a bucket grew and holds the new description.
///
/// # Errors
///
/// Returns [`ContractViolation::ReportNotUpdated`] when the bucket did not
/// grow or no item carries `description`.
pub fn check_report_growth(
    before: &MonthlyReport,
    after: &MonthlyReport,
    category: Category,
    description: &str,
) -> Result<(), ContractViolation> {
    let (count_before, count_after) = (before.costs.count(category), after.costs.count(category));
    if count_after <= count_before {
        return Err(ContractViolation::ReportNotUpdated {
            category,
            detail: format!("item count went from {count_before} to {count_after}"),
        });
    }
    let found = after
        .costs
        .get(category)
        .is_some_and(|items| items.iter().any(|item| item.description == description));
    if found {
        Ok(())
    } else {
        Err(ContractViolation::ReportNotUpdated {
            category,
            detail: format!("no item described `{description}`"),
        })
    }
}

// ============================================================================
// SECTION: Logs and Admin
// ============================================================================

/// Returns the number of log entries.
///
/// # Errors
///
/// Returns [`ContractViolation::NotAList`] when the body is not a list.
pub fn check_log_list(value: &Value) -> Result<usize, ContractViolation> {
    expect_list(value, "log list").map(<[Value]>::len)
}

/// Fails when the log count shrank.
///
/// # Errors
///
/// Returns [`ContractViolation::LogCountDecreased`] when `after < before`.
pub const fn check_log_growth(before: usize, after: usize) -> Result<(), ContractViolation> {
    if after >= before {
        Ok(())
    } else {
        Err(ContractViolation::LogCountDecreased {
            before,
            after,
        })
    }
}

/// Checks `GET /api/about`: a non-empty list of exactly-two-field entries.
///
/// # Errors
///
/// Returns [`ContractViolation`] when the list is empty, or any entry is not
/// an object, has keys other than `first_name` and `last_name`, or has
/// non-string values.
pub fn check_about(value: &Value) -> Result<Vec<TeamMember>, ContractViolation> {
    let entries = expect_list(value, "about list")?;
    if entries.is_empty() {
        return Err(ContractViolation::EmptyList {
            what: "about list".to_string(),
        });
    }
    let mut members = Vec::with_capacity(entries.len());
    for (index, entry) in entries.iter().enumerate() {
        let what = format!("about entry {index}");
        let object = expect_object(entry, &what)?;
        let mut keys: Vec<String> = object.keys().cloned().collect();
        keys.sort();
        if keys != ABOUT_KEYS {
            return Err(ContractViolation::KeySetMismatch {
                what,
                expected: ABOUT_KEYS.iter().map(ToString::to_string).collect(),
                actual: keys,
            });
        }
        members.push(TeamMember {
            first_name: str_field(object, &what, "first_name")?,
            last_name: str_field(object, &what, "last_name")?,
        });
    }
    Ok(members)
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Returns the object behind `value`.
fn expect_object<'a>(value: &'a Value, what: &str) -> Result<&'a Map<String, Value>, ContractViolation> {
    value.as_object().ok_or_else(|| ContractViolation::NotAnObject {
        what: what.to_string(),
    })
}

/// Returns a required field.
fn required<'a>(
    object: &'a Map<String, Value>,
    what: &str,
    field: &str,
) -> Result<&'a Value, ContractViolation> {
    object.get(field).ok_or_else(|| ContractViolation::MissingField {
        what: what.to_string(),
        field: field.to_string(),
    })
}

/// Returns a required unsigned integer field.
fn u64_field(object: &Map<String, Value>, what: &str, field: &str) -> Result<u64, ContractViolation> {
    required(object, what, field)?.as_u64().ok_or_else(|| ContractViolation::WrongType {
        what: what.to_string(),
        field: field.to_string(),
        expected: "an unsigned integer",
    })
}

/// Returns a required string field.
fn str_field(object: &Map<String, Value>, what: &str, field: &str) -> Result<String, ContractViolation> {
    required(object, what, field)?.as_str().map(str::to_string).ok_or_else(|| {
        ContractViolation::WrongType {
            what: what.to_string(),
            field: field.to_string(),
            expected: "a string",
        }
    })
}

/// Compares two JSON scalars; integers and floats compare numerically.
fn expect_equal(field: &str, expected: &Value, actual: &Value) -> Result<(), ContractViolation> {
    let equal = match (expected, actual) {
        (Value::Number(left), Value::Number(right)) => match (left.as_i64(), right.as_i64()) {
            (Some(left), Some(right)) => left == right,
            _ => match (left.as_u64(), right.as_u64()) {
                (Some(left), Some(right)) => left == right,
                _ => left.as_f64() == right.as_f64(),
            },
        },
        _ => expected == actual,
    };
    if equal {
        Ok(())
    } else {
        Err(ContractViolation::FieldMismatch {
            field: field.to_string(),
            expected: expected.to_string(),
            actual: actual.to_string(),
        })
    }
}
