// crates/cost-manager-contract/src/types.rs
// ============================================================================
// Module: Contract Types
// Description: Request and response bodies of the users, costs, and admin services.
// Purpose: Provide typed shapes for fixtures and for checked responses.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Request bodies are built from these types; response bodies are first
//! checked as raw JSON by [`crate::checks`] and then materialized into them.
//! Response types tolerate extra fields except [`TeamMember`], whose key set
//! is part of the contract.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Number;
use serde_json::Value;

use crate::Category;

// ============================================================================
// SECTION: Users
// ============================================================================

/// Body of `POST /api/add` on the users service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUser {
    /// Caller-assigned numeric id.
    pub id: u64,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Birthday as `YYYY-MM-DD`.
    pub birthday: String,
}

/// Body of `GET /api/users/:id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserDetails {
    /// User id.
    pub id: u64,
    /// Given name.
    #[serde(default)]
    pub first_name: Option<String>,
    /// Family name.
    #[serde(default)]
    pub last_name: Option<String>,
    /// Sum of every cost recorded for the user.
    pub total: f64,
}

// ============================================================================
// SECTION: Costs
// ============================================================================

/// Field name used to carry the user id on a cost submission.
///
/// The services accept both spellings; the echo always uses `userid`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum UserIdField {
    /// `userid`
    #[serde(rename = "userid")]
    Userid,
    /// `user_id`
    #[default]
    #[serde(rename = "user_id")]
    UserId,
}

impl UserIdField {
    /// Returns the JSON field name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Userid => "userid",
            Self::UserId => "user_id",
        }
    }
}

/// Body of `POST /api/add` on the costs service.
///
/// `category` stays a raw string so invalid categories can be submitted on
/// purpose.
#[derive(Debug, Clone, PartialEq)]
pub struct CostSubmission {
    /// Owning user id.
    pub user_id: u64,
    /// Field name carrying `user_id`.
    pub user_id_field: UserIdField,
    /// Free-text description.
    pub description: String,
    /// Category wire name.
    pub category: String,
    /// Amount.
    pub sum: f64,
    /// Optional calendar year.
    pub year: Option<i32>,
    /// Optional month, 1-based.
    pub month: Option<u8>,
    /// Optional day of month.
    pub day: Option<u8>,
}

impl CostSubmission {
    /// Creates a submission for a known category without a date.
    #[must_use]
    pub fn new(user_id: u64, category: Category, description: &str, sum: f64) -> Self {
        Self {
            user_id,
            user_id_field: UserIdField::default(),
            description: description.to_string(),
            category: category.as_str().to_string(),
            sum,
            year: None,
            month: None,
            day: None,
        }
    }

    /// Returns a copy carrying a different user id.
    #[must_use]
    pub fn with_user_id(&self, user_id: u64) -> Self {
        Self {
            user_id,
            ..self.clone()
        }
    }

    /// Returns a copy carrying a raw category string.
    #[must_use]
    pub fn with_category(&self, category: &str) -> Self {
        Self {
            category: category.to_string(),
            ..self.clone()
        }
    }

    /// Returns a copy carrying a different description.
    #[must_use]
    pub fn with_description(&self, description: &str) -> Self {
        Self {
            description: description.to_string(),
            ..self.clone()
        }
    }

    /// Returns the parsed category when it is one of the five.
    #[must_use]
    pub fn parsed_category(&self) -> Option<Category> {
        Category::parse(&self.category)
    }

    /// Builds the JSON request body. Absent date parts are omitted.
    #[must_use]
    pub fn to_body(&self) -> Value {
        let mut body = Map::new();
        body.insert(self.user_id_field.as_str().to_string(), Value::from(self.user_id));
        if let Some(year) = self.year {
            body.insert("year".to_string(), Value::from(year));
        }
        if let Some(month) = self.month {
            body.insert("month".to_string(), Value::from(month));
        }
        if let Some(day) = self.day {
            body.insert("day".to_string(), Value::from(day));
        }
        body.insert("description".to_string(), Value::from(self.description.clone()));
        body.insert("category".to_string(), Value::from(self.category.clone()));
        body.insert("sum".to_string(), number_value(self.sum));
        Value::Object(body)
    }
}

/// Cost echoed back by `POST /api/add` on the costs service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostRecord {
    /// Owning user id.
    #[serde(alias = "user_id")]
    pub userid: u64,
    /// Category.
    pub category: Category,
    /// Description.
    pub description: String,
    /// Amount.
    pub sum: f64,
    /// Opaque record id, emitted by some deployments.
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Calendar year, when echoed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i64>,
    /// Month, when echoed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub month: Option<i64>,
    /// Day of month, when echoed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day: Option<i64>,
}

// ============================================================================
// SECTION: Admin and Errors
// ============================================================================

/// Entry of `GET /api/about`. Exactly two fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TeamMember {
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
}

/// Error body returned on every 4xx/5xx: `{id, message}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Error code; the services emit the HTTP status here.
    pub id: Value,
    /// Human-readable reason.
    pub message: String,
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Magnitude below which every whole `f64` is an exact integer.
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

/// Encodes an amount, as an integer literal when the value is whole.
#[allow(
    clippy::cast_possible_truncation,
    reason = "The value is whole and below 2^53, so the cast is exact."
)]
pub(crate) fn number_value(value: f64) -> Value {
    if value.fract() == 0.0 && value.abs() < MAX_EXACT_INTEGER {
        Value::from(value as i64)
    } else {
        Number::from_f64(value).map_or(Value::Null, Value::Number)
    }
}
