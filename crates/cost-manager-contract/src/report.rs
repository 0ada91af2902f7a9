// crates/cost-manager-contract/src/report.rs
// ============================================================================
// Module: Monthly Reports
// Description: Typed view of `GET /api/report` with category-keyed buckets.
// Purpose: Replace the wire's list of single-key objects with a map.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! On the wire, `costs` is a list such as `[{"food": [...]}, {"health": []}]`.
//! [`CategoryBuckets::from_wire`] folds it into a map keyed by [`Category`],
//! validating every item on the way. Keys that are not categories are kept by
//! name: they are reported but never fail the superset check.
//!
//! ## Invariants
//! - Every decoded [`ReportItem`] has `MIN_REPORT_DAY <= day <= MAX_REPORT_DAY`.
//! - A category listed twice on the wire has its items concatenated in order.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::Category;
use crate::ContractViolation;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Smallest valid day of month for a report item.
pub const MIN_REPORT_DAY: i64 = 1;
/// Largest valid day of month for a report item.
pub const MAX_REPORT_DAY: i64 = 31;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Query parameters of `GET /api/report`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportQuery {
    /// User id.
    pub id: u64,
    /// Calendar year.
    pub year: i32,
    /// Month, 1-based.
    pub month: u8,
}

impl ReportQuery {
    /// Returns `(name, value)` pairs in the order the services document them.
    #[must_use]
    pub fn to_pairs(&self) -> [(&'static str, String); 3] {
        [("id", self.id.to_string()), ("year", self.year.to_string()), ("month", self.month.to_string())]
    }
}

/// A single cost inside a report bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportItem {
    /// Amount.
    pub sum: f64,
    /// Description.
    pub description: String,
    /// Day of month.
    pub day: i64,
}

/// Report costs keyed by category.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryBuckets {
    /// Items per category present on the wire.
    buckets: BTreeMap<Category, Vec<ReportItem>>,
    /// Wire keys that are not categories, in first-seen order.
    unknown_keys: Vec<String>,
}

impl CategoryBuckets {
    /// Decodes the wire `costs` list.
    ///
    /// # Errors
    ///
    /// Returns [`ContractViolation`] when `costs` is not a list of objects,
    /// when a category does not map to a list, or when an item is malformed
    /// or carries a day outside `1..=31`.
    pub fn from_wire(costs: &Value) -> Result<Self, ContractViolation> {
        let entries = costs.as_array().ok_or_else(|| ContractViolation::NotAList {
            what: "report costs".to_string(),
        })?;
        let mut decoded = Self::default();
        for (index, entry) in entries.iter().enumerate() {
            let object = entry.as_object().ok_or_else(|| ContractViolation::NotAnObject {
                what: format!("report costs entry {index}"),
            })?;
            for (key, value) in object {
                let Some(category) = Category::parse(key) else {
                    if !decoded.unknown_keys.contains(key) {
                        decoded.unknown_keys.push(key.clone());
                    }
                    continue;
                };
                let items = value.as_array().ok_or_else(|| ContractViolation::NotAList {
                    what: format!("report bucket `{category}`"),
                })?;
                let bucket = decoded.buckets.entry(category).or_default();
                for item in items {
                    bucket.push(decode_item(category, item)?);
                }
            }
        }
        Ok(decoded)
    }

    /// Returns the items of a category, or `None` when the bucket is absent.
    #[must_use]
    pub fn get(&self, category: Category) -> Option<&[ReportItem]> {
        self.buckets.get(&category).map(Vec::as_slice)
    }

    /// Returns the number of items in a category (zero when absent).
    #[must_use]
    pub fn count(&self, category: Category) -> usize {
        self.get(category).map_or(0, <[ReportItem]>::len)
    }

    /// Returns categories with no bucket, in canonical order.
    #[must_use]
    pub fn missing(&self) -> Vec<Category> {
        Category::ALL.into_iter().filter(|category| !self.buckets.contains_key(category)).collect()
    }

    /// Returns wire keys that are not categories.
    #[must_use]
    pub fn unknown_keys(&self) -> &[String] {
        &self.unknown_keys
    }

    /// Returns the total amount across every bucket.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.buckets.values().flatten().map(|item| item.sum).sum()
    }
}

/// A checked monthly report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyReport {
    /// User id.
    pub userid: u64,
    /// Calendar year.
    pub year: i64,
    /// Month, 1-based.
    pub month: i64,
    /// Buckets keyed by category.
    pub costs: CategoryBuckets,
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Decodes one bucket item and enforces the day range.
fn decode_item(category: Category, item: &Value) -> Result<ReportItem, ContractViolation> {
    let what = format!("report item in `{category}`");
    let object = item.as_object().ok_or_else(|| ContractViolation::NotAnObject {
        what: what.clone(),
    })?;
    let field = |name: &str| {
        object.get(name).ok_or_else(|| ContractViolation::MissingField {
            what: what.clone(),
            field: name.to_string(),
        })
    };
    let wrong_type = |name: &str, expected: &'static str| ContractViolation::WrongType {
        what: what.clone(),
        field: name.to_string(),
        expected,
    };
    let sum = field("sum")?.as_f64().ok_or_else(|| wrong_type("sum", "a number"))?;
    let description = field("description")?
        .as_str()
        .ok_or_else(|| wrong_type("description", "a string"))?
        .to_string();
    let day = field("day")?.as_i64().ok_or_else(|| wrong_type("day", "an integer"))?;
    if !(MIN_REPORT_DAY..=MAX_REPORT_DAY).contains(&day) {
        return Err(ContractViolation::DayOutOfRange {
            category,
            day,
        });
    }
    Ok(ReportItem {
        sum,
        description,
        day,
    })
}
