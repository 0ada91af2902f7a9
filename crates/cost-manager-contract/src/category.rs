// crates/cost-manager-contract/src/category.rs
// ============================================================================
// Module: Expense Categories
// Description: The closed set of expense categories accepted by the costs service.
// Purpose: Give report buckets and cost submissions a typed category.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! The costs service only accepts five categories, and every monthly report
//! exposes one bucket per category even when it is empty. [`Category::ALL`]
//! fixes the canonical order the services emit buckets in.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Expense category accepted by the costs service.
///
/// # Invariants
/// - Variants are stable; the wire form is the lowercase name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Groceries and restaurants.
    Food,
    /// Medical expenses.
    Health,
    /// Rent, mortgage, utilities.
    Housing,
    /// Sport and fitness.
    Sports,
    /// Courses and tuition.
    Education,
}

impl Category {
    /// Every category in the order report buckets are emitted.
    pub const ALL: [Self; 5] =
        [Self::Food, Self::Health, Self::Housing, Self::Sports, Self::Education];

    /// Returns the wire name of the category.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Food => "food",
            Self::Health => "health",
            Self::Housing => "housing",
            Self::Sports => "sports",
            Self::Education => "education",
        }
    }

    /// Parses a wire name. Matching is exact: the services reject `Food`.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|category| category.as_str() == value)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string is not one of the five categories.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown category `{0}`")]
pub struct UnknownCategory(pub String);

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value).ok_or_else(|| UnknownCategory(value.to_string()))
    }
}
