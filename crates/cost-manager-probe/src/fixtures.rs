// crates/cost-manager-probe/src/fixtures.rs
// ============================================================================
// Module: Fixtures
// Description: Test user, expense, and invalid variants derived from config.
// Purpose: Give every probe the same inputs for one run.
// Dependencies: cost-manager-contract, serde_json, time
// ============================================================================

//! ## Overview
//! [`Fixtures`] is built once per run from [`FixtureConfig`] and the current
//! UTC date. The expense carries today's year, month, and day so the monthly
//! report of the same date contains it.
//!
//! The costs service stamps its own date on a cost, so near midnight on the
//! last day of a month a service running in a non-UTC zone may file the
//! expense under a different month than the report query names. Runs in that
//! window should pin the date with [`crate::ConformanceSuite::with_today`].

use cost_manager_contract::Category;
use cost_manager_contract::CostSubmission;
use cost_manager_contract::NewUser;
use cost_manager_contract::ReportQuery;
use cost_manager_contract::UserIdField;
use serde_json::Map;
use serde_json::Value;
use time::Date;
use time::OffsetDateTime;

use crate::FixtureConfig;

/// Category no service accepts.
pub const INVALID_CATEGORY: &str = "other";

/// Inputs shared by the probes of one run.
#[derive(Debug, Clone, PartialEq)]
pub struct Fixtures {
    /// Test user.
    pub user: NewUser,
    /// Category of the expense.
    pub category: Category,
    /// Valid expense of the test user, dated today.
    pub expense: CostSubmission,
    /// Id that must not exist.
    pub unknown_user_id: u64,
    /// Date the run treats as today.
    pub today: Date,
}

impl Fixtures {
    /// Derives fixtures for `today`.
    #[must_use]
    pub fn new(config: &FixtureConfig, user_id_field: UserIdField, today: Date) -> Self {
        let user = NewUser {
            id: config.user_id,
            first_name: config.first_name.clone(),
            last_name: config.last_name.clone(),
            birthday: config.birthday.clone(),
        };
        let mut expense =
            CostSubmission::new(config.user_id, config.category, &config.description, config.sum);
        expense.user_id_field = user_id_field;
        expense.year = Some(today.year());
        expense.month = Some(u8::from(today.month()));
        expense.day = Some(today.day());
        Self {
            user,
            category: config.category,
            expense,
            unknown_user_id: config.unknown_user_id,
            today,
        }
    }

    /// Today's date in UTC.
    ///
    /// UTC is used instead of the local zone because the local offset cannot
    /// be read soundly once the async runtime has started its threads.
    #[must_use]
    pub fn today_utc() -> Date {
        OffsetDateTime::now_utc().date()
    }

    /// Report query for the test user and the current month.
    #[must_use]
    pub fn report_query(&self) -> ReportQuery {
        ReportQuery {
            id: self.user.id,
            year: self.today.year(),
            month: u8::from(self.today.month()),
        }
    }

    /// Cost body carrying only the user id.
    #[must_use]
    pub fn missing_fields_body(&self) -> Value {
        let mut body = Map::new();
        body.insert(self.expense.user_id_field.as_str().to_string(), Value::from(self.user.id));
        Value::Object(body)
    }

    /// The expense with a category outside the five.
    #[must_use]
    pub fn invalid_category(&self) -> CostSubmission {
        self.expense.with_category(INVALID_CATEGORY)
    }

    /// The expense attributed to [`Self::unknown_user_id`].
    #[must_use]
    pub fn unknown_user(&self) -> CostSubmission {
        self.expense.with_user_id(self.unknown_user_id)
    }

    /// A second expense whose description tells it apart in the report.
    #[must_use]
    pub fn chained_expense(&self) -> CostSubmission {
        let description = format!("{}-chained", self.expense.description);
        self.expense.with_description(&description)
    }
}
