//! This file defines the type `Expense`, the core type of the application.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::models::DatabaseID;

/// The category assigned to expenses created without an explicit category.
pub const DEFAULT_CATEGORY: &str = "Uncategorized";

/// A single recorded expense, i.e. an event where money was spent.
///
/// To create a new `Expense`, use [Expense::build] and pass the builder to
/// [ExpenseStore::create](crate::stores::ExpenseStore::create). Existing
/// expenses are retrieved through the store's query functions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    id: DatabaseID,
    amount: f64,
    description: String,
    category: String,
    timestamp: OffsetDateTime,
}

impl Expense {
    /// Create a new expense.
    ///
    /// Shortcut for [ExpenseBuilder::new] for discoverability.
    pub fn build(amount: f64, description: impl Into<String>) -> ExpenseBuilder {
        ExpenseBuilder::new(amount, description)
    }

    /// Create an expense without validating the fields.
    ///
    /// Intended for reconstructing expenses from rows that were validated on
    /// the way into the database.
    pub fn new_unchecked(
        id: DatabaseID,
        amount: f64,
        description: String,
        category: String,
        timestamp: OffsetDateTime,
    ) -> Self {
        Self {
            id,
            amount,
            description,
            category,
            timestamp,
        }
    }

    /// The ID of the expense.
    pub fn id(&self) -> DatabaseID {
        self.id
    }

    /// The amount of money spent.
    pub fn amount(&self) -> f64 {
        self.amount
    }

    /// A text description of what the expense was for.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// The user-defined category that describes the type of the expense.
    pub fn category(&self) -> &str {
        &self.category
    }

    /// When the expense was recorded.
    pub fn timestamp(&self) -> &OffsetDateTime {
        &self.timestamp
    }
}

/// Builder for creating a new [Expense].
///
/// The builder is finalized by
/// [ExpenseStore::create](crate::stores::ExpenseStore::create), which
/// assigns the ID and validates the amount and description.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseBuilder {
    amount: f64,
    description: String,
    category: String,
    timestamp: OffsetDateTime,
}

impl ExpenseBuilder {
    /// Create a builder for an expense of `amount` for `description`.
    ///
    /// The category defaults to [DEFAULT_CATEGORY] and the timestamp to the
    /// current time (UTC).
    pub fn new(amount: f64, description: impl Into<String>) -> Self {
        Self {
            amount,
            description: description.into(),
            category: DEFAULT_CATEGORY.to_string(),
            timestamp: OffsetDateTime::now_utc(),
        }
    }

    /// Set the category for the expense.
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    /// Set the timestamp for the expense.
    pub fn timestamp(mut self, timestamp: OffsetDateTime) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// The amount of money spent.
    pub fn amount(&self) -> f64 {
        self.amount
    }

    /// A text description of what the expense was for.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// The category for the expense.
    pub fn category_name(&self) -> &str {
        &self.category
    }

    /// When the expense was recorded.
    pub fn creation_time(&self) -> &OffsetDateTime {
        &self.timestamp
    }
}

#[cfg(test)]
mod expense_builder_tests {
    use time::{Duration, OffsetDateTime, macros::datetime};

    use super::{DEFAULT_CATEGORY, Expense, ExpenseBuilder};

    #[test]
    fn new_defaults_category_and_timestamp() {
        let before = OffsetDateTime::now_utc();

        let builder = ExpenseBuilder::new(12.3, "Coffee");

        let after = OffsetDateTime::now_utc();
        assert_eq!(builder.amount(), 12.3);
        assert_eq!(builder.description(), "Coffee");
        assert_eq!(builder.category_name(), DEFAULT_CATEGORY);
        assert!(
            *builder.creation_time() >= before - Duration::seconds(1)
                && *builder.creation_time() <= after + Duration::seconds(1),
            "timestamp {} not close to now",
            builder.creation_time()
        );
    }

    #[test]
    fn setters_override_defaults() {
        let timestamp = datetime!(2024-08-07 12:00 UTC);

        let builder = Expense::build(45.6, "Petrol")
            .category("Fuel")
            .timestamp(timestamp);

        assert_eq!(builder.category_name(), "Fuel");
        assert_eq!(*builder.creation_time(), timestamp);
    }
}
