//! Contains traits and implementations for objects that store the domain
//! [models](crate::models).

pub mod sqlite;

use time::Month;

use crate::{
    Error,
    models::{DatabaseID, Expense, ExpenseBuilder},
};

/// Handles the creation, retrieval, update and deletion of expenses.
pub trait ExpenseStore {
    /// Create a new expense in the store.
    ///
    /// The store assigns the ID; amount and timestamp come from `builder`.
    fn create(&mut self, builder: ExpenseBuilder) -> Result<Expense, Error>;

    /// Retrieve an expense from the store by its `id`.
    fn get(&self, id: DatabaseID) -> Result<Expense, Error>;

    /// Remove the expense with the given `id`.
    ///
    /// Deleting an absent row is not an error: the result reports whether a
    /// row was actually removed.
    fn delete(&mut self, id: DatabaseID) -> Result<RowChange, Error>;

    /// Apply a sparse update to the expense with the given `id`.
    ///
    /// Only the fields supplied in `fields` change; the ID and timestamp
    /// are never updatable. An empty `fields` performs no database write.
    fn update(&mut self, id: DatabaseID, fields: ExpenseUpdate) -> Result<UpdateOutcome, Error>;

    /// Retrieve every expense, most recent first.
    fn get_all(&self) -> Result<Vec<Expense>, Error>;

    /// Retrieve the expenses whose description contains `keyword` as a
    /// case-sensitive substring, most recent first.
    fn search(&self, keyword: &str) -> Result<Vec<Expense>, Error>;

    /// Retrieve the expenses with timestamps in the given calendar month,
    /// i.e. the half-open interval from the first instant of the month up to
    /// but excluding the first instant of the next month.
    ///
    /// Results are returned in storage order.
    fn get_monthly(&self, month: Month, year: i32) -> Result<Vec<Expense>, Error>;
}

/// A sparse set of expense fields to change in
/// [ExpenseStore::update].
///
/// Fields left as `None` are not touched by the update.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ExpenseUpdate {
    /// Replacement amount, if the amount should change.
    pub amount: Option<f64>,
    /// Replacement description, if the description should change.
    pub description: Option<String>,
    /// Replacement category, if the category should change.
    pub category: Option<String>,
}

impl ExpenseUpdate {
    /// Whether the update contains no fields to change.
    pub fn is_empty(&self) -> bool {
        self.amount.is_none() && self.description.is_none() && self.category.is_none()
    }
}

/// Whether a delete actually removed a row.
#[derive(Debug, PartialEq, Eq)]
pub enum RowChange {
    /// A row with the given ID existed and was removed.
    Changed,
    /// No row with the given ID existed; nothing was removed.
    NotFound,
}

/// The result of [ExpenseStore::update].
#[derive(Debug, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// A row with the given ID existed and the supplied fields were written.
    Applied,
    /// The update contained no fields, so no database write was performed.
    NoFields,
    /// No row with the given ID existed; nothing was written.
    NotFound,
}
