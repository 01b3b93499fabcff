//! The SQLite backed implementation of the [ExpenseStore](crate::stores::ExpenseStore) trait.

pub mod expense;

pub use expense::SqliteExpenseStore;
