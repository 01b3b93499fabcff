//! This module defines the domain data types.

mod expense;

pub use expense::{DEFAULT_CATEGORY, Expense, ExpenseBuilder};

/// Alias for the integer type used for expense IDs.
pub type DatabaseID = i64;
