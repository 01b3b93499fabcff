//! Aggregation of expense lists into per-category totals for display.

use std::collections::BTreeMap;

use crate::models::Expense;

/// Per-category totals and the grand total for a set of expenses.
#[derive(Debug, Default, PartialEq)]
pub struct MonthlyTotals {
    /// The total amount spent per category, sorted by category name.
    pub categories: Vec<(String, f64)>,
    /// The total amount spent across every category.
    pub grand_total: f64,
}

/// Group `expenses` by category, summing the amount spent per category and
/// overall.
///
/// Categories are sorted lexicographically for a stable display order. This
/// is a pure function of the input list.
pub fn monthly_totals(expenses: &[Expense]) -> MonthlyTotals {
    let mut totals: BTreeMap<&str, f64> = BTreeMap::new();

    for expense in expenses {
        *totals.entry(expense.category()).or_insert(0.0) += expense.amount();
    }

    MonthlyTotals {
        categories: totals
            .into_iter()
            .map(|(category, total)| (category.to_string(), total))
            .collect(),
        grand_total: expenses.iter().map(Expense::amount).sum(),
    }
}
