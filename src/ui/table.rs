//! Renders expenses and category totals as terminal tables.

use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Columns},
};

use crate::{models::Expense, report::MonthlyTotals};

/// Format a monetary amount for display.
pub fn format_amount(amount: f64) -> String {
    format!("€{amount:.2}")
}

#[derive(Tabled)]
struct ExpenseRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Description")]
    description: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Amount")]
    amount: String,
}

impl From<&Expense> for ExpenseRow {
    fn from(expense: &Expense) -> Self {
        Self {
            id: expense.id(),
            date: expense.timestamp().date().to_string(),
            description: expense.description().to_string(),
            category: expense.category().to_string(),
            amount: format_amount(expense.amount()),
        }
    }
}

/// Render a table of expenses with one row per expense.
pub fn expense_table(expenses: &[Expense]) -> String {
    let rows: Vec<ExpenseRow> = expenses.iter().map(ExpenseRow::from).collect();

    let mut table = Table::new(rows);
    table.with(Style::rounded());
    table.with(Modify::new(Columns::single(4)).with(Alignment::right()));

    table.to_string()
}

#[derive(Tabled)]
struct SummaryRow {
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Total Spent")]
    total: String,
}

/// Render the per-category summary table of a monthly report.
pub fn summary_table(totals: &MonthlyTotals) -> String {
    let rows: Vec<SummaryRow> = totals
        .categories
        .iter()
        .map(|(category, total)| SummaryRow {
            category: category.clone(),
            total: format_amount(*total),
        })
        .collect();

    let mut table = Table::new(rows);
    table.with(Style::rounded());
    table.with(Modify::new(Columns::single(1)).with(Alignment::right()));

    table.to_string()
}
