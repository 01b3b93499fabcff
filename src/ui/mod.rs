//! Terminal presentation: the splash screen, styled status lines and the
//! expense/summary tables.

mod output;
mod table;

pub use output::{error, header, notice, splash, success, total_line};
pub use table::{expense_table, format_amount, summary_table};
