//! C.Y.B.O.R.G. — Cybernetic Yield & Budgetary Oversight Record Gadget.
//!
//! A personal expense tracker that records transactions in a local SQLite
//! database and renders tabular reports on the command line.
//!
//! This library provides the persistence layer ([stores]), the domain model
//! ([models]), report aggregation ([report]) and the terminal presentation
//! helpers ([ui]) used by the `cyborg` binary.

#![warn(missing_docs)]

pub mod db;
pub mod models;
pub mod report;
pub mod stores;
pub mod ui;

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// An empty string was used for an expense description.
    #[error("expense descriptions cannot be empty")]
    EmptyDescription,

    /// A NaN or infinite value was used for an expense amount.
    ///
    /// Amounts are stored as SQLite `REAL` values and must round-trip, so
    /// only finite numbers are accepted.
    #[error("{0} is not a finite amount")]
    NonFiniteAmount(f64),

    /// A month and year could not be turned into a calendar date range.
    #[error("invalid report month: {0}")]
    InvalidDate(String),

    /// The requested expense was not found.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested expense could not be found")]
    NotFound,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}
