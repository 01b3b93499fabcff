//! This module defines traits for interacting with the application's
//! database and owns schema creation.

use std::path::Path;

use rusqlite::{Connection, Row};

use crate::Error;

/// A trait for adding an object schema to a database.
pub trait CreateTable {
    /// Create a table for the model.
    ///
    /// # Errors
    /// Returns an error if the table already exists or if there is an SQL
    /// error.
    fn create_table(connection: &Connection) -> Result<(), rusqlite::Error>;
}

/// A trait for mapping from a `rusqlite::Row` from a SQLite database to a
/// concrete rust type.
pub trait MapRow {
    /// The type that rows are mapped to.
    type ReturnType;

    /// Convert a row into a concrete type.
    ///
    /// **Note:** This function expects that the row object contains all the
    /// table columns in the order they were defined.
    ///
    /// # Errors
    /// Returns an error if a row item cannot be converted into the
    /// corresponding rust type, or if an invalid column index was used.
    fn map_row(row: &Row) -> Result<Self::ReturnType, rusqlite::Error> {
        Self::map_row_with_offset(row, 0)
    }

    /// Convert a row into a concrete type, reading from the column at
    /// `offset`.
    ///
    /// # Errors
    /// Returns an error if a row item cannot be converted into the
    /// corresponding rust type, or if an invalid column index was used.
    fn map_row_with_offset(row: &Row, offset: usize) -> Result<Self::ReturnType, rusqlite::Error>;
}

/// The result of [initialize]: whether the schema was created by this call
/// or already existed.
#[derive(Debug, PartialEq, Eq)]
pub enum InitOutcome {
    /// The schema did not exist and was created.
    Created,
    /// The schema already existed and was left untouched.
    AlreadyInitialized,
}

/// Open the SQLite database at `path` and apply the connection settings the
/// application relies on.
///
/// # Errors
/// Returns an [Error::SqlError] if the database file cannot be opened.
pub fn open(path: impl AsRef<Path>) -> Result<Connection, Error> {
    tracing::debug!("opening database at {}", path.as_ref().display());
    let connection = Connection::open(path)?;
    configure(&connection)?;

    Ok(connection)
}

/// Apply per-connection settings.
///
/// SQLite's `LIKE` is case-insensitive for ASCII by default, but expense
/// searches must match substrings exactly.
///
/// # Errors
/// Returns an [Error::SqlError] if the pragma cannot be set.
pub fn configure(connection: &Connection) -> Result<(), Error> {
    connection.pragma_update(None, "case_sensitive_like", true)?;

    Ok(())
}

/// Create the expense schema if it does not exist yet.
///
/// Calling this on an already-initialized database is a no-op that reports
/// [InitOutcome::AlreadyInitialized] rather than an error.
///
/// # Errors
/// Returns an [Error::SqlError] if the schema cannot be created, e.g. the
/// database file is not writable.
pub fn initialize(connection: &Connection) -> Result<InitOutcome, Error> {
    let table_exists: bool = connection.query_row(
        "SELECT EXISTS (SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = 'expense')",
        [],
        |row| row.get(0),
    )?;

    if table_exists {
        tracing::debug!("expense table already exists, skipping schema creation");
        return Ok(InitOutcome::AlreadyInitialized);
    }

    crate::stores::sqlite::SqliteExpenseStore::create_table(connection)?;
    tracing::info!("created expense schema");

    Ok(InitOutcome::Created)
}

#[cfg(test)]
mod db_tests {
    use rusqlite::Connection;

    use super::{InitOutcome, configure, initialize, open};

    fn init_db() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        configure(&conn).unwrap();
        conn
    }

    #[test]
    fn initialize_creates_schema() {
        let conn = init_db();

        let outcome = initialize(&conn).unwrap();

        assert_eq!(outcome, InitOutcome::Created);
        conn.prepare("SELECT id, amount, description, category, timestamp FROM expense")
            .expect("expense table should exist after initialization");
    }

    #[test]
    fn initialize_is_a_noop_on_second_call() {
        let conn = init_db();

        initialize(&conn).unwrap();
        let outcome = initialize(&conn).unwrap();

        assert_eq!(outcome, InitOutcome::AlreadyInitialized);
    }

    #[test]
    fn open_creates_database_file() {
        let directory = tempfile::tempdir().unwrap();
        let db_path = directory.path().join("expenses.db");

        let conn = open(&db_path).unwrap();
        initialize(&conn).unwrap();

        assert!(db_path.exists());
    }
}
