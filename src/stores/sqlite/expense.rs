//! Implements a SQLite backed expense store.
use std::sync::{Arc, Mutex};

use rusqlite::{Connection, Row, params_from_iter, types::Value};
use time::{Date, Month, OffsetDateTime};

use crate::{
    Error,
    db::{CreateTable, MapRow},
    models::{DEFAULT_CATEGORY, DatabaseID, Expense, ExpenseBuilder},
    stores::{ExpenseStore, ExpenseUpdate, RowChange, UpdateOutcome},
};

/// Stores expenses in a SQLite database.
#[derive(Debug, Clone)]
pub struct SqliteExpenseStore {
    connection: Arc<Mutex<Connection>>,
}

impl SqliteExpenseStore {
    /// Create a new store for the SQLite `connection`.
    pub fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self { connection }
    }
}

/// Escape `%`, `_` and the escape character itself so a search keyword is
/// matched literally by `LIKE`.
fn escape_like_pattern(keyword: &str) -> String {
    keyword
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// The first instants of the given month and of the following month, as a
/// half-open UTC interval. December rolls over into January of `year + 1`.
fn month_bounds(month: Month, year: i32) -> Result<(OffsetDateTime, OffsetDateTime), Error> {
    let start = Date::from_calendar_date(year, month, 1)
        .map_err(|error| Error::InvalidDate(error.to_string()))?;

    let (next_year, next_month) = match month {
        Month::December => (year + 1, Month::January),
        month => (year, month.next()),
    };
    let end = Date::from_calendar_date(next_year, next_month, 1)
        .map_err(|error| Error::InvalidDate(error.to_string()))?;

    Ok((start.midnight().assume_utc(), end.midnight().assume_utc()))
}

impl ExpenseStore for SqliteExpenseStore {
    /// Create a new expense in the database.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::NonFiniteAmount] if the amount is NaN or infinite,
    /// - [Error::EmptyDescription] if the description is an empty string,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn create(&mut self, builder: ExpenseBuilder) -> Result<Expense, Error> {
        if !builder.amount().is_finite() {
            return Err(Error::NonFiniteAmount(builder.amount()));
        }

        if builder.description().is_empty() {
            return Err(Error::EmptyDescription);
        }

        let expense = self
            .connection
            .lock()
            .unwrap()
            .prepare(
                "INSERT INTO expense (amount, description, category, timestamp)
                 VALUES (?1, ?2, ?3, ?4)
                 RETURNING id, amount, description, category, timestamp",
            )?
            .query_row(
                (
                    builder.amount(),
                    builder.description(),
                    builder.category_name(),
                    builder.creation_time(),
                ),
                Self::map_row,
            )?;

        tracing::debug!(
            "recorded expense {} of {:.2} for {:?}",
            expense.id(),
            expense.amount(),
            expense.description(),
        );

        Ok(expense)
    }

    /// Retrieve an expense in the database by its `id`.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::NotFound] if `id` does not refer to a valid expense,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn get(&self, id: DatabaseID) -> Result<Expense, Error> {
        let expense = self
            .connection
            .lock()
            .unwrap()
            .prepare(
                "SELECT id, amount, description, category, timestamp FROM expense WHERE id = :id",
            )?
            .query_row(&[(":id", &id)], Self::map_row)?;

        Ok(expense)
    }

    /// Remove the expense with the given `id` from the database.
    ///
    /// Deleting an ID that is not in the database is not an error; it
    /// reports [RowChange::NotFound] so callers can tell the two cases
    /// apart.
    ///
    /// # Errors
    /// This function will return an [Error::SqlError] if there is an SQL
    /// error.
    fn delete(&mut self, id: DatabaseID) -> Result<RowChange, Error> {
        let rows_deleted = self
            .connection
            .lock()
            .unwrap()
            .execute("DELETE FROM expense WHERE id = ?1", [id])?;

        match rows_deleted {
            0 => Ok(RowChange::NotFound),
            _ => Ok(RowChange::Changed),
        }
    }

    /// Update only the fields of the expense `id` that are present in
    /// `fields`.
    ///
    /// The SET clause is assembled from the typed fields with numbered
    /// parameters; values are never interpolated into the SQL string.
    ///
    /// Supplied fields are held to the same rules as [Self::create]: the
    /// amount must be finite and the description non-empty.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::NonFiniteAmount] if the new amount is NaN or infinite,
    /// - [Error::EmptyDescription] if the new description is an empty
    ///   string,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn update(&mut self, id: DatabaseID, fields: ExpenseUpdate) -> Result<UpdateOutcome, Error> {
        if fields.is_empty() {
            return Ok(UpdateOutcome::NoFields);
        }

        if let Some(amount) = fields.amount
            && !amount.is_finite()
        {
            return Err(Error::NonFiniteAmount(amount));
        }

        if let Some(description) = &fields.description
            && description.is_empty()
        {
            return Err(Error::EmptyDescription);
        }

        let mut set_clause_parts = vec![];
        let mut query_parameters = vec![];

        if let Some(amount) = fields.amount {
            query_parameters.push(Value::Real(amount));
            set_clause_parts.push(format!("amount = ?{}", query_parameters.len()));
        }

        if let Some(description) = fields.description {
            query_parameters.push(Value::Text(description));
            set_clause_parts.push(format!("description = ?{}", query_parameters.len()));
        }

        if let Some(category) = fields.category {
            query_parameters.push(Value::Text(category));
            set_clause_parts.push(format!("category = ?{}", query_parameters.len()));
        }

        query_parameters.push(Value::Integer(id));
        let query_string = format!(
            "UPDATE expense SET {} WHERE id = ?{}",
            set_clause_parts.join(", "),
            query_parameters.len()
        );

        let rows_updated = self
            .connection
            .lock()
            .unwrap()
            .execute(&query_string, params_from_iter(query_parameters.iter()))?;

        match rows_updated {
            0 => Ok(UpdateOutcome::NotFound),
            _ => Ok(UpdateOutcome::Applied),
        }
    }

    /// Retrieve every expense in the database, most recent first.
    ///
    /// # Errors
    /// This function will return an [Error::SqlError] if there is an SQL
    /// error.
    fn get_all(&self) -> Result<Vec<Expense>, Error> {
        self.connection
            .lock()
            .unwrap()
            .prepare(
                "SELECT id, amount, description, category, timestamp FROM expense
                 ORDER BY timestamp DESC",
            )?
            .query_map([], Self::map_row)?
            .map(|maybe_expense| maybe_expense.map_err(Error::SqlError))
            .collect()
    }

    /// Retrieve the expenses whose description contains `keyword` as a
    /// case-sensitive substring, most recent first.
    ///
    /// `LIKE` wildcards in `keyword` are matched literally.
    ///
    /// # Errors
    /// This function will return an [Error::SqlError] if there is an SQL
    /// error.
    fn search(&self, keyword: &str) -> Result<Vec<Expense>, Error> {
        let pattern = format!("%{}%", escape_like_pattern(keyword));

        self.connection
            .lock()
            .unwrap()
            .prepare(
                "SELECT id, amount, description, category, timestamp FROM expense
                 WHERE description LIKE ?1 ESCAPE '\\'
                 ORDER BY timestamp DESC",
            )?
            .query_map([pattern], Self::map_row)?
            .map(|maybe_expense| maybe_expense.map_err(Error::SqlError))
            .collect()
    }

    /// Retrieve the expenses with timestamps in the given calendar month.
    ///
    /// The interval is half-open: an expense dated exactly at the start of
    /// the month is included, one dated exactly at the start of the next
    /// month is not. Results come back in storage order.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::InvalidDate] if `month` and `year` do not form a valid
    ///   calendar date,
    /// - or [Error::SqlError] if there is an SQL error.
    fn get_monthly(&self, month: Month, year: i32) -> Result<Vec<Expense>, Error> {
        let (start, end) = month_bounds(month, year)?;

        self.connection
            .lock()
            .unwrap()
            .prepare(
                "SELECT id, amount, description, category, timestamp FROM expense
                 WHERE timestamp >= ?1 AND timestamp < ?2",
            )?
            .query_map((start, end), Self::map_row)?
            .map(|maybe_expense| maybe_expense.map_err(Error::SqlError))
            .collect()
    }
}

impl CreateTable for SqliteExpenseStore {
    fn create_table(connection: &Connection) -> Result<(), rusqlite::Error> {
        connection.execute(
            "CREATE TABLE expense (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    amount REAL NOT NULL,
                    description TEXT NOT NULL,
                    category TEXT,
                    timestamp TEXT NOT NULL
                    )",
            (),
        )?;

        // Ensure the sequence starts at 1
        connection.execute(
            "INSERT OR IGNORE INTO sqlite_sequence (name, seq) VALUES ('expense', 0)",
            (),
        )?;

        Ok(())
    }
}

impl MapRow for SqliteExpenseStore {
    type ReturnType = Expense;

    fn map_row_with_offset(row: &Row, offset: usize) -> Result<Self::ReturnType, rusqlite::Error> {
        let id = row.get(offset)?;
        let amount = row.get(offset + 1)?;
        let description = row.get(offset + 2)?;
        let category: Option<String> = row.get(offset + 3)?;
        let timestamp = row.get(offset + 4)?;

        let expense = Expense::new_unchecked(
            id,
            amount,
            description,
            category.unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
            timestamp,
        );

        Ok(expense)
    }
}

#[cfg(test)]
mod sqlite_expense_store_tests {
    use std::sync::{Arc, Mutex};

    use rusqlite::Connection;
    use time::{Duration, Month, OffsetDateTime, macros::datetime};

    use crate::{
        Error,
        db::{configure, initialize},
        models::{DEFAULT_CATEGORY, Expense},
        stores::{ExpenseStore, ExpenseUpdate, RowChange, UpdateOutcome},
    };

    use super::SqliteExpenseStore;

    fn get_store() -> SqliteExpenseStore {
        let conn = Connection::open_in_memory().unwrap();
        configure(&conn).unwrap();
        initialize(&conn).unwrap();

        SqliteExpenseStore::new(Arc::new(Mutex::new(conn)))
    }

    #[test]
    fn create_succeeds() {
        let mut store = get_store();
        let timestamp = datetime!(2024-08-07 12:00 UTC);

        let expense = store
            .create(
                Expense::build(12.3, "Coffee")
                    .category("Food")
                    .timestamp(timestamp),
            )
            .unwrap();

        assert!(expense.id() > 0);
        assert_eq!(expense.amount(), 12.3);
        assert_eq!(expense.description(), "Coffee");
        assert_eq!(expense.category(), "Food");
        assert_eq!(*expense.timestamp(), timestamp);
    }

    #[test]
    fn create_applies_defaults() {
        let mut store = get_store();

        let expense = store.create(Expense::build(9.99, "Socks")).unwrap();

        assert_eq!(expense.category(), DEFAULT_CATEGORY);
        let age = OffsetDateTime::now_utc() - *expense.timestamp();
        assert!(
            age < Duration::seconds(5),
            "default timestamp {} is not close to now",
            expense.timestamp()
        );
    }

    #[test]
    fn create_assigns_unique_ids() {
        let mut store = get_store();

        let first = store.create(Expense::build(1.0, "First")).unwrap();
        let second = store.create(Expense::build(2.0, "Second")).unwrap();

        assert_ne!(first.id(), second.id());
    }

    #[test]
    fn create_fails_on_empty_description() {
        let mut store = get_store();

        let result = store.create(Expense::build(12.3, ""));

        assert_eq!(result, Err(Error::EmptyDescription));
    }

    #[test]
    fn create_fails_on_non_finite_amount() {
        let mut store = get_store();

        let result = store.create(Expense::build(f64::NAN, "Mystery"));

        assert!(
            matches!(result, Err(Error::NonFiniteAmount(_))),
            "want NonFiniteAmount error, got {result:?}"
        );
    }

    #[test]
    fn get_expense_by_id_succeeds() {
        let mut store = get_store();
        let expense = store
            .create(Expense::build(12.3, "Coffee").timestamp(datetime!(2024-08-07 12:00 UTC)))
            .unwrap();

        let selected_expense = store.get(expense.id());

        assert_eq!(Ok(expense), selected_expense);
    }

    #[test]
    fn get_expense_fails_on_invalid_id() {
        let mut store = get_store();
        let expense = store.create(Expense::build(12.3, "Coffee")).unwrap();

        let maybe_expense = store.get(expense.id() + 654);

        assert_eq!(maybe_expense, Err(Error::NotFound));
    }

    #[test]
    fn delete_removes_expense() {
        let mut store = get_store();
        let expense = store.create(Expense::build(12.3, "Coffee")).unwrap();

        let change = store.delete(expense.id()).unwrap();

        assert_eq!(change, RowChange::Changed);
        assert!(
            store
                .get_all()
                .unwrap()
                .iter()
                .all(|remaining| remaining.id() != expense.id())
        );
    }

    #[test]
    fn delete_is_idempotent() {
        let mut store = get_store();
        let expense = store.create(Expense::build(12.3, "Coffee")).unwrap();

        store.delete(expense.id()).unwrap();
        let change = store.delete(expense.id()).unwrap();

        assert_eq!(change, RowChange::NotFound);
    }

    #[test]
    fn update_changes_only_supplied_fields() {
        let mut store = get_store();
        let timestamp = datetime!(2024-08-07 12:00 UTC);
        let expense = store
            .create(
                Expense::build(12.3, "Coffee")
                    .category("Food")
                    .timestamp(timestamp),
            )
            .unwrap();

        let outcome = store
            .update(
                expense.id(),
                ExpenseUpdate {
                    amount: Some(45.6),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(outcome, UpdateOutcome::Applied);
        let updated = store.get(expense.id()).unwrap();
        assert_eq!(updated.amount(), 45.6);
        assert_eq!(updated.description(), "Coffee");
        assert_eq!(updated.category(), "Food");
        assert_eq!(*updated.timestamp(), timestamp);
    }

    #[test]
    fn update_applies_all_supplied_fields() {
        let mut store = get_store();
        let expense = store
            .create(Expense::build(12.3, "Coffee").category("Food"))
            .unwrap();

        let outcome = store
            .update(
                expense.id(),
                ExpenseUpdate {
                    amount: Some(45.6),
                    description: Some("Petrol".to_string()),
                    category: Some("Fuel".to_string()),
                },
            )
            .unwrap();

        assert_eq!(outcome, UpdateOutcome::Applied);
        let updated = store.get(expense.id()).unwrap();
        assert_eq!(updated.amount(), 45.6);
        assert_eq!(updated.description(), "Petrol");
        assert_eq!(updated.category(), "Fuel");
    }

    #[test]
    fn update_with_no_fields_leaves_expense_unchanged() {
        let mut store = get_store();
        let expense = store
            .create(Expense::build(12.3, "Coffee").timestamp(datetime!(2024-08-07 12:00 UTC)))
            .unwrap();

        let outcome = store
            .update(expense.id(), ExpenseUpdate::default())
            .unwrap();

        assert_eq!(outcome, UpdateOutcome::NoFields);
        assert_eq!(store.get(expense.id()), Ok(expense));
    }

    #[test]
    fn update_rejects_non_finite_amount() {
        let mut store = get_store();
        let expense = store.create(Expense::build(12.3, "Coffee")).unwrap();

        for amount in [f64::INFINITY, f64::NEG_INFINITY, f64::NAN] {
            let result = store.update(
                expense.id(),
                ExpenseUpdate {
                    amount: Some(amount),
                    ..Default::default()
                },
            );

            assert!(
                matches!(result, Err(Error::NonFiniteAmount(_))),
                "want NonFiniteAmount error for {amount}, got {result:?}"
            );
        }

        assert_eq!(store.get(expense.id()).unwrap().amount(), 12.3);
    }

    #[test]
    fn update_rejects_empty_description() {
        let mut store = get_store();
        let expense = store.create(Expense::build(12.3, "Coffee")).unwrap();

        let result = store.update(
            expense.id(),
            ExpenseUpdate {
                description: Some(String::new()),
                ..Default::default()
            },
        );

        assert_eq!(result, Err(Error::EmptyDescription));
        assert_eq!(store.get(expense.id()).unwrap().description(), "Coffee");
    }

    #[test]
    fn update_reports_missing_expense() {
        let mut store = get_store();

        let outcome = store
            .update(
                999,
                ExpenseUpdate {
                    amount: Some(1.0),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(outcome, UpdateOutcome::NotFound);
    }

    #[test]
    fn get_all_returns_most_recent_first() {
        let mut store = get_store();
        let oldest = store
            .create(Expense::build(1.0, "Oldest").timestamp(datetime!(2024-06-01 08:00 UTC)))
            .unwrap();
        let newest = store
            .create(Expense::build(2.0, "Newest").timestamp(datetime!(2024-06-03 08:00 UTC)))
            .unwrap();
        let middle = store
            .create(Expense::build(3.0, "Middle").timestamp(datetime!(2024-06-02 08:00 UTC)))
            .unwrap();

        let got = store.get_all().unwrap();

        assert_eq!(got, vec![newest, middle, oldest]);
    }

    #[test]
    fn search_matches_case_sensitive_substrings() {
        let mut store = get_store();
        let lowercase = store.create(Expense::build(3.5, "Decaf coffee")).unwrap();
        store.create(Expense::build(4.0, "COFFEE BEANS")).unwrap();
        store.create(Expense::build(5.0, "Petrol")).unwrap();

        let got = store.search("coffee").unwrap();

        assert_eq!(got, vec![lowercase]);
    }

    #[test]
    fn search_matches_substrings_not_whole_words() {
        let mut store = get_store();
        let expense = store.create(Expense::build(3.5, "Decaf coffee")).unwrap();

        let got = store.search("caf cof").unwrap();

        assert_eq!(got, vec![expense]);
    }

    #[test]
    fn search_treats_wildcards_literally() {
        let mut store = get_store();
        let with_percent = store.create(Expense::build(20.0, "100% cotton")).unwrap();
        store.create(Expense::build(21.0, "1000 cotton")).unwrap();

        let got = store.search("100%").unwrap();

        assert_eq!(got, vec![with_percent]);
    }

    #[test]
    fn get_monthly_uses_half_open_interval() {
        let mut store = get_store();
        let at_month_start = store
            .create(Expense::build(1.0, "Month start").timestamp(datetime!(2024-06-01 00:00 UTC)))
            .unwrap();
        let before_month_end = store
            .create(Expense::build(2.0, "Month end").timestamp(datetime!(2024-06-30 23:59:59 UTC)))
            .unwrap();

        // The expenses below land just outside the interval and should not
        // be returned by the query.
        store
            .create(Expense::build(3.0, "Too early").timestamp(datetime!(2024-05-31 23:59:59 UTC)))
            .unwrap();
        store
            .create(Expense::build(4.0, "Too late").timestamp(datetime!(2024-07-01 00:00 UTC)))
            .unwrap();

        let got = store.get_monthly(Month::June, 2024).unwrap();

        assert_eq!(got, vec![at_month_start, before_month_end]);
    }

    #[test]
    fn get_monthly_december_rolls_into_next_year() {
        let mut store = get_store();
        let in_december = store
            .create(
                Expense::build(1.0, "New Year's Eve").timestamp(datetime!(2024-12-31 23:59:59 UTC)),
            )
            .unwrap();
        store
            .create(Expense::build(2.0, "New Year's Day").timestamp(datetime!(2025-01-01 00:00 UTC)))
            .unwrap();

        let got = store.get_monthly(Month::December, 2024).unwrap();

        assert_eq!(got, vec![in_december]);
    }
}
