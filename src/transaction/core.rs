//! Defines the core data model and database queries for transactions.

use axum::http::StatusCode;
use rusqlite::{Connection, Row, params};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    Error,
    auth::UserID,
    database_id::TransactionId,
    transaction::persistence_error::PersistenceError,
};

// ============================================================================
// MODELS
// ============================================================================

time::serde::format_description!(iso_date, Date, "[year]-[month]-[day]");

/// An expense or income recorded by a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// The user that recorded the transaction.
    pub user_id: UserID,
    /// A text description of what the transaction was for.
    pub description: String,
    /// A free-text category, e.g. "Groceries".
    pub category: String,
    /// The amount of money spent or earned in this transaction.
    pub amount: f64,
    /// When the transaction happened.
    #[serde(with = "iso_date")]
    pub date: Date,
    /// How the transaction was paid, e.g. "Credit Card".
    pub payment_type: String,
}

/// The user-editable fields of a transaction after they have been sanitized and validated.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionFields {
    /// A text description of what the transaction was for.
    pub description: String,
    /// A free-text category, e.g. "Groceries".
    pub category: String,
    /// The amount of money spent or earned in this transaction.
    pub amount: f64,
    /// When the transaction happened.
    pub date: Date,
    /// How the transaction was paid, e.g. "Credit Card".
    pub payment_type: String,
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

const TRANSACTION_COLUMNS: &str = "id, user_id, description, category, amount, date, payment_type";

/// Create a new transaction for `user_id` in the database.
///
/// # Errors
/// This function will return a [Error::SqlError] if `user_id` does not refer to a user or
/// there is some other SQL error.
pub fn add_transaction(
    user_id: UserID,
    fields: &TransactionFields,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let transaction = connection
        .prepare(&format!(
            "INSERT INTO \"transaction\" (user_id, description, category, amount, date, payment_type)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             RETURNING {TRANSACTION_COLUMNS}"
        ))?
        .query_row(
            params![
                user_id.as_i64(),
                fields.description,
                fields.category,
                fields.amount,
                fields.date,
                fields.payment_type,
            ],
            map_transaction_row,
        )?;

    Ok(transaction)
}

/// Retrieve the transaction `id` belonging to `user_id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to one of the user's transactions,
/// - or [Error::SqlError] there is some other SQL error.
pub fn get_transaction(
    id: TransactionId,
    user_id: UserID,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let transaction = connection
        .prepare(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM \"transaction\" WHERE id = ?1 AND user_id = ?2"
        ))?
        .query_row(params![id, user_id.as_i64()], map_transaction_row)?;

    Ok(transaction)
}

/// Retrieve all of the transactions belonging to `user_id` in the order they were created.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn get_all_transactions(
    user_id: UserID,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    connection
        .prepare(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM \"transaction\" WHERE user_id = ?1 ORDER BY id ASC"
        ))?
        .query_map(params![user_id.as_i64()], map_transaction_row)?
        .map(|maybe_transaction| maybe_transaction.map_err(Error::from))
        .collect()
}

/// Retrieve the transactions belonging to `user_id` dated between `start` and `end` inclusive.
///
/// Only transactions in `category` are included, compared case-insensitively.
/// If `category` is `None` the transactions from every category are included.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn get_transactions_by_date_range_and_category(
    user_id: UserID,
    start: Date,
    end: Date,
    category: Option<&str>,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    connection
        .prepare(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM \"transaction\"
             WHERE user_id = ?1
                AND date BETWEEN ?2 AND ?3
                AND (?4 IS NULL OR category = ?4 COLLATE NOCASE)
             ORDER BY id ASC"
        ))?
        .query_map(
            params![user_id.as_i64(), start, end, category],
            map_transaction_row,
        )?
        .map(|maybe_transaction| maybe_transaction.map_err(Error::from))
        .collect()
}

/// Replace the fields of the transaction `id` belonging to `user_id`.
///
/// # Errors
/// Returns a [PersistenceError] with the status:
/// - 404 if `id` does not refer to one of the user's transactions,
/// - or 500 if there is some other SQL error.
pub fn update_transaction(
    id: TransactionId,
    user_id: UserID,
    fields: &TransactionFields,
    connection: &Connection,
) -> Result<Transaction, PersistenceError> {
    connection
        .prepare(&format!(
            "UPDATE \"transaction\"
             SET description = ?1, category = ?2, amount = ?3, date = ?4, payment_type = ?5
             WHERE id = ?6 AND user_id = ?7
             RETURNING {TRANSACTION_COLUMNS}"
        ))
        .and_then(|mut statement| {
            statement.query_row(
                params![
                    fields.description,
                    fields.category,
                    fields.amount,
                    fields.date,
                    fields.payment_type,
                    id,
                    user_id.as_i64(),
                ],
                map_transaction_row,
            )
        })
        .map_err(|error| transaction_persistence_error(id, error))
}

/// Delete the transaction `id` belonging to `user_id` and return the deleted transaction.
///
/// # Errors
/// Returns a [PersistenceError] with the status:
/// - 404 if `id` does not refer to one of the user's transactions,
/// - or 500 if there is some other SQL error.
pub fn remove_transaction(
    id: TransactionId,
    user_id: UserID,
    connection: &Connection,
) -> Result<Transaction, PersistenceError> {
    connection
        .prepare(&format!(
            "DELETE FROM \"transaction\" WHERE id = ?1 AND user_id = ?2 RETURNING {TRANSACTION_COLUMNS}"
        ))
        .and_then(|mut statement| {
            statement.query_row(params![id, user_id.as_i64()], map_transaction_row)
        })
        .map_err(|error| transaction_persistence_error(id, error))
}

fn transaction_persistence_error(id: TransactionId, error: rusqlite::Error) -> PersistenceError {
    match Error::from(error) {
        Error::NotFound => PersistenceError::new(
            StatusCode::NOT_FOUND,
            &format!("No transaction with id {id}"),
        ),
        error => PersistenceError::from_error(error, StatusCode::INTERNAL_SERVER_ERROR),
    }
}

/// Get the number of transactions belonging to `user_id`.
///
/// # Errors
/// This function will return a [Error::SqlError] there is some SQL error.
#[cfg(test)]
pub fn count_transactions(user_id: UserID, connection: &Connection) -> Result<u32, Error> {
    connection
        .query_row(
            "SELECT COUNT(id) FROM \"transaction\" WHERE user_id = ?1",
            params![user_id.as_i64()],
            |row| row.get(0),
        )
        .map_err(|error| error.into())
}

/// Create the transaction table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                description TEXT NOT NULL,
                category TEXT NOT NULL,
                amount REAL NOT NULL,
                date TEXT NOT NULL,
                payment_type TEXT NOT NULL,
                FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
                )",
        (),
    )?;

    // Used by the listing and the date range filter.
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transaction_user_date ON \"transaction\"(user_id, date);",
        (),
    )?;

    Ok(())
}

/// Map a database row to a Transaction.
pub fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    let id = row.get(0)?;
    let user_id = UserID::new(row.get(1)?);
    let description = row.get(2)?;
    let category = row.get(3)?;
    let amount = row.get(4)?;
    let date = row.get(5)?;
    let payment_type = row.get(6)?;

    Ok(Transaction {
        id,
        user_id,
        description,
        category,
        amount,
        date,
        payment_type,
    })
}

/// Sort `transactions` by date, newest first, breaking ties by the most recently created.
pub fn sort_most_recent_first(transactions: &mut [Transaction]) {
    transactions.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));
}

// ============================================================================
// TESTS
// ============================================================================
