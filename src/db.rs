//! Sets up the application database.

use rusqlite::Connection;

use crate::{auth::create_user_table, transaction::create_transaction_table};

/// Create the tables for the domain models if they do not already exist.
///
/// # Errors
/// Returns an error if a table cannot be created.
pub fn initialize(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute("PRAGMA foreign_keys = ON", ())?;

    create_user_table(connection)?;
    create_transaction_table(connection)?;

    Ok(())
}
