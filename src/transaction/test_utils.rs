//! Shared fixtures for the transaction tests.

use rusqlite::Connection;
use time::Date;

use crate::{
    auth::{PasswordHash, UserID, create_user},
    db::initialize,
    transaction::core::TransactionFields,
};

/// An in-memory database with the application tables.
pub fn get_test_connection() -> Connection {
    let connection = Connection::open_in_memory().expect("could not open in-memory database");
    initialize(&connection).expect("could not initialize test database");
    connection
}

/// Insert a user with a cheap password hash and return their ID.
pub fn create_test_user(connection: &Connection, email: &str) -> UserID {
    let password_hash = PasswordHash::new("hunter2", 4).expect("could not hash test password");
    create_user(email, password_hash, connection)
        .expect("could not create test user")
        .id
}

/// Valid transaction fields with `description` and `date`.
pub fn test_fields(description: &str, date: Date) -> TransactionFields {
    TransactionFields {
        description: description.to_owned(),
        category: "Food".to_owned(),
        amount: 12.5,
        date,
        payment_type: "Credit Card".to_owned(),
    }
}
