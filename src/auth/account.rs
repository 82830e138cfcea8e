//! Registered users, their password hashes and the user table.

use std::fmt::Display;

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};
use zxcvbn::{Score, zxcvbn};

use crate::Error;

/// The ID of a registered user.
///
/// Kept apart from transaction IDs so the two cannot be swapped by accident.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserID(i64);

impl UserID {
    /// Wrap a raw database ID.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// The raw database ID.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl Display for UserID {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A bcrypt hash of a user's password.
#[derive(Debug, Clone, PartialEq)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// The bcrypt cost used for real accounts.
    pub const DEFAULT_COST: u32 = bcrypt::DEFAULT_COST;

    /// Hash `password` with a fresh salt.
    ///
    /// Call [check_password_strength] first, this function accepts any password.
    ///
    /// # Errors
    /// Returns an [Error::HashingError] if bcrypt fails, e.g. for a `cost` outside 4..=31.
    pub fn new(password: &str, cost: u32) -> Result<Self, Error> {
        bcrypt::hash(password, cost)
            .map(Self)
            .map_err(|error| Error::HashingError(error.to_string()))
    }

    /// Whether `password` is the password this hash was made from.
    ///
    /// # Errors
    /// Returns an [Error::HashingError] if the stored hash is malformed.
    pub fn matches(&self, password: &str) -> Result<bool, Error> {
        bcrypt::verify(password, &self.0).map_err(|error| Error::HashingError(error.to_string()))
    }
}

/// Reject passwords that zxcvbn scores below three out of four.
///
/// `context` lists strings the password should not be built from, such as the email address.
///
/// # Errors
/// Returns an [Error::TooWeak] with zxcvbn's advice for a stronger password.
pub fn check_password_strength(password: &str, context: &[&str]) -> Result<(), Error> {
    let entropy = zxcvbn(password, context);

    if matches!(entropy.score(), Score::Three | Score::Four) {
        return Ok(());
    }

    let advice = entropy
        .feedback()
        .map(|feedback| feedback.to_string())
        .filter(|advice| !advice.trim().is_empty())
        .unwrap_or_else(|| "Use a longer password.".to_owned());

    Err(Error::TooWeak(advice))
}

/// A user of the application.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    /// The user's ID in the database.
    pub id: UserID,
    /// Lowercase email address, unique across users.
    pub email: String,
    /// The hash of the password the user logs in with.
    pub password_hash: PasswordHash,
}

/// Create the user table if it does not exist.
///
/// # Errors
/// Returns an error if the SQL query fails.
pub fn create_user_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS user (
            id INTEGER PRIMARY KEY,
            email TEXT UNIQUE NOT NULL,
            password_hash TEXT NOT NULL
        )",
        (),
    )?;

    Ok(())
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Store a new user. The email is trimmed and lowercased first.
///
/// # Errors
/// Returns an [Error::DuplicateEmail] if the email is taken, or an
/// [Error::SqlError] for other database failures.
pub fn create_user(
    email: &str,
    password_hash: PasswordHash,
    connection: &Connection,
) -> Result<User, Error> {
    let email = normalize_email(email);

    let id = connection.query_row(
        "INSERT INTO user (email, password_hash) VALUES (?1, ?2) RETURNING id",
        (&email, &password_hash.0),
        |row| row.get(0),
    )?;

    Ok(User {
        id: UserID(id),
        email,
        password_hash,
    })
}

/// Find the user registered with `email`, ignoring case and surrounding whitespace.
///
/// # Errors
/// Returns an [Error::NotFound] if nobody registered with `email`.
pub fn get_user_by_email(email: &str, connection: &Connection) -> Result<User, Error> {
    connection
        .query_row(
            "SELECT id, email, password_hash FROM user WHERE email = ?1",
            [normalize_email(email)],
            map_user_row,
        )
        .map_err(Error::from)
}

fn map_user_row(row: &Row) -> Result<User, rusqlite::Error> {
    Ok(User {
        id: UserID(row.get(0)?),
        email: row.get(1)?,
        password_hash: PasswordHash(row.get(2)?),
    })
}

#[cfg(test)]
mod password_tests {
    use crate::Error;

    use super::{PasswordHash, check_password_strength};

    #[test]
    fn guessable_passwords_are_too_weak() {
        for password in ["", "password1", "ledgerly@example.com"] {
            let result = check_password_strength(password, &["ledgerly@example.com"]);

            assert!(
                matches!(result, Err(Error::TooWeak(_))),
                "want {password:?} rejected, got {result:?}"
            );
        }
    }

    #[test]
    fn long_password_is_strong_enough() {
        assert_eq!(check_password_strength("asomewhatlongpassword1", &[]), Ok(()));
    }

    #[test]
    fn hash_matches_only_its_password() {
        let hash = PasswordHash::new("correct horse battery staple", 4).unwrap();

        assert!(hash.matches("correct horse battery staple").unwrap());
        assert!(!hash.matches("correct horse battery").unwrap());
    }
}
