//! The state shared by every route handler.

use std::{
    path::PathBuf,
    sync::{Arc, Mutex},
};

use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;
use rusqlite::Connection;
use sha2::{Digest, Sha512};
use time::Duration;

use crate::{Error, auth::SESSION_LENGTH, db::initialize};

/// Everything the route handlers need. Handlers take the narrower state structs that
/// implement `FromRef<AppState>` rather than this struct.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Encrypts the session cookie.
    pub cookie_key: Key,

    /// How long a session lasts without any requests.
    pub session_length: Duration,

    /// Canonical timezone name, e.g. "Pacific/Auckland", used to decide what "today" is.
    pub local_timezone: String,

    /// Where CSV exports are written.
    pub export_dir: PathBuf,

    /// The one SQLite connection, shared behind a lock.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl AppState {
    /// Create the tables in `db_connection` if needed and derive the cookie key from
    /// `cookie_secret`.
    ///
    /// # Errors
    /// Returns an error if a table cannot be created.
    pub fn new(
        db_connection: Connection,
        cookie_secret: &str,
        local_timezone: &str,
        export_dir: PathBuf,
    ) -> Result<Self, Error> {
        initialize(&db_connection)?;

        Ok(Self {
            cookie_key: create_cookie_key(cookie_secret),
            session_length: SESSION_LENGTH,
            local_timezone: local_timezone.to_owned(),
            export_dir,
            db_connection: Arc::new(Mutex::new(db_connection)),
        })
    }
}

impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.cookie_key.clone()
    }
}

/// A 64 byte cookie key derived from `secret`, so the same secret decrypts cookies
/// issued before a restart.
pub fn create_cookie_key(secret: &str) -> Key {
    Key::from(&Sha512::digest(secret))
}
