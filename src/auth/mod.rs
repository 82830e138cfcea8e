//! Accounts and log-in sessions for gating the transaction routes.

use std::sync::{Arc, Mutex};

use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;
use rusqlite::Connection;
use time::Duration;

use crate::AppState;

mod account;
mod gate;
mod pages;
mod session;

pub use account::{PasswordHash, User, UserID, create_user, create_user_table, get_user_by_email};
pub use gate::auth_guard;
pub use pages::{get_log_in_page, get_log_out, get_register_page, post_log_in, register_user};
pub use session::SESSION_LENGTH;

#[cfg(test)]
pub use session::SESSION_COOKIE;

/// The state shared by the account pages and the auth middleware.
#[derive(Debug, Clone)]
pub struct AccountState {
    /// The key for encrypting the session cookie.
    pub cookie_key: Key,
    /// How long a session lasts without any requests.
    pub session_length: Duration,
    /// The database connection for looking up and registering users.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for AccountState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            session_length: state.session_length,
            db_connection: state.db_connection.clone(),
        }
    }
}

impl FromRef<AccountState> for Key {
    fn from_ref(state: &AccountState) -> Self {
        state.cookie_key.clone()
    }
}
