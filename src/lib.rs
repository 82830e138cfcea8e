//! Ledgerly is a web app for keeping track of personal financial transactions.
//!
//! This library provides a REST API that directly serves HTML pages for
//! creating, listing, filtering, editing, deleting and exporting transactions.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use tokio::signal;

mod app_state;
mod auth;
mod database_id;
mod db;
mod endpoints;
mod error_page;
mod html;
mod logging;
mod navigation;
mod routing;
mod timezone;
mod transaction;
mod validation;

#[cfg(test)]
mod test_utils;

pub use app_state::AppState;
pub use auth::{PasswordHash, User, UserID};
pub use db::initialize as initialize_db;
pub use logging::logging_middleware;
pub use routing::build_router;
pub use timezone::get_local_offset;

use crate::error_page::ErrorPage;

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            tracing::error!("Could not listen for ctrl+c: {error}");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(error) => {
                tracing::error!("Could not listen for SIGTERM: {error}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Shutting down after ctrl+c."),
        _ = terminate => tracing::info!("Shutting down after SIGTERM."),
    }
}

/// Wait for ctrl+c or SIGTERM, then give the server behind `handle` one second to finish
/// in-flight requests.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    shutdown_signal().await;
    handle.graceful_shutdown(Some(Duration::from_secs(1)));
}

/// Everything that can go wrong in ledgerly.
///
/// Handlers convert these into responses with [IntoResponse]. Only [Error::NotFound] and
/// [Error::InvalidTimezone] say what went wrong. Every other variant shows a generic
/// error page and is logged instead.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// Nobody is registered with that email, or the password is wrong.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// No usable session cookie: missing, not decryptable, not a session, or expired.
    #[error("invalid session cookie: {0}")]
    CookieError(String),

    /// zxcvbn rated the password as too easy to guess. Holds its advice.
    #[error("password is too weak: {0}")]
    TooWeak(String),

    /// bcrypt failed to hash or verify a password.
    #[error("password hashing failed: {0}")]
    HashingError(String),

    /// Another user already registered this email.
    #[error("the email address is already registered")]
    DuplicateEmail,

    /// The row does not exist, or belongs to another user.
    #[error("not found")]
    NotFound,

    /// A database failure that none of the other variants describe.
    #[error("database error: {0}")]
    SqlError(rusqlite::Error),

    /// The database mutex was poisoned by a panicking thread.
    #[error("the database lock is poisoned")]
    DatabaseLockError,

    /// The configured timezone name is not in the timezone database.
    #[error("unknown timezone {0}")]
    InvalidTimezone(String),

    /// The CSV export could not be written.
    #[error("could not export transactions: {0}")]
    ExportError(String),
}

impl From<rusqlite::Error> for Error {
    fn from(error: rusqlite::Error) -> Self {
        match error {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            rusqlite::Error::SqliteFailure(ref failure, Some(ref message))
                if failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                    && message.ends_with("user.email") =>
            {
                Error::DuplicateEmail
            }
            error => {
                tracing::error!("Unhandled SQL error: {error}");
                Error::SqlError(error)
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::NotFound => ErrorPage::NOT_FOUND.into_response(),
            Error::InvalidTimezone(timezone) => ErrorPage {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                description: "Invalid Timezone Settings",
                fix: &format!(
                    "The server timezone \"{timezone}\" is unknown. Set it to a canonical name \
                    such as \"Pacific/Auckland\"."
                ),
            }
            .into_response(),
            error => {
                tracing::error!("Responding with a server error: {error}");
                ErrorPage::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }
}
