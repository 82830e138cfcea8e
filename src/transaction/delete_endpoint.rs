//! Defines the endpoint for deleting a transaction.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    auth::UserID,
    transaction::{
        core::remove_transaction,
        edit_page::{check_transaction_id, invalid_id_response},
        persistence_error::PersistenceError,
    },
};

/// The state needed to delete a transaction.
#[derive(Debug, Clone)]
pub struct DeleteTransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for deleting a transaction, responds with the deleted transaction as JSON.
// The status code has to be 200 OK or HTMX will not delete the table row.
pub async fn delete_transaction_endpoint(
    State(state): State<DeleteTransactionState>,
    Extension(user_id): Extension<UserID>,
    Path(raw_id): Path<String>,
) -> Response {
    let transaction_id = match check_transaction_id(&raw_id) {
        Ok(transaction_id) => transaction_id,
        Err(error) => {
            tracing::debug!("Rejected transaction ID {raw_id:?}: {error}");
            return invalid_id_response(&error);
        }
    };

    let result = match state.db_connection.lock() {
        Ok(connection) => remove_transaction(transaction_id, user_id, &connection),
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            Err(PersistenceError::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                &Error::DatabaseLockError.to_string(),
            ))
        }
    };

    match result {
        Ok(transaction) => {
            tracing::info!("Deleted transaction {transaction_id} for user {user_id}");
            Json(transaction).into_response()
        }
        Err(error) => {
            tracing::debug!(
                "Could not delete transaction {transaction_id}: {}",
                error.message
            );
            error.into_response()
        }
    }
}
