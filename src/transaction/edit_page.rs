//! Defines the page for editing a single transaction.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    auth::UserID,
    database_id::TransactionId,
    transaction::{
        core::get_transaction, form::TransactionForm, persistence_error::PersistenceError,
        view::edit_transaction_view,
    },
    validation::{ValidationError, check_id},
};

/// The name reported in errors for the transaction ID in the URL.
pub const ID_PARAM_FIELD: &str = "ID URL Param";

/// The state needed to view and update a transaction.
#[derive(Debug, Clone)]
pub struct EditTransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Check the raw transaction ID taken from the URL path.
pub fn check_transaction_id(raw_id: &str) -> Result<TransactionId, ValidationError> {
    check_id(raw_id, ID_PARAM_FIELD)
}

/// The JSON response for a malformed transaction ID.
pub fn invalid_id_response(error: &ValidationError) -> Response {
    PersistenceError::new(StatusCode::BAD_REQUEST, &error.to_string()).into_response()
}

/// Renders the form for editing the transaction in the URL path.
pub async fn get_edit_transaction_page(
    State(state): State<EditTransactionState>,
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

    let transaction = state
        .db_connection
        .lock()
        .map_err(|error| {
            tracing::error!("could not acquire database lock: {error}");
            Error::DatabaseLockError
        })
        .and_then(|connection| get_transaction(transaction_id, user_id, &connection));

    match transaction {
        Ok(transaction) => {
            edit_transaction_view(transaction_id, &TransactionForm::from(&transaction))
                .into_response()
        }
        Err(error) => {
            tracing::debug!("Could not get transaction {transaction_id}: {error}");
            PersistenceError::from_error(error, StatusCode::NOT_FOUND).into_response()
        }
    }
}
