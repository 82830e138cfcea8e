//! Defines the page and endpoint for creating a new transaction.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::{Form, FormRejection};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    auth::UserID,
    html::error_view,
    timezone::today_in,
    transaction::{
        core::add_transaction, form::TransactionForm, persistence_error::PersistenceError,
        view::new_transaction_view,
    },
    validation::{DATE_FORMAT, ErrorList},
};

pub const TRANSACTION_ADDED_MESSAGE: &str = "Transaction added successfully!";

/// The state needed to create a transaction.
#[derive(Debug, Clone)]
pub struct CreateTransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for CreateTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// An empty form with today's date filled in.
fn blank_form(local_timezone: &str) -> Result<TransactionForm, Error> {
    let today = today_in(local_timezone)
        .ok_or_else(|| Error::InvalidTimezone(local_timezone.to_owned()))?;

    Ok(TransactionForm {
        transaction_date: today.format(DATE_FORMAT).ok(),
        ..Default::default()
    })
}

/// Renders the page for creating a transaction.
pub async fn get_new_transaction_page(State(state): State<CreateTransactionState>) -> Response {
    match blank_form(&state.local_timezone) {
        Ok(form) => new_transaction_view(&form, &ErrorList::new(), None).into_response(),
        Err(error) => {
            tracing::error!("Could not render new transaction page: {error}");
            error.into_response()
        }
    }
}

fn empty_body_response() -> Response {
    (
        StatusCode::BAD_REQUEST,
        error_view(
            "Bad Request",
            "400",
            "No data in body part",
            "Fill in the transaction form and try again.",
        ),
    )
        .into_response()
}

/// A route handler for creating a new transaction.
///
/// Validation errors are shown on the form with the submitted values, otherwise the
/// transaction is stored and an empty form is shown with a success message.
pub async fn create_transaction_endpoint(
    State(state): State<CreateTransactionState>,
    Extension(user_id): Extension<UserID>,
    form: Result<Form<Vec<(String, String)>>, FormRejection>,
) -> Response {
    let form = match form.map(|Form(fields)| TransactionForm::from_fields(fields)) {
        Ok(Some(form)) => form,
        Ok(None) => return empty_body_response(),
        Err(rejection) => {
            tracing::warn!("Rejected new transaction form: {rejection}");
            return empty_body_response();
        }
    };

    let transaction = match form.validate(user_id) {
        Ok(transaction) => transaction,
        Err(errors) => {
            tracing::debug!("New transaction failed validation with {} errors", errors.len());
            return (
                StatusCode::BAD_REQUEST,
                new_transaction_view(&form.sanitized(), &errors, None),
            )
                .into_response();
        }
    };

    let result = match state.db_connection.lock() {
        Ok(connection) => add_transaction(transaction.user_id, &transaction.fields, &connection),
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            Err(Error::DatabaseLockError)
        }
    };

    if let Err(error) = result {
        tracing::error!("could not create transaction: {error}");
        return PersistenceError::from_error(error, StatusCode::INTERNAL_SERVER_ERROR)
            .into_response();
    }

    match blank_form(&state.local_timezone) {
        Ok(blank_form) => new_transaction_view(
            &blank_form,
            &ErrorList::new(),
            Some(TRANSACTION_ADDED_MESSAGE),
        )
        .into_response(),
        Err(error) => {
            tracing::error!("Could not render new transaction page: {error}");
            error.into_response()
        }
    }
}
