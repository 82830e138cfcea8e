//! Defines the route handlers for the pages that display a user's transactions as a table.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde::Deserialize;
use time::{Date, macros::date};

use crate::{
    AppState, Error,
    auth::UserID,
    timezone::today_in,
    transaction::{
        core::{
            Transaction, get_all_transactions, get_transactions_by_date_range_and_category,
            sort_most_recent_first,
        },
        persistence_error::PersistenceError,
        view::{FilterInputs, TransactionsListing, transactions_view},
    },
    validation::{DATE_FORMAT, ErrorList, ValidationError, check_date, sanitize},
};

/// The start date used when the filter form does not specify one.
pub const DEFAULT_START_DATE: Date = date!(2021 - 01 - 01);

pub const START_DATE_FIELD: &str = "Start Date";
pub const END_DATE_FIELD: &str = "End Date";

/// The state needed for displaying the transactions page.
#[derive(Debug, Clone)]
pub struct TransactionsViewState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for TransactionsViewState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Fetch all of the transactions for `user_id`, most recent first.
pub(super) fn get_sorted_transactions(
    user_id: UserID,
    db_connection: &Mutex<Connection>,
) -> Result<Vec<Transaction>, Error> {
    let connection = db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    let mut transactions = get_all_transactions(user_id, &connection)?;
    sort_most_recent_first(&mut transactions);

    Ok(transactions)
}

/// Render a table with all of the user's transactions, most recent first.
pub async fn get_transactions_page(
    State(state): State<TransactionsViewState>,
    Extension(user_id): Extension<UserID>,
) -> Response {
    match get_sorted_transactions(user_id, &state.db_connection) {
        Ok(transactions) => transactions_view(TransactionsListing {
            transactions: &transactions,
            filters: None,
            errors: &ErrorList::new(),
            alert: None,
        })
        .into_response(),
        Err(error) => {
            tracing::error!("Could not get transactions for user {user_id}: {error}");
            PersistenceError::from_error(error, StatusCode::NOT_FOUND).into_response()
        }
    }
}

/// The query parameters for filtering the transactions page.
#[derive(Debug, Default, Deserialize)]
pub struct FilterQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub category: Option<String>,
}

/// A validated filter for the transactions page.
#[derive(Debug, PartialEq)]
pub struct TransactionFilter {
    pub start: Date,
    pub end: Date,
    /// `None` means every category.
    pub category: Option<String>,
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(sanitize)
        .filter(|sanitized| !sanitized.is_empty())
}

impl FilterQuery {
    /// The values to show in the filter form, with the default dates filled in.
    pub fn inputs(&self, today: Date) -> FilterInputs {
        let format_date = |date: Date| date.format(DATE_FORMAT).unwrap_or_default();

        FilterInputs {
            start_date: non_empty(self.start_date.as_deref())
                .unwrap_or_else(|| format_date(DEFAULT_START_DATE)),
            end_date: non_empty(self.end_date.as_deref()).unwrap_or_else(|| format_date(today)),
            category: non_empty(self.category.as_deref()).unwrap_or_default(),
        }
    }

    /// Validate the filter, using [DEFAULT_START_DATE] and `today` for missing dates.
    ///
    /// # Errors
    /// Returns every invalid date, and an error if the start date is after the end date.
    pub fn validate(&self, today: Date) -> Result<TransactionFilter, ErrorList> {
        let mut errors = ErrorList::new();

        let start = match non_empty(self.start_date.as_deref()) {
            Some(start_date) => errors.collect(check_date(&start_date, START_DATE_FIELD)),
            None => Some(DEFAULT_START_DATE),
        };
        let end = match non_empty(self.end_date.as_deref()) {
            Some(end_date) => errors.collect(check_date(&end_date, END_DATE_FIELD)),
            None => Some(today),
        };

        if matches!((start, end), (Some(start), Some(end)) if start > end) {
            errors.push(ValidationError::new(
                START_DATE_FIELD,
                "must not be after the End Date",
            ));
        }

        match (start, end) {
            (Some(start), Some(end)) if errors.is_empty() => Ok(TransactionFilter {
                start,
                end,
                category: non_empty(self.category.as_deref()),
            }),
            _ => Err(errors),
        }
    }
}

/// Render a table of the user's transactions between two dates, optionally for one category.
///
/// Invalid filters are shown on the page with no transactions and a 400 status.
pub async fn get_filtered_transactions_page(
    State(state): State<TransactionsViewState>,
    Extension(user_id): Extension<UserID>,
    Query(query): Query<FilterQuery>,
) -> Response {
    let Some(today) = today_in(&state.local_timezone) else {
        tracing::error!("Invalid timezone {}", state.local_timezone);
        return Error::InvalidTimezone(state.local_timezone).into_response();
    };

    let inputs = query.inputs(today);

    let filter = match query.validate(today) {
        Ok(filter) => filter,
        Err(errors) => {
            tracing::debug!("Rejected transaction filter with {} errors", errors.len());
            return (
                StatusCode::BAD_REQUEST,
                transactions_view(TransactionsListing {
                    transactions: &[],
                    filters: Some(&inputs),
                    errors: &errors,
                    alert: None,
                }),
            )
                .into_response();
        }
    };

    let transactions = state
        .db_connection
        .lock()
        .map_err(|error| {
            tracing::error!("could not acquire database lock: {error}");
            Error::DatabaseLockError
        })
        .and_then(|connection| {
            get_transactions_by_date_range_and_category(
                user_id,
                filter.start,
                filter.end,
                filter.category.as_deref(),
                &connection,
            )
        });

    match transactions {
        Ok(mut transactions) => {
            sort_most_recent_first(&mut transactions);

            transactions_view(TransactionsListing {
                transactions: &transactions,
                filters: Some(&inputs),
                errors: &ErrorList::new(),
                alert: None,
            })
            .into_response()
        }
        Err(error) => {
            tracing::error!("Could not filter transactions for user {user_id}: {error}");
            PersistenceError::from_error(error, StatusCode::BAD_REQUEST).into_response()
        }
    }
}
