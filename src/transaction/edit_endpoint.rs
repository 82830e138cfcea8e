//! Defines the endpoint for updating a transaction.

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::{Form, FormRejection};
use axum_htmx::HxRedirect;
use serde_json::json;

use crate::{
    Error,
    auth::UserID,
    endpoints,
    transaction::{
        core::update_transaction,
        edit_page::{EditTransactionState, check_transaction_id},
        form::TransactionForm,
        persistence_error::PersistenceError,
        view::edit_transaction_form,
    },
    validation::ErrorList,
};

/// A route handler for updating the transaction in the URL path.
///
/// The path ID and every form field are validated together so the form shows all
/// of the problems at once. On success the client is redirected to the transactions page.
pub async fn update_transaction_endpoint(
    State(state): State<EditTransactionState>,
    Extension(user_id): Extension<UserID>,
    Path(raw_id): Path<String>,
    form: Result<Form<TransactionForm>, FormRejection>,
) -> Response {
    let form = match form {
        Ok(Form(form)) => form,
        Err(rejection) => {
            tracing::warn!("Rejected transaction update form: {rejection}");
            return PersistenceError::new(StatusCode::BAD_REQUEST, &rejection.to_string())
                .into_response();
        }
    };

    let mut errors = ErrorList::new();
    let transaction_id = errors.collect(check_transaction_id(&raw_id));
    let transaction = form.validate_into(user_id, &mut errors);

    let (transaction_id, transaction) = match (transaction_id, transaction) {
        (Some(transaction_id), Some(transaction)) if errors.is_empty() => {
            (transaction_id, transaction)
        }
        (transaction_id, _) => {
            tracing::debug!(
                "Update for transaction {raw_id:?} failed validation with {} errors",
                errors.len()
            );
            return (
                StatusCode::BAD_REQUEST,
                edit_transaction_form(transaction_id, &form.sanitized(), &errors),
            )
                .into_response();
        }
    };

    let result = match state.db_connection.lock() {
        Ok(connection) => update_transaction(
            transaction_id,
            transaction.user_id,
            &transaction.fields,
            &connection,
        ),
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            Err(PersistenceError::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                &Error::DatabaseLockError.to_string(),
            ))
        }
    };

    match result {
        Ok(_) => (
            HxRedirect(endpoints::TRANSACTIONS_VIEW.to_owned()),
            Json(json!({ "update": true })),
        )
            .into_response(),
        Err(error) => {
            tracing::debug!(
                "Could not update transaction {transaction_id}: {}",
                error.message
            );
            error.into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Extension,
        body::Body,
        extract::{Path, State},
        http::{Response, StatusCode},
    };
    use axum_extra::extract::Form;
    use scraper::Selector;
    use serde_json::{Value, json};
    use time::macros::date;

    use crate::{
        auth::UserID,
        endpoints,
        test_utils::parse_html_fragment,
        transaction::{
            core::{add_transaction, get_transaction},
            edit_page::{EditTransactionState, ID_PARAM_FIELD},
            form::{AMOUNT_FIELD, DESCRIPTION_FIELD, TransactionForm},
            test_utils::{create_test_user, get_test_connection, test_fields},
        },
    };

    use super::update_transaction_endpoint;

    fn get_state() -> (EditTransactionState, UserID, i64) {
        let connection = get_test_connection();
        let user_id = create_test_user(&connection, "test@example.com");
        let transaction =
            add_transaction(user_id, &test_fields("Lunch", date!(2024 - 06 - 01)), &connection)
                .unwrap();

        (
            EditTransactionState {
                db_connection: Arc::new(Mutex::new(connection)),
            },
            user_id,
            transaction.id,
        )
    }

    fn form(description: &str, amount: &str) -> TransactionForm {
        TransactionForm {
            description: Some(description.to_owned()),
            category: Some("Dining".to_owned()),
            amount: Some(amount.to_owned()),
            transaction_date: Some("2024-07-04".to_owned()),
            payment_type: Some("Cash".to_owned()),
        }
    }

    async fn body_text(response: Response<Body>) -> String {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();

        String::from_utf8_lossy(&body).to_string()
    }

    async fn error_fields(response: Response<Body>) -> Vec<String> {
        parse_html_fragment(response)
            .await
            .select(&Selector::parse("#errors li.error").unwrap())
            .map(|item| item.text().collect::<String>())
            .collect()
    }

    #[tokio::test]
    async fn updates_transaction_and_redirects() {
        let (state, user_id, id) = get_state();

        let response = update_transaction_endpoint(
            State(state.clone()),
            Extension(user_id),
            Path(id.to_string()),
            Ok(Form(form("Dinner", "40"))),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get("hx-redirect").unwrap(),
            endpoints::TRANSACTIONS_VIEW
        );
        let json: Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(json, json!({ "update": true }));

        let connection = state.db_connection.lock().unwrap();
        let transaction = get_transaction(id, user_id, &connection).unwrap();
        assert_eq!(transaction.description, "Dinner");
        assert_eq!(transaction.category, "Dining");
        assert_eq!(transaction.amount, 40.0);
        assert_eq!(transaction.date, date!(2024 - 07 - 04));
        assert_eq!(transaction.payment_type, "Cash");
    }

    #[tokio::test]
    async fn invalid_fields_render_form_with_errors() {
        let (state, user_id, id) = get_state();

        let response = update_transaction_endpoint(
            State(state.clone()),
            Extension(user_id),
            Path(id.to_string()),
            Ok(Form(form("", "abc"))),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let errors = error_fields(response).await;
        assert_eq!(errors.len(), 2, "got {errors:?}");
        assert!(errors[0].starts_with(DESCRIPTION_FIELD));
        assert!(errors[1].starts_with(AMOUNT_FIELD));

        let connection = state.db_connection.lock().unwrap();
        let transaction = get_transaction(id, user_id, &connection).unwrap();
        assert_eq!(transaction.description, "Lunch");
    }

    #[tokio::test]
    async fn invalid_id_and_fields_are_reported_together() {
        let (state, user_id, _) = get_state();

        let response = update_transaction_endpoint(
            State(state),
            Extension(user_id),
            Path("abc".to_owned()),
            Ok(Form(form("Dinner", "abc"))),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let errors = error_fields(response).await;
        assert_eq!(errors.len(), 2, "got {errors:?}");
        assert!(errors[0].starts_with(ID_PARAM_FIELD));
        assert!(errors[1].starts_with(AMOUNT_FIELD));
    }

    #[tokio::test]
    async fn form_for_invalid_id_has_no_update_target() {
        let (state, user_id, _) = get_state();

        let response = update_transaction_endpoint(
            State(state),
            Extension(user_id),
            Path("abc".to_owned()),
            Ok(Form(form("Dinner", "40"))),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let fragment = parse_html_fragment(response).await;
        let form = fragment
            .select(&Selector::parse("form#edit-transaction-form").unwrap())
            .next()
            .expect("No edit form found");
        assert_eq!(form.value().attr("hx-put"), None);
    }

    #[tokio::test]
    async fn missing_transaction_is_not_found() {
        let (state, user_id, id) = get_state();

        let response = update_transaction_endpoint(
            State(state),
            Extension(user_id),
            Path((id + 1).to_string()),
            Ok(Form(form("Dinner", "40"))),
        )
        .await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let json: Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(
            json,
            json!({ "error": format!("No transaction with id {}", id + 1) })
        );
    }

    #[tokio::test]
    async fn cannot_update_other_users_transaction() {
        let (state, user_id, id) = get_state();
        let other_user = {
            let connection = state.db_connection.lock().unwrap();
            create_test_user(&connection, "other@example.com")
        };

        let response = update_transaction_endpoint(
            State(state.clone()),
            Extension(other_user),
            Path(id.to_string()),
            Ok(Form(form("Dinner", "40"))),
        )
        .await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let connection = state.db_connection.lock().unwrap();
        let transaction = get_transaction(id, user_id, &connection).unwrap();
        assert_eq!(transaction.description, "Lunch");
    }
}
