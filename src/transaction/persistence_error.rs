//! The error returned by transaction persistence operations that carry their own HTTP status.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::Error;

/// A failed persistence operation with the status code the client should receive.
#[derive(Debug, Clone, PartialEq)]
pub struct PersistenceError {
    /// The HTTP status for the failure, e.g. 404 when the transaction does not exist.
    pub status: StatusCode,
    /// A message that is safe to show to the client.
    pub message: String,
}

impl PersistenceError {
    /// Create an error with an explicit `status` and `message`.
    pub fn new(status: StatusCode, message: &str) -> Self {
        Self {
            status,
            message: message.to_owned(),
        }
    }

    /// Convert an application error into a persistence error.
    ///
    /// [Error::NotFound] always maps to 404, every other error uses `default_status`.
    /// SQL error details are logged rather than sent to the client.
    pub fn from_error(error: Error, default_status: StatusCode) -> Self {
        match error {
            Error::NotFound => Self::new(StatusCode::NOT_FOUND, &error.to_string()),
            Error::SqlError(sql_error) => {
                tracing::error!("SQL error during transaction operation: {sql_error}");
                Self::new(default_status, "an unexpected database error occurred")
            }
            error => Self::new(default_status, &error.to_string()),
        }
    }
}

impl IntoResponse for PersistenceError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use axum::{http::StatusCode, response::IntoResponse};
    use serde_json::json;

    use crate::Error;

    use super::PersistenceError;

    #[test]
    fn not_found_ignores_default_status() {
        let error = PersistenceError::from_error(Error::NotFound, StatusCode::BAD_REQUEST);

        assert_eq!(error.status, StatusCode::NOT_FOUND);
    }

    #[test]
    fn other_errors_use_default_status() {
        let error =
            PersistenceError::from_error(Error::DatabaseLockError, StatusCode::BAD_REQUEST);

        assert_eq!(error.status, StatusCode::BAD_REQUEST);
        assert_eq!(error.message, Error::DatabaseLockError.to_string());
    }

    #[test]
    fn sql_errors_hide_details() {
        let error = PersistenceError::from_error(
            Error::SqlError(rusqlite::Error::InvalidQuery),
            StatusCode::INTERNAL_SERVER_ERROR,
        );

        assert_eq!(error.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(error.message, "an unexpected database error occurred");
    }

    #[tokio::test]
    async fn renders_json_error_body() {
        let response =
            PersistenceError::new(StatusCode::NOT_FOUND, "No transaction with id 7").into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json, json!({ "error": "No transaction with id 7" }));
    }
}
