//! Exports a user's transactions to a CSV spreadsheet.

use std::{
    borrow::Cow,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

use axum::{
    Extension,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    auth::UserID,
    transaction::{
        core::Transaction,
        transactions_page::get_sorted_transactions,
        view::{Alert, TransactionsListing, transactions_view},
    },
    validation::{DATE_FORMAT, ErrorList},
};

const CSV_HEADER: [&str; 6] = [
    "id",
    "date",
    "description",
    "category",
    "payment type",
    "amount",
];

pub const EXPORT_FAILED_MESSAGE: &str = "Could not export transactions. Try again later.";

/// Where an export was written and how many transactions it contains.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportSummary {
    pub path: PathBuf,
    pub rows: usize,
}

/// The file name of the spreadsheet for `user_id`.
pub fn export_file_name(user_id: UserID) -> String {
    format!("transactions_{user_id}.csv")
}

/// Text cells starting with one of these are read as formulas by spreadsheet programs.
const FORMULA_PREFIXES: [char; 6] = ['=', '+', '-', '@', '\t', '\r'];

/// Quote `value` with a leading `'` if a spreadsheet would treat it as a formula.
fn text_cell(value: &str) -> Cow<'_, str> {
    if value.starts_with(FORMULA_PREFIXES) {
        Cow::Owned(format!("'{value}"))
    } else {
        Cow::Borrowed(value)
    }
}

/// Write `transactions` to a CSV file for `user_id` in `dir`, replacing any previous export.
///
/// `dir` is created if it does not exist.
///
/// # Errors
/// Returns an [Error::ExportError] if the directory or file cannot be written.
pub fn export_to_csv(
    user_id: UserID,
    transactions: &[Transaction],
    dir: &Path,
) -> Result<ExportSummary, Error> {
    std::fs::create_dir_all(dir).map_err(|error| {
        Error::ExportError(format!("could not create {}: {error}", dir.display()))
    })?;

    let path = dir.join(export_file_name(user_id));
    let mut writer = csv::Writer::from_path(&path)
        .map_err(|error| Error::ExportError(format!("could not open {}: {error}", path.display())))?;

    writer.write_record(CSV_HEADER).map_err(export_error)?;

    for transaction in transactions {
        let id = transaction.id.to_string();
        let date = transaction
            .date
            .format(DATE_FORMAT)
            .unwrap_or_else(|_| transaction.date.to_string());
        let amount = format!("{:.2}", transaction.amount);

        writer
            .write_record([
                id.as_str(),
                date.as_str(),
                &*text_cell(&transaction.description),
                &*text_cell(&transaction.category),
                &*text_cell(&transaction.payment_type),
                amount.as_str(),
            ])
            .map_err(export_error)?;
    }

    writer
        .flush()
        .map_err(|error| Error::ExportError(error.to_string()))?;

    Ok(ExportSummary {
        path,
        rows: transactions.len(),
    })
}

fn export_error(error: csv::Error) -> Error {
    Error::ExportError(error.to_string())
}

/// The state needed to export transactions.
#[derive(Debug, Clone)]
pub struct ExportState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The directory that spreadsheets are written to.
    pub export_dir: PathBuf,
}

impl FromRef<AppState> for ExportState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            export_dir: state.export_dir.clone(),
        }
    }
}

/// Export the user's transactions and show the listing with the outcome.
pub async fn export_transactions_endpoint(
    State(state): State<ExportState>,
    Extension(user_id): Extension<UserID>,
) -> Response {
    let result = get_sorted_transactions(user_id, &state.db_connection).and_then(|transactions| {
        export_to_csv(user_id, &transactions, &state.export_dir)
            .map(|summary| (transactions, summary))
    });

    match result {
        Ok((transactions, summary)) => {
            tracing::info!(
                "Exported {} transactions for user {user_id} to {}",
                summary.rows,
                summary.path.display()
            );

            let file_name = summary
                .path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| export_file_name(user_id));
            let message = format!(
                "Exported {} transactions to {file_name}.",
                summary.rows
            );

            transactions_view(TransactionsListing {
                transactions: &transactions,
                filters: None,
                errors: &ErrorList::new(),
                alert: Some(Alert::Success(message)),
            })
            .into_response()
        }
        Err(error) => {
            tracing::error!("Could not export transactions for user {user_id}: {error}");

            let transactions = get_sorted_transactions(user_id, &state.db_connection)
                .unwrap_or_default();

            (
                StatusCode::INTERNAL_SERVER_ERROR,
                transactions_view(TransactionsListing {
                    transactions: &transactions,
                    filters: None,
                    errors: &ErrorList::new(),
                    alert: Some(Alert::Error(EXPORT_FAILED_MESSAGE.to_owned())),
                }),
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod export_to_csv_tests {
    use time::macros::date;

    use crate::{Error, auth::UserID, transaction::core::Transaction};

    use super::export_to_csv;

    fn transaction(id: i64, description: &str, amount: f64) -> Transaction {
        Transaction {
            id,
            user_id: UserID::new(3),
            description: description.to_owned(),
            category: "Food".to_owned(),
            amount,
            date: date!(2024 - 06 - 01),
            payment_type: "Cash".to_owned(),
        }
    }

    #[test]
    fn writes_header_and_rows() {
        let dir = tempfile::tempdir().unwrap();
        let transactions = [
            transaction(2, "Lunch, with friends", -12.5),
            transaction(1, "Salary", 1000.0),
        ];

        let summary = export_to_csv(UserID::new(3), &transactions, dir.path()).unwrap();

        assert_eq!(summary.rows, 2);
        assert_eq!(summary.path, dir.path().join("transactions_3.csv"));
        let contents = std::fs::read_to_string(&summary.path).unwrap();
        assert_eq!(
            contents,
            "id,date,description,category,payment type,amount\n\
            2,2024-06-01,\"Lunch, with friends\",Food,Cash,-12.50\n\
            1,2024-06-01,Salary,Food,Cash,1000.00\n"
        );
    }

    #[test]
    fn text_that_looks_like_a_formula_is_quoted() {
        let dir = tempfile::tempdir().unwrap();
        let transactions = [Transaction {
            category: "+Food".to_owned(),
            payment_type: "@Cash".to_owned(),
            ..transaction(1, "=HYPERLINK(\"http://example.com\")", -5.0)
        }];

        let summary = export_to_csv(UserID::new(3), &transactions, dir.path()).unwrap();

        let contents = std::fs::read_to_string(&summary.path).unwrap();
        assert_eq!(
            contents,
            "id,date,description,category,payment type,amount\n\
            1,2024-06-01,\"'=HYPERLINK(\"\"http://example.com\"\")\",'+Food,'@Cash,-5.00\n"
        );
    }

    #[test]
    fn creates_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("exports").join("nested");

        let summary = export_to_csv(UserID::new(3), &[], &nested).unwrap();

        assert_eq!(summary.rows, 0);
        assert!(summary.path.exists());
    }

    #[test]
    fn replaces_previous_export() {
        let dir = tempfile::tempdir().unwrap();
        export_to_csv(UserID::new(3), &[transaction(1, "Old", 1.0)], dir.path()).unwrap();

        let summary = export_to_csv(UserID::new(3), &[], dir.path()).unwrap();

        let contents = std::fs::read_to_string(&summary.path).unwrap();
        assert_eq!(contents, "id,date,description,category,payment type,amount\n");
    }

    #[test]
    fn unwritable_directory_is_export_error() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("not_a_directory");
        std::fs::write(&file, "").unwrap();

        let result = export_to_csv(UserID::new(3), &[], &file);

        assert!(matches!(result, Err(Error::ExportError(_))));
    }
}
