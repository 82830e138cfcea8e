//! Route paths. Paths with a `{transaction_id}` segment are filled in with [format_endpoint].

/// Redirects to [TRANSACTIONS_VIEW].
pub const ROOT: &str = "/";
/// GET shows the new transaction form, POST creates the transaction.
pub const NEW_TRANSACTION: &str = "/transactions/new";
pub const TRANSACTIONS_VIEW: &str = "/transactions/seeAllTransaction";
/// The transactions page narrowed by the date range and category in the query string.
pub const FILTERED_TRANSACTIONS_VIEW: &str = "/transactions/seeAllTransaction/filters";
/// Writes the user's transactions to a CSV file in the export directory.
pub const EXPORT_TRANSACTIONS: &str = "/transactions/seeAllTransaction/export";
/// GET shows the edit form, PUT updates and DELETE removes one transaction.
pub const TRANSACTION: &str = "/transactions/{transaction_id}";
pub const REGISTER: &str = "/register";
pub const LOG_IN: &str = "/login";
pub const LOG_OUT: &str = "/logout";
/// Where htmx sends the browser after a server error.
pub const INTERNAL_ERROR_VIEW: &str = "/error";
pub const STATIC: &str = "/static";

/// `path` with its `{...}` segment replaced by `id`, e.g. `/transactions/7`.
///
/// Paths without a `{` are returned unchanged.
pub fn format_endpoint(path: &str, id: i64) -> String {
    match path.split_once('{') {
        Some((head, rest)) => {
            let tail = rest.split_once('}').map_or("", |(_, tail)| tail);
            format!("{head}{id}{tail}")
        }
        None => path.to_owned(),
    }
}
