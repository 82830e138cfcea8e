//! Transaction management for the ledger.
//!
//! This module contains everything related to transactions:
//! - The `Transaction` model and the database functions for storing and querying transactions
//! - Sanitizing and validating the transaction form
//! - The route handlers for creating, listing, filtering, editing, deleting and exporting
//!   transactions

mod core;
mod create_page;
mod delete_endpoint;
mod edit_endpoint;
mod edit_page;
mod export;
mod form;
mod persistence_error;
mod transactions_page;
mod view;

#[cfg(test)]
pub(crate) mod test_utils;

pub use core::create_transaction_table;
pub use create_page::{create_transaction_endpoint, get_new_transaction_page};
pub use delete_endpoint::delete_transaction_endpoint;
pub use edit_endpoint::update_transaction_endpoint;
pub use edit_page::get_edit_transaction_page;
pub use export::export_transactions_endpoint;
pub use transactions_page::{get_filtered_transactions_page, get_transactions_page};
