//! The HTML for the transaction pages.

use maud::{Markup, html};

use crate::{
    database_id::TransactionId,
    endpoints::{self, format_endpoint},
    html::{
        BUTTON_DELETE_STYLE, BUTTON_PRIMARY_STYLE, BUTTON_SECONDARY_STYLE, DOLLAR_INPUT_CSS,
        FORM_CONTAINER_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, LINK_STYLE,
        PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base,
        error_list, format_currency, success_message,
    },
    navigation::nav_bar,
    transaction::{
        core::Transaction,
        form::{TransactionForm, transaction_form_fields},
    },
    validation::{DATE_FORMAT, ErrorList},
};

/// The values shown in the filter form of the transactions page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterInputs {
    pub start_date: String,
    pub end_date: String,
    pub category: String,
}

/// A banner shown above the transactions table.
#[derive(Debug, Clone, PartialEq)]
pub enum Alert {
    Success(String),
    Error(String),
}

/// Everything needed to render the transactions page.
pub struct TransactionsListing<'a> {
    /// The rows of the table in display order.
    pub transactions: &'a [Transaction],
    /// The filter form values, or `None` to show an empty filter form.
    pub filters: Option<&'a FilterInputs>,
    /// Problems with the filter values.
    pub errors: &'a ErrorList,
    pub alert: Option<Alert>,
}

/// The page with the form for creating a transaction.
pub fn new_transaction_view(
    form: &TransactionForm,
    errors: &ErrorList,
    success: Option<&str>,
) -> Markup {
    let nav = nav_bar(endpoints::NEW_TRANSACTION);

    let content = html! {
        (nav)

        div class=(FORM_CONTAINER_STYLE)
        {
            h1 class="text-xl font-bold mb-4" { "New Transaction" }

            @if let Some(message) = success {
                (success_message(message))
            }

            (error_list(errors))

            form
                method="post"
                action=(endpoints::NEW_TRANSACTION)
                class="w-full space-y-4 md:space-y-6"
            {
                (transaction_form_fields(form))

                button type="submit" id="submit-button" class=(BUTTON_PRIMARY_STYLE)
                {
                    "Add Transaction"
                }
            }
        }
    };

    base("New Transaction", &[DOLLAR_INPUT_CSS], &content)
}

/// The page for editing the transaction `id`.
pub fn edit_transaction_view(id: TransactionId, form: &TransactionForm) -> Markup {
    let nav = nav_bar(&format_endpoint(endpoints::TRANSACTION, id));

    let content = html! {
        (nav)

        div class=(FORM_CONTAINER_STYLE)
        {
            h1 class="text-xl font-bold mb-4" { "Edit Transaction" }

            (edit_transaction_form(Some(id), form, &ErrorList::new()))
        }
    };

    base("Edit Transaction", &[DOLLAR_INPUT_CSS], &content)
}

/// The edit form on its own, used to show validation errors after a failed update.
///
/// Without an `id` the form has nowhere to submit to, so only the errors and
/// the cancel link are usable.
pub fn edit_transaction_form(
    id: Option<TransactionId>,
    form: &TransactionForm,
    errors: &ErrorList,
) -> Markup {
    let update_url = id.map(|id| format_endpoint(endpoints::TRANSACTION, id));

    html! {
        form
            id="edit-transaction-form"
            hx-put=[update_url]
            hx-target-error="this"
            hx-swap="outerHTML"
            class="w-full space-y-4 md:space-y-6"
        {
            (error_list(errors))

            (transaction_form_fields(form))

            button
                type="submit"
                id="submit-button"
                disabled[id.is_none()]
                class=(BUTTON_PRIMARY_STYLE)
            {
                "Update Transaction"
            }

            a href=(endpoints::TRANSACTIONS_VIEW) class=(LINK_STYLE) { "Cancel" }
        }
    }
}

fn filter_form(filters: Option<&FilterInputs>) -> Markup {
    let filters = filters.cloned().unwrap_or_default();

    html! {
        form
            method="get"
            action=(endpoints::FILTERED_TRANSACTIONS_VIEW)
            class="flex flex-wrap items-end gap-4 mb-4"
        {
            div
            {
                label for="start_date" class=(FORM_LABEL_STYLE) { "Start Date" }
                input
                    type="date"
                    name="start_date"
                    id="start_date"
                    value=(filters.start_date)
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="end_date" class=(FORM_LABEL_STYLE) { "End Date" }
                input
                    type="date"
                    name="end_date"
                    id="end_date"
                    value=(filters.end_date)
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="category" class=(FORM_LABEL_STYLE) { "Category" }
                input
                    type="text"
                    name="category"
                    id="category"
                    placeholder="All categories"
                    value=(filters.category)
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                button type="submit" class=(BUTTON_SECONDARY_STYLE) { "Filter" }
            }

            a href=(endpoints::TRANSACTIONS_VIEW) class=(LINK_STYLE) { "Clear filters" }
        }
    }
}

fn transaction_row(transaction: &Transaction) -> Markup {
    let url = format_endpoint(endpoints::TRANSACTION, transaction.id);
    let date = transaction
        .date
        .format(DATE_FORMAT)
        .unwrap_or_else(|_| transaction.date.to_string());

    html! {
        tr class=(TABLE_ROW_STYLE) data-transaction-id=(transaction.id)
        {
            td class=(TABLE_CELL_STYLE) { (date) }
            td class=(TABLE_CELL_STYLE) { (transaction.description) }
            td class=(TABLE_CELL_STYLE) { (transaction.category) }
            td class=(TABLE_CELL_STYLE) { (transaction.payment_type) }
            td class=(TABLE_CELL_STYLE) { (format_currency(transaction.amount)) }
            td class=(TABLE_CELL_STYLE)
            {
                div class="flex gap-4"
                {
                    a href=(url) class=(LINK_STYLE) { "Edit" }

                    button
                        hx-delete=(url)
                        hx-confirm={
                            "Are you sure you want to delete '" (transaction.description) "'?"
                        }
                        hx-target="closest tr"
                        hx-swap="delete"
                        class=(BUTTON_DELETE_STYLE)
                    {
                        "Delete"
                    }
                }
            }
        }
    }
}

/// The page listing a user's transactions with the filter form and export link.
pub fn transactions_view(listing: TransactionsListing<'_>) -> Markup {
    let nav = nav_bar(endpoints::TRANSACTIONS_VIEW);

    let content = html! {
        (nav)

        div class=(PAGE_CONTAINER_STYLE)
        {
            div class="w-full max-w-screen-xl"
            {
                div class="flex justify-between flex-wrap items-end mb-4"
                {
                    h1 class="text-xl font-bold" { "Transactions" }

                    div class="flex gap-4"
                    {
                        a href=(endpoints::NEW_TRANSACTION) class=(LINK_STYLE) { "New Transaction" }
                        a href=(endpoints::EXPORT_TRANSACTIONS) id="export-link" class=(LINK_STYLE)
                        {
                            "Export to spreadsheet"
                        }
                    }
                }

                div id="alert-container"
                {
                    @match &listing.alert {
                        Some(Alert::Success(message)) => (success_message(message)),
                        Some(Alert::Error(message)) => {
                            p
                                id="error-message"
                                class="w-full p-4 mb-4 text-sm text-red-800 rounded-lg bg-red-50 dark:bg-gray-800 dark:text-red-400"
                                role="alert"
                            {
                                (message)
                            }
                        },
                        None => {}
                    }
                }

                (error_list(listing.errors))

                (filter_form(listing.filters))

                div class="relative overflow-x-auto shadow-md rounded-lg"
                {
                    table class="w-full text-sm text-left rtl:text-right text-gray-500 dark:text-gray-400"
                    {
                        thead class=(TABLE_HEADER_STYLE)
                        {
                            tr
                            {
                                th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Description" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Payment Type" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Amount" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                            }
                        }

                        tbody
                        {
                            @for transaction in listing.transactions {
                                (transaction_row(transaction))
                            }

                            @if listing.transactions.is_empty() {
                                tr class=(TABLE_ROW_STYLE)
                                {
                                    td colspan="6" class="px-6 py-4 text-center" id="no-transactions"
                                    {
                                        "No transactions found."
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    };

    base("Transactions", &[], &content)
}
