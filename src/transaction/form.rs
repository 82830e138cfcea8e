//! The transaction form shared by the create and edit pages.

use maud::{Markup, html};
use serde::Deserialize;

use crate::{
    auth::UserID,
    html::{FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE},
    transaction::core::{Transaction, TransactionFields},
    validation::{
        DATE_FORMAT, ErrorList, check_date, check_id, check_number, check_string, sanitize,
    },
};

pub const DESCRIPTION_FIELD: &str = "Description";
pub const CATEGORY_FIELD: &str = "Category";
pub const AMOUNT_FIELD: &str = "Amount";
pub const DATE_FIELD: &str = "Transaction Date";
pub const PAYMENT_TYPE_FIELD: &str = "Payment Type";
pub const USER_ID_FIELD: &str = "User ID";

/// The raw form data for creating or editing a transaction.
///
/// Every field is optional so that missing fields are reported as validation
/// errors instead of rejecting the request outright.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TransactionForm {
    pub description: Option<String>,
    pub category: Option<String>,
    pub amount: Option<String>,
    pub transaction_date: Option<String>,
    pub payment_type: Option<String>,
}

/// A transaction that passed validation and is ready to be stored for `user_id`.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedTransaction {
    pub user_id: UserID,
    pub fields: TransactionFields,
}

impl TransactionForm {
    /// Build a form from the submitted key-value pairs.
    ///
    /// Returns `None` if the body had no fields at all. Blank values are kept
    /// so that validation reports them.
    pub fn from_fields(fields: Vec<(String, String)>) -> Option<Self> {
        if fields.is_empty() {
            return None;
        }

        let mut form = Self::default();

        for (name, value) in fields {
            let field = match name.as_str() {
                "description" => &mut form.description,
                "category" => &mut form.category,
                "amount" => &mut form.amount,
                "transaction_date" => &mut form.transaction_date,
                "payment_type" => &mut form.payment_type,
                _ => continue,
            };
            *field = Some(value);
        }

        Some(form)
    }

    /// A copy of the form with markup removed from every field.
    pub fn sanitized(&self) -> Self {
        let clean = |field: &Option<String>| Some(sanitize(field.as_deref().unwrap_or_default()));

        Self {
            description: clean(&self.description),
            category: clean(&self.category),
            amount: clean(&self.amount),
            transaction_date: clean(&self.transaction_date),
            payment_type: clean(&self.payment_type),
        }
    }

    /// Sanitize and validate every field for `user_id`.
    ///
    /// # Errors
    /// Returns every field that failed validation, in form order.
    pub fn validate(&self, user_id: UserID) -> Result<ValidatedTransaction, ErrorList> {
        let mut errors = ErrorList::new();

        match self.validate_into(user_id, &mut errors) {
            Some(transaction) if errors.is_empty() => Ok(transaction),
            _ => Err(errors),
        }
    }

    /// Sanitize and validate every field for `user_id`, appending failures to `errors`.
    ///
    /// Returns `None` if any field is invalid.
    pub fn validate_into(
        &self,
        user_id: UserID,
        errors: &mut ErrorList,
    ) -> Option<ValidatedTransaction> {
        let form = self.sanitized();
        let value = |field: &Option<String>| field.clone().unwrap_or_default();

        let description = errors.collect(check_string(&value(&form.description), DESCRIPTION_FIELD));
        let category = errors.collect(check_string(&value(&form.category), CATEGORY_FIELD));
        let amount = errors.collect(check_number(&value(&form.amount), AMOUNT_FIELD));
        let date = errors.collect(check_date(&value(&form.transaction_date), DATE_FIELD));
        let payment_type =
            errors.collect(check_string(&value(&form.payment_type), PAYMENT_TYPE_FIELD));
        let user_id = errors
            .collect(check_id(&user_id.to_string(), USER_ID_FIELD))
            .map(UserID::new);

        Some(ValidatedTransaction {
            user_id: user_id?,
            fields: TransactionFields {
                description: description?,
                category: category?,
                amount: amount?,
                date: date?,
                payment_type: payment_type?,
            },
        })
    }
}

impl From<&Transaction> for TransactionForm {
    fn from(transaction: &Transaction) -> Self {
        Self {
            description: Some(transaction.description.clone()),
            category: Some(transaction.category.clone()),
            amount: Some(format!("{:.2}", transaction.amount)),
            transaction_date: transaction.date.format(DATE_FORMAT).ok(),
            payment_type: Some(transaction.payment_type.clone()),
        }
    }
}

fn text_input(name: &str, label: &str, value: Option<&str>, placeholder: &str) -> Markup {
    html! {
        div
        {
            label for=(name) class=(FORM_LABEL_STYLE) { (label) }

            input
                name=(name)
                id=(name)
                type="text"
                placeholder=(placeholder)
                value=[value]
                required
                class=(FORM_TEXT_INPUT_STYLE);
        }
    }
}

/// The inputs for every transaction field, pre-filled with the values in `form`.
pub fn transaction_form_fields(form: &TransactionForm) -> Markup {
    html! {
        (text_input("description", DESCRIPTION_FIELD, form.description.as_deref(), "Groceries at the market"))

        (text_input("category", CATEGORY_FIELD, form.category.as_deref(), "Groceries"))

        div
        {
            label for="amount" class=(FORM_LABEL_STYLE) { (AMOUNT_FIELD) }

            div class="input-wrapper w-full"
            {
                input
                    name="amount"
                    id="amount"
                    type="number"
                    step="0.01"
                    placeholder="0.00"
                    value=[form.amount.as_deref()]
                    required
                    class=(FORM_TEXT_INPUT_STYLE);
            }
        }

        div
        {
            label for="transaction_date" class=(FORM_LABEL_STYLE) { (DATE_FIELD) }

            input
                name="transaction_date"
                id="transaction_date"
                type="date"
                value=[form.transaction_date.as_deref()]
                required
                class=(FORM_TEXT_INPUT_STYLE);
        }

        (text_input("payment_type", PAYMENT_TYPE_FIELD, form.payment_type.as_deref(), "Credit Card"))
    }
}
