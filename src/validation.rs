//! Sanitizing and validating user input.
//!
//! Each `check_*` function validates a single field and returns either the
//! normalized value or a [ValidationError] naming the field. Handlers run
//! every check for a submission and collect the failures in an [ErrorList]
//! so that the user sees all of the problems at once.

use std::fmt::Display;

use time::{Date, format_description::BorrowedFormatItem, macros::format_description};

use crate::database_id::DatabaseId;

/// The format for dates in forms and query strings, e.g. "2024-06-01".
pub const DATE_FORMAT: &[BorrowedFormatItem] = format_description!("[year]-[month]-[day]");

/// Elements whose content is removed along with the tags.
const STRIPPED_ELEMENTS: [&str; 2] = ["script", "style"];

/// Remove HTML markup from `raw` and trim surrounding whitespace.
///
/// `<script>` and `<style>` elements are removed along with their content,
/// other tags are removed but their text is kept, and any leftover angle
/// brackets are dropped. Applying this function to its own output returns
/// the output unchanged.
pub fn sanitize(raw: &str) -> String {
    let mut text = raw.to_owned();

    for element in STRIPPED_ELEMENTS {
        text = remove_element(&text, element);
    }

    let mut sanitized = String::with_capacity(text.len());
    let mut in_tag = false;

    for c in text.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => sanitized.push(c),
            _ => {}
        }
    }

    sanitized.trim().to_owned()
}

/// Remove every `<name ...>...</name>` element from `text`, case-insensitively.
///
/// An element without a closing tag is removed up to the end of `text`.
fn remove_element(text: &str, name: &str) -> String {
    let open_tag = format!("<{name}");
    let close_tag = format!("</{name}");
    let lowercase = text.to_ascii_lowercase();

    let mut result = String::with_capacity(text.len());
    let mut position = 0;

    while let Some(offset) = lowercase[position..].find(&open_tag) {
        let start = position + offset;
        result.push_str(&text[position..start]);

        position = match lowercase[start..].find(&close_tag) {
            Some(close_offset) => {
                let close_start = start + close_offset;
                lowercase[close_start..]
                    .find('>')
                    .map(|end| close_start + end + 1)
                    .unwrap_or(text.len())
            }
            None => text.len(),
        };
    }

    result.push_str(&text[position..]);
    result
}

/// A field that failed validation and the reason why.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// The human readable name of the field, e.g. "Payment Type".
    pub field: String,
    /// Why the value was rejected, e.g. "must not be empty".
    pub message: String,
}

impl ValidationError {
    /// Create a validation error for `field`.
    pub fn new(field: &str, message: &str) -> Self {
        Self {
            field: field.to_owned(),
            message: message.to_owned(),
        }
    }
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.field, self.message)
    }
}

/// The validation errors collected while checking a single request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ErrorList(Vec<ValidationError>);

impl ErrorList {
    /// Create an empty error list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `error` to the end of the list.
    pub fn push(&mut self, error: ValidationError) {
        self.0.push(error);
    }

    /// Return the value in `result`, or record its error and return `None`.
    pub fn collect<T>(&mut self, result: Result<T, ValidationError>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(error) => {
                self.push(error);
                None
            }
        }
    }

    /// Whether no errors have been recorded.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The number of errors recorded.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterate over the errors in the order they were recorded.
    pub fn iter(&self) -> impl Iterator<Item = &ValidationError> {
        self.0.iter()
    }
}

#[cfg(test)]
impl ErrorList {
    pub fn has_error_for(&self, field: &str) -> bool {
        self.0.iter().any(|error| error.field == field)
    }
}

/// Check that `value` is not empty after trimming.
///
/// # Errors
/// Returns a [ValidationError] for `field_name` if `value` is empty or only whitespace.
pub fn check_string(value: &str, field_name: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();

    if trimmed.is_empty() {
        return Err(ValidationError::new(field_name, "must not be empty"));
    }

    Ok(trimmed.to_owned())
}

/// Check that `value` is a finite number, e.g. "12.50".
///
/// # Errors
/// Returns a [ValidationError] for `field_name` if `value` is not a number,
/// or is infinite or NaN.
pub fn check_number(value: &str, field_name: &str) -> Result<f64, ValidationError> {
    let trimmed = value.trim();

    if trimmed.is_empty() {
        return Err(ValidationError::new(field_name, "must not be empty"));
    }

    match trimmed.parse::<f64>() {
        Ok(number) if number.is_finite() => Ok(number),
        _ => Err(ValidationError::new(field_name, "must be a valid number")),
    }
}

/// Check that `value` is a calendar date in the format YYYY-MM-DD.
///
/// # Errors
/// Returns a [ValidationError] for `field_name` if `value` is not a valid date.
pub fn check_date(value: &str, field_name: &str) -> Result<Date, ValidationError> {
    let trimmed = value.trim();

    if trimmed.is_empty() {
        return Err(ValidationError::new(field_name, "must not be empty"));
    }

    Date::parse(trimmed, DATE_FORMAT).map_err(|_| {
        ValidationError::new(field_name, "must be a valid date in the format YYYY-MM-DD")
    })
}

/// Check that `value` is a well-formed database ID, i.e. a positive integer.
///
/// # Errors
/// Returns a [ValidationError] for `field_name` if `value` is not a positive integer.
pub fn check_id(value: &str, field_name: &str) -> Result<DatabaseId, ValidationError> {
    let trimmed = value.trim();

    if trimmed.is_empty() {
        return Err(ValidationError::new(field_name, "must not be empty"));
    }

    match trimmed.parse::<DatabaseId>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(ValidationError::new(field_name, "must be a valid ID")),
    }
}


#[cfg(test)]
mod check_tests {
    use time::macros::date;

    use super::{
        ErrorList, ValidationError, check_date, check_id, check_number, check_string,
    };

    #[test]
    fn check_string_trims() {
        assert_eq!(check_string("  Food ", "Category"), Ok("Food".to_owned()));
    }

    #[test]
    fn check_string_rejects_empty() {
        let error = check_string("   ", "Description").unwrap_err();

        assert_eq!(error.field, "Description");
    }

    #[test]
    fn check_number_parses_decimal() {
        assert_eq!(check_number("12.50", "Amount"), Ok(12.5));
        assert_eq!(check_number(" -3 ", "Amount"), Ok(-3.0));
    }

    #[test]
    fn check_number_rejects_non_numbers() {
        for input in ["abc", "", "NaN", "inf", "12.5.0"] {
            let result = check_number(input, "Amount");
            assert!(result.is_err(), "want error for {input:?}, got {result:?}");
        }
    }

    #[test]
    fn check_date_parses_iso_date() {
        assert_eq!(
            check_date("2024-06-01", "Transaction Date"),
            Ok(date!(2024 - 06 - 01))
        );
    }

    #[test]
    fn check_date_rejects_invalid_dates() {
        for input in ["", "2024-02-30", "01/06/2024", "yesterday"] {
            let result = check_date(input, "Transaction Date");
            assert!(result.is_err(), "want error for {input:?}, got {result:?}");
        }
    }

    #[test]
    fn check_id_accepts_positive_integers() {
        assert_eq!(check_id("42", "ID"), Ok(42));
    }

    #[test]
    fn check_id_rejects_malformed_ids() {
        for input in ["", "0", "-1", "abc", "65f1c0ffee"] {
            let result = check_id(input, "ID");
            assert!(result.is_err(), "want error for {input:?}, got {result:?}");
        }
    }

    #[test]
    fn error_list_collects_failures_in_order() {
        let mut errors = ErrorList::new();

        let description = errors.collect(check_string("", "Description"));
        let amount = errors.collect(check_number("1.5", "Amount"));
        let category = errors.collect(check_string(" ", "Category"));

        assert_eq!(description, None);
        assert_eq!(amount, Some(1.5));
        assert_eq!(category, None);
        assert_eq!(
            errors.iter().cloned().collect::<Vec<_>>(),
            vec![
                ValidationError::new("Description", "must not be empty"),
                ValidationError::new("Category", "must not be empty"),
            ]
        );
    }
}
