//! The page skeleton, the Tailwind class lists shared between pages, and small components.

use maud::{DOCTYPE, Markup, PreEscaped, html};

use crate::{endpoints, validation::ErrorList};

pub const LINK_STYLE: &str = "text-blue-600 hover:text-blue-500 \
    dark:text-blue-500 dark:hover:text-blue-400 underline";

pub const BUTTON_PRIMARY_STYLE: &str = "w-full px-4 py-2 bg-blue-500 \
    dark:bg-blue-600 disabled:bg-blue-700 hover:enabled:bg-blue-600 \
    hover:enabled:dark:bg-blue-700 text-white rounded";

/// For the filter button, which sits beside the inputs rather than under a form.
pub const BUTTON_SECONDARY_STYLE: &str = "px-5 py-2.5 text-sm font-medium \
    text-gray-900 bg-white rounded border border-gray-200 hover:bg-gray-100 \
    dark:bg-gray-800 dark:text-gray-300 dark:border-gray-600 dark:hover:bg-gray-700";

/// Delete buttons look like links so they fit in a table row.
pub const BUTTON_DELETE_STYLE: &str = "text-red-600 hover:text-red-500 \
    dark:text-red-500 dark:hover:text-red-400 underline bg-transparent \
    border-none cursor-pointer";

pub const FORM_CONTAINER_STYLE: &str = "flex flex-col items-center px-6 py-8 \
    mx-auto max-w-md text-gray-900 dark:text-white";
pub const FORM_LABEL_STYLE: &str = "block mb-2 text-sm font-medium text-gray-900 dark:text-white";
pub const FORM_TEXT_INPUT_STYLE: &str = "block w-full p-2.5 rounded text-sm \
    text-gray-900 dark:text-white disabled:text-gray-500 bg-gray-50 \
    dark:bg-gray-700 border border-gray-300 dark:border-gray-600 \
    focus:ring-blue-600 focus:border-blue-600";

pub const TABLE_HEADER_STYLE: &str = "text-xs text-gray-700 uppercase \
    bg-gray-50 dark:bg-gray-700 dark:text-gray-400";
pub const TABLE_ROW_STYLE: &str = "bg-white border-b dark:bg-gray-800 dark:border-gray-700";
pub const TABLE_CELL_STYLE: &str = "px-6 py-4";

pub const PAGE_CONTAINER_STYLE: &str =
    "flex flex-col items-center px-6 py-8 mx-auto text-gray-900 dark:text-white";

/// Puts a '$' inside the left edge of the amount input.
pub const DOLLAR_INPUT_CSS: &str = r#"
.input-wrapper { position: relative; display: inline-block; }
.input-wrapper input[type="number"] { padding-left: 1.4rem; }
.input-wrapper::before {
    content: '$';
    position: absolute;
    left: 0.6rem;
    top: 50%;
    transform: translateY(-50%);
    pointer-events: none;
}
"#;

/// A full page with `content` as the body. `styles` are added to the head as raw CSS.
pub fn base(title: &str, styles: &[&str], content: &Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en"
        {
            head
            {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) " - Ledgerly" }
                link rel="icon" type="image/png" href="/static/favicon-32x32.png" sizes="32x32";
                link href="/static/main.css" rel="stylesheet";

                script src="/static/htmx-2.0.8-min.js" integrity="sha384-/TgkGk7p307TH7EXJDuUlgG3Ce1UVolAOFopFekQkkXihi5u/6OCvVKyz1W+idaz" {}
                script src="/static/htmx-ext-response-targets-2.0.4.js" integrity="sha384-T41oglUPvXLGBVyRdZsVRxNWnOOqCynaPubjUVjxhsjFTKrFJGEMm3/0KGmNQ+Pg" {}

                @for css in styles {
                    style { (PreEscaped(*css)) }
                }
            }

            body
                hx-ext="response-targets"
                class="container max-w-full min-h-screen bg-gray-50 dark:bg-gray-900"
            {
                (content)
            }
        }
    }
}

/// A page explaining that something went wrong, e.g. a 404, with a link back to the app.
pub fn error_view(title: &str, header: &str, description: &str, fix: &str) -> Markup {
    let content = html! {
        section class="px-4 py-16 mx-auto max-w-screen-sm text-center"
        {
            h1 class="mb-4 text-7xl lg:text-9xl font-extrabold text-blue-600 dark:text-blue-500"
            {
                (header)
            }

            p class="mb-4 text-3xl md:text-4xl font-bold text-gray-900 dark:text-white"
            {
                (description)
            }

            p class="mb-8 text-xl md:text-2xl text-gray-900 dark:text-white" { (fix) }

            a href=(endpoints::TRANSACTIONS_VIEW) class=(LINK_STYLE) { "Back to your transactions" }
        }
    };

    base(title, &[], &content)
}

/// Format `number` as dollars with two decimal places, e.g. "-$12.30".
pub fn format_currency(number: f64) -> String {
    if number < 0.0 {
        format!("-${:.2}", number.abs())
    } else {
        format!("${number:.2}")
    }
}

/// A list of validation error messages, or nothing if `errors` is empty.
pub fn error_list(errors: &ErrorList) -> Markup {
    html! {
        @if !errors.is_empty() {
            ul
                id="errors"
                class="w-full p-4 mb-4 space-y-1 text-sm text-red-800 rounded-lg bg-red-50 dark:bg-gray-800 dark:text-red-400"
                role="alert"
            {
                @for error in errors.iter() {
                    li class="error" { (error) }
                }
            }
        }
    }
}

/// A green banner with `message`.
pub fn success_message(message: &str) -> Markup {
    html! {
        p
            id="success-message"
            class="w-full p-4 mb-4 text-sm text-green-800 rounded-lg bg-green-50 dark:bg-gray-800 dark:text-green-400"
            role="status"
        {
            (message)
        }
    }
}

#[cfg(test)]
mod tests {
    use maud::html;
    use scraper::{Html, Selector};

    use crate::validation::{ErrorList, ValidationError};

    use super::{DOLLAR_INPUT_CSS, base, error_list, format_currency};

    #[test]
    fn formats_currency() {
        assert_eq!(format_currency(12.3), "$12.30");
        assert_eq!(format_currency(-1200.0), "-$1200.00");
        assert_eq!(format_currency(0.0), "$0.00");
    }

    #[test]
    fn base_adds_styles_unescaped() {
        let page = base("Title", &[DOLLAR_INPUT_CSS], &html! { p { "hi" } }).into_string();

        assert!(page.contains(r#"input[type="number"]"#), "got {page}");
        assert!(page.contains("<title>Title - Ledgerly</title>"));
    }

    #[test]
    fn error_list_renders_every_error() {
        let mut errors = ErrorList::new();
        errors.push(ValidationError::new("Description", "must not be empty"));
        errors.push(ValidationError::new("Amount", "must be a number"));

        let html = Html::parse_fragment(&error_list(&errors).into_string());

        let selector = Selector::parse("li.error").unwrap();
        let items = html
            .select(&selector)
            .map(|item| item.text().collect::<String>())
            .collect::<Vec<_>>();
        assert_eq!(
            items,
            vec!["Description must not be empty", "Amount must be a number"]
        );
    }

    #[test]
    fn error_list_is_empty_without_errors() {
        let markup = error_list(&ErrorList::new()).into_string();

        assert!(markup.is_empty(), "want no markup, got {markup:?}");
    }
}
