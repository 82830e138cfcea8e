//! The bar of links at the top of every transaction page.

use maud::{Markup, html};

use crate::endpoints;

const LINKS: [(&str, &str); 3] = [
    (endpoints::NEW_TRANSACTION, "New Transaction"),
    (endpoints::TRANSACTIONS_VIEW, "All Transactions"),
    (endpoints::LOG_OUT, "Log out"),
];

const LINK_STYLE: &str = "block py-2 px-3 rounded-sm md:p-0 text-gray-900 \
    hover:bg-gray-100 md:hover:bg-transparent md:hover:text-blue-700 \
    dark:text-white md:dark:hover:text-blue-500 dark:hover:bg-gray-700";

const CURRENT_LINK_STYLE: &str = "block py-2 px-3 rounded-sm md:p-0 text-white \
    bg-blue-700 md:bg-transparent md:text-blue-700 md:dark:text-blue-500";

/// The navigation bar, with the link to `current_path` (if any) marked as the current page.
pub fn nav_bar(current_path: &str) -> Markup {
    html! {
        nav class="bg-white border-gray-200 dark:bg-gray-900"
        {
            div class="max-w-screen-xl flex flex-wrap items-center justify-between mx-auto p-4"
            {
                a href=(endpoints::ROOT)
                    class="text-2xl font-semibold whitespace-nowrap dark:text-white"
                {
                    "Ledgerly"
                }

                ul class="font-medium flex flex-col md:flex-row p-4 md:p-0 mt-4 md:mt-0 md:space-x-8"
                {
                    @for (url, title) in LINKS {
                        @let is_current = url == current_path;

                        li
                        {
                            a
                                href=(url)
                                class=(if is_current { CURRENT_LINK_STYLE } else { LINK_STYLE })
                                aria-current=[is_current.then_some("page")]
                            {
                                (title)
                            }
                        }
                    }
                }
            }
        }
    }
}
