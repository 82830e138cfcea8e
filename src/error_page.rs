//! The full pages shown for unknown routes and server failures.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::html::error_view;

/// A page telling the user that their request failed and what they can do about it.
#[derive(Debug, Clone, Copy)]
pub struct ErrorPage<'a> {
    pub status: StatusCode,
    pub description: &'a str,
    pub fix: &'a str,
}

impl ErrorPage<'static> {
    pub const NOT_FOUND: Self = Self {
        status: StatusCode::NOT_FOUND,
        description: "Something's missing.",
        fix: "That page or transaction does not exist. It may have been deleted.",
    };

    pub const INTERNAL_SERVER_ERROR: Self = Self {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        description: "Sorry, something went wrong.",
        fix: "Try again later or check the server logs.",
    };
}

impl IntoResponse for ErrorPage<'_> {
    fn into_response(self) -> Response {
        let title = self.status.canonical_reason().unwrap_or("Error");
        let page = error_view(title, self.status.as_str(), self.description, self.fix);

        (self.status, page).into_response()
    }
}

/// The fallback for paths without a route.
pub async fn get_404_not_found() -> Response {
    ErrorPage::NOT_FOUND.into_response()
}

/// Where the browser is sent when an htmx request fails with a server error.
pub async fn get_internal_server_error_page() -> Response {
    ErrorPage::INTERNAL_SERVER_ERROR.into_response()
}
