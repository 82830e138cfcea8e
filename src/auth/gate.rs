//! Middleware that turns away requests without a live session.

use axum::{
    extract::{Request, State},
    http::Uri,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::PrivateCookieJar;

use crate::{
    auth::{AccountState, session::Session},
    endpoints,
};

/// Only let requests with a live session through to the route handler.
///
/// The session's user is inserted into the request extensions, so handlers can take
/// `Extension(user_id): Extension<UserID>`. Each request that gets through keeps the
/// session alive for another session length. Anything else is redirected to the
/// log-in page, which sends the user back here after logging in.
pub async fn auth_guard(
    State(state): State<AccountState>,
    jar: PrivateCookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    let session = match Session::from_jar(&jar) {
        Ok(session) => session,
        Err(error) => {
            tracing::debug!("Sending {} to log in: {error}", request.uri());
            return Redirect::to(&log_in_url(request.uri())).into_response();
        }
    };

    request.extensions_mut().insert(session.user_id);
    let response = next.run(request).await;

    match session.renewed(state.session_length).save(jar) {
        Ok(jar) => (jar, response).into_response(),
        Err(error) => {
            tracing::error!("Could not renew session for user {}: {error}", session.user_id);
            response
        }
    }
}

/// `target` if it is a path within this app that is worth returning to after logging in.
///
/// Absolute URLs, protocol-relative URLs and the log-in and log-out pages are refused.
pub fn local_redirect(target: &str) -> Option<&str> {
    let path = target.split(['?', '#']).next().unwrap_or_default();
    let is_local = path.starts_with('/') && !path.starts_with("//") && !path.contains('\\');

    (is_local && path != endpoints::LOG_IN && path != endpoints::LOG_OUT).then_some(target)
}

fn log_in_url(requested: &Uri) -> String {
    let Some(target) = requested
        .path_and_query()
        .and_then(|target| local_redirect(target.as_str()))
    else {
        return endpoints::LOG_IN.to_owned();
    };

    match serde_urlencoded::to_string([("redirect_url", target)]) {
        Ok(query) => format!("{}?{query}", endpoints::LOG_IN),
        Err(error) => {
            tracing::error!("Could not encode redirect URL {target}: {error}");
            endpoints::LOG_IN.to_owned()
        }
    }
}
