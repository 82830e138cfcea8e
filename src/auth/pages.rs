//! The log-in, registration and log-out routes.

use axum::{
    Form,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::PrivateCookieJar;
use maud::{Markup, html};
use serde::Deserialize;

use crate::{
    Error,
    auth::{
        AccountState, PasswordHash, UserID,
        account::check_password_strength,
        create_user,
        gate::local_redirect,
        get_user_by_email,
        session::{Session, end_session},
    },
    endpoints,
    html::{BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, LINK_STYLE, base, error_list},
    validation::{ErrorList, ValidationError},
};

const EMAIL_FIELD: &str = "Email";
const PASSWORD_FIELD: &str = "Password";
const CONFIRM_PASSWORD_FIELD: &str = "Confirm Password";
const CREDENTIALS_FIELD: &str = "Email or password";

fn account_input(name: &str, label: &str, input_type: &str, value: Option<&str>) -> Markup {
    html! {
        div
        {
            label for=(name) class=(FORM_LABEL_STYLE) { (label) }

            input
                type=(input_type)
                name=(name)
                id=(name)
                value=[value]
                required
                class=(FORM_TEXT_INPUT_STYLE);
        }
    }
}

/// The log-in and registration pages share this layout and differ in their fields.
fn account_page(
    title: &str,
    action: &str,
    errors: &ErrorList,
    fields: Markup,
    footer: Markup,
) -> Markup {
    let content = html! {
        div class="flex flex-col items-center justify-center px-6 py-8 mx-auto max-w-md"
        {
            p class="mb-6 text-2xl font-semibold text-gray-900 dark:text-white" { "Ledgerly" }

            div class="w-full p-6 space-y-4 bg-white rounded-lg shadow dark:bg-gray-800"
            {
                h1 class="text-xl font-bold text-gray-900 dark:text-white" { (title) }

                (error_list(errors))

                form method="post" action=(action) class="space-y-4 md:space-y-6"
                {
                    (fields)

                    button type="submit" id="submit-button" class=(BUTTON_PRIMARY_STYLE)
                    {
                        (title)
                    }
                }

                p class="text-sm font-light text-gray-500 dark:text-gray-400" { (footer) }
            }
        }
    };

    base(title, &[], &content)
}

fn log_in_page(email: &str, redirect_url: Option<&str>, errors: &ErrorList) -> Markup {
    let fields = html! {
        @if let Some(redirect_url) = redirect_url {
            input type="hidden" name="redirect_url" value=(redirect_url);
        }

        (account_input("email", EMAIL_FIELD, "email", Some(email)))
        (account_input("password", PASSWORD_FIELD, "password", None))
    };
    let footer = html! {
        "No account yet? "
        a href=(endpoints::REGISTER) class=(LINK_STYLE) { "Register" }
    };

    account_page("Log in", endpoints::LOG_IN, errors, fields, footer)
}

fn register_page(email: &str, errors: &ErrorList) -> Markup {
    let fields = html! {
        (account_input("email", EMAIL_FIELD, "email", Some(email)))
        (account_input("password", PASSWORD_FIELD, "password", None))
        (account_input("confirm_password", CONFIRM_PASSWORD_FIELD, "password", None))
    };
    let footer = html! {
        "Already registered? "
        a href=(endpoints::LOG_IN) class=(LINK_STYLE) { "Log in" }
    };

    account_page("Register", endpoints::REGISTER, errors, fields, footer)
}

/// `raw_url` if it is safe to send the user there after logging in.
fn checked_redirect(raw_url: Option<&str>) -> Option<&str> {
    let raw_url = raw_url?;
    let redirect_url = local_redirect(raw_url);

    if redirect_url.is_none() {
        tracing::warn!("Ignoring redirect to {raw_url:?}");
    }

    redirect_url
}

/// Where the log-in form should send the user afterwards.
#[derive(Debug, Deserialize)]
pub struct RedirectQuery {
    redirect_url: Option<String>,
}

/// Display the log-in page.
pub async fn get_log_in_page(Query(query): Query<RedirectQuery>) -> Markup {
    log_in_page(
        "",
        checked_redirect(query.redirect_url.as_deref()),
        &ErrorList::new(),
    )
}

/// The submitted log-in form.
#[derive(Debug, Deserialize)]
pub struct LogInForm {
    email: String,
    password: String,
    redirect_url: Option<String>,
}

/// The user that `email` and `password` belong to.
///
/// # Errors
/// Returns an [Error::InvalidCredentials] for an unknown email or a wrong password.
fn verify_credentials(email: &str, password: &str, state: &AccountState) -> Result<UserID, Error> {
    let user = {
        let connection = state.db_connection.lock().map_err(|error| {
            tracing::error!("could not acquire database lock: {error}");
            Error::DatabaseLockError
        })?;

        get_user_by_email(email, &connection)
    };

    let user = match user {
        Err(Error::NotFound) => return Err(Error::InvalidCredentials),
        user => user?,
    };

    if user.password_hash.matches(password)? {
        Ok(user.id)
    } else {
        Err(Error::InvalidCredentials)
    }
}

/// Start a session for the user and send them on to `redirect_url` or the transactions page.
///
/// A wrong email or password shows the log-in form again with a 401 status.
pub async fn post_log_in(
    State(state): State<AccountState>,
    jar: PrivateCookieJar,
    Form(form): Form<LogInForm>,
) -> Response {
    let redirect_url = checked_redirect(form.redirect_url.as_deref());

    let user_id = match verify_credentials(&form.email, &form.password, &state) {
        Ok(user_id) => user_id,
        Err(Error::InvalidCredentials) => {
            tracing::debug!("Failed log in for {:?}", form.email);
            let mut errors = ErrorList::new();
            errors.push(ValidationError::new(CREDENTIALS_FIELD, "is incorrect"));

            return (
                StatusCode::UNAUTHORIZED,
                log_in_page(&form.email, redirect_url, &errors),
            )
                .into_response();
        }
        Err(error) => {
            tracing::error!("Could not check credentials: {error}");
            return error.into_response();
        }
    };

    match Session::start(user_id, state.session_length).save(jar) {
        Ok(jar) => {
            tracing::debug!("User {user_id} logged in");
            let redirect_url = redirect_url.unwrap_or(endpoints::TRANSACTIONS_VIEW);
            (jar, Redirect::to(redirect_url)).into_response()
        }
        Err(error) => {
            tracing::error!("Could not start session for user {user_id}: {error}");
            error.into_response()
        }
    }
}

/// Display the registration page.
pub async fn get_register_page() -> Markup {
    register_page("", &ErrorList::new())
}

/// The submitted registration form.
#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    email: String,
    password: String,
    confirm_password: String,
}

fn is_email(email: &str) -> bool {
    email
        .split_once('@')
        .is_some_and(|(name, domain)| !name.is_empty() && !domain.is_empty() && !domain.contains('@'))
        && !email.contains(char::is_whitespace)
}

fn check_registration(form: &RegisterForm, email: &str) -> ErrorList {
    let mut errors = ErrorList::new();

    if !is_email(email) {
        errors.push(ValidationError::new(
            EMAIL_FIELD,
            "must be an email address, e.g. you@example.com",
        ));
    }

    match check_password_strength(&form.password, &[email]) {
        Ok(()) => {}
        Err(Error::TooWeak(advice)) => errors.push(ValidationError::new(
            PASSWORD_FIELD,
            &format!("is too easy to guess. {advice}"),
        )),
        Err(error) => errors.push(ValidationError::new(PASSWORD_FIELD, &error.to_string())),
    }

    if form.password != form.confirm_password {
        errors.push(ValidationError::new(
            CONFIRM_PASSWORD_FIELD,
            "must match the password",
        ));
    }

    errors
}

/// Create an account, start a session for it and go to the transactions page.
///
/// Every problem with the form is listed at once on the registration page with a 400 status.
pub async fn register_user(
    State(state): State<AccountState>,
    jar: PrivateCookieJar,
    Form(form): Form<RegisterForm>,
) -> Response {
    let email = form.email.trim();
    let mut errors = check_registration(&form, email);

    if !errors.is_empty() {
        tracing::debug!("Registration failed validation with {} errors", errors.len());
        return (StatusCode::BAD_REQUEST, register_page(email, &errors)).into_response();
    }

    let user = PasswordHash::new(&form.password, PasswordHash::DEFAULT_COST).and_then(|hash| {
        let connection = state.db_connection.lock().map_err(|error| {
            tracing::error!("could not acquire database lock: {error}");
            Error::DatabaseLockError
        })?;

        create_user(email, hash, &connection)
    });

    let user = match user {
        Ok(user) => user,
        Err(Error::DuplicateEmail) => {
            errors.push(ValidationError::new(EMAIL_FIELD, "is already registered"));
            return (StatusCode::BAD_REQUEST, register_page(email, &errors)).into_response();
        }
        Err(error) => {
            tracing::error!("Could not register user: {error}");
            return error.into_response();
        }
    };

    tracing::info!("Registered user {}", user.id);

    match Session::start(user.id, state.session_length).save(jar) {
        Ok(jar) => (jar, Redirect::to(endpoints::TRANSACTIONS_VIEW)).into_response(),
        Err(error) => {
            tracing::error!("Could not start session for user {}: {error}", user.id);
            error.into_response()
        }
    }
}

/// End the session and go back to the log-in page.
pub async fn get_log_out(jar: PrivateCookieJar) -> (PrivateCookieJar, Redirect) {
    (end_session(jar), Redirect::to(endpoints::LOG_IN))
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{Router, http::StatusCode, routing::get};
    use axum_test::TestServer;
    use scraper::{Html, Selector};
    use time::Duration;

    use crate::{
        app_state::create_cookie_key,
        auth::{AccountState, PasswordHash, SESSION_COOKIE, create_user, get_user_by_email},
        endpoints,
        test_utils::assert_valid_html,
        transaction::test_utils::get_test_connection,
    };

    use super::{
        get_log_in_page, get_log_out, get_register_page, post_log_in, register_user,
    };

    const EMAIL: &str = "test@example.com";
    const PASSWORD: &str = "asomewhatlongpassword1";

    fn get_server() -> (TestServer, AccountState) {
        let connection = get_test_connection();
        create_user(EMAIL, PasswordHash::new(PASSWORD, 4).unwrap(), &connection).unwrap();
        let state = AccountState {
            cookie_key: create_cookie_key("42"),
            session_length: Duration::minutes(30),
            db_connection: Arc::new(Mutex::new(connection)),
        };

        let app = Router::new()
            .route(endpoints::LOG_IN, get(get_log_in_page).post(post_log_in))
            .route(endpoints::REGISTER, get(get_register_page).post(register_user))
            .route(endpoints::LOG_OUT, get(get_log_out))
            .with_state(state.clone());

        (
            TestServer::try_new(app).expect("Could not create test server."),
            state,
        )
    }

    fn error_items(text: &str) -> Vec<String> {
        Html::parse_document(text)
            .select(&Selector::parse("#errors li.error").unwrap())
            .map(|item| item.text().collect())
            .collect()
    }

    #[tokio::test]
    async fn log_in_page_keeps_safe_redirect() {
        let (server, _) = get_server();

        let response = server
            .get(endpoints::LOG_IN)
            .add_query_param("redirect_url", endpoints::NEW_TRANSACTION)
            .await;

        response.assert_status_ok();
        let document = Html::parse_document(&response.text());
        assert_valid_html(&document);
        let hidden = document
            .select(&Selector::parse("input[name=redirect_url]").unwrap())
            .next()
            .expect("want hidden redirect input");
        assert_eq!(hidden.value().attr("value"), Some(endpoints::NEW_TRANSACTION));
    }

    #[tokio::test]
    async fn log_in_starts_session_and_follows_redirect() {
        let (server, _) = get_server();

        let response = server
            .post(endpoints::LOG_IN)
            .form(&[
                ("email", "Test@Example.com"),
                ("password", PASSWORD),
                ("redirect_url", endpoints::NEW_TRANSACTION),
            ])
            .await;

        response.assert_status_see_other();
        assert_eq!(response.header("location"), endpoints::NEW_TRANSACTION);
        response.cookie(SESSION_COOKIE);
    }

    #[tokio::test]
    async fn log_in_ignores_redirect_to_other_site() {
        let (server, _) = get_server();

        let response = server
            .post(endpoints::LOG_IN)
            .form(&[
                ("email", EMAIL),
                ("password", PASSWORD),
                ("redirect_url", "https://example.com/"),
            ])
            .await;

        response.assert_status_see_other();
        assert_eq!(response.header("location"), endpoints::TRANSACTIONS_VIEW);
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_email_look_the_same() {
        let (server, _) = get_server();

        for (email, password) in [(EMAIL, "wrongpassword"), ("nobody@example.com", PASSWORD)] {
            let response = server
                .post(endpoints::LOG_IN)
                .form(&[("email", email), ("password", password)])
                .await;

            response.assert_status(StatusCode::UNAUTHORIZED);
            assert_eq!(
                error_items(&response.text()),
                ["Email or password is incorrect"]
            );
        }
    }

    #[tokio::test]
    async fn register_creates_user_and_starts_session() {
        let (server, state) = get_server();
        let password = "anotherfairlylongpassword2";

        let response = server
            .post(endpoints::REGISTER)
            .form(&[
                ("email", " New@Example.com "),
                ("password", password),
                ("confirm_password", password),
            ])
            .await;

        response.assert_status_see_other();
        assert_eq!(response.header("location"), endpoints::TRANSACTIONS_VIEW);
        response.cookie(SESSION_COOKIE);
        let connection = state.db_connection.lock().unwrap();
        let user = get_user_by_email("new@example.com", &connection).unwrap();
        assert!(user.password_hash.matches(password).unwrap());
    }

    #[tokio::test]
    async fn register_lists_every_problem() {
        let (server, _) = get_server();

        let response = server
            .post(endpoints::REGISTER)
            .form(&[
                ("email", "not-an-email"),
                ("password", "password1"),
                ("confirm_password", "password2"),
            ])
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let errors = error_items(&response.text());
        assert_eq!(errors.len(), 3, "got {errors:?}");
        assert!(errors[0].starts_with("Email must be an email address"));
        assert!(errors[1].starts_with("Password is too easy to guess."));
        assert_eq!(errors[2], "Confirm Password must match the password");
    }

    #[tokio::test]
    async fn register_rejects_taken_email() {
        let (server, _) = get_server();

        let response = server
            .post(endpoints::REGISTER)
            .form(&[
                ("email", "TEST@example.com"),
                ("password", PASSWORD),
                ("confirm_password", PASSWORD),
            ])
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(
            error_items(&response.text()),
            ["Email is already registered"]
        );
    }

    #[tokio::test]
    async fn log_out_expires_session_and_goes_to_log_in() {
        let (server, _) = get_server();

        let response = server.get(endpoints::LOG_OUT).await;

        response.assert_status_see_other();
        assert_eq!(response.header("location"), endpoints::LOG_IN);
        let cookie = response.cookie(SESSION_COOKIE);
        assert_eq!(cookie.max_age(), Some(Duration::ZERO));
    }
}
