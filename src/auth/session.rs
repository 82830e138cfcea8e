//! The encrypted cookie that records who is logged in.

use axum_extra::extract::{
    PrivateCookieJar,
    cookie::{Cookie, SameSite},
};
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

use crate::{Error, auth::UserID};

/// The name of the private cookie holding the JSON encoded [Session].
pub const SESSION_COOKIE: &str = "session";

/// How long a session lasts without any requests.
pub const SESSION_LENGTH: Duration = Duration::minutes(30);

/// A logged in user and when their session ends.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: UserID,
    #[serde(with = "time::serde::timestamp")]
    pub expires_at: OffsetDateTime,
}

impl Session {
    /// A session for `user_id` that ends `length` from now.
    pub fn start(user_id: UserID, length: Duration) -> Self {
        Self {
            user_id,
            expires_at: OffsetDateTime::now_utc() + length,
        }
    }

    /// Read the session stored in `jar`.
    ///
    /// # Errors
    /// Returns an [Error::CookieError] if there is no session cookie, its value is
    /// not a session, or the session has ended.
    pub fn from_jar(jar: &PrivateCookieJar) -> Result<Self, Error> {
        let cookie = jar
            .get(SESSION_COOKIE)
            .ok_or_else(|| Error::CookieError("no session cookie".to_owned()))?;
        let session: Self = serde_json::from_str(cookie.value())
            .map_err(|error| Error::CookieError(error.to_string()))?;

        if session.expires_at <= OffsetDateTime::now_utc() {
            return Err(Error::CookieError(format!(
                "session for user {} ended at {}",
                session.user_id, session.expires_at
            )));
        }

        Ok(session)
    }

    /// The same session, ending no earlier than `length` from now.
    pub fn renewed(self, length: Duration) -> Self {
        Self {
            expires_at: self.expires_at.max(OffsetDateTime::now_utc() + length),
            ..self
        }
    }

    /// Add the session cookie to `jar`.
    ///
    /// # Errors
    /// Returns an [Error::CookieError] if the session cannot be serialized.
    pub fn save(&self, jar: PrivateCookieJar) -> Result<PrivateCookieJar, Error> {
        let value =
            serde_json::to_string(self).map_err(|error| Error::CookieError(error.to_string()))?;

        Ok(jar.add(session_cookie(value, self.expires_at)))
    }
}

/// Replace the session cookie with an empty one that the client discards immediately.
pub fn end_session(jar: PrivateCookieJar) -> PrivateCookieJar {
    let mut cookie = session_cookie(String::new(), OffsetDateTime::UNIX_EPOCH);
    cookie.set_max_age(Duration::ZERO);

    jar.add(cookie)
}

fn session_cookie(value: String, expires_at: OffsetDateTime) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, value))
        .expires(expires_at)
        .path("/")
        .http_only(true)
        .same_site(SameSite::Strict)
        .secure(true)
        .build()
}
