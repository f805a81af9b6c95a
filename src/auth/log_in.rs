//! Defines the routes for logging in and getting the logged in user.
//! The cookie module handles the lower level session cookie logic.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, State},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use rusqlite::Connection;
use serde::Deserialize;
use time::Duration;

use crate::{
    AppState, Error,
    auth::{cookie::set_auth_cookie, get_shared_password},
    user::{User, get_user_by_email},
};

/// The state needed to perform a login.
#[derive(Debug, Clone)]
pub struct LoginState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The duration for which cookies used for authentication are valid.
    pub cookie_duration: Duration,
    /// The database connection for looking up users and the shared password.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for LoginState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
            db_connection: state.db_connection.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<LoginState> for Key {
    fn from_ref(state: &LoginState) -> Self {
        state.cookie_key.clone()
    }
}

/// The credentials sent by the client to log in.
#[derive(Clone, Deserialize)]
pub struct LogInData {
    /// The email of the user logging in.
    #[serde(default)]
    pub email: String,
    /// The shared password.
    #[serde(default)]
    pub password: String,
}

/// Handler for log-in requests.
///
/// On success the session cookie is set and the logged in user is returned.
///
/// # Errors
///
/// This function will return an error if:
/// - the email or password is empty,
/// - the password does not match the shared password,
/// - no user has the email,
/// - the user has been deactivated,
/// - or an internal error occurred when verifying the password.
pub async fn post_log_in(
    State(state): State<LoginState>,
    jar: PrivateCookieJar,
    Json(log_in_data): Json<LogInData>,
) -> Result<(PrivateCookieJar, Json<User>), Error> {
    let email = log_in_data.email.trim();
    if email.is_empty() {
        return Err(Error::MissingField("email"));
    }
    if log_in_data.password.is_empty() {
        return Err(Error::MissingField("password"));
    }

    let (password_hash, user) = {
        let connection = state.db_connection.lock().map_err(|error| {
            tracing::error!("could not acquire database lock: {error}");
            Error::DatabaseLockError
        })?;

        let password_hash = get_shared_password(&connection)?;
        let user = match get_user_by_email(email, &connection) {
            Ok(user) => Some(user),
            Err(Error::NotFound) => None,
            Err(error) => return Err(error),
        };

        (password_hash, user)
    };

    let is_password_valid = password_hash
        .verify(&log_in_data.password)
        .map_err(|error| Error::HashingError(error.to_string()))?;

    if !is_password_valid {
        tracing::info!("Rejected log in for {email}: invalid password");
        return Err(Error::InvalidCredentials);
    }

    let user = user.ok_or_else(|| Error::UnknownEmail(email.to_owned()))?;

    if !user.is_active {
        return Err(Error::InactiveUser);
    }

    let jar = set_auth_cookie(jar, user.id, state.cookie_duration)?;
    tracing::info!("User {} logged in", user.id);

    Ok((jar, Json(user)))
}

/// Responds with the logged in user.
pub async fn get_current_user(Extension(user): Extension<User>) -> Json<User> {
    Json(user)
}
