//! Petty Cash is a web app for tracking petty-cash expenses.
//!
//! Staff submit expenses against a personal cash balance, managers and admins
//! approve or reject them, and admins top up the cash balances.
//!
//! This library provides the JSON REST API consumed by the single-page client.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use serde_json::json;
use tokio::signal;

mod app_state;
mod auth;
mod balance;
mod category;
mod dashboard;
mod database_id;
mod db;
mod endpoints;
mod expense;
mod logging;
mod money;
mod not_found;
mod report;
mod routing;
mod timezone;
mod top_up;
mod user;

#[cfg(test)]
mod test_utils;

pub use app_state::{AppState, create_cookie_key};
pub use auth::{PasswordHash, ValidatedPassword, set_shared_password};
pub use category::{Category, CategoryName, NewCategory, create_category};
pub use db::initialize as initialize_db;
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use routing::build_router;
pub use timezone::get_local_offset;
pub use top_up::{NewTopUp, record_top_up};
pub use user::{NewUser, Role, User, UserID, create_user, get_user_by_email, get_user_by_id};

use crate::{
    database_id::CategoryId,
    expense::{ExpenseStatus, MAX_RECEIPT_BYTES},
};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The shared password did not match.
    #[error("invalid password")]
    InvalidCredentials,

    /// No user is registered with the email used to log in.
    #[error("no user with the email \"{0}\"")]
    UnknownEmail(String),

    /// The user exists but their account has been deactivated.
    #[error("the user account is deactivated")]
    InactiveUser,

    /// The request did not carry a valid session cookie.
    #[error("the request is not authenticated")]
    Unauthorized,

    /// The user's role does not allow the requested operation.
    #[error("insufficient permissions")]
    InsufficientPermissions,

    /// A staff user tried to access another user's expense.
    #[error("access to the expense was denied")]
    AccessDenied,

    /// No shared password has been stored in the database yet.
    ///
    /// The `reset_password` binary sets the shared password.
    #[error("the shared password has not been set")]
    PasswordNotSet,

    /// The user provided a password that is too easy to guess.
    #[error("password is too weak: {0}")]
    TooWeak(String),

    /// An unexpected error occurred with the underlying hashing library.
    ///
    /// The error string should only be logged for debugging on the server.
    /// When communicating with the application client this error should be
    /// replaced with a general error type indicating an internal server error.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// The session token could not be written to or read from the cookie.
    #[error("could not create the session cookie: {0}")]
    CookieError(String),

    /// A required field in the request was missing or empty.
    #[error("{0} is required")]
    MissingField(&'static str),

    /// An amount was not a positive, finite number.
    #[error("\"{0}\" is not a valid amount, amounts must be positive numbers")]
    InvalidAmount(String),

    /// A date could not be parsed.
    #[error("\"{0}\" is not a valid date, dates must use the format YYYY-MM-DD")]
    InvalidDate(String),

    /// An ID in a query string was not an integer.
    #[error("\"{0}\" is not a valid ID")]
    InvalidId(String),

    /// The role is not one of admin, manager or staff.
    #[error("invalid role \"{0}\"")]
    InvalidRole(String),

    /// The status is not a valid decision for an expense.
    #[error("invalid status \"{0}\", expected \"approved\" or \"rejected\"")]
    InvalidStatus(String),

    /// An empty string was used to create a category name.
    #[error("category name cannot be empty")]
    EmptyCategoryName,

    /// A user with the email already exists.
    #[error("a user with the email \"{0}\" already exists")]
    DuplicateEmail(String),

    /// A category with the name already exists.
    #[error("the category \"{0}\" already exists")]
    DuplicateCategoryName(String),

    /// The category ID used to create an expense did not match a category.
    #[error("the category ID {0} does not refer to a valid category")]
    InvalidCategory(CategoryId),

    /// A query referenced a row that does not exist.
    #[error("a referenced row does not exist")]
    InvalidForeignKey,

    /// Only pending expenses may be approved or rejected.
    #[error("the expense has already been {0}")]
    ExpenseAlreadyDecided(ExpenseStatus),

    /// The multipart form could not be parsed.
    #[error("could not parse multipart form: {0}")]
    MultipartError(String),

    /// The receipt is not an image or PDF.
    #[error("invalid receipt file type \"{0}\"")]
    InvalidReceiptType(String),

    /// The receipt is larger than [MAX_RECEIPT_BYTES].
    #[error("the receipt is larger than {MAX_RECEIPT_BYTES} bytes")]
    ReceiptTooLarge,

    /// The receipt could not be written to the upload directory.
    #[error("could not save the receipt: {0}")]
    ReceiptSaveError(String),

    /// The CSV report could not be written.
    #[error("could not write the CSV report: {0}")]
    CsvError(String),

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),

    /// The requested resource was not found.
    ///
    /// For HTTP request handlers, the client should check that the parameters
    /// (e.g., ID) are correct and that the resource has been created.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,
}

/// The extended SQLite result code for a failed UNIQUE constraint.
const SQLITE_CONSTRAINT_UNIQUE: i32 = 2067;
/// The extended SQLite result code for a failed FOREIGN KEY constraint.
const SQLITE_CONSTRAINT_FOREIGNKEY: i32 = 787;

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::SqliteFailure(sql_error, Some(_))
                if sql_error.extended_code == SQLITE_CONSTRAINT_FOREIGNKEY =>
            {
                Error::InvalidForeignKey
            }
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

/// Map a failed UNIQUE constraint on an insert to `duplicate`, otherwise convert the error as usual.
pub(crate) fn map_unique_violation(error: rusqlite::Error, duplicate: impl FnOnce() -> Error) -> Error {
    match error {
        rusqlite::Error::SqliteFailure(sql_error, Some(_))
            if sql_error.extended_code == SQLITE_CONSTRAINT_UNIQUE =>
        {
            duplicate()
        }
        error => error.into(),
    }
}

impl Error {
    fn status_code(&self) -> StatusCode {
        match self {
            Error::InvalidCredentials | Error::UnknownEmail(_) | Error::Unauthorized => {
                StatusCode::UNAUTHORIZED
            }
            Error::InactiveUser | Error::InsufficientPermissions | Error::AccessDenied => {
                StatusCode::FORBIDDEN
            }
            Error::TooWeak(_)
            | Error::MissingField(_)
            | Error::InvalidAmount(_)
            | Error::InvalidDate(_)
            | Error::InvalidId(_)
            | Error::InvalidRole(_)
            | Error::InvalidStatus(_)
            | Error::EmptyCategoryName
            | Error::InvalidCategory(_)
            | Error::InvalidForeignKey
            | Error::MultipartError(_)
            | Error::InvalidReceiptType(_) => StatusCode::BAD_REQUEST,
            Error::ReceiptTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Error::DuplicateEmail(_)
            | Error::DuplicateCategoryName(_)
            | Error::ExpenseAlreadyDecided(_) => StatusCode::CONFLICT,
            Error::NotFound => StatusCode::NOT_FOUND,
            Error::PasswordNotSet
            | Error::HashingError(_)
            | Error::CookieError(_)
            | Error::ReceiptSaveError(_)
            | Error::CsvError(_)
            | Error::InvalidTimezoneError(_)
            | Error::SqlError(_)
            | Error::DatabaseLockError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The message shown to the client.
    fn client_message(&self) -> String {
        match self {
            Error::InvalidCredentials => "Invalid password".to_owned(),
            Error::UnknownEmail(_) => "User not found".to_owned(),
            Error::InactiveUser => "This account has been deactivated".to_owned(),
            Error::Unauthorized => "Unauthorized".to_owned(),
            Error::InsufficientPermissions => "Insufficient permissions".to_owned(),
            Error::AccessDenied => "Access denied".to_owned(),
            Error::NotFound => "Not found".to_owned(),
            Error::InvalidReceiptType(_) => {
                "Invalid file type. Only JPEG, PNG, GIF, and PDF files are allowed.".to_owned()
            }
            Error::ReceiptTooLarge => "Receipts must be 10 MB or smaller.".to_owned(),
            Error::PasswordNotSet => {
                "The log-in password has not been set, ask an administrator to set it.".to_owned()
            }
            error if error.status_code().is_client_error() => capitalise_first_char(&error.to_string()),
            // Any errors that are not handled above are not intended to be shown to the client.
            _ => "Something went wrong, check the server logs for more details.".to_owned(),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!("An unexpected error occurred: {}", self);
        } else {
            tracing::debug!("Request failed with {status}: {}", self);
        }

        (status, Json(json!({ "message": self.client_message() }))).into_response()
    }
}

fn capitalise_first_char(string: &str) -> String {
    let mut chars = string.chars();
    let Some(first) = chars.next() else {
        return String::with_capacity(0);
    };
    first.to_uppercase().chain(chars).collect()
}
