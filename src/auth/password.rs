//! The shared log-in password.
//!
//! Every user logs in with their own email and the one password shared by the
//! whole office. Only a bcrypt hash of that password is stored, in a
//! single-row table.

use std::fmt::Display;

use bcrypt::{BcryptError, hash, verify};
use rusqlite::{Connection, params};
use serde::{Deserialize, Serialize};
use zxcvbn::{Score, feedback::Feedback, zxcvbn};

use crate::Error;

/// A plain text password that is hard enough to guess to be used as the shared password.
///
/// This struct can be used to construct a [PasswordHash].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidatedPassword(String);

impl ValidatedPassword {
    /// Create and validate a new password from a string.
    ///
    /// # Errors
    ///
    /// Returns [Error::TooWeak] with suggestions from `zxcvbn` if the password scores below three.
    pub fn new(raw_password_string: &str) -> Result<Self, Error> {
        let password_analysis = zxcvbn(raw_password_string, &[]);

        match password_analysis.score() {
            Score::Three | Score::Four => Ok(Self(raw_password_string.to_string())),
            _ => Err(Error::TooWeak(
                password_analysis
                    .feedback()
                    .unwrap_or(&Feedback::default())
                    .to_string(),
            )),
        }
    }

    /// Wrap `raw_password_string` without checking its strength.
    ///
    /// Used for demo databases and tests where a memorable password is more
    /// useful than a strong one.
    pub fn new_unchecked(raw_password_string: &str) -> Self {
        Self(raw_password_string.to_string())
    }
}

impl Display for ValidatedPassword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", str::repeat("*", 8))
    }
}

/// A salted and hashed password.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// An alias for the default encryption cost for hashing passwords.
    pub const DEFAULT_COST: u32 = bcrypt::DEFAULT_COST;

    /// Hash `password` with `cost` rounds of bcrypt.
    ///
    /// # Errors
    ///
    /// Returns [Error::HashingError] if bcrypt fails, e.g. because `cost` is out of range.
    pub fn new(password: ValidatedPassword, cost: u32) -> Result<Self, Error> {
        hash(&password.0, cost)
            .map(Self)
            .map_err(|error| Error::HashingError(error.to_string()))
    }

    /// Wrap a hash that was read back from the database.
    pub fn new_unchecked(raw_password_hash: &str) -> Self {
        Self(raw_password_hash.to_string())
    }

    /// Validate then hash `raw_password`.
    pub fn from_raw_password(raw_password: &str, cost: u32) -> Result<Self, Error> {
        PasswordHash::new(ValidatedPassword::new(raw_password)?, cost)
    }

    /// Check that `raw_password` matches the stored password.
    pub fn verify(&self, raw_password: &str) -> Result<bool, BcryptError> {
        verify(raw_password, &self.0)
    }
}

impl AsRef<str> for PasswordHash {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Create the table holding the shared password hash.
pub fn create_shared_password_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS shared_password (
                id INTEGER PRIMARY KEY CHECK (id = 1),
                password TEXT NOT NULL
                )",
        (),
    )?;

    Ok(())
}

/// Store `password_hash` as the shared password, replacing any previous one.
pub fn set_shared_password(password_hash: &PasswordHash, connection: &Connection) -> Result<(), Error> {
    connection.execute(
        "INSERT INTO shared_password (id, password) VALUES (1, ?1)
        ON CONFLICT(id) DO UPDATE SET password = excluded.password",
        params![password_hash.as_ref()],
    )?;

    Ok(())
}

/// Get the hash of the shared password.
///
/// # Errors
///
/// Returns [Error::PasswordNotSet] if no shared password has been stored.
pub fn get_shared_password(connection: &Connection) -> Result<PasswordHash, Error> {
    connection
        .query_row(
            "SELECT password FROM shared_password WHERE id = 1",
            [],
            |row| row.get::<_, String>(0),
        )
        .map(|raw_hash| PasswordHash::new_unchecked(&raw_hash))
        .map_err(|error| match Error::from(error) {
            Error::NotFound => Error::PasswordNotSet,
            error => error,
        })
}


#[cfg(test)]
mod shared_password_tests {
    use rusqlite::Connection;

    use crate::{
        Error,
        auth::{PasswordHash, ValidatedPassword, get_shared_password, set_shared_password},
        db::initialize,
    };

    fn get_db_connection() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        conn
    }

    #[test]
    fn missing_password_is_reported() {
        let conn = get_db_connection();

        assert_eq!(get_shared_password(&conn), Err(Error::PasswordNotSet));
    }

    #[test]
    fn setting_password_twice_replaces_it() {
        let conn = get_db_connection();
        let first = PasswordHash::new(ValidatedPassword::new_unchecked("first"), 4).unwrap();
        let second = PasswordHash::new(ValidatedPassword::new_unchecked("second"), 4).unwrap();

        set_shared_password(&first, &conn).unwrap();
        set_shared_password(&second, &conn).unwrap();

        let stored = get_shared_password(&conn).unwrap();
        assert_eq!(stored, second);
        assert!(stored.verify("second").unwrap());
    }
}
