//! Defines the user model and the database queries for users.

use std::{fmt::Display, str::FromStr};

use rusqlite::{
    Connection, Row, params,
    types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{Error, balance::create_empty_balance, map_unique_violation, timezone::now_utc};

/// A newtype wrapper for integer user IDs.
///
/// This helps disambiguate user IDs from other types of IDs, leading to better compile time
/// errors, and more flexible generics that can have distinct implementations for multiple ID types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct UserID(i64);

impl UserID {
    /// Create a new user ID.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Cast the user ID to a 64 bit integer.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl Display for UserID {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl ToSql for UserID {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        self.0.to_sql()
    }
}

impl FromSql for UserID {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        i64::column_result(value).map(UserID)
    }
}

/// What a user is allowed to do.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Manages users, categories and cash top-ups, and approves expenses.
    Admin,
    /// Approves expenses and hands out cash.
    Manager,
    /// Submits expenses against their own cash balance.
    Staff,
}

impl Role {
    /// The lowercase name of the role, as stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Manager => "manager",
            Role::Staff => "staff",
        }
    }

    /// Whether the role may approve expenses and see everyone's data.
    pub fn is_approver(&self) -> bool {
        matches!(self, Role::Admin | Role::Manager)
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "manager" => Ok(Role::Manager),
            "staff" => Ok(Role::Staff),
            other => Err(Error::InvalidRole(other.to_owned())),
        }
    }
}

impl ToSql for Role {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(self.as_str().into())
    }
}

impl FromSql for Role {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value.as_str()?.parse().map_err(|_| FromSqlError::InvalidType)
    }
}

/// A user of the application.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// The user's ID in the application database.
    pub id: UserID,
    /// The email the user logs in with.
    pub email: String,
    /// The user's given name.
    pub first_name: String,
    /// The user's family name.
    pub last_name: String,
    /// What the user is allowed to do.
    pub role: Role,
    /// The department the user works in, may be empty.
    pub department: String,
    /// Deactivated users cannot log in.
    pub is_active: bool,
    /// When the user was created.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl User {
    /// The user's full name, or their email if they have no name.
    pub fn display_name(&self) -> String {
        display_name(&self.first_name, &self.last_name, &self.email)
    }
}

/// The name to show for a user: their full name, or their email if they have no name.
pub fn display_name(first_name: &str, last_name: &str, email: &str) -> String {
    let full_name = format!("{first_name} {last_name}");
    let full_name = full_name.trim();

    if full_name.is_empty() {
        email.to_owned()
    } else {
        full_name.to_owned()
    }
}

/// The data needed to create a [User].
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    /// The email the user logs in with, must be unique.
    pub email: String,
    /// The user's given name.
    pub first_name: String,
    /// The user's family name.
    pub last_name: String,
    /// What the user is allowed to do.
    pub role: Role,
    /// The department the user works in, may be empty.
    pub department: String,
}

/// A user along with a summary of their balance and expenses.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserWithStats {
    /// The user.
    #[serde(flatten)]
    pub user: User,
    /// The user's current cash balance.
    pub balance: f64,
    /// The number of expenses the user has submitted.
    pub total_expenses: i64,
    /// The number of the user's expenses that were approved.
    pub approved_expenses: i64,
    /// The number of the user's expenses waiting for a decision.
    pub pending_expenses: i64,
    /// The number of the user's expenses that were rejected.
    pub rejected_expenses: i64,
}

/// The columns of the user table in the order expected by [map_user_row].
pub const USER_COLUMNS: &str =
    "user.id, user.email, user.first_name, user.last_name, user.role, user.department, user.is_active, user.created_at";

/// Create the user table.
///
/// # Errors
///
/// This function will return an error if the SQL query failed.
pub fn create_user_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS user (
                id INTEGER PRIMARY KEY,
                email TEXT NOT NULL UNIQUE COLLATE NOCASE,
                first_name TEXT NOT NULL,
                last_name TEXT NOT NULL,
                role TEXT NOT NULL DEFAULT 'staff' CHECK (role IN ('admin', 'manager', 'staff')),
                department TEXT NOT NULL DEFAULT '',
                is_active INTEGER NOT NULL DEFAULT 1,
                created_at TEXT NOT NULL
                )",
        (),
    )?;

    Ok(())
}

/// Map a row that selected [USER_COLUMNS] to a [User].
pub fn map_user_row(row: &Row) -> Result<User, rusqlite::Error> {
    map_user_row_at(row, 0)
}

/// Map the [USER_COLUMNS] starting at column `offset` to a [User].
///
/// This is useful when the user table has been joined onto another table.
pub fn map_user_row_at(row: &Row, offset: usize) -> Result<User, rusqlite::Error> {
    Ok(User {
        id: row.get(offset)?,
        email: row.get(offset + 1)?,
        first_name: row.get(offset + 2)?,
        last_name: row.get(offset + 3)?,
        role: row.get(offset + 4)?,
        department: row.get(offset + 5)?,
        is_active: row.get(offset + 6)?,
        created_at: row.get(offset + 7)?,
    })
}

/// Create and insert a new user into the database along with an empty cash balance.
///
/// # Errors
///
/// Returns a:
/// - [Error::MissingField] if the email, first name or last name is empty.
/// - [Error::DuplicateEmail] if a user already has the email.
/// - [Error::SqlError] if an SQL related error occurred.
pub fn create_user(new_user: NewUser, connection: &Connection) -> Result<User, Error> {
    let email = new_user.email.trim().to_owned();
    if email.is_empty() {
        return Err(Error::MissingField("email"));
    }

    let first_name = new_user.first_name.trim().to_owned();
    if first_name.is_empty() {
        return Err(Error::MissingField("first name"));
    }

    let last_name = new_user.last_name.trim().to_owned();
    if last_name.is_empty() {
        return Err(Error::MissingField("last name"));
    }

    let department = new_user.department.trim().to_owned();
    let created_at = now_utc();

    let transaction = connection.unchecked_transaction()?;

    transaction
        .execute(
            "INSERT INTO user (email, first_name, last_name, role, department, is_active, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, 1, ?6)",
            params![email, first_name, last_name, new_user.role, department, created_at],
        )
        .map_err(|error| map_unique_violation(error, || Error::DuplicateEmail(email.clone())))?;

    let id = UserID::new(transaction.last_insert_rowid());
    create_empty_balance(id, &transaction)?;

    transaction.commit()?;

    Ok(User {
        id,
        email,
        first_name,
        last_name,
        role: new_user.role,
        department,
        is_active: true,
        created_at,
    })
}

/// Get the user from the database with an ID equal to `user_id`.
///
/// # Errors
///
/// This function will return an error if:
/// - `user_id` does not belong to a registered user.
/// - there was an error trying to access the store.
pub fn get_user_by_id(user_id: UserID, connection: &Connection) -> Result<User, Error> {
    connection
        .query_row(
            &format!("SELECT {USER_COLUMNS} FROM user WHERE user.id = ?1"),
            params![user_id],
            map_user_row,
        )
        .map_err(Error::from)
}

/// Get the user that logs in with `email`.
///
/// Emails are compared case-insensitively.
///
/// # Errors
///
/// Returns [Error::NotFound] if no user has the email.
pub fn get_user_by_email(email: &str, connection: &Connection) -> Result<User, Error> {
    connection
        .query_row(
            &format!("SELECT {USER_COLUMNS} FROM user WHERE user.email = ?1 COLLATE NOCASE"),
            params![email.trim()],
            map_user_row,
        )
        .map_err(Error::from)
}

/// Get every user along with their balance and expense counts, oldest first.
pub fn get_users_with_stats(connection: &Connection) -> Result<Vec<UserWithStats>, Error> {
    connection
        .prepare(&format!(
            "SELECT {USER_COLUMNS},
                COALESCE(user_balance.current_balance, 0),
                COUNT(expense.id),
                COUNT(CASE WHEN expense.status = 'approved' THEN 1 END),
                COUNT(CASE WHEN expense.status = 'pending' THEN 1 END),
                COUNT(CASE WHEN expense.status = 'rejected' THEN 1 END)
            FROM user
            LEFT JOIN expense ON expense.user_id = user.id
            LEFT JOIN user_balance ON user_balance.user_id = user.id
            GROUP BY user.id
            ORDER BY user.created_at, user.id"
        ))?
        .query_map([], |row| {
            Ok(UserWithStats {
                user: map_user_row(row)?,
                balance: row.get(8)?,
                total_expenses: row.get(9)?,
                approved_expenses: row.get(10)?,
                pending_expenses: row.get(11)?,
                rejected_expenses: row.get(12)?,
            })
        })?
        .map(|maybe_user| maybe_user.map_err(Error::from))
        .collect()
}

/// Change the role of a user and return the updated user.
///
/// # Errors
///
/// Returns [Error::NotFound] if the user does not exist.
pub fn update_user_role(user_id: UserID, role: Role, connection: &Connection) -> Result<User, Error> {
    let rows_affected = connection.execute(
        "UPDATE user SET role = ?1 WHERE id = ?2",
        params![role, user_id],
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    get_user_by_id(user_id, connection)
}

/// Activate a deactivated user or deactivate an active one, returning the updated user.
///
/// # Errors
///
/// Returns [Error::NotFound] if the user does not exist.
pub fn toggle_user_status(user_id: UserID, connection: &Connection) -> Result<User, Error> {
    let rows_affected = connection.execute(
        "UPDATE user SET is_active = NOT is_active WHERE id = ?1",
        params![user_id],
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    get_user_by_id(user_id, connection)
}
