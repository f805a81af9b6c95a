//! Storage for the denormalised cash balance of each user.

use rusqlite::{Connection, Row, params};
use serde::Serialize;
use time::OffsetDateTime;

use crate::{Error, expense::ExpenseStatus, timezone::now_utc, user::UserID};

/// The cash a user has received, spent and has left.
///
/// `current_balance` always equals `total_allocated - total_spent`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserBalance {
    /// The user the balance belongs to.
    pub user_id: UserID,
    /// The total cash given to the user.
    pub total_allocated: f64,
    /// The total of the user's pending and approved expenses.
    pub total_spent: f64,
    /// The total of the user's expenses waiting for a decision.
    pub pending_amount: f64,
    /// The cash the user has left.
    pub current_balance: f64,
    /// When the balance last changed.
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Create the user balance table.
///
/// # Errors
///
/// This function will return an error if the SQL query failed.
pub fn create_balance_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS user_balance (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL UNIQUE,
            total_allocated REAL NOT NULL DEFAULT 0,
            total_spent REAL NOT NULL DEFAULT 0,
            pending_amount REAL NOT NULL DEFAULT 0,
            current_balance REAL NOT NULL DEFAULT 0,
            updated_at TEXT NOT NULL,
            FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
        )",
        (),
    )?;

    Ok(())
}

fn map_balance_row(row: &Row) -> Result<UserBalance, rusqlite::Error> {
    Ok(UserBalance {
        user_id: row.get(0)?,
        total_allocated: row.get(1)?,
        total_spent: row.get(2)?,
        pending_amount: row.get(3)?,
        current_balance: row.get(4)?,
        updated_at: row.get(5)?,
    })
}

/// Insert a zeroed balance for `user_id` unless the user already has one.
///
/// # Errors
///
/// Returns [Error::InvalidForeignKey] if the user does not exist.
pub fn create_empty_balance(user_id: UserID, connection: &Connection) -> Result<(), Error> {
    connection.execute(
        "INSERT OR IGNORE INTO user_balance (user_id, updated_at) VALUES (?1, ?2)",
        params![user_id, now_utc()],
    )?;

    Ok(())
}

/// Get the balance of a user.
///
/// A user without a balance row gets a zeroed balance.
///
/// # Errors
///
/// Returns [Error::NotFound] if the user does not exist.
pub fn get_balance(user_id: UserID, connection: &Connection) -> Result<UserBalance, Error> {
    connection
        .query_row(
            "SELECT user.id,
                COALESCE(user_balance.total_allocated, 0),
                COALESCE(user_balance.total_spent, 0),
                COALESCE(user_balance.pending_amount, 0),
                COALESCE(user_balance.current_balance, 0),
                COALESCE(user_balance.updated_at, user.created_at)
            FROM user
            LEFT JOIN user_balance ON user_balance.user_id = user.id
            WHERE user.id = ?1",
            params![user_id],
            map_balance_row,
        )
        .map_err(Error::from)
}

/// Add `amount` of cash to a user's allocation and current balance.
///
/// Should run in the same transaction as the insertion of the top-up.
pub fn apply_top_up(user_id: UserID, amount: f64, connection: &Connection) -> Result<(), Error> {
    create_empty_balance(user_id, connection)?;

    connection.execute(
        "UPDATE user_balance
        SET total_allocated = total_allocated + ?1,
            current_balance = current_balance + ?1,
            updated_at = ?2
        WHERE user_id = ?3",
        params![amount, now_utc(), user_id],
    )?;

    Ok(())
}

/// Deduct a newly submitted expense with a total of `total` from a user's cash.
///
/// The balance may go negative.
pub fn record_expense_submission(
    user_id: UserID,
    total: f64,
    connection: &Connection,
) -> Result<(), Error> {
    create_empty_balance(user_id, connection)?;

    connection.execute(
        "UPDATE user_balance
        SET total_spent = total_spent + ?1,
            pending_amount = pending_amount + ?1,
            current_balance = current_balance - ?1,
            updated_at = ?2
        WHERE user_id = ?3",
        params![total, now_utc(), user_id],
    )?;

    Ok(())
}

/// Settle a pending expense with a total of `total` that was given `decision`.
///
/// Approved expenses stay spent. Rejected expenses are refunded to the user's cash.
/// A `decision` of [ExpenseStatus::Pending] changes nothing.
pub fn record_expense_decision(
    user_id: UserID,
    total: f64,
    decision: ExpenseStatus,
    connection: &Connection,
) -> Result<(), Error> {
    let query = match decision {
        ExpenseStatus::Pending => return Ok(()),
        ExpenseStatus::Approved => {
            "UPDATE user_balance
            SET pending_amount = pending_amount - ?1,
                updated_at = ?2
            WHERE user_id = ?3"
        }
        ExpenseStatus::Rejected => {
            "UPDATE user_balance
            SET pending_amount = pending_amount - ?1,
                total_spent = total_spent - ?1,
                current_balance = current_balance + ?1,
                updated_at = ?2
            WHERE user_id = ?3"
        }
    };

    create_empty_balance(user_id, connection)?;
    connection.execute(query, params![total, now_utc(), user_id])?;

    Ok(())
}

/// Zero the cash balance of every staff member and manager.
///
/// The allocation is set to what has been spent so the balance stays consistent.
/// Returns the number of balances that were reset.
pub fn reset_worker_balances(connection: &Connection) -> Result<usize, Error> {
    let rows_affected = connection.execute(
        "UPDATE user_balance
        SET total_allocated = total_spent,
            current_balance = 0,
            updated_at = ?1
        WHERE user_id IN (SELECT id FROM user WHERE role IN ('staff', 'manager'))",
        params![now_utc()],
    )?;

    Ok(rows_affected)
}
