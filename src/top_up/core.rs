//! Storage for cash top-ups, the cash handed out to users.

use rusqlite::{Connection, Row, params};
use serde::Serialize;
use time::{Date, OffsetDateTime};

use crate::{
    Error,
    balance::apply_top_up,
    database_id::TopUpId,
    money::validate_amount,
    timezone::now_utc,
    user::{UserID, display_name},
};

/// The number of entries returned by [get_top_up_history] when no limit is given.
pub const TOP_UP_HISTORY_LIMIT: u32 = 50;

/// Cash given to a user.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CashTopUp {
    /// The ID of the top-up.
    pub id: TopUpId,
    /// The user who received the cash.
    pub user_id: UserID,
    /// How much cash was given.
    pub amount: f64,
    /// Who or where the cash came from.
    pub source: String,
    /// A reference for the transfer, may be empty.
    pub reference: String,
    /// Free-form notes, may be empty.
    pub remarks: String,
    /// The day the cash was handed over.
    pub date: Date,
    /// When the top-up was recorded.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// The data needed to record a [CashTopUp].
#[derive(Debug, Clone, PartialEq)]
pub struct NewTopUp {
    /// The user receiving the cash.
    pub user_id: UserID,
    /// How much cash is given, must be positive.
    pub amount: f64,
    /// Who or where the cash came from, must not be empty.
    pub source: String,
    /// A reference for the transfer.
    pub reference: String,
    /// Free-form notes.
    pub remarks: String,
    /// The day the cash was handed over.
    pub date: Date,
}

/// A top-up along with the names of the people involved.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopUpHistoryEntry {
    /// The top-up.
    #[serde(flatten)]
    pub top_up: CashTopUp,
    /// The name of the user who received the cash.
    pub recipient_name: String,
    /// The name of whoever added the cash.
    pub added_by_name: String,
}

/// Create the cash top-up table.
///
/// # Errors
///
/// This function will return an error if the SQL query failed.
pub fn create_top_up_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS cash_top_up (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL,
            amount REAL NOT NULL CHECK (amount > 0),
            source TEXT NOT NULL,
            reference TEXT NOT NULL DEFAULT '',
            remarks TEXT NOT NULL DEFAULT '',
            date TEXT NOT NULL,
            created_at TEXT NOT NULL,
            FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
        )",
        (),
    )?;

    Ok(())
}

const TOP_UP_COLUMNS: &str = "cash_top_up.id, cash_top_up.user_id, cash_top_up.amount, \
    cash_top_up.source, cash_top_up.reference, cash_top_up.remarks, cash_top_up.date, \
    cash_top_up.created_at";

fn map_top_up_row(row: &Row) -> Result<CashTopUp, rusqlite::Error> {
    Ok(CashTopUp {
        id: row.get(0)?,
        user_id: row.get(1)?,
        amount: row.get(2)?,
        source: row.get(3)?,
        reference: row.get(4)?,
        remarks: row.get(5)?,
        date: row.get(6)?,
        created_at: row.get(7)?,
    })
}

/// Record a cash top-up and add the cash to the user's balance.
///
/// Both changes are made in one transaction.
///
/// # Errors
///
/// Returns a:
/// - [Error::InvalidAmount] if the amount is not positive.
/// - [Error::MissingField] if the source is empty.
/// - [Error::InvalidForeignKey] if the user does not exist.
/// - [Error::SqlError] if an SQL related error occurred.
pub fn record_top_up(new_top_up: NewTopUp, connection: &Connection) -> Result<CashTopUp, Error> {
    let amount = validate_amount(new_top_up.amount)?;
    let source = new_top_up.source.trim().to_owned();
    if source.is_empty() {
        return Err(Error::MissingField("source"));
    }

    let reference = new_top_up.reference.trim().to_owned();
    let remarks = new_top_up.remarks.trim().to_owned();
    let created_at = now_utc();

    let transaction = connection.unchecked_transaction()?;

    transaction.execute(
        "INSERT INTO cash_top_up (user_id, amount, source, reference, remarks, date, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            new_top_up.user_id,
            amount,
            source,
            reference,
            remarks,
            new_top_up.date,
            created_at
        ],
    )?;
    let id = transaction.last_insert_rowid();

    apply_top_up(new_top_up.user_id, amount, &transaction)?;

    transaction.commit()?;

    Ok(CashTopUp {
        id,
        user_id: new_top_up.user_id,
        amount,
        source,
        reference,
        remarks,
        date: new_top_up.date,
        created_at,
    })
}

/// Get every top-up, newest first.
pub fn get_top_ups(connection: &Connection) -> Result<Vec<CashTopUp>, Error> {
    connection
        .prepare(&format!(
            "SELECT {TOP_UP_COLUMNS} FROM cash_top_up
            ORDER BY cash_top_up.created_at DESC, cash_top_up.id DESC"
        ))?
        .query_map([], map_top_up_row)?
        .map(|maybe_top_up| maybe_top_up.map_err(Error::from))
        .collect()
}

/// Get the most recent top-ups along with the recipients' names, newest first.
///
/// If `recipient` is given only the top-ups made to that user are returned.
/// At most `limit` entries are returned.
pub fn get_top_up_history(
    recipient: Option<UserID>,
    limit: u32,
    connection: &Connection,
) -> Result<Vec<TopUpHistoryEntry>, Error> {
    connection
        .prepare(&format!(
            "SELECT {TOP_UP_COLUMNS}, user.first_name, user.last_name, user.email
            FROM cash_top_up
            INNER JOIN user ON user.id = cash_top_up.user_id
            WHERE ?1 IS NULL OR cash_top_up.user_id = ?1
            ORDER BY cash_top_up.created_at DESC, cash_top_up.id DESC
            LIMIT ?2"
        ))?
        .query_map(params![recipient, limit], |row| {
            let top_up = map_top_up_row(row)?;
            let first_name: String = row.get(8)?;
            let last_name: String = row.get(9)?;
            let email: String = row.get(10)?;
            let added_by_name = if top_up.source.is_empty() {
                "Admin".to_owned()
            } else {
                top_up.source.clone()
            };

            Ok(TopUpHistoryEntry {
                top_up,
                recipient_name: display_name(&first_name, &last_name, &email),
                added_by_name,
            })
        })?
        .map(|maybe_entry| maybe_entry.map_err(Error::from))
        .collect()
}

#[cfg(test)]
mod top_up_tests {
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        Error,
        balance::get_balance,
        db::initialize,
        test_utils::new_user,
        top_up::{NewTopUp, get_top_up_history, get_top_ups, record_top_up},
        user::{Role, User, UserID, create_user},
    };

    fn get_db_connection() -> Connection {
        let conn =
            Connection::open_in_memory().expect("Could not create in-memory SQLite database");
        initialize(&conn).expect("Could not initialize database");

        conn
    }

    fn add_user(email: &str, conn: &Connection) -> User {
        create_user(new_user(email, Role::Staff), conn).expect("Could not create user")
    }

    fn new_top_up(user_id: UserID, amount: f64) -> NewTopUp {
        NewTopUp {
            user_id,
            amount,
            source: "Petty cash tin".to_owned(),
            reference: "REF-1".to_owned(),
            remarks: String::new(),
            date: date!(2025 - 03 - 01),
        }
    }

    #[test]
    fn record_top_up_updates_balance() {
        let conn = get_db_connection();
        let user = add_user("staff@example.com", &conn);

        let top_up = record_top_up(new_top_up(user.id, 120.0), &conn).unwrap();

        assert_eq!(top_up.amount, 120.0);
        assert_eq!(top_up.date, date!(2025 - 03 - 01));
        let balance = get_balance(user.id, &conn).unwrap();
        assert_eq!(balance.total_allocated, 120.0);
        assert_eq!(balance.current_balance, 120.0);
    }

    #[test]
    fn record_top_up_rejects_non_positive_amount() {
        let conn = get_db_connection();
        let user = add_user("staff@example.com", &conn);

        let result = record_top_up(new_top_up(user.id, 0.0), &conn);

        assert!(matches!(result, Err(Error::InvalidAmount(_))));
        assert_eq!(get_top_ups(&conn).unwrap(), vec![]);
    }

    #[test]
    fn record_top_up_requires_source() {
        let conn = get_db_connection();
        let user = add_user("staff@example.com", &conn);
        let mut top_up = new_top_up(user.id, 10.0);
        top_up.source = "   ".to_owned();

        assert_eq!(
            record_top_up(top_up, &conn),
            Err(Error::MissingField("source"))
        );
    }

    #[test]
    fn record_top_up_for_unknown_user_changes_nothing() {
        let conn = get_db_connection();

        let result = record_top_up(new_top_up(UserID::new(999), 10.0), &conn);

        assert_eq!(result, Err(Error::InvalidForeignKey));
        assert_eq!(get_top_ups(&conn).unwrap(), vec![]);
    }

    #[test]
    fn top_ups_are_newest_first() {
        let conn = get_db_connection();
        let user = add_user("staff@example.com", &conn);
        let first = record_top_up(new_top_up(user.id, 10.0), &conn).unwrap();
        let second = record_top_up(new_top_up(user.id, 20.0), &conn).unwrap();

        let top_ups = get_top_ups(&conn).unwrap();

        assert_eq!(top_ups, vec![second, first]);
    }

    #[test]
    fn history_includes_names_and_filters_by_recipient() {
        let conn = get_db_connection();
        let alice = add_user("alice@example.com", &conn);
        let bob = add_user("bob@example.com", &conn);
        record_top_up(new_top_up(alice.id, 10.0), &conn).unwrap();
        record_top_up(new_top_up(bob.id, 20.0), &conn).unwrap();

        let all = get_top_up_history(None, 50, &conn).unwrap();
        let bobs = get_top_up_history(Some(bob.id), 50, &conn).unwrap();

        assert_eq!(all.len(), 2);
        assert_eq!(bobs.len(), 1);
        assert_eq!(bobs[0].recipient_name, bob.display_name());
        assert_eq!(bobs[0].added_by_name, "Petty cash tin");
    }

    #[test]
    fn history_respects_limit() {
        let conn = get_db_connection();
        let user = add_user("staff@example.com", &conn);
        for _ in 0..3 {
            record_top_up(new_top_up(user.id, 10.0), &conn).unwrap();
        }

        assert_eq!(get_top_up_history(None, 2, &conn).unwrap().len(), 2);
    }
}
