//! Defines the expense model and the database queries for expenses.

use std::{fmt::Display, str::FromStr};

use rusqlite::{
    Connection, Row, params,
    types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use crate::{
    Error,
    balance::{record_expense_decision, record_expense_submission},
    category::Category,
    database_id::{CategoryId, ExpenseId},
    money::{gst_for, round2, validate_amount},
    timezone::now_utc,
    user::{USER_COLUMNS, User, UserID, map_user_row_at},
};

/// Where an expense is in its approval lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ExpenseStatus {
    /// Waiting for a manager or admin to decide.
    Pending,
    /// Accepted by a manager or admin.
    Approved,
    /// Refused by a manager or admin, the total is refunded to the user's cash.
    Rejected,
}

impl ExpenseStatus {
    /// The status as it is stored in the database and sent to clients.
    pub fn as_str(&self) -> &'static str {
        match self {
            ExpenseStatus::Pending => "pending",
            ExpenseStatus::Approved => "approved",
            ExpenseStatus::Rejected => "rejected",
        }
    }
}

impl Display for ExpenseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExpenseStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Ok(ExpenseStatus::Pending),
            "approved" => Ok(ExpenseStatus::Approved),
            "rejected" => Ok(ExpenseStatus::Rejected),
            _ => Err(Error::InvalidStatus(s.to_owned())),
        }
    }
}

impl ToSql for ExpenseStatus {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(self.as_str().into())
    }
}

impl FromSql for ExpenseStatus {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value.as_str()?.parse().map_err(|_| FromSqlError::InvalidType)
    }
}

/// A claim against a user's petty cash.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    /// The ID of the expense.
    pub id: ExpenseId,
    /// The user who submitted the expense.
    pub user_id: UserID,
    /// The category the expense was filed under.
    pub category_id: CategoryId,
    /// The amount spent, excluding GST.
    pub amount: f64,
    /// What the money was spent on.
    pub description: String,
    /// Free-form notes, may be empty.
    pub remarks: String,
    /// Where the uploaded receipt can be downloaded from.
    pub receipt_url: Option<String>,
    /// The day the money was spent.
    pub expense_date: Date,
    /// Where the expense is in its approval lifecycle.
    pub status: ExpenseStatus,
    /// The manager or admin who decided on the expense.
    pub approved_by: Option<UserID>,
    /// When the expense was decided on.
    #[serde(with = "time::serde::rfc3339::option")]
    pub approved_at: Option<OffsetDateTime>,
    /// Why the expense was rejected.
    pub rejection_reason: Option<String>,
    /// Whether GST was added to the amount.
    pub has_gst: bool,
    /// The GST on the amount, zero if `has_gst` is false.
    pub gst_amount: f64,
    /// When the expense was submitted.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl Expense {
    /// The amount including GST, which is what gets deducted from the user's cash.
    pub fn total(&self) -> f64 {
        round2(self.amount + self.gst_amount)
    }
}

/// An expense along with the people and category it refers to.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseWithDetails {
    /// The expense.
    #[serde(flatten)]
    pub expense: Expense,
    /// The user who submitted the expense.
    pub user: User,
    /// The category the expense was filed under.
    pub category: Category,
    /// The manager or admin who decided on the expense, if any.
    pub approver: Option<User>,
}

/// The data needed to submit an [Expense].
#[derive(Debug, Clone, PartialEq)]
pub struct NewExpense {
    /// The user submitting the expense.
    pub user_id: UserID,
    /// The category to file the expense under.
    pub category_id: CategoryId,
    /// The amount spent excluding GST, must be positive.
    pub amount: f64,
    /// What the money was spent on, must not be empty.
    pub description: String,
    /// Free-form notes.
    pub remarks: String,
    /// Where the uploaded receipt can be downloaded from.
    pub receipt_url: Option<String>,
    /// The day the money was spent.
    pub expense_date: Date,
    /// Whether GST should be added to the amount.
    pub has_gst: bool,
}

/// Narrows down the expenses returned by [get_expenses].
///
/// Every field is optional, `None` matches everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExpenseFilter {
    /// Only include expenses submitted by this user.
    pub user_id: Option<UserID>,
    /// Only include expenses in this category.
    pub category_id: Option<CategoryId>,
    /// Only include expenses with this status.
    pub status: Option<ExpenseStatus>,
    /// Only include expenses on or after this date.
    pub start_date: Option<Date>,
    /// Only include expenses on or before this date.
    pub end_date: Option<Date>,
    /// Only include expenses whose description or remarks contain this text, ignoring case.
    pub search: Option<String>,
}

/// Create the expense table.
///
/// # Errors
///
/// This function will return an error if the SQL query failed.
pub fn create_expense_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS expense (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL,
            category_id INTEGER NOT NULL,
            amount REAL NOT NULL CHECK (amount > 0),
            description TEXT NOT NULL,
            remarks TEXT NOT NULL DEFAULT '',
            receipt_url TEXT,
            expense_date TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'pending'
                CHECK (status IN ('pending', 'approved', 'rejected')),
            approved_by INTEGER,
            approved_at TEXT,
            rejection_reason TEXT,
            has_gst INTEGER NOT NULL DEFAULT 0,
            gst_amount REAL NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL,
            FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE,
            FOREIGN KEY(category_id) REFERENCES category(id) ON UPDATE CASCADE,
            FOREIGN KEY(approved_by) REFERENCES user(id) ON UPDATE CASCADE ON DELETE SET NULL
        )",
        (),
    )?;

    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_expense_user_date ON expense(user_id, expense_date)",
        (),
    )?;

    Ok(())
}

/// The columns of the expense table in the order expected by [map_expense_row].
const EXPENSE_COLUMNS: &str = "expense.id, expense.user_id, expense.category_id, \
    expense.amount, expense.description, expense.remarks, expense.receipt_url, \
    expense.expense_date, expense.status, expense.approved_by, expense.approved_at, \
    expense.rejection_reason, expense.has_gst, expense.gst_amount, expense.created_at";

const EXPENSE_COLUMN_COUNT: usize = 15;
const USER_COLUMN_COUNT: usize = 8;
const CATEGORY_OFFSET: usize = EXPENSE_COLUMN_COUNT + USER_COLUMN_COUNT;
const APPROVER_OFFSET: usize = CATEGORY_OFFSET + 4;

/// Map a row that selected [EXPENSE_COLUMNS] to an [Expense].
fn map_expense_row(row: &Row) -> Result<Expense, rusqlite::Error> {
    Ok(Expense {
        id: row.get(0)?,
        user_id: row.get(1)?,
        category_id: row.get(2)?,
        amount: row.get(3)?,
        description: row.get(4)?,
        remarks: row.get(5)?,
        receipt_url: row.get(6)?,
        expense_date: row.get(7)?,
        status: row.get(8)?,
        approved_by: row.get(9)?,
        approved_at: row.get(10)?,
        rejection_reason: row.get(11)?,
        has_gst: row.get(12)?,
        gst_amount: row.get(13)?,
        created_at: row.get(14)?,
    })
}

fn map_expense_with_details_row(row: &Row) -> Result<ExpenseWithDetails, rusqlite::Error> {
    let expense = map_expense_row(row)?;
    let user = map_user_row_at(row, EXPENSE_COLUMN_COUNT)?;
    let category = Category {
        id: row.get(CATEGORY_OFFSET)?,
        name: row.get(CATEGORY_OFFSET + 1)?,
        description: row.get(CATEGORY_OFFSET + 2)?,
        is_active: row.get(CATEGORY_OFFSET + 3)?,
    };
    let approver = match row.get::<_, Option<UserID>>(APPROVER_OFFSET)? {
        Some(_) => Some(map_user_row_at(row, APPROVER_OFFSET)?),
        None => None,
    };

    Ok(ExpenseWithDetails {
        expense,
        user,
        category,
        approver,
    })
}

fn details_query(where_clause: &str) -> String {
    let approver_columns = USER_COLUMNS.replace("user.", "approver.");

    format!(
        "SELECT {EXPENSE_COLUMNS}, {USER_COLUMNS},
            category.id, category.name, category.description, category.is_active,
            {approver_columns}
        FROM expense
        INNER JOIN user ON user.id = expense.user_id
        INNER JOIN category ON category.id = expense.category_id
        LEFT JOIN user AS approver ON approver.id = expense.approved_by
        {where_clause}"
    )
}

/// Submit a new expense and deduct its total from the user's cash.
///
/// GST is calculated from the amount when `has_gst` is set. Both changes are made in one
/// transaction.
///
/// # Errors
///
/// Returns a:
/// - [Error::InvalidAmount] if the amount is not positive.
/// - [Error::MissingField] if the description is empty.
/// - [Error::InvalidCategory] if the category does not exist.
/// - [Error::InvalidForeignKey] if the user does not exist.
/// - [Error::SqlError] if an SQL related error occurred.
pub fn create_expense(new_expense: NewExpense, connection: &Connection) -> Result<Expense, Error> {
    let amount = validate_amount(new_expense.amount)?;
    let description = new_expense.description.trim().to_owned();
    if description.is_empty() {
        return Err(Error::MissingField("description"));
    }

    let category_exists: bool = connection.query_row(
        "SELECT EXISTS(SELECT 1 FROM category WHERE id = ?1)",
        params![new_expense.category_id],
        |row| row.get(0),
    )?;
    if !category_exists {
        return Err(Error::InvalidCategory(new_expense.category_id));
    }

    let gst_amount = if new_expense.has_gst {
        gst_for(amount)
    } else {
        0.0
    };
    let remarks = new_expense.remarks.trim().to_owned();
    let created_at = now_utc();

    let transaction = connection.unchecked_transaction()?;

    transaction.execute(
        "INSERT INTO expense (user_id, category_id, amount, description, remarks, receipt_url,
            expense_date, status, has_gst, gst_amount, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
            new_expense.user_id,
            new_expense.category_id,
            amount,
            description,
            remarks,
            new_expense.receipt_url,
            new_expense.expense_date,
            ExpenseStatus::Pending,
            new_expense.has_gst,
            gst_amount,
            created_at,
        ],
    )?;

    let expense = Expense {
        id: transaction.last_insert_rowid(),
        user_id: new_expense.user_id,
        category_id: new_expense.category_id,
        amount,
        description,
        remarks,
        receipt_url: new_expense.receipt_url,
        expense_date: new_expense.expense_date,
        status: ExpenseStatus::Pending,
        approved_by: None,
        approved_at: None,
        rejection_reason: None,
        has_gst: new_expense.has_gst,
        gst_amount,
        created_at,
    };

    record_expense_submission(expense.user_id, expense.total(), &transaction)?;

    transaction.commit()?;

    Ok(expense)
}

/// Get the expense with the ID `expense_id`.
///
/// # Errors
///
/// Returns [Error::NotFound] if there is no such expense.
pub fn get_expense(expense_id: ExpenseId, connection: &Connection) -> Result<Expense, Error> {
    connection
        .query_row(
            &format!("SELECT {EXPENSE_COLUMNS} FROM expense WHERE expense.id = ?1"),
            params![expense_id],
            map_expense_row,
        )
        .map_err(Error::from)
}

/// Get the expense with the ID `expense_id` along with its user, category and approver.
///
/// # Errors
///
/// Returns [Error::NotFound] if there is no such expense.
pub fn get_expense_with_details(
    expense_id: ExpenseId,
    connection: &Connection,
) -> Result<ExpenseWithDetails, Error> {
    connection
        .query_row(
            &details_query("WHERE expense.id = ?1"),
            params![expense_id],
            map_expense_with_details_row,
        )
        .map_err(Error::from)
}

/// Get the expenses matching `filter` along with their users, categories and approvers.
///
/// The most recently submitted expenses come first.
pub fn get_expenses(
    filter: &ExpenseFilter,
    connection: &Connection,
) -> Result<Vec<ExpenseWithDetails>, Error> {
    let search = filter
        .search
        .as_deref()
        .map(str::trim)
        .filter(|search| !search.is_empty());

    connection
        .prepare(&details_query(
            "WHERE (?1 IS NULL OR expense.user_id = ?1)
                AND (?2 IS NULL OR expense.category_id = ?2)
                AND (?3 IS NULL OR expense.status = ?3)
                AND (?4 IS NULL OR expense.expense_date >= ?4)
                AND (?5 IS NULL OR expense.expense_date <= ?5)
                AND (?6 IS NULL
                    OR instr(lower(expense.description), lower(?6)) > 0
                    OR instr(lower(expense.remarks), lower(?6)) > 0)
            ORDER BY expense.created_at DESC, expense.id DESC",
        ))?
        .query_map(
            params![
                filter.user_id,
                filter.category_id,
                filter.status,
                filter.start_date,
                filter.end_date,
                search,
            ],
            map_expense_with_details_row,
        )?
        .map(|maybe_expense| maybe_expense.map_err(Error::from))
        .collect()
}

/// Approve or reject a pending expense and settle it against the user's cash.
///
/// `rejection_reason` is only stored for rejections. Both changes are made in one transaction.
///
/// # Errors
///
/// Returns a:
/// - [Error::InvalidStatus] if `decision` is [ExpenseStatus::Pending].
/// - [Error::NotFound] if the expense does not exist.
/// - [Error::ExpenseAlreadyDecided] if the expense is not pending.
/// - [Error::SqlError] if an SQL related error occurred.
pub fn decide_expense(
    expense_id: ExpenseId,
    decision: ExpenseStatus,
    approver_id: UserID,
    rejection_reason: Option<String>,
    connection: &Connection,
) -> Result<Expense, Error> {
    if decision == ExpenseStatus::Pending {
        return Err(Error::InvalidStatus(decision.to_string()));
    }

    let rejection_reason = match decision {
        ExpenseStatus::Rejected => rejection_reason
            .map(|reason| reason.trim().to_owned())
            .filter(|reason| !reason.is_empty()),
        ExpenseStatus::Pending | ExpenseStatus::Approved => None,
    };

    let transaction = connection.unchecked_transaction()?;

    let expense = get_expense(expense_id, &transaction)?;

    if expense.status != ExpenseStatus::Pending {
        return Err(Error::ExpenseAlreadyDecided(expense.status));
    }

    let approved_at = now_utc();
    transaction.execute(
        "UPDATE expense
        SET status = ?1, approved_by = ?2, approved_at = ?3, rejection_reason = ?4
        WHERE id = ?5",
        params![
            decision,
            approver_id,
            approved_at,
            rejection_reason,
            expense_id
        ],
    )?;

    record_expense_decision(expense.user_id, expense.total(), decision, &transaction)?;

    transaction.commit()?;

    Ok(Expense {
        status: decision,
        approved_by: Some(approver_id),
        approved_at: Some(approved_at),
        rejection_reason,
        ..expense
    })
}


#[cfg(test)]
mod expense_query_tests {
    use rusqlite::Connection;
    use time::macros::date;

    use super::get_expense;
    use crate::{
        Error,
        balance::get_balance,
        category::{Category, CategoryName, NewCategory, create_category},
        db::initialize,
        expense::{
            ExpenseFilter, ExpenseStatus, NewExpense, create_expense, decide_expense,
            get_expense_with_details, get_expenses,
        },
        test_utils::new_user,
        top_up::{NewTopUp, record_top_up},
        user::{Role, User, create_user},
    };

    struct Fixture {
        conn: Connection,
        staff: User,
        manager: User,
        category: Category,
    }

    fn fixture() -> Fixture {
        let conn =
            Connection::open_in_memory().expect("Could not create in-memory SQLite database");
        initialize(&conn).expect("Could not initialize database");
        let staff = create_user(new_user("staff@example.com", Role::Staff), &conn).unwrap();
        let manager = create_user(new_user("manager@example.com", Role::Manager), &conn).unwrap();
        let category = create_category(
            NewCategory {
                name: CategoryName::new_unchecked("Travel"),
                description: String::new(),
            },
            &conn,
        )
        .unwrap();
        record_top_up(
            NewTopUp {
                user_id: staff.id,
                amount: 200.0,
                source: "Finance".to_owned(),
                reference: String::new(),
                remarks: String::new(),
                date: date!(2025 - 01 - 01),
            },
            &conn,
        )
        .unwrap();

        Fixture {
            conn,
            staff,
            manager,
            category,
        }
    }

    fn new_expense(fixture: &Fixture, amount: f64, has_gst: bool) -> NewExpense {
        NewExpense {
            user_id: fixture.staff.id,
            category_id: fixture.category.id,
            amount,
            description: "Taxi to client".to_owned(),
            remarks: "Airport run".to_owned(),
            receipt_url: None,
            expense_date: date!(2025 - 01 - 15),
            has_gst,
        }
    }

    #[test]
    fn create_expense_adds_gst_and_deducts_total() {
        let fixture = fixture();

        let expense = create_expense(new_expense(&fixture, 100.0, true), &fixture.conn).unwrap();

        assert_eq!(expense.gst_amount, 9.0);
        assert_eq!(expense.total(), 109.0);
        assert_eq!(expense.status, ExpenseStatus::Pending);
        assert_eq!(get_expense(expense.id, &fixture.conn), Ok(expense));
        let balance = get_balance(fixture.staff.id, &fixture.conn).unwrap();
        assert_eq!(balance.total_spent, 109.0);
        assert_eq!(balance.pending_amount, 109.0);
        assert_eq!(balance.current_balance, 91.0);
    }

    #[test]
    fn create_expense_without_gst() {
        let fixture = fixture();

        let expense = create_expense(new_expense(&fixture, 12.5, false), &fixture.conn).unwrap();

        assert_eq!(expense.gst_amount, 0.0);
        assert_eq!(expense.total(), 12.5);
    }

    #[test]
    fn create_expense_rejects_invalid_input() {
        let fixture = fixture();

        let negative = create_expense(new_expense(&fixture, -1.0, false), &fixture.conn);
        let mut blank = new_expense(&fixture, 1.0, false);
        blank.description = " ".to_owned();
        let blank = create_expense(blank, &fixture.conn);
        let mut unknown_category = new_expense(&fixture, 1.0, false);
        unknown_category.category_id = 999;
        let unknown_category = create_expense(unknown_category, &fixture.conn);

        assert!(matches!(negative, Err(Error::InvalidAmount(_))));
        assert_eq!(blank, Err(Error::MissingField("description")));
        assert_eq!(unknown_category, Err(Error::InvalidCategory(999)));
        let balance = get_balance(fixture.staff.id, &fixture.conn).unwrap();
        assert_eq!(balance.total_spent, 0.0);
    }

    #[test]
    fn get_expense_with_details_includes_related_rows() {
        let fixture = fixture();
        let expense = create_expense(new_expense(&fixture, 10.0, false), &fixture.conn).unwrap();

        let details = get_expense_with_details(expense.id, &fixture.conn).unwrap();

        assert_eq!(details.expense, expense);
        assert_eq!(details.user, fixture.staff);
        assert_eq!(details.category, fixture.category);
        assert_eq!(details.approver, None);
    }

    #[test]
    fn get_missing_expense_is_not_found() {
        let fixture = fixture();

        assert_eq!(get_expense(42, &fixture.conn), Err(Error::NotFound));
        assert_eq!(
            get_expense_with_details(42, &fixture.conn),
            Err(Error::NotFound)
        );
    }

    #[test]
    fn approve_records_approver_and_clears_pending() {
        let fixture = fixture();
        let expense = create_expense(new_expense(&fixture, 100.0, true), &fixture.conn).unwrap();

        let approved = decide_expense(
            expense.id,
            ExpenseStatus::Approved,
            fixture.manager.id,
            Some("ignored".to_owned()),
            &fixture.conn,
        )
        .unwrap();

        assert_eq!(approved.status, ExpenseStatus::Approved);
        assert_eq!(approved.approved_by, Some(fixture.manager.id));
        assert!(approved.approved_at.is_some());
        assert_eq!(approved.rejection_reason, None);
        assert_eq!(get_expense(expense.id, &fixture.conn), Ok(approved));
        let details = get_expense_with_details(expense.id, &fixture.conn).unwrap();
        assert_eq!(details.approver, Some(fixture.manager.clone()));
        let balance = get_balance(fixture.staff.id, &fixture.conn).unwrap();
        assert_eq!(balance.pending_amount, 0.0);
        assert_eq!(balance.current_balance, 91.0);
    }

    #[test]
    fn reject_refunds_total() {
        let fixture = fixture();
        let expense = create_expense(new_expense(&fixture, 100.0, true), &fixture.conn).unwrap();

        let rejected = decide_expense(
            expense.id,
            ExpenseStatus::Rejected,
            fixture.manager.id,
            Some("No receipt".to_owned()),
            &fixture.conn,
        )
        .unwrap();

        assert_eq!(rejected.rejection_reason.as_deref(), Some("No receipt"));
        let balance = get_balance(fixture.staff.id, &fixture.conn).unwrap();
        assert_eq!(balance.total_spent, 0.0);
        assert_eq!(balance.pending_amount, 0.0);
        assert_eq!(balance.current_balance, 200.0);
    }

    #[test]
    fn expense_can_only_be_decided_once() {
        let fixture = fixture();
        let expense = create_expense(new_expense(&fixture, 10.0, false), &fixture.conn).unwrap();
        decide_expense(
            expense.id,
            ExpenseStatus::Approved,
            fixture.manager.id,
            None,
            &fixture.conn,
        )
        .unwrap();

        let result = decide_expense(
            expense.id,
            ExpenseStatus::Rejected,
            fixture.manager.id,
            None,
            &fixture.conn,
        );

        assert_eq!(
            result,
            Err(Error::ExpenseAlreadyDecided(ExpenseStatus::Approved))
        );
        let balance = get_balance(fixture.staff.id, &fixture.conn).unwrap();
        assert_eq!(balance.total_spent, 10.0);
    }

    #[test]
    fn cannot_decide_pending() {
        let fixture = fixture();
        let expense = create_expense(new_expense(&fixture, 10.0, false), &fixture.conn).unwrap();

        let result = decide_expense(
            expense.id,
            ExpenseStatus::Pending,
            fixture.manager.id,
            None,
            &fixture.conn,
        );

        assert_eq!(result, Err(Error::InvalidStatus("pending".to_owned())));
    }

    #[test]
    fn filters_narrow_results() {
        let fixture = fixture();
        let first = create_expense(new_expense(&fixture, 10.0, false), &fixture.conn).unwrap();
        let mut other = new_expense(&fixture, 20.0, false);
        other.description = "Printer paper".to_owned();
        other.remarks = String::new();
        other.expense_date = date!(2025 - 02 - 10);
        let second = create_expense(other, &fixture.conn).unwrap();
        decide_expense(
            second.id,
            ExpenseStatus::Approved,
            fixture.manager.id,
            None,
            &fixture.conn,
        )
        .unwrap();

        let all = get_expenses(&ExpenseFilter::default(), &fixture.conn).unwrap();
        let by_search = get_expenses(
            &ExpenseFilter {
                search: Some("AIRPORT".to_owned()),
                ..Default::default()
            },
            &fixture.conn,
        )
        .unwrap();
        let by_status = get_expenses(
            &ExpenseFilter {
                status: Some(ExpenseStatus::Approved),
                ..Default::default()
            },
            &fixture.conn,
        )
        .unwrap();
        let by_dates = get_expenses(
            &ExpenseFilter {
                start_date: Some(date!(2025 - 01 - 15)),
                end_date: Some(date!(2025 - 01 - 15)),
                ..Default::default()
            },
            &fixture.conn,
        )
        .unwrap();
        let by_other_user = get_expenses(
            &ExpenseFilter {
                user_id: Some(fixture.manager.id),
                ..Default::default()
            },
            &fixture.conn,
        )
        .unwrap();

        assert_eq!(all.len(), 2);
        assert_eq!(all[0].expense.id, second.id, "newest first");
        assert_eq!(by_search.len(), 1);
        assert_eq!(by_search[0].expense.id, first.id);
        assert_eq!(by_status.len(), 1);
        assert_eq!(by_status[0].expense.id, second.id);
        assert_eq!(by_dates.len(), 1);
        assert_eq!(by_dates[0].expense.id, first.id);
        assert!(by_other_user.is_empty());
    }
}
