//! Aggregation queries behind the dashboard summary.
//!
//! Every total of expenses includes GST. Rejected expenses are refunded to the submitter so
//! they never count as spent.

use rusqlite::{Connection, params};
use serde::Serialize;
use time::Date;

use crate::{
    Error,
    database_id::CategoryId,
    money::round2,
    user::{USER_COLUMNS, User, UserID, map_user_row},
};

/// An optional, inclusive range of expense dates.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DateRange {
    /// The earliest date, inclusive.
    pub start: Option<Date>,
    /// The latest date, inclusive.
    pub end: Option<Date>,
}

/// The spending in one category.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryBreakdown {
    /// The ID of the category.
    pub category_id: CategoryId,
    /// The name of the category.
    pub category_name: String,
    /// The total of the expenses in the category.
    pub total_spent: f64,
    /// The number of expenses in the category.
    pub expense_count: i64,
}

/// The cash position of a staff member.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserBreakdown {
    /// The staff member.
    #[serde(flatten)]
    pub user: User,
    /// The total cash given to the user.
    pub total_allocated: f64,
    /// The total of the user's pending and approved expenses.
    pub total_spent: f64,
    /// The cash the user has left.
    pub current_balance: f64,
    /// The total of the user's expenses waiting for a decision.
    pub pending_expenses: f64,
}

/// The figures shown on the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    /// The total cash received.
    pub total_cash_in: f64,
    /// The total of pending and approved expenses.
    pub total_spent: f64,
    /// The cash received minus the cash spent.
    pub total_balance: f64,
    /// The total of the expenses waiting for a decision.
    pub pending_expenses: f64,
    /// The total of pending and approved expenses dated in the current month.
    pub this_month_expenses: f64,
    /// The number of expenses, including rejected ones.
    pub total_expenses_count: i64,
    /// The number of expenses waiting for a decision, always zero for staff.
    pub pending_approvals_count: i64,
    /// The spending per category, largest first.
    pub category_breakdown: Vec<CategoryBreakdown>,
    /// The cash position of each staff member, only given to managers and admins.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_breakdown: Option<Vec<UserBreakdown>>,
}

/// Calculate the dashboard figures.
///
/// # Arguments
/// * `scope` - Only count the expenses and top-ups of this user, or everyone's if `None`.
/// * `range` - Only count expenses dated within this range. Top-ups are always counted.
/// * `today` - The current date in the server's timezone, used for the current month.
/// * `connection` - Database connection reference
///
/// # Errors
/// Returns [Error::SqlError] if a query fails.
pub fn get_dashboard_stats(
    scope: Option<UserID>,
    range: DateRange,
    today: Date,
    connection: &Connection,
) -> Result<DashboardStats, Error> {
    let total_cash_in: f64 = connection.query_row(
        "SELECT COALESCE(SUM(amount), 0) FROM cash_top_up WHERE ?1 IS NULL OR user_id = ?1",
        params![scope],
        |row| row.get(0),
    )?;

    let current_month = format!("{:04}-{:02}", today.year(), u8::from(today.month()));

    let (total_spent, pending_expenses, this_month_expenses, total_expenses_count, pending_count): (
        f64,
        f64,
        f64,
        i64,
        i64,
    ) = connection.query_row(
        "SELECT
            COALESCE(SUM(CASE WHEN status != 'rejected' THEN amount + gst_amount END), 0),
            COALESCE(SUM(CASE WHEN status = 'pending' THEN amount + gst_amount END), 0),
            COALESCE(SUM(CASE WHEN status != 'rejected' AND substr(expense_date, 1, 7) = ?4
                THEN amount + gst_amount END), 0),
            COUNT(*),
            COUNT(CASE WHEN status = 'pending' THEN 1 END)
        FROM expense
        WHERE (?1 IS NULL OR user_id = ?1)
            AND (?2 IS NULL OR expense_date >= ?2)
            AND (?3 IS NULL OR expense_date <= ?3)",
        params![scope, range.start, range.end, current_month],
        |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?)),
    )?;

    let category_breakdown = get_category_breakdown(scope, range, connection)?;

    Ok(DashboardStats {
        total_cash_in: round2(total_cash_in),
        total_spent: round2(total_spent),
        total_balance: round2(total_cash_in - total_spent),
        pending_expenses: round2(pending_expenses),
        this_month_expenses: round2(this_month_expenses),
        total_expenses_count,
        pending_approvals_count: if scope.is_some() { 0 } else { pending_count },
        category_breakdown,
        user_breakdown: None,
    })
}

fn get_category_breakdown(
    scope: Option<UserID>,
    range: DateRange,
    connection: &Connection,
) -> Result<Vec<CategoryBreakdown>, Error> {
    connection
        .prepare(
            "SELECT category.id, category.name,
                SUM(expense.amount + expense.gst_amount) AS total,
                COUNT(expense.id)
            FROM expense
            INNER JOIN category ON category.id = expense.category_id
            WHERE expense.status != 'rejected'
                AND (?1 IS NULL OR expense.user_id = ?1)
                AND (?2 IS NULL OR expense.expense_date >= ?2)
                AND (?3 IS NULL OR expense.expense_date <= ?3)
            GROUP BY category.id
            ORDER BY total DESC, category.name",
        )?
        .query_map(params![scope, range.start, range.end], |row| {
            let total: f64 = row.get(2)?;

            Ok(CategoryBreakdown {
                category_id: row.get(0)?,
                category_name: row.get(1)?,
                total_spent: round2(total),
                expense_count: row.get(3)?,
            })
        })?
        .map(|maybe_breakdown| maybe_breakdown.map_err(Error::from))
        .collect()
}

/// Get the cash position of every staff member, oldest account first.
pub fn get_user_breakdown(connection: &Connection) -> Result<Vec<UserBreakdown>, Error> {
    connection
        .prepare(&format!(
            "SELECT {USER_COLUMNS},
                COALESCE(user_balance.total_allocated, 0),
                COALESCE(user_balance.total_spent, 0),
                COALESCE(user_balance.current_balance, 0),
                COALESCE(user_balance.pending_amount, 0)
            FROM user
            LEFT JOIN user_balance ON user_balance.user_id = user.id
            WHERE user.role = 'staff'
            ORDER BY user.created_at, user.id"
        ))?
        .query_map([], |row| {
            Ok(UserBreakdown {
                user: map_user_row(row)?,
                total_allocated: row.get(8)?,
                total_spent: row.get(9)?,
                current_balance: row.get(10)?,
                pending_expenses: row.get(11)?,
            })
        })?
        .map(|maybe_breakdown| maybe_breakdown.map_err(Error::from))
        .collect()
}
