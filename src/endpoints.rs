//! The API endpoints URIs.
//!
//! Tests fill in the parameter of an endpoint, e.g., '/api/users/{user_id}/role', with `format_endpoint`.

/// The route for logging in a user.
pub const LOG_IN: &str = "/api/login";
/// The route for the client to log out the current user.
pub const LOG_OUT: &str = "/api/logout";
/// The route for getting the logged in user.
pub const CURRENT_USER: &str = "/api/auth/user";
/// The route for the dashboard summary.
pub const DASHBOARD_STATS: &str = "/api/dashboard/stats";
/// The route to list and create categories.
pub const CATEGORIES: &str = "/api/categories";
/// The route to list and submit expenses.
pub const EXPENSES: &str = "/api/expenses";
/// The route to access a single expense.
pub const EXPENSE: &str = "/api/expenses/{expense_id}";
/// The route to approve or reject an expense.
pub const EXPENSE_STATUS: &str = "/api/expenses/{expense_id}/status";
/// The route to list and create cash top-ups.
pub const CASH_TOP_UPS: &str = "/api/cash-topups";
/// The route for the recent cash top-ups along with the recipients' names.
pub const CASH_TOP_UP_HISTORY: &str = "/api/cash-topups-history";
/// The route to zero the cash balances of staff and managers.
pub const RESET_CASH_TOP_UPS: &str = "/api/reset-cash-topups";
/// The route to list and create users.
pub const USERS: &str = "/api/users";
/// The route to change a user's role.
pub const USER_ROLE: &str = "/api/users/{user_id}/role";
/// The route to activate or deactivate a user.
pub const USER_STATUS: &str = "/api/users/{user_id}/toggle-status";
/// The route for the expense report.
pub const EXPENSE_REPORT: &str = "/api/reports/expenses";
/// The route for downloading the expense report as a CSV file.
pub const EXPENSE_REPORT_CSV: &str = "/api/reports/expenses/csv";
/// The route for a user's cash balance.
pub const USER_BALANCE: &str = "/api/user-balance/{user_id}";
/// The route for giving cash to a user.
pub const ADD_CASH: &str = "/api/add-cash";
/// The route for the cash received by users.
pub const TRANSACTIONS: &str = "/api/transactions";
/// The prefix of every API route.
pub const API_PREFIX: &str = "/api";
/// The route for uploaded receipts.
pub const UPLOADS: &str = "/uploads";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace.
/// For example, in the endpoint path '/users/{user_id}', '{user_id}' is the parameter.
///
/// This function assumes that an endpoint path only contains ASCII characters
/// and a single parameter.
///
/// If no parameter is found in `endpoint_path`, the function returns
/// the original `endpoint_path`.
#[cfg(test)]
pub fn format_endpoint(endpoint_path: &str, id: i64) -> String {
    let mut param_start = None;
    let mut param_end = None;

    for (i, c) in endpoint_path.chars().enumerate() {
        if c == '{' {
            param_start = Some(i);
        } else if param_start.is_some() && c == '}' {
            param_end = Some(i + 1);
            break;
        }
    }

    let param_start = match param_start {
        Some(start) => start,
        None => return endpoint_path.to_string(),
    };

    let param_end = param_end.unwrap_or(endpoint_path.len());

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        id,
        &endpoint_path[param_end..]
    )
}
