//! Expenses, their receipts and their approval lifecycle.

mod core;
mod create_endpoint;
mod list_endpoint;
mod receipt;
mod status_endpoint;

pub use self::core::{
    Expense, ExpenseFilter, ExpenseStatus, ExpenseWithDetails, NewExpense, create_expense,
    create_expense_table, decide_expense, get_expense_with_details, get_expenses,
};
pub use create_endpoint::create_expense_endpoint;
pub use list_endpoint::{ExpenseQuery, ExpenseState, get_expense_endpoint, list_expenses_endpoint};
pub use receipt::MAX_RECEIPT_BYTES;
pub use status_endpoint::update_expense_status_endpoint;
