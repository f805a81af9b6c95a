//! Cash balances: how much cash each user has been given and has spent.

mod add_cash_endpoint;
mod core;
mod get_endpoint;

pub use self::core::{
    UserBalance, apply_top_up, create_balance_table, create_empty_balance, get_balance,
    record_expense_decision, record_expense_submission, reset_worker_balances,
};
pub use add_cash_endpoint::add_cash_endpoint;
pub use get_endpoint::get_user_balance_endpoint;
