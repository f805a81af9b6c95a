//! Expense reports for managers and admins, as JSON or as a CSV download.

mod csv_export;
mod handlers;

pub use csv_export::write_expense_csv;
pub use handlers::{expense_report_csv_endpoint, expense_report_endpoint};
