//! Writes expense reports as CSV.

use time::UtcOffset;

use crate::{Error, expense::ExpenseWithDetails};

/// The column names of the CSV report.
pub const CSV_HEADER: [&str; 8] = [
    "Date",
    "Employee",
    "Category",
    "Description",
    "Amount",
    "Status",
    "Approved By",
    "Approved Date",
];

/// Write `expenses` as CSV with a header row.
///
/// Amounts exclude GST. Approval dates are given in the timezone with `local_offset`.
///
/// # Errors
///
/// Returns [Error::CsvError] if a record could not be written.
pub fn write_expense_csv(
    expenses: &[ExpenseWithDetails],
    local_offset: UtcOffset,
) -> Result<String, Error> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    writer
        .write_record(CSV_HEADER)
        .map_err(|error| Error::CsvError(error.to_string()))?;

    for details in expenses {
        let expense = &details.expense;
        let approver = details
            .approver
            .as_ref()
            .map(|approver| approver.display_name())
            .unwrap_or_default();
        let approved_date = expense
            .approved_at
            .map(|approved_at| approved_at.to_offset(local_offset).date().to_string())
            .unwrap_or_default();

        writer
            .write_record([
                expense.expense_date.to_string(),
                details.user.display_name(),
                details.category.name.to_string(),
                expense.description.clone(),
                format!("{:.2}", expense.amount),
                expense.status.to_string(),
                approver,
                approved_date,
            ])
            .map_err(|error| Error::CsvError(error.to_string()))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|error| Error::CsvError(error.to_string()))?;

    String::from_utf8(bytes).map_err(|error| Error::CsvError(error.to_string()))
}

#[cfg(test)]
mod csv_export_tests {
    use time::{UtcOffset, macros::{date, datetime}};

    use crate::{
        category::{Category, CategoryName},
        expense::{Expense, ExpenseStatus, ExpenseWithDetails},
        report::write_expense_csv,
        user::{Role, User, UserID},
    };

    fn user(id: i64, first_name: &str, last_name: &str) -> User {
        User {
            id: UserID::new(id),
            email: format!("{}@example.com", first_name.to_lowercase()),
            first_name: first_name.to_owned(),
            last_name: last_name.to_owned(),
            role: Role::Staff,
            department: String::new(),
            is_active: true,
            created_at: datetime!(2025-01-01 00:00 UTC),
        }
    }

    fn expense_details(approved: bool) -> ExpenseWithDetails {
        ExpenseWithDetails {
            expense: Expense {
                id: 1,
                user_id: UserID::new(1),
                category_id: 1,
                amount: 12.5,
                description: "Coffee, milk and sugar".to_owned(),
                remarks: String::new(),
                receipt_url: None,
                expense_date: date!(2025 - 04 - 30),
                status: if approved {
                    ExpenseStatus::Approved
                } else {
                    ExpenseStatus::Pending
                },
                approved_by: approved.then(|| UserID::new(2)),
                approved_at: approved.then(|| datetime!(2025-04-30 20:00 UTC)),
                rejection_reason: None,
                has_gst: true,
                gst_amount: 1.13,
                created_at: datetime!(2025-04-30 09:00 UTC),
            },
            user: user(1, "Alice", "Ng"),
            category: Category {
                id: 1,
                name: CategoryName::new_unchecked("Pantry"),
                description: String::new(),
                is_active: true,
            },
            approver: approved.then(|| user(2, "Maria", "Lopez")),
        }
    }

    #[test]
    fn empty_report_only_has_header() {
        let csv = write_expense_csv(&[], UtcOffset::UTC).unwrap();

        assert_eq!(
            csv.trim_end(),
            "Date,Employee,Category,Description,Amount,Status,Approved By,Approved Date"
        );
    }

    #[test]
    fn writes_rows_and_quotes_commas() {
        let csv =
            write_expense_csv(&[expense_details(false), expense_details(true)], UtcOffset::UTC)
                .unwrap();

        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[1],
            "2025-04-30,Alice Ng,Pantry,\"Coffee, milk and sugar\",12.50,pending,,"
        );
        assert_eq!(
            lines[2],
            "2025-04-30,Alice Ng,Pantry,\"Coffee, milk and sugar\",12.50,approved,Maria Lopez,2025-04-30"
        );
    }

    #[test]
    fn approval_date_uses_local_offset() {
        let offset = UtcOffset::from_hms(12, 0, 0).unwrap();

        let csv = write_expense_csv(&[expense_details(true)], offset).unwrap();

        assert!(csv.lines().nth(1).unwrap().ends_with(",2025-05-01"));
    }
}
