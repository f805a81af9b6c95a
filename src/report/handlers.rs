//! HTTP handlers for the expense report.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Query, State},
    http::header::{CONTENT_DISPOSITION, CONTENT_TYPE},
    response::IntoResponse,
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    expense::{ExpenseQuery, ExpenseWithDetails, get_expenses},
    report::write_expense_csv,
    timezone::get_local_offset,
};

/// The file name suggested to the browser for the CSV report.
const CSV_FILE_NAME: &str = "expenses-report.csv";

/// The state needed to build expense reports.
#[derive(Debug, Clone)]
pub struct ReportState {
    /// The local timezone as a canonical timezone name, used for approval dates.
    pub local_timezone: String,
    /// The database connection for reading expenses.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ReportState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            local_timezone: state.local_timezone.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

fn get_report_rows(
    state: &ReportState,
    query: &ExpenseQuery,
) -> Result<Vec<ExpenseWithDetails>, Error> {
    let filter = query.to_filter()?;

    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    get_expenses(&filter, &connection)
}

/// A route handler for the expense report filtered by date, category and status.
pub async fn expense_report_endpoint(
    State(state): State<ReportState>,
    Query(query): Query<ExpenseQuery>,
) -> Result<Json<Vec<ExpenseWithDetails>>, Error> {
    get_report_rows(&state, &query).map(Json)
}

/// A route handler for downloading the expense report as a CSV file.
pub async fn expense_report_csv_endpoint(
    State(state): State<ReportState>,
    Query(query): Query<ExpenseQuery>,
) -> Result<impl IntoResponse, Error> {
    let local_offset = get_local_offset(&state.local_timezone)
        .ok_or_else(|| Error::InvalidTimezoneError(state.local_timezone.clone()))?;
    let expenses = get_report_rows(&state, &query)?;
    let csv = write_expense_csv(&expenses, local_offset)?;

    tracing::debug!("Exported {} expenses as CSV", expenses.len());

    Ok((
        [
            (CONTENT_TYPE, "text/csv".to_owned()),
            (
                CONTENT_DISPOSITION,
                format!("attachment; filename=\"{CSV_FILE_NAME}\""),
            ),
        ],
        csv,
    ))
}
