//! Defines the endpoint for managers and admins to approve or reject expenses.

use axum::{
    Extension, Json,
    extract::{Path, State},
};
use serde::Deserialize;

use crate::{
    Error,
    database_id::ExpenseId,
    expense::{Expense, ExpenseState, ExpenseStatus, decide_expense},
    user::User,
};

/// The JSON body for deciding on an expense.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatusRequest {
    /// Either "approved" or "rejected".
    pub status: String,
    /// Why the expense was rejected.
    #[serde(default)]
    pub rejection_reason: Option<String>,
}

/// A route handler for approving or rejecting a pending expense, responds with the updated expense.
pub async fn update_expense_status_endpoint(
    State(state): State<ExpenseState>,
    Extension(approver): Extension<User>,
    Path(expense_id): Path<ExpenseId>,
    Json(request): Json<UpdateStatusRequest>,
) -> Result<Json<Expense>, Error> {
    let decision: ExpenseStatus = request.status.parse()?;

    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    let expense = decide_expense(
        expense_id,
        decision,
        approver.id,
        request.rejection_reason,
        &connection,
    )?;
    tracing::info!(
        "User {} {} expense {}",
        approver.id,
        expense.status,
        expense.id
    );

    Ok(Json(expense))
}
