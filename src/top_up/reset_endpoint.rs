//! Defines the admin endpoint for zeroing the cash balances of staff and managers.

use axum::{Json, extract::State};
use serde_json::{Value, json};

use crate::{Error, balance::reset_worker_balances, top_up::TopUpState};

/// A route handler for resetting the cash balances of every staff member and manager.
///
/// Admin balances are left untouched.
pub async fn reset_top_ups_endpoint(State(state): State<TopUpState>) -> Result<Json<Value>, Error> {
    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    let reset_count = reset_worker_balances(&connection)?;
    tracing::info!("Reset the cash balances of {reset_count} users");

    Ok(Json(json!({
        "message": "All worker cash balances have been reset",
        "resetCount": reset_count,
    })))
}
