//! Defines the endpoint for looking up a user's cash balance.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Path, State},
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    balance::{UserBalance, get_balance},
    user::UserID,
};

/// The state needed to look up cash balances.
#[derive(Debug, Clone)]
pub struct BalanceState {
    /// The database connection for reading balances.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for BalanceState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for getting the cash balance of a user.
pub async fn get_user_balance_endpoint(
    State(state): State<BalanceState>,
    Path(user_id): Path<i64>,
) -> Result<Json<UserBalance>, Error> {
    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    get_balance(UserID::new(user_id), &connection).map(Json)
}
