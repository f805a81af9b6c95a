//! Defines the admin endpoint for listing users.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    user::{UserWithStats, get_users_with_stats},
};

/// The state needed to list and manage users.
#[derive(Debug, Clone)]
pub struct UsersState {
    /// The database connection for managing users.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for UsersState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler that responds with every user and a summary of their expenses.
pub async fn list_users_endpoint(
    State(state): State<UsersState>,
) -> Result<Json<Vec<UserWithStats>>, Error> {
    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    get_users_with_stats(&connection).map(Json)
}
