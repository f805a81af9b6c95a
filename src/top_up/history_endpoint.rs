//! Defines the endpoints for the history of cash handed out.

use axum::{Extension, Json, extract::State};

use crate::{
    Error,
    top_up::{TOP_UP_HISTORY_LIMIT, TopUpHistoryEntry, TopUpState, get_top_up_history},
    user::{Role, User},
};

/// A route handler for the most recent top-ups of every user.
pub async fn top_up_history_endpoint(
    State(state): State<TopUpState>,
) -> Result<Json<Vec<TopUpHistoryEntry>>, Error> {
    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    get_top_up_history(None, TOP_UP_HISTORY_LIMIT, &connection).map(Json)
}

/// A route handler for the cash received by users.
///
/// Staff only see the cash they received.
pub async fn transactions_endpoint(
    State(state): State<TopUpState>,
    Extension(user): Extension<User>,
) -> Result<Json<Vec<TopUpHistoryEntry>>, Error> {
    let recipient = match user.role {
        Role::Staff => Some(user.id),
        Role::Admin | Role::Manager => None,
    };

    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    get_top_up_history(recipient, TOP_UP_HISTORY_LIMIT, &connection).map(Json)
}
