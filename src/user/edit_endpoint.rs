//! Defines the admin endpoints for changing a user's role and activation status.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;

use crate::{
    Error,
    user::{
        Role, User, UserID, list_endpoint::UsersState, toggle_user_status, update_user_role,
    },
};

/// The JSON body for changing a user's role.
#[derive(Debug, Deserialize)]
pub struct UpdateRoleRequest {
    /// One of "admin", "manager" or "staff".
    pub role: String,
}

/// A route handler for changing a user's role, responds with the updated user.
pub async fn update_user_role_endpoint(
    State(state): State<UsersState>,
    Path(user_id): Path<i64>,
    Json(request): Json<UpdateRoleRequest>,
) -> Result<Json<User>, Error> {
    let role: Role = request.role.parse()?;

    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    let user = update_user_role(UserID::new(user_id), role, &connection)?;
    tracing::info!("Changed the role of user {} to {role}", user.id);

    Ok(Json(user))
}

/// A route handler for activating or deactivating a user, responds with the updated user.
pub async fn toggle_user_status_endpoint(
    State(state): State<UsersState>,
    Path(user_id): Path<i64>,
) -> Result<Json<User>, Error> {
    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    let user = toggle_user_status(UserID::new(user_id), &connection)?;
    tracing::info!("Set is_active={} for user {}", user.is_active, user.id);

    Ok(Json(user))
}
