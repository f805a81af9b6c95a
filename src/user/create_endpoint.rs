//! Defines the admin endpoint for creating a user.

use axum::{Json, extract::State};
use serde::Deserialize;

use crate::{
    Error,
    user::{NewUser, Role, User, create_user, list_endpoint::UsersState},
};

/// The JSON body for creating a user.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    /// The email the user logs in with.
    pub email: String,
    /// The user's given name.
    pub first_name: String,
    /// The user's family name.
    #[serde(default)]
    pub last_name: String,
    /// One of "admin", "manager" or "staff", defaults to "staff".
    pub role: Option<String>,
    /// The department the user works in.
    pub department: Option<String>,
}

/// A route handler for creating a new user, responds with the created user.
pub async fn create_user_endpoint(
    State(state): State<UsersState>,
    Json(request): Json<CreateUserRequest>,
) -> Result<Json<User>, Error> {
    let role = match request.role.as_deref() {
        None | Some("") => Role::Staff,
        Some(role) => role.parse()?,
    };

    let new_user = NewUser {
        email: request.email,
        first_name: request.first_name,
        last_name: request.last_name,
        role,
        department: request.department.unwrap_or_default(),
    };

    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    let user = create_user(new_user, &connection)?;
    tracing::info!("Created {} user {}", user.role, user.id);

    Ok(Json(user))
}
