//! Defines the admin endpoint for creating a category.

use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;

use crate::{
    Error,
    category::{Category, CategoryName, CategoryState, NewCategory, create_category},
};

/// The JSON body for creating a category.
#[derive(Debug, Deserialize)]
pub struct CreateCategoryRequest {
    /// The name of the category.
    #[serde(default)]
    pub name: String,
    /// What belongs in the category.
    #[serde(default)]
    pub description: Option<String>,
}

/// A route handler for creating a new category, responds with the new category.
pub async fn create_category_endpoint(
    State(state): State<CategoryState>,
    Json(request): Json<CreateCategoryRequest>,
) -> Result<(StatusCode, Json<Category>), Error> {
    let new_category = NewCategory {
        name: CategoryName::new(&request.name)?,
        description: request.description.unwrap_or_default(),
    };

    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    let category = create_category(new_category, &connection)?;
    tracing::info!("Created category {} \"{}\"", category.id, category.name);

    Ok((StatusCode::CREATED, Json(category)))
}
