//! Defines the endpoint for listing the active categories.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    category::{Category, get_active_categories},
};

/// The state needed to list and create categories.
#[derive(Debug, Clone)]
pub struct CategoryState {
    /// The database connection for managing categories.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CategoryState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for listing the active categories by name.
pub async fn list_categories_endpoint(
    State(state): State<CategoryState>,
) -> Result<Json<Vec<Category>>, Error> {
    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    get_active_categories(&connection).map(Json)
}

#[cfg(test)]
mod list_categories_tests {
    use serde_json::Value;

    use crate::{
        category::{CategoryName, NewCategory, create_category},
        endpoints,
        test_utils::TestApp,
        user::Role,
    };

    #[tokio::test]
    async fn staff_can_list_categories() {
        let app = TestApp::new();
        app.add_user("staff@example.com", Role::Staff);
        create_category(
            NewCategory {
                name: CategoryName::new_unchecked("Office"),
                description: "Stationery and supplies".to_owned(),
            },
            &app.state.db_connection.lock().unwrap(),
        )
        .unwrap();
        let cookie = app.log_in("staff@example.com").await;

        let response = app.server.get(endpoints::CATEGORIES).add_cookie(cookie).await;

        response.assert_status_ok();
        let categories = response.json::<Vec<Value>>();
        assert_eq!(categories.len(), 1);
        assert_eq!(categories[0]["name"], "Office");
        assert_eq!(categories[0]["isActive"], true);
    }

    #[tokio::test]
    async fn listing_requires_log_in() {
        let app = TestApp::new();

        app.server
            .get(endpoints::CATEGORIES)
            .await
            .assert_status_unauthorized();
    }
}
