//! Defines the endpoints for listing and viewing expenses.

use std::{
    path::PathBuf,
    sync::{Arc, Mutex},
};

use axum::{
    Extension, Json,
    extract::{FromRef, Path, Query, State},
};
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error,
    database_id::ExpenseId,
    expense::{
        ExpenseFilter, ExpenseStatus, ExpenseWithDetails, get_expense_with_details, get_expenses,
    },
    timezone::parse_date,
    user::{User, UserID},
};

/// The state needed to submit, list and decide on expenses.
#[derive(Debug, Clone)]
pub struct ExpenseState {
    /// The directory where uploaded receipts are saved.
    pub upload_dir: PathBuf,
    /// The database connection for managing expenses.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ExpenseState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            upload_dir: state.upload_dir.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The query parameters for filtering expenses.
///
/// Empty values and "all" match everything.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseQuery {
    /// The ID of the user who submitted the expenses.
    pub user_id: Option<String>,
    /// The ID of the category of the expenses.
    pub category_id: Option<String>,
    /// One of "pending", "approved" or "rejected".
    pub status: Option<String>,
    /// The earliest expense date, inclusive.
    pub start_date: Option<String>,
    /// The latest expense date, inclusive.
    pub end_date: Option<String>,
    /// Text to look for in the description or remarks.
    pub search: Option<String>,
}

fn non_trivial(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty() && !value.eq_ignore_ascii_case("all"))
}

fn parse_id(id: &str) -> Result<i64, Error> {
    id.parse().map_err(|_| Error::InvalidId(id.to_owned()))
}

impl ExpenseQuery {
    /// Convert the query parameters into an [ExpenseFilter].
    ///
    /// # Errors
    ///
    /// Returns an error if an ID, status or date cannot be parsed.
    pub fn to_filter(&self) -> Result<ExpenseFilter, Error> {
        let user_id = non_trivial(&self.user_id)
            .map(|id| parse_id(id).map(UserID::new))
            .transpose()?;
        let category_id = non_trivial(&self.category_id).map(parse_id).transpose()?;
        let status = non_trivial(&self.status)
            .map(str::parse::<ExpenseStatus>)
            .transpose()?;
        let start_date = non_trivial(&self.start_date).map(parse_date).transpose()?;
        let end_date = non_trivial(&self.end_date).map(parse_date).transpose()?;
        let search = self
            .search
            .as_deref()
            .map(str::trim)
            .filter(|search| !search.is_empty())
            .map(str::to_owned);

        Ok(ExpenseFilter {
            user_id,
            category_id,
            status,
            start_date,
            end_date,
            search,
        })
    }
}

/// A route handler for listing expenses, newest first.
///
/// Staff only ever see their own expenses.
pub async fn list_expenses_endpoint(
    State(state): State<ExpenseState>,
    Extension(user): Extension<User>,
    Query(query): Query<ExpenseQuery>,
) -> Result<Json<Vec<ExpenseWithDetails>>, Error> {
    let mut filter = query.to_filter()?;
    if !user.role.is_approver() {
        filter.user_id = Some(user.id);
    }

    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    get_expenses(&filter, &connection).map(Json)
}

/// A route handler for viewing a single expense.
///
/// Staff may only view their own expenses.
pub async fn get_expense_endpoint(
    State(state): State<ExpenseState>,
    Extension(user): Extension<User>,
    Path(expense_id): Path<ExpenseId>,
) -> Result<Json<ExpenseWithDetails>, Error> {
    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    let expense = get_expense_with_details(expense_id, &connection)?;

    if !user.role.is_approver() && expense.expense.user_id != user.id {
        return Err(Error::AccessDenied);
    }

    Ok(Json(expense))
}

#[cfg(test)]
mod list_expenses_tests {
    use axum::http::StatusCode;
    use serde_json::Value;
    use time::macros::date;

    use crate::{
        category::{Category, CategoryName, NewCategory, create_category},
        endpoints::{self, format_endpoint},
        expense::{Expense, ExpenseQuery, ExpenseStatus, NewExpense, create_expense},
        test_utils::TestApp,
        user::{Role, User, UserID},
    };

    fn add_category(app: &TestApp) -> Category {
        create_category(
            NewCategory {
                name: CategoryName::new_unchecked("Meals"),
                description: String::new(),
            },
            &app.state.db_connection.lock().unwrap(),
        )
        .unwrap()
    }

    fn add_expense(app: &TestApp, user: &User, category: &Category, description: &str) -> Expense {
        create_expense(
            NewExpense {
                user_id: user.id,
                category_id: category.id,
                amount: 15.0,
                description: description.to_owned(),
                remarks: String::new(),
                receipt_url: None,
                expense_date: date!(2025 - 04 - 02),
                has_gst: false,
            },
            &app.state.db_connection.lock().unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn query_treats_all_as_no_filter() {
        let query = ExpenseQuery {
            user_id: Some("all".to_owned()),
            category_id: Some("".to_owned()),
            status: Some("approved".to_owned()),
            start_date: Some("2025-01-01".to_owned()),
            ..Default::default()
        };

        let filter = query.to_filter().unwrap();

        assert_eq!(filter.user_id, None);
        assert_eq!(filter.category_id, None);
        assert_eq!(filter.status, Some(ExpenseStatus::Approved));
        assert_eq!(filter.start_date, Some(date!(2025 - 01 - 01)));
    }

    #[test]
    fn query_parses_user_id() {
        let query = ExpenseQuery {
            user_id: Some("7".to_owned()),
            ..Default::default()
        };

        assert_eq!(query.to_filter().unwrap().user_id, Some(UserID::new(7)));
    }

    #[tokio::test]
    async fn staff_only_see_their_own_expenses() {
        let app = TestApp::new();
        let alice = app.add_user("alice@example.com", Role::Staff);
        let bob = app.add_user("bob@example.com", Role::Staff);
        let category = add_category(&app);
        add_expense(&app, &alice, &category, "Alice's lunch");
        add_expense(&app, &bob, &category, "Bob's lunch");
        let cookie = app.log_in("alice@example.com").await;

        let response = app
            .server
            .get(endpoints::EXPENSES)
            .add_query_param("userId", bob.id.as_i64())
            .add_cookie(cookie)
            .await;

        response.assert_status_ok();
        let expenses = response.json::<Vec<Value>>();
        assert_eq!(expenses.len(), 1);
        assert_eq!(expenses[0]["description"], "Alice's lunch");
        assert_eq!(expenses[0]["user"]["email"], "alice@example.com");
        assert_eq!(expenses[0]["category"]["name"], "Meals");
    }

    #[tokio::test]
    async fn managers_can_filter_by_user() {
        let app = TestApp::new();
        app.add_user("manager@example.com", Role::Manager);
        let alice = app.add_user("alice@example.com", Role::Staff);
        let bob = app.add_user("bob@example.com", Role::Staff);
        let category = add_category(&app);
        add_expense(&app, &alice, &category, "Alice's lunch");
        add_expense(&app, &bob, &category, "Bob's lunch");
        let cookie = app.log_in("manager@example.com").await;

        let everything = app
            .server
            .get(endpoints::EXPENSES)
            .add_query_param("userId", "all")
            .add_cookie(cookie.clone())
            .await
            .json::<Vec<Value>>();
        let bobs = app
            .server
            .get(endpoints::EXPENSES)
            .add_query_param("userId", bob.id.as_i64())
            .add_cookie(cookie)
            .await
            .json::<Vec<Value>>();

        assert_eq!(everything.len(), 2);
        assert_eq!(bobs.len(), 1);
        assert_eq!(bobs[0]["description"], "Bob's lunch");
    }

    #[tokio::test]
    async fn invalid_date_filter_is_bad_request() {
        let app = TestApp::new();
        app.add_user("manager@example.com", Role::Manager);
        let cookie = app.log_in("manager@example.com").await;

        app.server
            .get(endpoints::EXPENSES)
            .add_query_param("startDate", "yesterday")
            .add_cookie(cookie)
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn staff_cannot_view_other_users_expense() {
        let app = TestApp::new();
        app.add_user("alice@example.com", Role::Staff);
        let bob = app.add_user("bob@example.com", Role::Staff);
        let category = add_category(&app);
        let expense = add_expense(&app, &bob, &category, "Bob's lunch");
        let cookie = app.log_in("alice@example.com").await;

        app.server
            .get(&format_endpoint(endpoints::EXPENSE, expense.id))
            .add_cookie(cookie)
            .await
            .assert_status(StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn owner_can_view_expense() {
        let app = TestApp::new();
        let alice = app.add_user("alice@example.com", Role::Staff);
        let category = add_category(&app);
        let expense = add_expense(&app, &alice, &category, "Alice's lunch");
        let cookie = app.log_in("alice@example.com").await;

        let response = app
            .server
            .get(&format_endpoint(endpoints::EXPENSE, expense.id))
            .add_cookie(cookie)
            .await;

        response.assert_status_ok();
        let body = response.json::<Value>();
        assert_eq!(body["id"], expense.id);
        assert_eq!(body["status"], "pending");
        assert_eq!(body["approver"], Value::Null);
    }

    #[tokio::test]
    async fn missing_expense_is_not_found() {
        let app = TestApp::new();
        app.add_user("manager@example.com", Role::Manager);
        let cookie = app.log_in("manager@example.com").await;

        app.server
            .get(&format_endpoint(endpoints::EXPENSE, 404))
            .add_cookie(cookie)
            .await
            .assert_status_not_found();
    }
}
