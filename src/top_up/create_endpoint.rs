//! Defines the admin endpoints for listing and recording cash top-ups.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
    http::StatusCode,
};
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error,
    money::AmountInput,
    timezone::{local_today, parse_date},
    top_up::{CashTopUp, NewTopUp, get_top_ups, record_top_up},
    user::UserID,
};

/// The state needed to record and list cash top-ups.
#[derive(Debug, Clone)]
pub struct TopUpState {
    /// The local timezone as a canonical timezone name, used for the default top-up date.
    pub local_timezone: String,
    /// The database connection for managing top-ups.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for TopUpState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            local_timezone: state.local_timezone.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The JSON body for recording a cash top-up.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTopUpRequest {
    /// The user receiving the cash.
    pub user_id: i64,
    /// How much cash is given.
    pub amount: AmountInput,
    /// Who or where the cash came from.
    #[serde(default)]
    pub source: String,
    /// A reference for the transfer.
    #[serde(default)]
    pub reference: Option<String>,
    /// Free-form notes.
    #[serde(default)]
    pub remarks: Option<String>,
    /// The day the cash was handed over as YYYY-MM-DD or an ISO date time, defaults to today.
    #[serde(default)]
    pub date: Option<String>,
}

/// A route handler for listing every cash top-up, newest first.
pub async fn list_top_ups_endpoint(
    State(state): State<TopUpState>,
) -> Result<Json<Vec<CashTopUp>>, Error> {
    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    get_top_ups(&connection).map(Json)
}

/// A route handler for recording a cash top-up, responds with the new top-up.
pub async fn create_top_up_endpoint(
    State(state): State<TopUpState>,
    Json(request): Json<CreateTopUpRequest>,
) -> Result<(StatusCode, Json<CashTopUp>), Error> {
    let date = match request.date.as_deref().map(str::trim) {
        Some(date) if !date.is_empty() => parse_date(date)?,
        _ => local_today(&state.local_timezone)?,
    };

    let new_top_up = NewTopUp {
        user_id: UserID::new(request.user_id),
        amount: request.amount.parse()?,
        source: request.source,
        reference: request.reference.unwrap_or_default(),
        remarks: request.remarks.unwrap_or_default(),
        date,
    };

    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    let top_up = record_top_up(new_top_up, &connection)?;
    tracing::info!(
        "Recorded top-up {} of {:.2} for user {}",
        top_up.id,
        top_up.amount,
        top_up.user_id
    );

    Ok((StatusCode::CREATED, Json(top_up)))
}

#[cfg(test)]
mod create_top_up_tests {
    use axum::http::StatusCode;
    use serde_json::{Value, json};

    use crate::{balance::get_balance, endpoints, test_utils::TestApp, user::Role};

    #[tokio::test]
    async fn admin_can_record_top_up() {
        let app = TestApp::new();
        app.add_user("admin@example.com", Role::Admin);
        let staff = app.add_user("staff@example.com", Role::Staff);
        let cookie = app.log_in("admin@example.com").await;

        let response = app
            .server
            .post(endpoints::CASH_TOP_UPS)
            .add_cookie(cookie.clone())
            .json(&json!({
                "userId": staff.id.as_i64(),
                "amount": "150.00",
                "source": "Bank withdrawal",
                "date": "2025-02-03"
            }))
            .await;

        response.assert_status(StatusCode::CREATED);
        let body = response.json::<Value>();
        assert_eq!(body["amount"], 150.0);
        assert_eq!(body["date"], "2025-02-03");

        let balance = get_balance(staff.id, &app.state.db_connection.lock().unwrap()).unwrap();
        assert_eq!(balance.current_balance, 150.0);

        let list = app
            .server
            .get(endpoints::CASH_TOP_UPS)
            .add_cookie(cookie)
            .await
            .json::<Vec<Value>>();
        assert_eq!(list.len(), 1);
    }

    #[tokio::test]
    async fn accepts_iso_date_time_and_empty_date() {
        let app = TestApp::new();
        app.add_user("admin@example.com", Role::Admin);
        let staff = app.add_user("staff@example.com", Role::Staff);
        let cookie = app.log_in("admin@example.com").await;

        let response = app
            .server
            .post(endpoints::CASH_TOP_UPS)
            .add_cookie(cookie.clone())
            .json(&json!({
                "userId": staff.id.as_i64(),
                "amount": 20,
                "source": "Bank",
                "date": "2025-03-31T00:00:00.000Z"
            }))
            .await;

        response.assert_status(StatusCode::CREATED);
        assert_eq!(response.json::<Value>()["date"], "2025-03-31");

        app.server
            .post(endpoints::CASH_TOP_UPS)
            .add_cookie(cookie)
            .json(&json!({"userId": staff.id.as_i64(), "amount": 5, "source": "Bank", "date": ""}))
            .await
            .assert_status(StatusCode::CREATED);
    }

    #[tokio::test]
    async fn rejects_invalid_date() {
        let app = TestApp::new();
        app.add_user("admin@example.com", Role::Admin);
        let staff = app.add_user("staff@example.com", Role::Staff);
        let cookie = app.log_in("admin@example.com").await;

        app.server
            .post(endpoints::CASH_TOP_UPS)
            .add_cookie(cookie)
            .json(&json!({"userId": staff.id.as_i64(), "amount": 5, "source": "Bank", "date": "March"}))
            .await
            .assert_status_bad_request();
    }

    #[tokio::test]
    async fn rejects_non_positive_amount() {
        let app = TestApp::new();
        app.add_user("admin@example.com", Role::Admin);
        let staff = app.add_user("staff@example.com", Role::Staff);
        let cookie = app.log_in("admin@example.com").await;

        app.server
            .post(endpoints::CASH_TOP_UPS)
            .add_cookie(cookie)
            .json(&json!({"userId": staff.id.as_i64(), "amount": -5, "source": "Bank"}))
            .await
            .assert_status_bad_request();
    }

    #[tokio::test]
    async fn managers_cannot_record_top_ups() {
        let app = TestApp::new();
        let manager = app.add_user("manager@example.com", Role::Manager);
        let cookie = app.log_in("manager@example.com").await;

        app.server
            .post(endpoints::CASH_TOP_UPS)
            .add_cookie(cookie)
            .json(&json!({"userId": manager.id.as_i64(), "amount": 5, "source": "Bank"}))
            .await
            .assert_status(StatusCode::FORBIDDEN);
    }
}
