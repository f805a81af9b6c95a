//! HTTP handler for the dashboard summary.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, Query, State},
};
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error,
    dashboard::{DashboardStats, DateRange, get_dashboard_stats, get_user_breakdown},
    timezone::{local_today, parse_date},
    user::{Role, User},
};

/// The state needed for the dashboard.
#[derive(Debug, Clone)]
pub struct DashboardState {
    /// The local timezone as a canonical timezone name, used to find the current month.
    pub local_timezone: String,
    /// The database connection for reading expenses and top-ups.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DashboardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            local_timezone: state.local_timezone.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The optional date range for the dashboard.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardQuery {
    /// The earliest expense date, inclusive.
    pub start_date: Option<String>,
    /// The latest expense date, inclusive.
    pub end_date: Option<String>,
}

fn parse_optional_date(value: Option<&str>) -> Result<Option<time::Date>, Error> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(parse_date)
        .transpose()
}

/// Responds with the dashboard figures for the logged in user.
///
/// Staff get figures for their own expenses and cash. Managers and admins get system-wide
/// figures along with a breakdown per staff member.
pub async fn get_dashboard_stats_endpoint(
    State(state): State<DashboardState>,
    Extension(user): Extension<User>,
    Query(query): Query<DashboardQuery>,
) -> Result<Json<DashboardStats>, Error> {
    let range = DateRange {
        start: parse_optional_date(query.start_date.as_deref())?,
        end: parse_optional_date(query.end_date.as_deref())?,
    };
    let today = local_today(&state.local_timezone)?;

    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    let stats = match user.role {
        Role::Staff => get_dashboard_stats(Some(user.id), range, today, &connection)?,
        Role::Admin | Role::Manager => DashboardStats {
            user_breakdown: Some(get_user_breakdown(&connection)?),
            ..get_dashboard_stats(None, range, today, &connection)?
        },
    };

    Ok(Json(stats))
}
