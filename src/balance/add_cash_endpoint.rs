//! Defines the endpoint for managers and admins to hand cash to a user.

use axum::{Extension, Json, extract::State};
use serde::Deserialize;

use crate::{
    Error,
    balance::{UserBalance, get_balance},
    money::AmountInput,
    timezone::{local_today, parse_date},
    top_up::{NewTopUp, TopUpState, record_top_up},
    user::{User, UserID},
};

/// The JSON body for handing cash to a user.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddCashRequest {
    /// The user receiving the cash.
    pub user_id: i64,
    /// How much cash is given.
    pub amount: AmountInput,
    /// The day the cash was handed over as YYYY-MM-DD or an ISO date time, defaults to today.
    #[serde(default)]
    pub date: Option<String>,
}

/// A route handler for handing cash to a user, responds with the user's updated balance.
///
/// The cash is recorded as a top-up from the logged in user.
pub async fn add_cash_endpoint(
    State(state): State<TopUpState>,
    Extension(giver): Extension<User>,
    Json(request): Json<AddCashRequest>,
) -> Result<Json<UserBalance>, Error> {
    let date = match request.date.as_deref().map(str::trim) {
        Some(date) if !date.is_empty() => parse_date(date)?,
        _ => local_today(&state.local_timezone)?,
    };
    let giver_name = giver.display_name();
    let user_id = UserID::new(request.user_id);

    let new_top_up = NewTopUp {
        user_id,
        amount: request.amount.parse()?,
        reference: format!("Cash transfer from {giver_name}"),
        remarks: format!("Cash allocated by {giver_name}"),
        source: giver_name,
        date,
    };

    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    let top_up = record_top_up(new_top_up, &connection)?;
    tracing::info!(
        "User {} gave {:.2} cash to user {user_id}",
        giver.id,
        top_up.amount
    );

    get_balance(user_id, &connection).map(Json)
}
