//! Defines the route for logging out the current user.

use axum::Json;
use axum_extra::extract::PrivateCookieJar;
use serde_json::{Value, json};

use crate::auth::cookie::invalidate_auth_cookie;

/// Invalidate the session cookie.
///
/// Logging out always succeeds, even without a session.
pub async fn post_log_out(jar: PrivateCookieJar) -> (PrivateCookieJar, Json<Value>) {
    (
        invalidate_auth_cookie(jar),
        Json(json!({ "message": "Logged out successfully" })),
    )
}
