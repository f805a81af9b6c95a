//! The response for unknown API routes.

use axum::response::{IntoResponse, Response};

use crate::Error;

/// Responds with 404 and a JSON error message.
pub async fn get_404_not_found() -> Response {
    Error::NotFound.into_response()
}
