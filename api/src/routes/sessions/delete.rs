use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use services::qr_session;
use util::state::AppState;

use crate::auth::guards::Empty;
use crate::response::ApiResponse;

/// DELETE /sessions/{session_id}
///
/// Deactivates a session so it can no longer be scanned. Deactivating an
/// already-inactive session still reports success.
///
/// ### Responses
/// - `200 OK`
/// - `404 Not Found` for an unknown session id
pub async fn deactivate_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> (StatusCode, Json<ApiResponse<Empty>>) {
    match qr_session::deactivate_session(state.db(), &session_id).await {
        Ok(true) => (
            StatusCode::OK,
            Json(ApiResponse::success(Empty, "Session deactivated")),
        ),
        Ok(false) => (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::error("Session not found")),
        ),
        Err(err) => {
            tracing::error!("failed to deactivate session {session_id}: {err}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error("Failed to deactivate session")),
            )
        }
    }
}
