use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Serialize;
use services::qr_session::{self, ActiveSession, SessionValidation};
use util::state::AppState;

use crate::response::ApiResponse;

/// GET /sessions
///
/// Lists sessions that are still active and unexpired, with their remaining
/// lifetime in minutes.
pub async fn list_sessions(
    State(state): State<AppState>,
) -> (StatusCode, Json<ApiResponse<Vec<ActiveSession>>>) {
    let now_ms = chrono::Utc::now().timestamp_millis();
    match qr_session::list_active_sessions(state.db(), now_ms).await {
        Ok(sessions) => (
            StatusCode::OK,
            Json(ApiResponse::success(sessions, "Active sessions retrieved")),
        ),
        Err(err) => {
            tracing::error!("failed to list sessions: {err}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error("Failed to list sessions")),
            )
        }
    }
}

#[derive(Debug, Serialize, Default)]
pub struct ValidationResponse {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining_minutes: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expired_minutes_ago: Option<i64>,
}

/// GET /sessions/{session_id}/validate
///
/// Public validation used by the scan page before it asks for a UID. The
/// first look at an expired session also deactivates it.
///
/// ### Responses
/// - `200 OK` → `{ "status": "valid", "remaining_minutes": 4 }`
/// - `404 Not Found` → unknown session id
/// - `410 Gone` → deactivated, or expired (with `expired_minutes_ago`)
pub async fn validate_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> (StatusCode, Json<ApiResponse<ValidationResponse>>) {
    let now_ms = chrono::Utc::now().timestamp_millis();
    let verdict = match qr_session::validate_session(state.db(), Some(&session_id), now_ms).await
    {
        Ok(v) => v,
        Err(err) => {
            tracing::error!("session validation failed: {err}");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error("Failed to validate session")),
            );
        }
    };

    match verdict {
        SessionValidation::Valid { remaining_minutes } => (
            StatusCode::OK,
            Json(ApiResponse::success(
                ValidationResponse {
                    status: "valid".to_string(),
                    remaining_minutes: Some(remaining_minutes),
                    expired_minutes_ago: None,
                },
                "Session is valid",
            )),
        ),
        SessionValidation::Missing => (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::error("Session id is required")),
        ),
        SessionValidation::NotFound => (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::error("Session not found")),
        ),
        SessionValidation::Inactive => (
            StatusCode::GONE,
            Json(ApiResponse::error("Session is no longer active")),
        ),
        SessionValidation::Expired { expired_minutes_ago } => (
            StatusCode::GONE,
            Json(ApiResponse {
                success: false,
                data: ValidationResponse {
                    status: "expired".to_string(),
                    remaining_minutes: None,
                    expired_minutes_ago: Some(expired_minutes_ago),
                },
                message: format!("Session expired {expired_minutes_ago} minute(s) ago"),
            }),
        ),
    }
}
