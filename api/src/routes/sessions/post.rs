use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};
use services::qr_session::{self, ScanPayload};
use services::ServiceError;
use util::{config, state::AppState};

use crate::response::ApiResponse;

#[derive(Debug, Deserialize, Default)]
pub struct CreateRequest {
    /// Overrides the configured session lifetime.
    pub duration_minutes: Option<u64>,
}

#[derive(Debug, Serialize, Default)]
pub struct SessionResponse {
    pub session_id: String,
    pub active: bool,
    pub created_at: i64,
    pub expired_at: i64,
    /// JSON string to embed in the QR image.
    pub qr_payload: String,
}

/// POST /sessions
///
/// Creates a new QR session valid for `duration_minutes` (configured
/// default when omitted) and returns it together with the exact string to
/// render as a QR code.
///
/// ### Request Body (optional)
/// ```json
/// { "duration_minutes": 10 }
/// ```
///
/// ### Responses
/// - `201 Created` with the session and `qr_payload`
/// - `400 Bad Request` for a zero duration
/// - `500 Internal Server Error` on a store failure
pub async fn create_session(
    State(state): State<AppState>,
    body: Option<Json<CreateRequest>>,
) -> (StatusCode, Json<ApiResponse<SessionResponse>>) {
    let duration = body
        .and_then(|Json(req)| req.duration_minutes)
        .unwrap_or_else(config::qr_session_minutes);

    let session = match qr_session::create_session(state.db(), duration).await {
        Ok(s) => s,
        Err(ServiceError::Rejected(message)) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ApiResponse::error(message)),
            );
        }
        Err(err) => {
            tracing::error!("failed to create qr session: {err}");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error("Failed to create session")),
            );
        }
    };

    let payload = ScanPayload {
        session_id: session.id.clone(),
        expired_at: session.expired_at,
    };
    let qr_payload = match serde_json::to_string(&payload) {
        Ok(s) => s,
        Err(err) => {
            tracing::error!("failed to serialize qr payload: {err}");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error("Failed to create session")),
            );
        }
    };

    (
        StatusCode::CREATED,
        Json(ApiResponse::success(
            SessionResponse {
                session_id: session.id,
                active: session.active,
                created_at: session.created_at,
                expired_at: session.expired_at,
                qr_payload,
            },
            "Session created",
        )),
    )
}

#[derive(Debug, Serialize, Default)]
pub struct CleanResponse {
    pub cleaned: u64,
}

/// POST /sessions/clean
///
/// Deletes every session past its expiry, active or not, and reports how
/// many rows were removed.
pub async fn clean_sessions(
    State(state): State<AppState>,
) -> (StatusCode, Json<ApiResponse<CleanResponse>>) {
    let now_ms = chrono::Utc::now().timestamp_millis();
    match qr_session::clean_expired_sessions(state.db(), now_ms).await {
        Ok(cleaned) => (
            StatusCode::OK,
            Json(ApiResponse::success(
                CleanResponse { cleaned },
                "Expired sessions removed",
            )),
        ),
        Err(err) => {
            tracing::error!("session cleanup failed: {err}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error("Failed to clean sessions")),
            )
        }
    }
}
