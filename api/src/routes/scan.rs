//! Resolution of raw QR scan content into a navigation target.
//!
//! The kiosk camera posts whatever string it decoded; this endpoint parses
//! it, validates the embedded session against the store, and hands back the
//! attendance page path to navigate to.

use axum::{Json, Router, extract::State, http::StatusCode, routing::post};
use serde::{Deserialize, Serialize};
use services::qr_session::{self, ScanError, SessionValidation};
use util::state::AppState;

use crate::response::ApiResponse;

pub fn scan_routes() -> Router<AppState> {
    Router::new().route("/", post(resolve_scan))
}

#[derive(Debug, Deserialize)]
pub struct ScanRequest {
    /// The decoded QR string, expected to be the JSON payload issued at
    /// session creation.
    pub content: String,
}

#[derive(Debug, Serialize, Default)]
pub struct ScanResponse {
    pub session_id: String,
    /// Frontend path to navigate to, e.g. `/absensi?session=qr_...`.
    pub next: String,
}

/// POST /scan
///
/// ### Request Body
/// ```json
/// { "content": "{\"sessionId\":\"qr_1755752400000_k3j9d8s2\",\"expiredAt\":1755752700000}" }
/// ```
///
/// ### Responses
/// - `200 OK` → `{ "session_id": "...", "next": "/absensi?session=..." }`
/// - `400 Bad Request` → content that is not a session payload
/// - `404 Not Found` → session id unknown to the store
/// - `410 Gone` → session deactivated or expired
pub async fn resolve_scan(
    State(state): State<AppState>,
    Json(req): Json<ScanRequest>,
) -> (StatusCode, Json<ApiResponse<ScanResponse>>) {
    let payload = match qr_session::parse_scan_payload(&req.content) {
        Ok(p) => p,
        Err(ScanError::Malformed) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ApiResponse::error("Scanned code is not an attendance QR")),
            );
        }
        Err(ScanError::MissingSessionId) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ApiResponse::error("Scanned code carries no session id")),
            );
        }
    };

    let now_ms = chrono::Utc::now().timestamp_millis();
    let verdict =
        match qr_session::validate_session(state.db(), Some(&payload.session_id), now_ms).await {
            Ok(v) => v,
            Err(err) => {
                tracing::error!("scan validation failed: {err}");
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ApiResponse::error("Failed to validate session")),
                );
            }
        };

    match verdict {
        SessionValidation::Valid { .. } => {
            let next = format!("/absensi?session={}", payload.session_id);
            (
                StatusCode::OK,
                Json(ApiResponse::success(
                    ScanResponse {
                        session_id: payload.session_id,
                        next,
                    },
                    "Session is valid",
                )),
            )
        }
        // Missing cannot occur here: the parser guarantees a non-empty id.
        SessionValidation::Missing | SessionValidation::NotFound => (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::error("Session not found")),
        ),
        SessionValidation::Inactive => (
            StatusCode::GONE,
            Json(ApiResponse::error("Session is no longer active")),
        ),
        SessionValidation::Expired { expired_minutes_ago } => (
            StatusCode::GONE,
            Json(ApiResponse::error(format!(
                "Session expired {expired_minutes_ago} minute(s) ago"
            ))),
        ),
    }
}
