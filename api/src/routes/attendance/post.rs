use axum::{Json, extract::State, http::StatusCode};
use chrono::Local;
use serde::{Deserialize, Serialize};
use services::attendance::{self, RecordOutcome};
use services::{member, qr_session};
use services::qr_session::SessionValidation;
use util::partition::{PartitionPath, format_timestamp};
use util::state::AppState;

use crate::response::ApiResponse;

#[derive(Debug, Deserialize)]
pub struct RecordRequest {
    pub session_id: String,
    /// Card/scanner UID of the member checking in.
    pub member_id: String,
}

#[derive(Debug, Serialize, Default)]
pub struct RecordResponse {
    pub member_id: String,
    pub member_name: String,
    pub recorded_at: String,
    pub duplicate: bool,
}

/// POST /attendance
///
/// Records a member as present for today. The session is re-validated here;
/// a session that was valid when the page loaded but expired before submit
/// is rejected.
///
/// An unregistered UID is queued for the admin's pending list and rejected,
/// so the registration happens later without losing the sighting.
///
/// ### Request Body
/// ```json
/// { "session_id": "qr_1755752400000_k3j9d8s2", "member_id": "04a1b2c3" }
/// ```
///
/// ### Responses
/// - `201 Created` → attendance recorded
/// - `200 OK` → already recorded today (`duplicate: true`, original timestamp)
/// - `404 Not Found` → unknown session or unregistered UID
/// - `410 Gone` → session deactivated or expired
pub async fn record_attendance(
    State(state): State<AppState>,
    Json(req): Json<RecordRequest>,
) -> (StatusCode, Json<ApiResponse<RecordResponse>>) {
    let now_ms = chrono::Utc::now().timestamp_millis();
    let verdict =
        match qr_session::validate_session(state.db(), Some(&req.session_id), now_ms).await {
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
        SessionValidation::Valid { .. } => {}
        SessionValidation::Missing => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ApiResponse::error("Session id is required")),
            );
        }
        SessionValidation::NotFound => {
            return (
                StatusCode::NOT_FOUND,
                Json(ApiResponse::error("Session not found")),
            );
        }
        SessionValidation::Inactive => {
            return (
                StatusCode::GONE,
                Json(ApiResponse::error("Session is no longer active")),
            );
        }
        SessionValidation::Expired { expired_minutes_ago } => {
            return (
                StatusCode::GONE,
                Json(ApiResponse::error(format!(
                    "Session expired {expired_minutes_ago} minute(s) ago"
                ))),
            );
        }
    }

    let uid = req.member_id.trim();
    let member = match member::get_member(state.db(), uid).await {
        Ok(Some(m)) => m,
        Ok(None) => {
            if let Err(err) = member::touch_pending(state.db(), uid).await {
                tracing::error!("failed to queue pending uid {uid}: {err}");
            }
            return (
                StatusCode::NOT_FOUND,
                Json(ApiResponse::error(
                    "UID is not registered; it has been queued for registration",
                )),
            );
        }
        Err(err) => {
            tracing::error!("member lookup failed: {err}");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error("Failed to look up member")),
            );
        }
    };

    let path = PartitionPath::today();
    let timestamp = format_timestamp(Local::now());
    match attendance::record_attendance(state.db(), &member, &path, &timestamp).await {
        Ok(RecordOutcome::Recorded(row)) => (
            StatusCode::CREATED,
            Json(ApiResponse::success(
                RecordResponse {
                    member_id: row.member_id,
                    member_name: row.member_name,
                    recorded_at: row.recorded_at,
                    duplicate: false,
                },
                "Attendance recorded",
            )),
        ),
        Ok(RecordOutcome::Duplicate(row)) => (
            StatusCode::OK,
            Json(ApiResponse::success(
                RecordResponse {
                    member_id: row.member_id,
                    member_name: row.member_name,
                    recorded_at: row.recorded_at,
                    duplicate: true,
                },
                "Already recorded today",
            )),
        ),
        Err(err) => {
            tracing::error!("failed to record attendance for {}: {err}", member.id);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error("Failed to record attendance")),
            )
        }
    }
}
