use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Serialize;
use services::{attendance, member};
use util::state::AppState;

use crate::auth::guards::Empty;
use crate::response::ApiResponse;

/// DELETE /members/{uid}
///
/// Removes a member from the registry. Their attendance history is left in
/// place; use `DELETE /members/{uid}/attendance` to purge it.
pub async fn delete_member(
    State(state): State<AppState>,
    Path(uid): Path<String>,
) -> (StatusCode, Json<ApiResponse<Empty>>) {
    match member::delete_member(state.db(), &uid).await {
        Ok(true) => (
            StatusCode::OK,
            Json(ApiResponse::success(Empty, "Member deleted")),
        ),
        Ok(false) => (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::error("Member not found")),
        ),
        Err(err) => {
            tracing::error!("failed to delete member {uid}: {err}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error("Failed to delete member")),
            )
        }
    }
}

/// DELETE /members/pending/{uid}
///
/// Drops a UID from the pending queue without registering it.
pub async fn delete_pending(
    State(state): State<AppState>,
    Path(uid): Path<String>,
) -> (StatusCode, Json<ApiResponse<Empty>>) {
    match member::delete_pending(state.db(), &uid).await {
        Ok(true) => (
            StatusCode::OK,
            Json(ApiResponse::success(Empty, "Pending UID removed")),
        ),
        Ok(false) => (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::error("Pending UID not found")),
        ),
        Err(err) => {
            tracing::error!("failed to delete pending uid {uid}: {err}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error("Failed to delete pending UID")),
            )
        }
    }
}

#[derive(Debug, Serialize, Default)]
pub struct PurgeResponse {
    pub removed: u64,
}

/// DELETE /members/{uid}/attendance
///
/// Purges every attendance row a member has, across all days, and reports
/// how many were removed.
pub async fn delete_member_attendance(
    State(state): State<AppState>,
    Path(uid): Path<String>,
) -> (StatusCode, Json<ApiResponse<PurgeResponse>>) {
    match attendance::delete_member_attendance(state.db(), &uid).await {
        Ok(removed) => (
            StatusCode::OK,
            Json(ApiResponse::success(
                PurgeResponse { removed },
                "Attendance history removed",
            )),
        ),
        Err(err) => {
            tracing::error!("failed to purge attendance for {uid}: {err}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error("Failed to remove attendance history")),
            )
        }
    }
}
