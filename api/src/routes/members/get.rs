use axum::{Json, extract::State, http::StatusCode};
use db::models::{member::Model as Member, pending_member::Model as PendingMember};
use services::member;
use util::state::AppState;

use crate::response::ApiResponse;

/// GET /members
///
/// All registered members, newest registration first.
pub async fn list_members(
    State(state): State<AppState>,
) -> (StatusCode, Json<ApiResponse<Vec<Member>>>) {
    match member::list_members(state.db()).await {
        Ok(members) => (
            StatusCode::OK,
            Json(ApiResponse::success(members, "Members retrieved")),
        ),
        Err(err) => {
            tracing::error!("failed to list members: {err}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error("Failed to list members")),
            )
        }
    }
}

/// GET /members/pending
///
/// UIDs the scanner has seen that nobody has registered yet, oldest
/// sighting first.
pub async fn list_pending(
    State(state): State<AppState>,
) -> (StatusCode, Json<ApiResponse<Vec<PendingMember>>>) {
    match member::list_pending(state.db()).await {
        Ok(pending) => (
            StatusCode::OK,
            Json(ApiResponse::success(pending, "Pending UIDs retrieved")),
        ),
        Err(err) => {
            tracing::error!("failed to list pending uids: {err}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error("Failed to list pending UIDs")),
            )
        }
    }
}
