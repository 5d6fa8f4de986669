use axum::{Json, extract::State, http::StatusCode};
use db::models::member::Model as Member;
use serde::{Deserialize, Serialize};
use services::member::{self, NewMember};
use services::ServiceError;
use util::state::AppState;
use validator::Validate;

use crate::response::ApiResponse;

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, message = "UID is required"))]
    pub id: String,

    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,

    #[validate(length(min = 1, message = "NIM is required"))]
    pub nim: String,

    #[serde(default)]
    pub field: String,
}

#[derive(Debug, Serialize, Default)]
pub struct MemberResponse {
    pub id: String,
    pub name: String,
    pub nim: String,
    pub field: String,
    pub registered_at: String,
}

impl From<Member> for MemberResponse {
    fn from(m: Member) -> Self {
        Self {
            id: m.id,
            name: m.name,
            nim: m.nim,
            field: m.field,
            registered_at: m.registered_at,
        }
    }
}

/// POST /members
///
/// Registers a member. A UID sitting in the pending queue is consumed by a
/// successful registration.
///
/// ### Request Body
/// ```json
/// { "id": "04a1b2c3", "name": "Alya", "nim": "230401001", "field": "Programming" }
/// ```
///
/// ### Responses
/// - `201 Created`
/// - `400 Bad Request` (validation failure)
/// - `409 Conflict` (UID or NIM already registered)
pub async fn register_member(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> (StatusCode, Json<ApiResponse<MemberResponse>>) {
    if let Err(errors) = req.validate() {
        let message = errors
            .field_errors()
            .values()
            .flat_map(|errs| errs.iter())
            .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
            .next()
            .unwrap_or_else(|| "Invalid request".to_string());
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::error(message)),
        );
    }

    let input = NewMember {
        id: req.id,
        name: req.name,
        nim: req.nim,
        field: req.field,
    };

    match member::register_member(state.db(), input).await {
        Ok(created) => (
            StatusCode::CREATED,
            Json(ApiResponse::success(
                MemberResponse::from(created),
                "Member registered",
            )),
        ),
        Err(ServiceError::Rejected(message)) => (
            StatusCode::CONFLICT,
            Json(ApiResponse::error(message)),
        ),
        Err(err) => {
            tracing::error!("member registration failed: {err}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error("Failed to register member")),
            )
        }
    }
}
