use axum::{
    Router,
    middleware::from_fn,
    routing::{delete, get, post},
};
use util::state::AppState;

use crate::auth::guards::allow_admin;

mod delete;
mod get;
mod post;

pub use delete::deactivate_session;
pub use get::{list_sessions, validate_session};
pub use post::{clean_sessions, create_session};

/// QR session management. Everything except `/{session_id}/validate` is
/// admin-only; validation stays public so the scan page can check a token
/// before asking for a UID.
pub fn sessions_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_session).route_layer(from_fn(allow_admin)))
        .route("/", get(list_sessions).route_layer(from_fn(allow_admin)))
        .route("/clean", post(clean_sessions).route_layer(from_fn(allow_admin)))
        .route(
            "/{session_id}",
            delete(deactivate_session).route_layer(from_fn(allow_admin)),
        )
        .route("/{session_id}/validate", get(validate_session))
}
