use axum::{
    Router,
    routing::{delete, get, post},
};
use util::state::AppState;

mod delete;
mod get;
mod post;

pub use delete::{delete_member, delete_member_attendance, delete_pending};
pub use get::{list_members, list_pending};
pub use post::register_member;

/// Member registry management. The whole group is admin-only; the guard is
/// applied where the group is mounted.
pub fn members_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(register_member))
        .route("/", get(list_members))
        .route("/pending", get(list_pending))
        .route("/pending/{uid}", delete(delete_pending))
        .route("/{uid}", delete(delete_member))
        .route("/{uid}/attendance", delete(delete_member_attendance))
}
