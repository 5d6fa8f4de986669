use axum::{Router, middleware::from_fn, routing::get, routing::post};
use util::state::AppState;

use crate::auth::guards::allow_admin;

mod get;
mod post;

pub use get::{attendance_log, export_today, latest_per_member, today_presence};
pub use post::record_attendance;

/// Attendance recording and reporting. Recording is public (it is what the
/// scan page submits); every report is admin-only.
pub fn attendance_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(record_attendance))
        .route("/log", get(attendance_log).route_layer(from_fn(allow_admin)))
        .route(
            "/today",
            get(today_presence).route_layer(from_fn(allow_admin)),
        )
        .route(
            "/today/export",
            get(export_today).route_layer(from_fn(allow_admin)),
        )
        .route(
            "/latest",
            get(latest_per_member).route_layer(from_fn(allow_admin)),
        )
}
