//! HTTP route entry point for `/api/...`.
//!
//! Route groups include:
//! - `/health` → Health check endpoint (public)
//! - `/auth` → Admin login via rotating access code (public)
//! - `/scan` → QR scan resolution for the kiosk page (public)
//! - `/sessions` → QR session management (admin-only, except validation)
//! - `/attendance` → Attendance recording (public) and reporting (admin-only)
//! - `/members` → Member registry management (admin-only)

use crate::auth::guards::allow_admin;
use crate::routes::{
    attendance::attendance_routes, auth::auth_routes, health::health_routes,
    members::members_routes, scan::scan_routes, sessions::sessions_routes,
};
use axum::{Router, middleware::from_fn};
use util::state::AppState;

pub mod attendance;
pub mod auth;
pub mod health;
pub mod members;
pub mod scan;
pub mod sessions;

/// Builds the complete application router for all HTTP endpoints.
///
/// State is supplied here, so the returned router is ready to serve. All
/// route groups are mounted under their base paths; admin-only access is
/// enforced per group (or per route, for the mixed groups) via the
/// `allow_admin` guard.
pub fn routes(app_state: AppState) -> Router {
    Router::new()
        .nest("/health", health_routes())
        .nest("/auth", auth_routes())
        .nest("/scan", scan_routes())
        .nest("/sessions", sessions_routes())
        .nest("/attendance", attendance_routes())
        .nest("/members", members_routes().route_layer(from_fn(allow_admin)))
        .with_state(app_state)
}
