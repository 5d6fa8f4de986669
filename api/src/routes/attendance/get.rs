//! Attendance reporting: full log, today's presence split, per-member
//! latest scan, and the xlsx export of today's report.

use axum::{
    Json,
    extract::State,
    http::{HeaderMap, HeaderValue, StatusCode},
};
use services::report::{self, DayLog, MemberLatest, PresenceReport};
use services::export;
use util::partition::PartitionPath;
use util::state::AppState;

use crate::response::ApiResponse;

/// GET /attendance/log
///
/// The full attendance log grouped by day, newest day first. Rows with
/// unparseable partition dates are flagged and grouped last rather than
/// hidden.
pub async fn attendance_log(
    State(state): State<AppState>,
) -> (StatusCode, Json<ApiResponse<Vec<DayLog>>>) {
    match report::daily_log(state.db()).await {
        Ok(days) => (
            StatusCode::OK,
            Json(ApiResponse::success(days, "Attendance log retrieved")),
        ),
        Err(err) => {
            tracing::error!("failed to build attendance log: {err}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error("Failed to build attendance log")),
            )
        }
    }
}

/// GET /attendance/today
///
/// Today's present/absent split: who scanned in (latest first, with their
/// registry details) and which registered members have not.
pub async fn today_presence(
    State(state): State<AppState>,
) -> (StatusCode, Json<ApiResponse<Option<PresenceReport>>>) {
    match report::presence_for(state.db(), &PartitionPath::today()).await {
        Ok(report) => (
            StatusCode::OK,
            Json(ApiResponse::success(
                Some(report),
                "Today's attendance retrieved",
            )),
        ),
        Err(err) => {
            tracing::error!("failed to build today's report: {err}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error("Failed to build today's report")),
            )
        }
    }
}

/// GET /attendance/latest
///
/// Each member's most recent scan, most recent first.
pub async fn latest_per_member(
    State(state): State<AppState>,
) -> (StatusCode, Json<ApiResponse<Vec<MemberLatest>>>) {
    match report::latest_per_member(state.db()).await {
        Ok(latest) => (
            StatusCode::OK,
            Json(ApiResponse::success(latest, "Latest scans retrieved")),
        ),
        Err(err) => {
            tracing::error!("failed to collect latest scans: {err}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error("Failed to collect latest scans")),
            )
        }
    }
}

/// GET /attendance/today/export
///
/// Today's presence report as an xlsx workbook, served as a download named
/// `Absensi_{date}.xlsx` with a "Sudah Hadir" and a "Belum Hadir" sheet.
pub async fn export_today(
    State(state): State<AppState>,
) -> Result<(HeaderMap, Vec<u8>), (StatusCode, Json<ApiResponse<()>>)> {
    let path = PartitionPath::today();
    let bytes = export::presence_workbook(state.db(), &path)
        .await
        .map_err(|err| {
            tracing::error!("xlsx export failed: {err}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error("Failed to export attendance")),
            )
        })?;

    let filename = export::workbook_filename(&path);
    let mut headers = HeaderMap::new();
    headers.insert(
        axum::http::header::CONTENT_TYPE,
        HeaderValue::from_static(
            "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        ),
    );
    headers.insert(
        axum::http::header::CONTENT_DISPOSITION,
        HeaderValue::from_str(&format!("attachment; filename=\"{}\"", filename))
            .unwrap_or(HeaderValue::from_static("attachment")),
    );

    Ok((headers, bytes))
}
