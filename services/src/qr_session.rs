//! QR session store: issuance, validation, deactivation and cleanup of the
//! time-boxed tokens that authorize an attendance scan.
//!
//! A session is usable iff `active && now <= expired_at`. Expiry is observed
//! lazily: the first validation that notices `now > expired_at` flips the row
//! to inactive. That write is best-effort; the validation verdict is computed
//! from the timestamps alone and is never changed by a failed write. Once a
//! session is inactive it never becomes valid again.

use crate::error::{ServiceError, ServiceResult};
use chrono::Utc;
use db::models::qr_session::{ActiveModel, Column, Entity, Model};
use rand::distr::{Alphanumeric, SampleString};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, IntoActiveModel,
    QueryFilter, Set,
};
use serde::Serialize;
use thiserror::Error;

const MS_PER_MINUTE: i64 = 60_000;

/// Upper bound on a session lifetime. Keeps the caller-supplied duration
/// within range for the millisecond arithmetic below.
const MAX_SESSION_MINUTES: u64 = 24 * 60;

/// Outcome of validating a session id against the store and the clock.
///
/// The invalid variants are deliberately distinct: the scanner UI tells the
/// user different things for a token that never existed, one an admin turned
/// off, and one that simply ran out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionValidation {
    Valid { remaining_minutes: i64 },
    /// Empty or absent session id; decided before any store call.
    Missing,
    NotFound,
    /// Explicitly deactivated (or previously observed as expired).
    Inactive,
    Expired { expired_minutes_ago: i64 },
}

/// Payload carried inside the QR image.
///
/// The wire names are a compatibility contract with already-printed codes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanPayload {
    #[serde(rename = "sessionId")]
    pub session_id: String,
    #[serde(rename = "expiredAt")]
    pub expired_at: i64,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScanError {
    #[error("QR payload is not valid JSON")]
    Malformed,
    #[error("QR payload carries no sessionId")]
    MissingSessionId,
}

/// Parses the scanned QR content. A missing or empty `sessionId` is a hard
/// parse failure, distinct from every store-backed validation outcome; no
/// store call happens here.
pub fn parse_scan_payload(raw: &str) -> Result<ScanPayload, ScanError> {
    let value: serde_json::Value =
        serde_json::from_str(raw.trim()).map_err(|_| ScanError::Malformed)?;

    let session_id = value
        .get("sessionId")
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
        .ok_or(ScanError::MissingSessionId)?
        .to_owned();

    let expired_at = value.get("expiredAt").and_then(|v| v.as_i64()).unwrap_or(0);

    Ok(ScanPayload {
        session_id,
        expired_at,
    })
}

/// Builds a fresh session id: `qr_{epoch_ms}_{8 random alphanumerics}`.
/// The timestamp prefix plus the random suffix makes collisions with
/// existing keys effectively impossible.
pub fn generate_session_id(now_ms: i64) -> String {
    let suffix = Alphanumeric
        .sample_string(&mut rand::rng(), 8)
        .to_lowercase();
    format!("qr_{now_ms}_{suffix}")
}

/// Creates and persists a new ACTIVE session valid for `duration_minutes`.
pub async fn create_session(
    db: &DatabaseConnection,
    duration_minutes: u64,
) -> ServiceResult<Model> {
    if duration_minutes == 0 || duration_minutes > MAX_SESSION_MINUTES {
        return Err(ServiceError::rejected(
            "Session duration must be between 1 minute and 24 hours",
        ));
    }

    let now_ms = Utc::now().timestamp_millis();
    let session = ActiveModel {
        id: Set(generate_session_id(now_ms)),
        active: Set(true),
        created_at: Set(now_ms),
        expired_at: Set(now_ms + duration_minutes as i64 * MS_PER_MINUTE),
    };

    let created = session.insert(db).await?;
    log::info!(
        "created qr session {} valid for {} minute(s)",
        created.id,
        duration_minutes
    );
    Ok(created)
}

/// Validates `session_id` against the store at `now_ms`.
///
/// Store failures surface as `Err(DbErr)` so callers can distinguish "try
/// again" from every business outcome. The lazy deactivation write on the
/// expired path is best-effort: its failure is logged and the `Expired`
/// verdict stands.
pub async fn validate_session(
    db: &DatabaseConnection,
    session_id: Option<&str>,
    now_ms: i64,
) -> Result<SessionValidation, DbErr> {
    let Some(id) = session_id.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(SessionValidation::Missing);
    };

    let Some(session) = Entity::find_by_id(id).one(db).await? else {
        return Ok(SessionValidation::NotFound);
    };

    if !session.active {
        return Ok(SessionValidation::Inactive);
    }

    if now_ms > session.expired_at {
        let expired_minutes_ago = (now_ms - session.expired_at) / MS_PER_MINUTE;

        let mut row = session.into_active_model();
        row.active = Set(false);
        if let Err(err) = row.update(db).await {
            log::warn!("failed to lazily deactivate expired session {id}: {err}");
        }

        return Ok(SessionValidation::Expired { expired_minutes_ago });
    }

    // Ceiling division; a session with seconds left still reports one minute.
    let remaining_minutes = (session.expired_at - now_ms + MS_PER_MINUTE - 1) / MS_PER_MINUTE;
    Ok(SessionValidation::Valid { remaining_minutes })
}

/// Administrative invalidation. Idempotent: deactivating an already-inactive
/// session reports success. Returns `false` only when the id is unknown.
pub async fn deactivate_session(db: &DatabaseConnection, session_id: &str) -> Result<bool, DbErr> {
    let Some(session) = Entity::find_by_id(session_id).one(db).await? else {
        return Ok(false);
    };

    if session.active {
        let mut row = session.into_active_model();
        row.active = Set(false);
        row.update(db).await?;
        log::info!("deactivated qr session {session_id}");
    }

    Ok(true)
}

/// Hard-deletes every session with `now > expired_at`, active or not, and
/// returns the number removed. Validation does not depend on this sweep; it
/// only bounds storage growth.
pub async fn clean_expired_sessions(db: &DatabaseConnection, now_ms: i64) -> Result<u64, DbErr> {
    let result = Entity::delete_many()
        .filter(Column::ExpiredAt.lt(now_ms))
        .exec(db)
        .await?;

    if result.rows_affected > 0 {
        log::info!("cleaned {} expired qr session(s)", result.rows_affected);
    }
    Ok(result.rows_affected)
}

/// A live session as listed for administrative/debug use.
#[derive(Debug, Clone, Serialize)]
pub struct ActiveSession {
    pub session_id: String,
    pub created_at: i64,
    pub expired_at: i64,
    pub remaining_minutes: i64,
}

/// Sessions that are both active and unexpired at `now_ms`.
pub async fn list_active_sessions(
    db: &DatabaseConnection,
    now_ms: i64,
) -> Result<Vec<ActiveSession>, DbErr> {
    let rows = Entity::find()
        .filter(Column::Active.eq(true))
        .filter(Column::ExpiredAt.gte(now_ms))
        .all(db)
        .await?;

    Ok(rows
        .into_iter()
        .map(|s| ActiveSession {
            remaining_minutes: (s.expired_at - now_ms + MS_PER_MINUTE - 1) / MS_PER_MINUTE,
            session_id: s.id,
            created_at: s.created_at,
            expired_at: s.expired_at,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use db::test_utils::setup_test_db;

    #[test]
    fn session_ids_embed_timestamp_and_differ() {
        let a = generate_session_id(1_700_000_000_000);
        let b = generate_session_id(1_700_000_000_000);
        assert!(a.starts_with("qr_1700000000000_"));
        assert_eq!(a.len(), "qr_1700000000000_".len() + 8);
        assert_ne!(a, b);
    }

    #[test]
    fn scan_payload_rejects_garbage_before_any_store_call() {
        assert_eq!(parse_scan_payload("not json"), Err(ScanError::Malformed));
        assert_eq!(parse_scan_payload("{}"), Err(ScanError::MissingSessionId));
        assert_eq!(
            parse_scan_payload(r#"{"sessionId":""}"#),
            Err(ScanError::MissingSessionId)
        );
    }

    #[test]
    fn scan_payload_parses_printed_format() {
        let payload =
            parse_scan_payload(r#" {"sessionId":"qr_1_abc","expiredAt":42} "#).unwrap();
        assert_eq!(payload.session_id, "qr_1_abc");
        assert_eq!(payload.expired_at, 42);

        // expiredAt is advisory; old codes without it still parse.
        let bare = parse_scan_payload(r#"{"sessionId":"qr_1_abc"}"#).unwrap();
        assert_eq!(bare.expired_at, 0);
    }

    #[tokio::test]
    async fn fresh_session_validates_with_full_remaining_time() {
        let db = setup_test_db().await;
        let session = create_session(&db, 5).await.unwrap();
        assert_eq!(session.expired_at - session.created_at, 5 * MS_PER_MINUTE);

        let verdict = validate_session(&db, Some(&session.id), session.created_at + 1)
            .await
            .unwrap();
        match verdict {
            SessionValidation::Valid { remaining_minutes } => {
                assert!((4..=5).contains(&remaining_minutes));
            }
            other => panic!("expected valid session, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn out_of_range_durations_are_rejected_not_persisted() {
        let db = setup_test_db().await;
        for duration in [0, MAX_SESSION_MINUTES + 1, u64::MAX] {
            assert!(
                matches!(
                    create_session(&db, duration).await,
                    Err(ServiceError::Rejected(_))
                ),
                "duration {duration} must be rejected"
            );
        }
        assert!(
            Entity::find().all(&db).await.unwrap().is_empty(),
            "rejected creation must not leave a row behind"
        );
    }

    #[tokio::test]
    async fn created_sessions_never_expire_before_creation() {
        let db = setup_test_db().await;
        let session = create_session(&db, MAX_SESSION_MINUTES).await.unwrap();
        assert!(session.expired_at > session.created_at);
        assert_eq!(
            session.expired_at - session.created_at,
            MAX_SESSION_MINUTES as i64 * MS_PER_MINUTE
        );
    }

    #[tokio::test]
    async fn remaining_minutes_round_up_not_down() {
        let db = setup_test_db().await;
        let session = create_session(&db, 5).await.unwrap();

        // Ten seconds left still counts as one minute.
        assert_eq!(
            validate_session(&db, Some(&session.id), session.expired_at - 10_000)
                .await
                .unwrap(),
            SessionValidation::Valid {
                remaining_minutes: 1
            }
        );
        // One millisecond past a whole minute rounds to the next one.
        assert_eq!(
            validate_session(
                &db,
                Some(&session.id),
                session.expired_at - MS_PER_MINUTE - 1
            )
            .await
            .unwrap(),
            SessionValidation::Valid {
                remaining_minutes: 2
            }
        );
    }

    #[tokio::test]
    async fn missing_and_unknown_ids_are_distinguished() {
        let db = setup_test_db().await;
        let now = Utc::now().timestamp_millis();

        assert_eq!(
            validate_session(&db, None, now).await.unwrap(),
            SessionValidation::Missing
        );
        assert_eq!(
            validate_session(&db, Some("   "), now).await.unwrap(),
            SessionValidation::Missing
        );
        assert_eq!(
            validate_session(&db, Some("qr_0_nothere"), now).await.unwrap(),
            SessionValidation::NotFound
        );
    }

    #[tokio::test]
    async fn expiry_is_observed_once_then_session_stays_inactive() {
        let db = setup_test_db().await;
        let session = create_session(&db, 5).await.unwrap();

        // Two minutes past expiry: first observation reports Expired and
        // lazily deactivates the row.
        let late = session.expired_at + 2 * MS_PER_MINUTE + 1;
        assert_eq!(
            validate_session(&db, Some(&session.id), late).await.unwrap(),
            SessionValidation::Expired {
                expired_minutes_ago: 2
            }
        );

        // Any later observation sees the deactivated row, even if the caller's
        // clock moved backwards into the originally-valid window.
        assert_eq!(
            validate_session(&db, Some(&session.id), late + 1).await.unwrap(),
            SessionValidation::Inactive
        );
        assert_eq!(
            validate_session(&db, Some(&session.id), session.created_at + 1)
                .await
                .unwrap(),
            SessionValidation::Inactive
        );
    }

    #[tokio::test]
    async fn deactivation_is_idempotent() {
        let db = setup_test_db().await;
        let session = create_session(&db, 5).await.unwrap();

        assert!(deactivate_session(&db, &session.id).await.unwrap());
        assert!(deactivate_session(&db, &session.id).await.unwrap());
        assert!(!deactivate_session(&db, "qr_0_nothere").await.unwrap());

        assert_eq!(
            validate_session(&db, Some(&session.id), session.created_at + 1)
                .await
                .unwrap(),
            SessionValidation::Inactive
        );
    }

    #[tokio::test]
    async fn cleanup_removes_exactly_the_expired_sessions() {
        let db = setup_test_db().await;
        let now = Utc::now().timestamp_millis();

        let expired_active = create_session(&db, 5).await.unwrap();
        let expired_inactive = create_session(&db, 5).await.unwrap();
        let live = create_session(&db, 60).await.unwrap();

        // Push two sessions into the past; deactivate one of them to show the
        // sweep ignores the active flag.
        for (id, active) in [(&expired_active.id, true), (&expired_inactive.id, false)] {
            let mut row = Entity::find_by_id(id.as_str())
                .one(&db)
                .await
                .unwrap()
                .unwrap()
                .into_active_model();
            row.expired_at = Set(now - MS_PER_MINUTE);
            row.active = Set(active);
            row.update(&db).await.unwrap();
        }

        assert_eq!(clean_expired_sessions(&db, now).await.unwrap(), 2);
        assert!(
            Entity::find_by_id(live.id.as_str())
                .one(&db)
                .await
                .unwrap()
                .is_some(),
            "unexpired session must survive the sweep"
        );
    }

    #[tokio::test]
    async fn listing_skips_expired_and_deactivated_sessions() {
        let db = setup_test_db().await;
        let now = Utc::now().timestamp_millis();

        let live = create_session(&db, 10).await.unwrap();
        let dead = create_session(&db, 10).await.unwrap();
        deactivate_session(&db, &dead.id).await.unwrap();

        let listed = list_active_sessions(&db, now).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].session_id, live.id);
        assert!(listed[0].remaining_minutes >= 9);
    }
}
