//! Attendance recorder: one row per member per day partition.
//!
//! The per-day uniqueness guarantee lives in the store, not in application
//! logic: inserts go through `ON CONFLICT DO NOTHING` on the full partition
//! key, so two concurrent scans of the same card commit exactly one row and
//! the loser is reported as a duplicate rather than an error.

use db::models::attendance_record::{ActiveModel, Column, Entity, Model};
use db::models::member;
use sea_orm::sea_query::OnConflict;
use sea_orm::{ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Set};
use util::partition::PartitionPath;

/// What happened to a single scan.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordOutcome {
    /// This scan created the member's row for the day.
    Recorded(Model),
    /// A row for this member and day already existed; the stored row keeps
    /// the original timestamp.
    Duplicate(Model),
}

impl RecordOutcome {
    pub fn record(&self) -> &Model {
        match self {
            RecordOutcome::Recorded(m) | RecordOutcome::Duplicate(m) => m,
        }
    }
}

/// Records `member` as present in the `path` partition at `recorded_at`.
///
/// Losing the conflict race is not a failure: the stored row is fetched and
/// returned as `Duplicate` so callers can show who and when.
pub async fn record_attendance(
    db: &DatabaseConnection,
    member: &member::Model,
    path: &PartitionPath,
    recorded_at: &str,
) -> Result<RecordOutcome, DbErr> {
    let row = ActiveModel {
        year: Set(path.year.clone()),
        month: Set(path.month.clone()),
        week: Set(path.week.clone()),
        day: Set(path.day.clone()),
        member_id: Set(member.id.clone()),
        member_name: Set(member.name.clone()),
        recorded_at: Set(recorded_at.to_owned()),
    };

    let insert = Entity::insert(row).on_conflict(
        OnConflict::columns([
            Column::Year,
            Column::Month,
            Column::Week,
            Column::Day,
            Column::MemberId,
        ])
        .do_nothing()
        .to_owned(),
    );

    match insert.exec(db).await {
        Ok(_) => {
            log::info!(
                "recorded attendance for {} on {}",
                member.id,
                path.date_string()
            );
            Ok(RecordOutcome::Recorded(Model {
                year: path.year.clone(),
                month: path.month.clone(),
                week: path.week.clone(),
                day: path.day.clone(),
                member_id: member.id.clone(),
                member_name: member.name.clone(),
                recorded_at: recorded_at.to_owned(),
            }))
        }
        Err(DbErr::RecordNotInserted) => {
            let existing = find_record(db, path, &member.id).await?.ok_or_else(|| {
                DbErr::RecordNotFound(format!(
                    "attendance row for {} on {} vanished after conflict",
                    member.id,
                    path.date_string()
                ))
            })?;
            Ok(RecordOutcome::Duplicate(existing))
        }
        Err(err) => Err(err),
    }
}

/// The member's row in a given partition, if any.
pub async fn find_record(
    db: &DatabaseConnection,
    path: &PartitionPath,
    member_id: &str,
) -> Result<Option<Model>, DbErr> {
    Entity::find_by_id((
        path.year.clone(),
        path.month.clone(),
        path.week.clone(),
        path.day.clone(),
        member_id.to_owned(),
    ))
    .one(db)
    .await
}

/// Removes every attendance row a member has, across all partitions, and
/// returns how many were deleted. Used when a member is purged from the
/// registry.
pub async fn delete_member_attendance(
    db: &DatabaseConnection,
    member_id: &str,
) -> Result<u64, DbErr> {
    let result = Entity::delete_many()
        .filter(Column::MemberId.eq(member_id))
        .exec(db)
        .await?;

    if result.rows_affected > 0 {
        log::info!(
            "deleted {} attendance row(s) for member {member_id}",
            result.rows_affected
        );
    }
    Ok(result.rows_affected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use db::test_utils::setup_test_db;
    use sea_orm::ActiveModelTrait;

    async fn seed_member(db: &DatabaseConnection, id: &str, name: &str) -> member::Model {
        member::ActiveModel {
            id: Set(id.to_owned()),
            name: Set(name.to_owned()),
            nim: Set(format!("nim-{id}")),
            field: Set("Programming".to_owned()),
            registered_at: Set("2026-01-01 08:00:00".to_owned()),
        }
        .insert(db)
        .await
        .unwrap()
    }

    fn path(day: u32) -> PartitionPath {
        PartitionPath::for_date(NaiveDate::from_ymd_opt(2026, 8, day).unwrap())
    }

    #[tokio::test]
    async fn first_scan_writes_the_partition_row() {
        let db = setup_test_db().await;
        let member = seed_member(&db, "04a1b2", "Alya").await;

        let outcome = record_attendance(&db, &member, &path(9), "2026-08-09 07:15:00")
            .await
            .unwrap();
        let RecordOutcome::Recorded(row) = outcome else {
            panic!("first scan must record");
        };
        assert_eq!(row.week, "minggu-2");
        assert_eq!(row.day, "09");
        assert_eq!(row.member_name, "Alya");

        let stored = find_record(&db, &path(9), &member.id).await.unwrap().unwrap();
        assert_eq!(stored, row);
    }

    #[tokio::test]
    async fn second_scan_same_day_keeps_the_original_timestamp() {
        let db = setup_test_db().await;
        let member = seed_member(&db, "04a1b2", "Alya").await;
        let p = path(9);

        record_attendance(&db, &member, &p, "2026-08-09 07:15:00")
            .await
            .unwrap();
        let outcome = record_attendance(&db, &member, &p, "2026-08-09 09:30:00")
            .await
            .unwrap();

        let RecordOutcome::Duplicate(row) = outcome else {
            panic!("second scan must report duplicate");
        };
        assert_eq!(row.recorded_at, "2026-08-09 07:15:00");

        let all = Entity::find().all(&db).await.unwrap();
        assert_eq!(all.len(), 1, "duplicate scan must not add a row");
    }

    #[tokio::test]
    async fn same_member_on_another_day_is_a_fresh_row() {
        let db = setup_test_db().await;
        let member = seed_member(&db, "04a1b2", "Alya").await;

        record_attendance(&db, &member, &path(9), "2026-08-09 07:15:00")
            .await
            .unwrap();
        let outcome = record_attendance(&db, &member, &path(10), "2026-08-10 07:02:00")
            .await
            .unwrap();
        assert!(matches!(outcome, RecordOutcome::Recorded(_)));
        assert_eq!(Entity::find().all(&db).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn purge_removes_only_that_members_rows() {
        let db = setup_test_db().await;
        let alya = seed_member(&db, "04a1b2", "Alya").await;
        let bima = seed_member(&db, "04c3d4", "Bima").await;

        for day in [2, 9, 16] {
            record_attendance(&db, &alya, &path(day), "2026-08-02 07:00:00")
                .await
                .unwrap();
        }
        record_attendance(&db, &bima, &path(9), "2026-08-09 07:01:00")
            .await
            .unwrap();

        assert_eq!(delete_member_attendance(&db, &alya.id).await.unwrap(), 3);
        assert_eq!(delete_member_attendance(&db, &alya.id).await.unwrap(), 0);

        let survivors = Entity::find().all(&db).await.unwrap();
        assert_eq!(survivors.len(), 1);
        assert_eq!(survivors[0].member_id, bima.id);
    }
}
