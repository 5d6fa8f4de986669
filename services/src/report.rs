//! Reporting over the partitioned attendance rows: flattened logs, per-day
//! grouping, and the present/absent split for the current day.
//!
//! Rows written by earlier deployments occasionally carry partition strings
//! that do not parse as dates. Reporting never drops them; they are flagged
//! `malformed` and sorted last so an operator can find and fix them.

use db::models::attendance_record::{Column, Entity, Model};
use db::models::member;
use sea_orm::{ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use util::partition::{PartitionPath, time_part};

/// One attendance row lifted out of its partition for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlatRecord {
    pub member_id: String,
    pub member_name: String,
    /// `YYYY-MM-DD` assembled from the partition key.
    pub date: String,
    /// `HH:mm:ss` from the stored timestamp, empty when absent.
    pub time: String,
    pub recorded_at: String,
    /// Set when the partition components do not form a plausible date.
    pub malformed: bool,
}

fn is_malformed(row: &Model) -> bool {
    let numeric = |s: &str, len: usize| s.len() == len && s.bytes().all(|b| b.is_ascii_digit());
    !(numeric(&row.year, 4) && numeric(&row.month, 2) && numeric(&row.day, 2))
}

fn flatten(row: Model) -> FlatRecord {
    let malformed = is_malformed(&row);
    FlatRecord {
        date: format!("{}-{}-{}", row.year, row.month, row.day),
        time: time_part(&row.recorded_at).unwrap_or("").to_owned(),
        member_id: row.member_id,
        member_name: row.member_name,
        recorded_at: row.recorded_at,
        malformed,
    }
}

/// Every attendance row, flattened, newest first. Malformed rows sort after
/// all well-formed ones.
pub async fn flatten_all(db: &DatabaseConnection) -> Result<Vec<FlatRecord>, DbErr> {
    let mut records: Vec<FlatRecord> = Entity::find()
        .all(db)
        .await?
        .into_iter()
        .map(flatten)
        .collect();

    records.sort_by(|a, b| {
        a.malformed
            .cmp(&b.malformed)
            .then_with(|| b.date.cmp(&a.date))
            .then_with(|| b.time.cmp(&a.time))
            .then_with(|| a.member_name.cmp(&b.member_name))
    });
    Ok(records)
}

/// One day's worth of log entries.
#[derive(Debug, Clone, Serialize)]
pub struct DayLog {
    pub date: String,
    pub entries: Vec<FlatRecord>,
}

/// The full log grouped by day, newest day first. Malformed rows land in a
/// trailing group keyed by their raw partition date.
pub async fn daily_log(db: &DatabaseConnection) -> Result<Vec<DayLog>, DbErr> {
    let records = flatten_all(db).await?;

    let mut well_formed: BTreeMap<String, Vec<FlatRecord>> = BTreeMap::new();
    let mut malformed: BTreeMap<String, Vec<FlatRecord>> = BTreeMap::new();
    for record in records {
        let bucket = if record.malformed {
            &mut malformed
        } else {
            &mut well_formed
        };
        bucket.entry(record.date.clone()).or_default().push(record);
    }

    let mut days: Vec<DayLog> = well_formed
        .into_iter()
        .rev()
        .map(|(date, entries)| DayLog { date, entries })
        .collect();
    days.extend(
        malformed
            .into_iter()
            .map(|(date, entries)| DayLog { date, entries }),
    );
    Ok(days)
}

/// The present/absent split for one day partition.
#[derive(Debug, Clone, Serialize)]
pub struct PresenceReport {
    pub date: String,
    /// Members with a row in the partition, most recent scan first.
    pub present: Vec<PresentMember>,
    /// Registered members without a row, alphabetical.
    pub absent: Vec<member::Model>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PresentMember {
    pub member_id: String,
    pub name: String,
    pub nim: String,
    pub field: String,
    pub recorded_at: String,
}

/// Joins the day's attendance rows against the registry. A row whose UID was
/// since purged from the registry still counts as present, with blank
/// registry columns.
pub async fn presence_for(
    db: &DatabaseConnection,
    path: &PartitionPath,
) -> Result<PresenceReport, DbErr> {
    let rows = Entity::find()
        .filter(Column::Year.eq(&path.year))
        .filter(Column::Month.eq(&path.month))
        .filter(Column::Week.eq(&path.week))
        .filter(Column::Day.eq(&path.day))
        .order_by_desc(Column::RecordedAt)
        .all(db)
        .await?;

    let members = member::Entity::find()
        .order_by_asc(member::Column::Name)
        .all(db)
        .await?;
    let registry: HashMap<&str, &member::Model> =
        members.iter().map(|m| (m.id.as_str(), m)).collect();

    let present: Vec<PresentMember> = rows
        .iter()
        .map(|row| {
            let known = registry.get(row.member_id.as_str());
            PresentMember {
                member_id: row.member_id.clone(),
                name: row.member_name.clone(),
                nim: known.map(|m| m.nim.clone()).unwrap_or_default(),
                field: known.map(|m| m.field.clone()).unwrap_or_default(),
                recorded_at: row.recorded_at.clone(),
            }
        })
        .collect();

    let present_ids: HashMap<&str, ()> =
        rows.iter().map(|r| (r.member_id.as_str(), ())).collect();
    let absent = members
        .iter()
        .filter(|m| !present_ids.contains_key(m.id.as_str()))
        .cloned()
        .collect();

    Ok(PresenceReport {
        date: path.date_string(),
        present,
        absent,
    })
}

/// A member's most recent attendance, for the registry detail view.
#[derive(Debug, Clone, Serialize)]
pub struct MemberLatest {
    pub member_id: String,
    pub member_name: String,
    pub last_seen: String,
}

/// The latest well-formed scan per member, ordered most recent first.
pub async fn latest_per_member(db: &DatabaseConnection) -> Result<Vec<MemberLatest>, DbErr> {
    let records = flatten_all(db).await?;

    let mut latest: Vec<MemberLatest> = Vec::new();
    let mut seen: HashMap<String, ()> = HashMap::new();
    for record in records.into_iter().filter(|r| !r.malformed) {
        if seen.insert(record.member_id.clone(), ()).is_none() {
            latest.push(MemberLatest {
                member_id: record.member_id,
                member_name: record.member_name,
                last_seen: record.recorded_at,
            });
        }
    }
    Ok(latest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use db::models::attendance_record::ActiveModel;
    use db::test_utils::setup_test_db;
    use sea_orm::{ActiveModelTrait, Set};

    async fn seed_record(
        db: &DatabaseConnection,
        (year, month, week, day): (&str, &str, &str, &str),
        member_id: &str,
        name: &str,
        recorded_at: &str,
    ) {
        ActiveModel {
            year: Set(year.to_owned()),
            month: Set(month.to_owned()),
            week: Set(week.to_owned()),
            day: Set(day.to_owned()),
            member_id: Set(member_id.to_owned()),
            member_name: Set(name.to_owned()),
            recorded_at: Set(recorded_at.to_owned()),
        }
        .insert(db)
        .await
        .unwrap();
    }

    async fn seed_member(db: &DatabaseConnection, id: &str, name: &str, nim: &str) {
        member::ActiveModel {
            id: Set(id.to_owned()),
            name: Set(name.to_owned()),
            nim: Set(nim.to_owned()),
            field: Set("Programming".to_owned()),
            registered_at: Set("2026-01-01 08:00:00".to_owned()),
        }
        .insert(db)
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn flatten_orders_newest_first_with_malformed_last() {
        let db = setup_test_db().await;
        seed_record(
            &db,
            ("2026", "08", "minggu-2", "09"),
            "a",
            "Alya",
            "2026-08-09 07:15:00",
        )
        .await;
        seed_record(
            &db,
            ("2026", "08", "minggu-2", "10"),
            "b",
            "Bima",
            "2026-08-10 07:02:00",
        )
        .await;
        seed_record(&db, ("20xx", "08", "minggu-1", "03"), "c", "Cita", "").await;

        let flat = flatten_all(&db).await.unwrap();
        assert_eq!(flat.len(), 3);
        assert_eq!(flat[0].member_name, "Bima");
        assert_eq!(flat[0].date, "2026-08-10");
        assert_eq!(flat[0].time, "07:02:00");
        assert_eq!(flat[1].member_name, "Alya");
        assert!(flat[2].malformed, "unparseable year must be flagged");
        assert_eq!(flat[2].time, "");
    }

    #[tokio::test]
    async fn daily_log_groups_by_date_newest_day_first() {
        let db = setup_test_db().await;
        for (day, member_id, at) in [
            ("09", "a", "2026-08-09 07:15:00"),
            ("09", "b", "2026-08-09 08:00:00"),
            ("10", "a", "2026-08-10 07:02:00"),
        ] {
            seed_record(&db, ("2026", "08", "minggu-2", day), member_id, "x", at).await;
        }

        let days = daily_log(&db).await.unwrap();
        assert_eq!(days.len(), 2);
        assert_eq!(days[0].date, "2026-08-10");
        assert_eq!(days[0].entries.len(), 1);
        assert_eq!(days[1].date, "2026-08-09");
        assert_eq!(days[1].entries.len(), 2);
    }

    #[tokio::test]
    async fn presence_splits_present_and_absent_for_the_partition() {
        let db = setup_test_db().await;
        seed_member(&db, "a", "Alya", "230401001").await;
        seed_member(&db, "b", "Bima", "230401002").await;
        seed_member(&db, "c", "Cita", "230401003").await;

        let path = PartitionPath::for_date(NaiveDate::from_ymd_opt(2026, 8, 9).unwrap());
        seed_record(
            &db,
            ("2026", "08", "minggu-2", "09"),
            "a",
            "Alya",
            "2026-08-09 07:15:00",
        )
        .await;
        seed_record(
            &db,
            ("2026", "08", "minggu-2", "09"),
            "b",
            "Bima",
            "2026-08-09 08:40:00",
        )
        .await;
        // A different day must not bleed into today's report.
        seed_record(
            &db,
            ("2026", "08", "minggu-2", "10"),
            "c",
            "Cita",
            "2026-08-10 07:00:00",
        )
        .await;

        let report = presence_for(&db, &path).await.unwrap();
        assert_eq!(report.date, "2026-08-09");
        assert_eq!(report.present.len(), 2);
        assert_eq!(report.present[0].name, "Bima", "latest scan first");
        assert_eq!(report.present[0].nim, "230401002");
        assert_eq!(report.absent.len(), 1);
        assert_eq!(report.absent[0].name, "Cita");
    }

    #[tokio::test]
    async fn presence_keeps_rows_for_purged_members() {
        let db = setup_test_db().await;
        let path = PartitionPath::for_date(NaiveDate::from_ymd_opt(2026, 8, 9).unwrap());
        seed_record(
            &db,
            ("2026", "08", "minggu-2", "09"),
            "gone",
            "Ghost",
            "2026-08-09 07:15:00",
        )
        .await;

        let report = presence_for(&db, &path).await.unwrap();
        assert_eq!(report.present.len(), 1);
        assert_eq!(report.present[0].name, "Ghost");
        assert_eq!(report.present[0].nim, "");
    }

    #[tokio::test]
    async fn latest_per_member_keeps_one_row_each() {
        let db = setup_test_db().await;
        seed_record(
            &db,
            ("2026", "08", "minggu-2", "09"),
            "a",
            "Alya",
            "2026-08-09 07:15:00",
        )
        .await;
        seed_record(
            &db,
            ("2026", "08", "minggu-2", "10"),
            "a",
            "Alya",
            "2026-08-10 07:02:00",
        )
        .await;
        seed_record(
            &db,
            ("2026", "08", "minggu-2", "09"),
            "b",
            "Bima",
            "2026-08-09 08:00:00",
        )
        .await;

        let latest = latest_per_member(&db).await.unwrap();
        assert_eq!(latest.len(), 2);
        assert_eq!(latest[0].member_id, "a");
        assert_eq!(latest[0].last_seen, "2026-08-10 07:02:00");
    }
}
