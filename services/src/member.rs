//! Member registry: registered members plus the pending queue of card UIDs
//! the scanner has seen but nobody has registered yet.

use crate::error::{ServiceError, ServiceResult};
use chrono::Local;
use db::models::{member, pending_member};
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder, Set,
};
use util::partition::format_timestamp;

/// Input for a registration, as captured from the admin form.
#[derive(Debug, Clone)]
pub struct NewMember {
    pub id: String,
    pub name: String,
    pub nim: String,
    pub field: String,
}

impl NewMember {
    fn trimmed(self) -> Self {
        Self {
            id: self.id.trim().to_owned(),
            name: self.name.trim().to_owned(),
            nim: self.nim.trim().to_owned(),
            field: self.field.trim().to_owned(),
        }
    }
}

/// Registers a member. Rejects blank fields, an already-registered UID, and
/// a NIM that belongs to someone else. On success the UID's pending entry,
/// if any, is consumed.
pub async fn register_member(
    db: &DatabaseConnection,
    input: NewMember,
) -> ServiceResult<member::Model> {
    let input = input.trimmed();
    if input.id.is_empty() || input.name.is_empty() || input.nim.is_empty() {
        return Err(ServiceError::rejected("UID, name and NIM are required"));
    }

    if member::Entity::find_by_id(&input.id).one(db).await?.is_some() {
        return Err(ServiceError::rejected(format!(
            "UID {} is already registered",
            input.id
        )));
    }

    let nim_taken = member::Entity::find()
        .filter(member::Column::Nim.eq(&input.nim))
        .one(db)
        .await?
        .is_some();
    if nim_taken {
        return Err(ServiceError::rejected(format!(
            "NIM {} is already registered",
            input.nim
        )));
    }

    let created = member::Entity::insert(member::ActiveModel {
        id: Set(input.id.clone()),
        name: Set(input.name),
        nim: Set(input.nim),
        field: Set(input.field),
        registered_at: Set(format_timestamp(Local::now())),
    })
    .exec_with_returning(db)
    .await?;

    pending_member::Entity::delete_by_id(&input.id).exec(db).await?;

    log::info!("registered member {} ({})", created.id, created.name);
    Ok(created)
}

/// Notes a UID the scanner saw that has no registration. Idempotent: the
/// first sighting's timestamp is kept. Returns whether a new entry was made.
pub async fn touch_pending(db: &DatabaseConnection, uid: &str) -> Result<bool, DbErr> {
    let uid = uid.trim();
    if uid.is_empty() {
        return Ok(false);
    }

    let row = pending_member::ActiveModel {
        id: Set(uid.to_owned()),
        first_seen: Set(format_timestamp(Local::now())),
    };

    match pending_member::Entity::insert(row)
        .on_conflict(
            OnConflict::column(pending_member::Column::Id)
                .do_nothing()
                .to_owned(),
        )
        .exec(db)
        .await
    {
        Ok(_) => {
            log::info!("unregistered uid {uid} queued for registration");
            Ok(true)
        }
        Err(DbErr::RecordNotInserted) => Ok(false),
        Err(err) => Err(err),
    }
}

pub async fn get_member(
    db: &DatabaseConnection,
    uid: &str,
) -> Result<Option<member::Model>, DbErr> {
    member::Entity::find_by_id(uid).one(db).await
}

/// All registered members, newest registration first.
pub async fn list_members(db: &DatabaseConnection) -> Result<Vec<member::Model>, DbErr> {
    member::Entity::find()
        .order_by_desc(member::Column::RegisteredAt)
        .all(db)
        .await
}

/// Unregistered UIDs awaiting an admin, oldest sighting first.
pub async fn list_pending(db: &DatabaseConnection) -> Result<Vec<pending_member::Model>, DbErr> {
    pending_member::Entity::find()
        .order_by_asc(pending_member::Column::FirstSeen)
        .all(db)
        .await
}

/// Removes a member from the registry. Attendance rows are handled
/// separately by the caller. Returns `false` for an unknown UID.
pub async fn delete_member(db: &DatabaseConnection, uid: &str) -> Result<bool, DbErr> {
    let result = member::Entity::delete_by_id(uid).exec(db).await?;
    if result.rows_affected > 0 {
        log::info!("deleted member {uid}");
    }
    Ok(result.rows_affected > 0)
}

/// Drops a UID from the pending queue without registering it.
pub async fn delete_pending(db: &DatabaseConnection, uid: &str) -> Result<bool, DbErr> {
    let result = pending_member::Entity::delete_by_id(uid).exec(db).await?;
    Ok(result.rows_affected > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use db::test_utils::setup_test_db;

    fn input(id: &str, nim: &str) -> NewMember {
        NewMember {
            id: id.to_owned(),
            name: "Alya".to_owned(),
            nim: nim.to_owned(),
            field: "Multimedia".to_owned(),
        }
    }

    #[tokio::test]
    async fn registration_trims_input_and_stores_a_timestamp() {
        let db = setup_test_db().await;
        let created = register_member(&db, input("  04a1b2 ", " 230401001 "))
            .await
            .unwrap();
        assert_eq!(created.id, "04a1b2");
        assert_eq!(created.nim, "230401001");
        assert_eq!(created.registered_at.len(), 19);
    }

    #[tokio::test]
    async fn duplicate_uid_and_nim_are_rejected() {
        let db = setup_test_db().await;
        register_member(&db, input("04a1b2", "230401001"))
            .await
            .unwrap();

        let same_uid = register_member(&db, input("04a1b2", "230401002")).await;
        assert!(matches!(same_uid, Err(ServiceError::Rejected(msg)) if msg.contains("UID")));

        let same_nim = register_member(&db, input("04c3d4", "230401001")).await;
        assert!(matches!(same_nim, Err(ServiceError::Rejected(msg)) if msg.contains("NIM")));

        assert_eq!(list_members(&db).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn blank_fields_are_rejected() {
        let db = setup_test_db().await;
        let mut blank = input("04a1b2", "230401001");
        blank.name = "   ".to_owned();
        assert!(matches!(
            register_member(&db, blank).await,
            Err(ServiceError::Rejected(_))
        ));
    }

    #[tokio::test]
    async fn registering_consumes_the_pending_entry() {
        let db = setup_test_db().await;
        assert!(touch_pending(&db, "04a1b2").await.unwrap());
        assert!(!touch_pending(&db, "04a1b2").await.unwrap());
        assert_eq!(list_pending(&db).await.unwrap().len(), 1);

        register_member(&db, input("04a1b2", "230401001"))
            .await
            .unwrap();
        assert!(list_pending(&db).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_member_reports_whether_anything_was_removed() {
        let db = setup_test_db().await;
        register_member(&db, input("04a1b2", "230401001"))
            .await
            .unwrap();

        assert!(delete_member(&db, "04a1b2").await.unwrap());
        assert!(!delete_member(&db, "04a1b2").await.unwrap());
        assert!(get_member(&db, "04a1b2").await.unwrap().is_none());
    }
}
