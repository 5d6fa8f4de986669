use sea_orm::entity::prelude::*;

/// A time-boxed scan authorization distributed via QR code.
///
/// `created_at` and `expired_at` are milliseconds since the Unix epoch;
/// validity is always recomputed from the stored `expired_at` against the
/// caller's clock, never cached.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, serde::Serialize)]
#[sea_orm(table_name = "qr_sessions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub active: bool,
    pub created_at: i64,
    pub expired_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
