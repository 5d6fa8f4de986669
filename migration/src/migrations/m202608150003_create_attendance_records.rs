// migration: create_attendance_records
use sea_orm_migration::prelude::*;

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m202608150003_create_attendance_records"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // attendance_records: the hierarchical year/month/week/day/uid path of
        // the legacy store flattened into a composite primary key. Components
        // stay strings with their historic formatting (zero-padded month/day,
        // `minggu-N`) so exported paths remain byte-identical.
        manager
            .create_table(
                Table::create()
                    .table(Alias::new("attendance_records"))
                    .if_not_exists()
                    .col(ColumnDef::new(Alias::new("year")).string_len(4).not_null())
                    .col(
                        ColumnDef::new(Alias::new("month"))
                            .string_len(2)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Alias::new("week")).string().not_null())
                    .col(ColumnDef::new(Alias::new("day")).string_len(2).not_null())
                    .col(ColumnDef::new(Alias::new("member_id")).string().not_null())
                    .col(
                        ColumnDef::new(Alias::new("member_name"))
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Alias::new("recorded_at"))
                            .string()
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .col(Alias::new("year"))
                            .col(Alias::new("month"))
                            .col(Alias::new("week"))
                            .col(Alias::new("day"))
                            .col(Alias::new("member_id")),
                    )
                    .to_owned(),
            )
            .await?;

        // Reporting reads per member (bulk delete, latest-per-member).
        manager
            .create_index(
                Index::create()
                    .name("idx_attendance_records_member")
                    .table(Alias::new("attendance_records"))
                    .col(Alias::new("member_id"))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(
                Table::drop()
                    .table(Alias::new("attendance_records"))
                    .to_owned(),
            )
            .await
    }
}
