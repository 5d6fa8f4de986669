// migration: create_members
use sea_orm_migration::prelude::*;

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m202608150001_create_members"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // members: the registered-users store (`users/terdaftar` in the
        // legacy layout). The id is the card/scanner UID, not a surrogate.
        manager
            .create_table(
                Table::create()
                    .table(Alias::new("members"))
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Alias::new("id"))
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Alias::new("name")).string().not_null())
                    .col(ColumnDef::new(Alias::new("nim")).string().not_null())
                    .col(ColumnDef::new(Alias::new("field")).string().not_null())
                    .col(
                        ColumnDef::new(Alias::new("registered_at"))
                            .string()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_members_nim")
                    .table(Alias::new("members"))
                    .col(Alias::new("nim"))
                    .unique()
                    .to_owned(),
            )
            .await?;

        // pending_members: UIDs seen by the hardware scanner but not yet
        // registered (`users/belum_terdaftar`).
        manager
            .create_table(
                Table::create()
                    .table(Alias::new("pending_members"))
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Alias::new("id"))
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Alias::new("first_seen"))
                            .string()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(
                Table::drop()
                    .table(Alias::new("pending_members"))
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(Table::drop().table(Alias::new("members")).to_owned())
            .await
    }
}
