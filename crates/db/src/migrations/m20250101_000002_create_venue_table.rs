//! Create venue table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Venue::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Venue::Id).string_len(32).not_null().primary_key())
                    .col(ColumnDef::new(Venue::Name).string_len(128).not_null())
                    .col(ColumnDef::new(Venue::Location).string_len(256).not_null())
                    .col(
                        ColumnDef::new(Venue::Capacity)
                            .integer()
                            .not_null()
                            .check(Expr::col(Venue::Capacity).gt(0)),
                    )
                    .col(
                        ColumnDef::new(Venue::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique index: name
        manager
            .create_index(
                Index::create()
                    .name("idx_venue_name")
                    .table(Venue::Table)
                    .col(Venue::Name)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Venue::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Venue {
    Table,
    Id,
    Name,
    Location,
    Capacity,
    CreatedAt,
}
