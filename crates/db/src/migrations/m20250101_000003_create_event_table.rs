//! Create event table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Event::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Event::Id).string_len(32).not_null().primary_key())
                    .col(ColumnDef::new(Event::Name).string_len(256).not_null())
                    .col(ColumnDef::new(Event::Description).text().not_null())
                    .col(ColumnDef::new(Event::ClubName).string_len(256).not_null())
                    .col(
                        ColumnDef::new(Event::Category)
                            .string_len(20)
                            .not_null()
                            .default("Seminar"),
                    )
                    .col(ColumnDef::new(Event::OrganizerId).string_len(32).not_null())
                    .col(
                        ColumnDef::new(Event::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_event_organizer")
                            .from(Event::Table, Event::OrganizerId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: organizer_id (for listing a club admin's events)
        manager
            .create_index(
                Index::create()
                    .name("idx_event_organizer_id")
                    .table(Event::Table)
                    .col(Event::OrganizerId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Event::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Event {
    Table,
    Id,
    Name,
    Description,
    ClubName,
    Category,
    OrganizerId,
    CreatedAt,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}
