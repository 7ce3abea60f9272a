//! Create booking table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Booking::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Booking::Id).string_len(32).not_null().primary_key())
                    .col(ColumnDef::new(Booking::EventId).string_len(32).not_null())
                    .col(ColumnDef::new(Booking::VenueId).string_len(32).not_null())
                    .col(ColumnDef::new(Booking::UserId).string_len(32).not_null())
                    .col(
                        ColumnDef::new(Booking::StartTime)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Booking::EndTime)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Booking::Status)
                            .string_len(20)
                            .not_null()
                            .default("pending"),
                    )
                    .col(
                        ColumnDef::new(Booking::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Booking::UpdatedAt).timestamp_with_time_zone())
                    .check(Expr::col(Booking::StartTime).lt(Expr::col(Booking::EndTime)))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_booking_event")
                            .from(Booking::Table, Booking::EventId)
                            .to(Event::Table, Event::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_booking_venue")
                            .from(Booking::Table, Booking::VenueId)
                            .to(Venue::Table, Venue::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_booking_user")
                            .from(Booking::Table, Booking::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: (venue_id, status) - conflict detection scans approved bookings per venue
        manager
            .create_index(
                Index::create()
                    .name("idx_booking_venue_status")
                    .table(Booking::Table)
                    .col(Booking::VenueId)
                    .col(Booking::Status)
                    .to_owned(),
            )
            .await?;

        // Index: user_id (for "my bookings")
        manager
            .create_index(
                Index::create()
                    .name("idx_booking_user_id")
                    .table(Booking::Table)
                    .col(Booking::UserId)
                    .to_owned(),
            )
            .await?;

        // Index: event_id
        manager
            .create_index(
                Index::create()
                    .name("idx_booking_event_id")
                    .table(Booking::Table)
                    .col(Booking::EventId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Booking::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Booking {
    Table,
    Id,
    EventId,
    VenueId,
    UserId,
    StartTime,
    EndTime,
    Status,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Event {
    Table,
    Id,
}

#[derive(Iden)]
enum Venue {
    Table,
    Id,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}
