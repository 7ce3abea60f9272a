//! Database migrations.
//!
//! Schema migrations for the database.

#![allow(missing_docs)]

use sea_orm_migration::prelude::*;

mod m20250101_000001_create_user_table;
mod m20250101_000002_create_venue_table;
mod m20250101_000003_create_event_table;
mod m20250101_000004_create_booking_table;
mod m20250101_000005_create_registration_table;
mod m20250101_000006_add_booking_overlap_constraint;

pub use m20250101_000006_add_booking_overlap_constraint::BOOKING_OVERLAP_CONSTRAINT;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250101_000001_create_user_table::Migration),
            Box::new(m20250101_000002_create_venue_table::Migration),
            Box::new(m20250101_000003_create_event_table::Migration),
            Box::new(m20250101_000004_create_booking_table::Migration),
            Box::new(m20250101_000005_create_registration_table::Migration),
            Box::new(m20250101_000006_add_booking_overlap_constraint::Migration),
        ]
    }
}
