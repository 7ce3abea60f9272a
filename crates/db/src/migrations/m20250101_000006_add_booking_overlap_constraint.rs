//! Forbid overlapping approved bookings in the same venue at the store level.
//!
//! The service-level conflict check is a pre-check; two instances approving
//! overlapping bookings at the same moment are only stopped by this constraint.

use sea_orm_migration::prelude::*;

/// Name of the exclusion constraint, matched when translating violations.
pub const BOOKING_OVERLAP_CONSTRAINT: &str = "booking_no_approved_overlap";

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Needed for `venue_id WITH =` inside a GiST index
        manager
            .get_connection()
            .execute_unprepared("CREATE EXTENSION IF NOT EXISTS btree_gist;")
            .await?;

        manager
            .get_connection()
            .execute_unprepared(&format!(
                r"
                ALTER TABLE booking
                ADD CONSTRAINT {BOOKING_OVERLAP_CONSTRAINT}
                EXCLUDE USING gist (
                    venue_id WITH =,
                    tstzrange(start_time, end_time, '[)') WITH &&
                )
                WHERE (status = 'approved');
                "
            ))
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared(&format!(
                "ALTER TABLE booking DROP CONSTRAINT IF EXISTS {BOOKING_OVERLAP_CONSTRAINT};"
            ))
            .await?;

        Ok(())
    }
}
