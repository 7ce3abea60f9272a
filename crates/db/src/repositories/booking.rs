//! Booking repository.

use std::sync::Arc;

use chrono::Utc;
use eventhub_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction,
    DbErr, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
    prelude::DateTimeWithTimeZone,
};

use crate::entities::{Booking, Registration, booking, registration};
use crate::migrations::BOOKING_OVERLAP_CONSTRAINT;

/// Repository for booking operations.
#[derive(Clone)]
pub struct BookingRepository {
    db: Arc<DatabaseConnection>,
}

impl BookingRepository {
    /// Create a new booking repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Start a transaction on the underlying connection.
    pub async fn begin(&self) -> AppResult<DatabaseTransaction> {
        self.db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a booking by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<booking::Model>> {
        Booking::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a booking by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<booking::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Booking: {id}")))
    }

    /// Find bookings by IDs.
    pub async fn find_by_ids(&self, ids: &[String]) -> AppResult<Vec<booking::Model>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        Booking::find()
            .filter(booking::Column::Id.is_in(ids.to_vec()))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Load a booking and hold a row lock on it until `txn` ends.
    ///
    /// Concurrent callers locking the same booking queue behind each other.
    pub async fn lock_by_id(
        &self,
        txn: &DatabaseTransaction,
        id: &str,
    ) -> AppResult<Option<booking::Model>> {
        Booking::find_by_id(id)
            .lock_exclusive()
            .one(txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List every booking, newest first.
    pub async fn find_all(&self) -> AppResult<Vec<booking::Model>> {
        Booking::find()
            .order_by_desc(booking::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List bookings requested by a user, newest first.
    pub async fn find_by_user(&self, user_id: &str) -> AppResult<Vec<booking::Model>> {
        Booking::find()
            .filter(booking::Column::UserId.eq(user_id))
            .order_by_desc(booking::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List bookings in a status by start time, optionally only those starting at or after `after`.
    pub async fn find_by_status(
        &self,
        status: booking::BookingStatus,
        after: Option<DateTimeWithTimeZone>,
    ) -> AppResult<Vec<booking::Model>> {
        let mut query = Booking::find().filter(booking::Column::Status.eq(status));

        if let Some(after) = after {
            query = query.filter(booking::Column::StartTime.gte(after));
        }

        query
            .order_by_asc(booking::Column::StartTime)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find the first approved booking in `venue_id` whose slot overlaps `[start, end)`.
    ///
    /// Slots are half-open, so a booking ending exactly at `start` does not overlap.
    pub async fn find_approved_overlapping(
        &self,
        venue_id: &str,
        start: DateTimeWithTimeZone,
        end: DateTimeWithTimeZone,
        exclude_id: Option<&str>,
    ) -> AppResult<Option<booking::Model>> {
        let mut query = Booking::find()
            .filter(booking::Column::VenueId.eq(venue_id))
            .filter(booking::Column::Status.eq(booking::BookingStatus::Approved))
            .filter(booking::Column::StartTime.lt(end))
            .filter(booking::Column::EndTime.gt(start));

        if let Some(exclude_id) = exclude_id {
            query = query.filter(booking::Column::Id.ne(exclude_id));
        }

        query
            .order_by_asc(booking::Column::StartTime)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new booking.
    pub async fn create(&self, model: booking::ActiveModel) -> AppResult<booking::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Persist the slot and status of `model`.
    ///
    /// When the store rejects the row for overlapping another approved
    /// booking, the clash is reported as [`AppError::BookingConflict`].
    pub async fn update(&self, model: &booking::Model) -> AppResult<booking::Model> {
        let active = booking::ActiveModel {
            id: Set(model.id.clone()),
            start_time: Set(model.start_time),
            end_time: Set(model.end_time),
            status: Set(model.status),
            updated_at: Set(Some(Utc::now().into())),
            ..Default::default()
        };

        match active.update(self.db.as_ref()).await {
            Ok(updated) => Ok(updated),
            Err(e) if is_overlap_violation(&e) => Err(self.overlap_error(model).await),
            Err(e) => Err(AppError::Database(e.to_string())),
        }
    }

    async fn overlap_error(&self, model: &booking::Model) -> AppError {
        match self
            .find_approved_overlapping(
                &model.venue_id,
                model.start_time,
                model.end_time,
                Some(&model.id),
            )
            .await
        {
            Ok(Some(existing)) => AppError::BookingConflict {
                event_id: existing.event_id,
                start_time: existing.start_time,
                end_time: existing.end_time,
            },
            Ok(None) => AppError::Conflict("Venue is already booked for this slot".to_string()),
            Err(e) => e,
        }
    }

    /// Delete a booking together with its registrations in one transaction.
    ///
    /// Returns the number of registrations removed. Nothing is deleted if
    /// any step fails.
    pub async fn delete_with_registrations(&self, id: &str) -> AppResult<u64> {
        let txn = self.begin().await?;

        let registrations = delete_registrations(&txn, id).await?;

        let result = Booking::delete_by_id(id)
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if result.rows_affected == 0 {
            txn.rollback()
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
            return Err(AppError::NotFound(format!("Booking: {id}")));
        }

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(registrations)
    }
}

async fn delete_registrations<C: ConnectionTrait>(conn: &C, booking_id: &str) -> AppResult<u64> {
    Registration::delete_many()
        .filter(registration::Column::BookingId.eq(booking_id))
        .exec(conn)
        .await
        .map(|r| r.rows_affected)
        .map_err(|e| AppError::Database(e.to_string()))
}

fn is_overlap_violation(err: &DbErr) -> bool {
    err.to_string().contains(BOOKING_OVERLAP_CONSTRAINT)
}
