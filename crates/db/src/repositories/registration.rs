//! Registration repository.
//!
//! The write path runs inside a caller-owned transaction that already holds
//! the booking row lock, see [`super::BookingRepository::lock_by_id`].

use std::collections::HashMap;
use std::sync::Arc;

use eventhub_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait,
    FromQueryResult, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
};

use crate::entities::{Registration, registration};

const BOOKING_USER_INDEX: &str = "idx_registration_booking_user";

/// Repository for registration operations.
#[derive(Clone)]
pub struct RegistrationRepository {
    db: Arc<DatabaseConnection>,
}

#[derive(Debug, FromQueryResult)]
struct BookingCount {
    booking_id: String,
    count: i64,
}

impl RegistrationRepository {
    /// Create a new registration repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a user's registration for a booking.
    pub async fn find_by_booking_and_user(
        &self,
        txn: &DatabaseTransaction,
        booking_id: &str,
        user_id: &str,
    ) -> AppResult<Option<registration::Model>> {
        Registration::find()
            .filter(registration::Column::BookingId.eq(booking_id))
            .filter(registration::Column::UserId.eq(user_id))
            .one(txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count registrations for a booking.
    pub async fn count_by_booking(
        &self,
        txn: &DatabaseTransaction,
        booking_id: &str,
    ) -> AppResult<u64> {
        Registration::find()
            .filter(registration::Column::BookingId.eq(booking_id))
            .count(txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Insert a registration.
    ///
    /// A clash on the `(booking_id, user_id)` index is reported as
    /// [`AppError::AlreadyRegistered`].
    pub async fn insert(
        &self,
        txn: &DatabaseTransaction,
        model: registration::ActiveModel,
    ) -> AppResult<registration::Model> {
        model.insert(txn).await.map_err(|e| {
            if super::is_unique_violation(&e, BOOKING_USER_INDEX) {
                AppError::AlreadyRegistered("Already registered for this event".to_string())
            } else {
                AppError::Database(e.to_string())
            }
        })
    }

    /// List a user's registrations, newest first.
    pub async fn find_by_user(&self, user_id: &str) -> AppResult<Vec<registration::Model>> {
        Registration::find()
            .filter(registration::Column::UserId.eq(user_id))
            .order_by_desc(registration::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Registration counts per booking. Bookings without registrations are absent.
    pub async fn count_by_bookings(&self, booking_ids: &[String]) -> AppResult<HashMap<String, u64>> {
        if booking_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = Registration::find()
            .select_only()
            .column(registration::Column::BookingId)
            .column_as(registration::Column::Id.count(), "count")
            .filter(registration::Column::BookingId.is_in(booking_ids.to_vec()))
            .group_by(registration::Column::BookingId)
            .into_model::<BookingCount>()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(rows
            .into_iter()
            .map(|row| (row.booking_id, row.count.max(0) as u64))
            .collect())
    }
}
