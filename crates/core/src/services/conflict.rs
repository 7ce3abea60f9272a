//! Venue conflict detection.
//!
//! Slots are half-open intervals `[start, end)`: a booking that ends at the
//! instant another begins does not overlap it. Only approved bookings hold a
//! venue; pending, rejected and cancelled ones never block a request.

use eventhub_common::{AppError, AppResult};
use eventhub_db::repositories::BookingRepository;
use sea_orm::prelude::DateTimeWithTimeZone;
use serde::Serialize;

/// The approved booking that occupies a requested slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConflictingBooking {
    pub booking_id: String,
    pub event_id: String,
    pub start_time: DateTimeWithTimeZone,
    pub end_time: DateTimeWithTimeZone,
}

impl From<ConflictingBooking> for AppError {
    fn from(conflict: ConflictingBooking) -> Self {
        Self::BookingConflict {
            event_id: conflict.event_id,
            start_time: conflict.start_time,
            end_time: conflict.end_time,
        }
    }
}

/// Whether `[a_start, a_end)` and `[b_start, b_end)` share any instant.
#[must_use]
pub fn overlaps<T: PartialOrd>(a_start: &T, a_end: &T, b_start: &T, b_end: &T) -> bool {
    a_start < b_end && b_start < a_end
}

/// Checks requested slots against approved bookings.
#[derive(Clone)]
pub struct ConflictDetector {
    booking_repo: BookingRepository,
}

impl ConflictDetector {
    #[must_use]
    pub const fn new(booking_repo: BookingRepository) -> Self {
        Self { booking_repo }
    }

    /// Find an approved booking in `venue_id` overlapping `[start, end)`.
    ///
    /// `exclude_booking_id` skips the booking being re-checked.
    pub async fn check_conflict(
        &self,
        venue_id: &str,
        start: DateTimeWithTimeZone,
        end: DateTimeWithTimeZone,
        exclude_booking_id: Option<&str>,
    ) -> AppResult<Option<ConflictingBooking>> {
        let existing = self
            .booking_repo
            .find_approved_overlapping(venue_id, start, end, exclude_booking_id)
            .await?;

        Ok(existing
            .filter(|b| overlaps(&b.start_time, &b.end_time, &start, &end))
            .map(|b| ConflictingBooking {
                booking_id: b.id,
                event_id: b.event_id,
                start_time: b.start_time,
                end_time: b.end_time,
            }))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, TimeZone, Utc};
    use eventhub_db::entities::booking;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn at(day: u32, hour: u32) -> DateTimeWithTimeZone {
        FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(2025, 1, day, hour, 0, 0)
            .unwrap()
    }

    fn approved(id: &str, start: u32, end: u32) -> booking::Model {
        booking::Model {
            id: id.to_string(),
            event_id: format!("event-{id}"),
            venue_id: "venue1".to_string(),
            user_id: "club1".to_string(),
            start_time: at(10, start),
            end_time: at(10, end),
            status: booking::BookingStatus::Approved,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    #[test]
    fn test_overlaps_half_open() {
        // [9, 11) vs [10, 12)
        assert!(overlaps(&9, &11, &10, &12));
        // containment
        assert!(overlaps(&9, &17, &10, &11));
        // back to back
        assert!(!overlaps(&10, &11, &11, &12));
        assert!(!overlaps(&11, &12, &10, &11));
        // disjoint
        assert!(!overlaps(&8, &9, &10, &11));
    }

    #[test]
    fn test_overlaps_with_timestamps() {
        assert!(overlaps(&at(10, 9), &at(10, 11), &at(10, 10), &at(10, 12)));
        assert!(!overlaps(&at(10, 9), &at(10, 11), &at(10, 11), &at(10, 13)));
    }

    #[tokio::test]
    async fn test_check_conflict_names_existing_event() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[approved("b1", 9, 11)]])
                .into_connection(),
        );

        let detector = ConflictDetector::new(BookingRepository::new(db));
        let conflict = detector
            .check_conflict("venue1", at(10, 10), at(10, 12), None)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(conflict.booking_id, "b1");
        assert_eq!(conflict.event_id, "event-b1");
        assert_eq!(conflict.start_time, at(10, 9));
        assert_eq!(conflict.end_time, at(10, 11));
    }

    #[tokio::test]
    async fn test_check_conflict_clear() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<booking::Model>::new()])
                .into_connection(),
        );

        let detector = ConflictDetector::new(BookingRepository::new(db));
        let conflict = detector
            .check_conflict("venue1", at(10, 11), at(10, 13), None)
            .await
            .unwrap();

        assert!(conflict.is_none());
    }

    #[test]
    fn test_conflict_converts_to_app_error() {
        let err: AppError = ConflictingBooking {
            booking_id: "b1".to_string(),
            event_id: "event1".to_string(),
            start_time: at(10, 9),
            end_time: at(10, 11),
        }
        .into();

        assert_eq!(err.error_code(), "BOOKING_CONFLICT");
    }
}
