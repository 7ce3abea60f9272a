//! Booking lifecycle service.
//!
//! A booking starts `pending`. A super admin moves it to `approved`,
//! `rejected` or `cancelled`; any edit of the time window sends it back to
//! `pending` for another review. Deleting a booking removes its
//! registrations with it.

use std::collections::{HashMap, HashSet};

use chrono::Utc;
use eventhub_common::{AppError, AppResult, IdGenerator};
use eventhub_db::entities::{booking, event, user, venue};
use eventhub_db::repositories::{
    BookingRepository, EventRepository, RegistrationRepository, UserRepository, VenueRepository,
};
use sea_orm::Set;
use sea_orm::prelude::DateTimeWithTimeZone;
use serde::Deserialize;

use super::conflict::ConflictDetector;
use super::permissions;

/// Input for requesting a booking. Every field is required.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingInput {
    pub event_id: Option<String>,
    pub venue_id: Option<String>,
    pub start_time: Option<DateTimeWithTimeZone>,
    pub end_time: Option<DateTimeWithTimeZone>,
}

/// Input for moving a booking's time window. Omitted fields keep their value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBookingInput {
    pub start_time: Option<DateTimeWithTimeZone>,
    pub end_time: Option<DateTimeWithTimeZone>,
}

/// A booking with its event, venue and requester resolved.
#[derive(Debug, Clone)]
pub struct BookingDetails {
    pub booking: booking::Model,
    pub event: Option<event::Model>,
    pub venue: Option<venue::Model>,
    pub requester: Option<user::Model>,
}

/// An approved booking as listed for students.
#[derive(Debug, Clone)]
pub struct ApprovedBooking {
    pub details: BookingDetails,
    pub registration_count: u64,
}

/// Service for the booking lifecycle.
#[derive(Clone)]
pub struct BookingService {
    booking_repo: BookingRepository,
    event_repo: EventRepository,
    venue_repo: VenueRepository,
    user_repo: UserRepository,
    registration_repo: RegistrationRepository,
    conflicts: ConflictDetector,
    id_gen: IdGenerator,
}

impl BookingService {
    /// Create a new booking service.
    #[must_use]
    pub fn new(
        booking_repo: BookingRepository,
        event_repo: EventRepository,
        venue_repo: VenueRepository,
        user_repo: UserRepository,
        registration_repo: RegistrationRepository,
    ) -> Self {
        Self {
            conflicts: ConflictDetector::new(booking_repo.clone()),
            booking_repo,
            event_repo,
            venue_repo,
            user_repo,
            registration_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Request a venue for an event. The booking is created `pending`.
    pub async fn create(
        &self,
        actor: &user::Model,
        input: CreateBookingInput,
    ) -> AppResult<booking::Model> {
        if !permissions::can_request_booking(actor) {
            return Err(AppError::Forbidden(
                "Only club admins can request bookings".to_string(),
            ));
        }

        let (Some(event_id), Some(venue_id), Some(start_time), Some(end_time)) = (
            input.event_id,
            input.venue_id,
            input.start_time,
            input.end_time,
        ) else {
            return Err(AppError::Validation(
                "eventId, venueId, startTime and endTime are required".to_string(),
            ));
        };

        validate_window(start_time, end_time)?;

        let event = self.event_repo.get_by_id(&event_id).await?;
        let venue = self.venue_repo.get_by_id(&venue_id).await?;

        if let Some(conflict) = self
            .conflicts
            .check_conflict(&venue.id, start_time, end_time, None)
            .await?
        {
            return Err(conflict.into());
        }

        let model = booking::ActiveModel {
            id: Set(self.id_gen.generate()),
            event_id: Set(event.id),
            venue_id: Set(venue.id),
            user_id: Set(actor.id.clone()),
            start_time: Set(start_time),
            end_time: Set(end_time),
            status: Set(booking::BookingStatus::Pending),
            created_at: Set(Utc::now().into()),
            updated_at: Set(None),
        };

        let booking = self.booking_repo.create(model).await?;

        tracing::info!(
            booking_id = %booking.id,
            venue_id = %booking.venue_id,
            requester = %actor.id,
            "Booking requested"
        );

        Ok(booking)
    }

    /// Review a booking: `approved`, `rejected` or `cancelled`.
    ///
    /// Approval re-checks the slot against the other approved bookings.
    pub async fn set_status(
        &self,
        actor: &user::Model,
        booking_id: &str,
        status: &str,
    ) -> AppResult<booking::Model> {
        if !permissions::can_moderate(actor) {
            return Err(AppError::Forbidden(
                "Only super admins can review bookings".to_string(),
            ));
        }

        let status = parse_review_status(status)?;
        let mut booking = self.booking_repo.get_by_id(booking_id).await?;

        if status == booking::BookingStatus::Approved
            && let Some(conflict) = self
                .conflicts
                .check_conflict(
                    &booking.venue_id,
                    booking.start_time,
                    booking.end_time,
                    Some(&booking.id),
                )
                .await?
        {
            return Err(conflict.into());
        }

        let previous = booking.status;
        booking.status = status;
        let booking = self.booking_repo.update(&booking).await?;

        tracing::info!(
            booking_id = %booking.id,
            from = previous.as_str(),
            to = booking.status.as_str(),
            actor = %actor.id,
            "Booking status changed"
        );

        Ok(booking)
    }

    /// Move a booking's time window. The booking goes back to `pending`.
    pub async fn update(
        &self,
        actor: &user::Model,
        booking_id: &str,
        input: UpdateBookingInput,
    ) -> AppResult<booking::Model> {
        let mut booking = self.booking_repo.get_by_id(booking_id).await?;

        if !permissions::can_mutate_booking(actor, &booking) {
            return Err(AppError::Forbidden("Not the booking owner".to_string()));
        }

        if let Some(start_time) = input.start_time {
            booking.start_time = start_time;
        }
        if let Some(end_time) = input.end_time {
            booking.end_time = end_time;
        }

        validate_window(booking.start_time, booking.end_time)?;

        if let Some(conflict) = self
            .conflicts
            .check_conflict(
                &booking.venue_id,
                booking.start_time,
                booking.end_time,
                Some(&booking.id),
            )
            .await?
        {
            return Err(conflict.into());
        }

        booking.status = booking::BookingStatus::Pending;
        let booking = self.booking_repo.update(&booking).await?;

        tracing::info!(booking_id = %booking.id, actor = %actor.id, "Booking rescheduled");

        Ok(booking)
    }

    /// Delete a booking and every registration for it.
    pub async fn delete(&self, actor: &user::Model, booking_id: &str) -> AppResult<()> {
        let booking = self.booking_repo.get_by_id(booking_id).await?;

        if !permissions::can_mutate_booking(actor, &booking) {
            return Err(AppError::Forbidden("Not the booking owner".to_string()));
        }

        let registrations = self
            .booking_repo
            .delete_with_registrations(&booking.id)
            .await?;

        tracing::info!(
            booking_id = %booking.id,
            registrations,
            actor = %actor.id,
            "Booking deleted"
        );

        Ok(())
    }

    /// Get a booking with its event, venue and requester.
    pub async fn get_by_id(&self, booking_id: &str) -> AppResult<BookingDetails> {
        let booking = self.booking_repo.get_by_id(booking_id).await?;
        let mut details = self.with_details(vec![booking]).await?;
        details
            .pop()
            .ok_or_else(|| AppError::NotFound(format!("Booking: {booking_id}")))
    }

    /// Every booking, newest first.
    pub async fn list_all(&self, actor: &user::Model) -> AppResult<Vec<BookingDetails>> {
        if !permissions::can_moderate(actor) {
            return Err(AppError::Forbidden(
                "Only super admins can list all bookings".to_string(),
            ));
        }

        let bookings = self.booking_repo.find_all().await?;
        self.with_details(bookings).await
    }

    /// Bookings the actor requested, newest first.
    pub async fn list_mine(&self, actor: &user::Model) -> AppResult<Vec<BookingDetails>> {
        if !permissions::can_request_booking(actor) {
            return Err(AppError::Forbidden(
                "Only club admins have bookings".to_string(),
            ));
        }

        let bookings = self.booking_repo.find_by_user(&actor.id).await?;
        self.with_details(bookings).await
    }

    /// Approved bookings by start time, with how many students registered.
    ///
    /// With `after`, only bookings starting at or after that instant are listed.
    pub async fn list_approved(
        &self,
        after: Option<DateTimeWithTimeZone>,
    ) -> AppResult<Vec<ApprovedBooking>> {
        let bookings = self
            .booking_repo
            .find_by_status(booking::BookingStatus::Approved, after)
            .await?;
        let ids: Vec<String> = bookings.iter().map(|b| b.id.clone()).collect();

        let details = self.with_details(bookings).await?;
        let counts = self.registration_repo.count_by_bookings(&ids).await?;

        Ok(details
            .into_iter()
            .map(|details| ApprovedBooking {
                registration_count: counts.get(&details.booking.id).copied().unwrap_or(0),
                details,
            })
            .collect())
    }

    async fn with_details(&self, bookings: Vec<booking::Model>) -> AppResult<Vec<BookingDetails>> {
        if bookings.is_empty() {
            return Ok(vec![]);
        }

        let event_ids = unique(bookings.iter().map(|b| &b.event_id));
        let venue_ids = unique(bookings.iter().map(|b| &b.venue_id));
        let user_ids = unique(bookings.iter().map(|b| &b.user_id));

        let events: HashMap<String, event::Model> = self
            .event_repo
            .find_by_ids(&event_ids)
            .await?
            .into_iter()
            .map(|e| (e.id.clone(), e))
            .collect();
        let venues: HashMap<String, venue::Model> = self
            .venue_repo
            .find_by_ids(&venue_ids)
            .await?
            .into_iter()
            .map(|v| (v.id.clone(), v))
            .collect();
        let users: HashMap<String, user::Model> = self
            .user_repo
            .find_by_ids(&user_ids)
            .await?
            .into_iter()
            .map(|u| (u.id.clone(), u))
            .collect();

        Ok(bookings
            .into_iter()
            .map(|booking| BookingDetails {
                event: events.get(&booking.event_id).cloned(),
                venue: venues.get(&booking.venue_id).cloned(),
                requester: users.get(&booking.user_id).cloned(),
                booking,
            })
            .collect())
    }
}

fn validate_window(start: DateTimeWithTimeZone, end: DateTimeWithTimeZone) -> AppResult<()> {
    if start >= end {
        return Err(AppError::Validation(
            "endTime must be after startTime".to_string(),
        ));
    }
    Ok(())
}

fn parse_review_status(status: &str) -> AppResult<booking::BookingStatus> {
    match status.parse::<booking::BookingStatus>() {
        Ok(
            s @ (booking::BookingStatus::Approved
            | booking::BookingStatus::Rejected
            | booking::BookingStatus::Cancelled),
        ) => Ok(s),
        _ => Err(AppError::Validation(format!(
            "Invalid status '{status}': expected approved, rejected or cancelled"
        ))),
    }
}

fn unique<'a>(ids: impl Iterator<Item = &'a String>) -> Vec<String> {
    let mut seen = HashSet::new();
    ids.filter(|id| seen.insert(*id)).cloned().collect()
}
