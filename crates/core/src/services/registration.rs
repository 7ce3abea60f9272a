//! Registration gate.
//!
//! Registering runs in one transaction that holds a row lock on the booking,
//! so concurrent registrations for the same booking are counted one at a
//! time and capacity cannot be overshot.

use std::collections::HashMap;

use chrono::Utc;
use eventhub_common::{AppError, AppResult, IdGenerator};
use eventhub_db::entities::{booking, event, registration, user, venue};
use eventhub_db::repositories::{
    BookingRepository, EventRepository, RegistrationRepository, VenueRepository,
};
use sea_orm::Set;

use super::permissions;

/// A registration with the booking it holds a seat in.
#[derive(Debug, Clone)]
pub struct RegistrationDetails {
    pub registration: registration::Model,
    pub booking: booking::Model,
    pub event: Option<event::Model>,
    pub venue: Option<venue::Model>,
}

/// Service for student registrations.
#[derive(Clone)]
pub struct RegistrationService {
    registration_repo: RegistrationRepository,
    booking_repo: BookingRepository,
    event_repo: EventRepository,
    venue_repo: VenueRepository,
    id_gen: IdGenerator,
}

impl RegistrationService {
    /// Create a new registration service.
    #[must_use]
    pub const fn new(
        registration_repo: RegistrationRepository,
        booking_repo: BookingRepository,
        event_repo: EventRepository,
        venue_repo: VenueRepository,
    ) -> Self {
        Self {
            registration_repo,
            booking_repo,
            event_repo,
            venue_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Take a seat in an approved booking.
    pub async fn register(
        &self,
        actor: &user::Model,
        booking_id: &str,
    ) -> AppResult<registration::Model> {
        if !permissions::can_register(actor) {
            return Err(AppError::Forbidden("Cannot register for events".to_string()));
        }

        let txn = self.booking_repo.begin().await?;

        let booking = self
            .booking_repo
            .lock_by_id(&txn, booking_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Booking: {booking_id}")))?;

        if booking.status != booking::BookingStatus::Approved {
            return Err(AppError::InvalidState(format!(
                "Booking is {}; registration opens once it is approved",
                booking.status.as_str()
            )));
        }

        if self
            .registration_repo
            .find_by_booking_and_user(&txn, &booking.id, &actor.id)
            .await?
            .is_some()
        {
            return Err(AppError::AlreadyRegistered(
                "Already registered for this event".to_string(),
            ));
        }

        let venue = self
            .venue_repo
            .get_by_id_in(&txn, &booking.venue_id)
            .await?;
        let count = self
            .registration_repo
            .count_by_booking(&txn, &booking.id)
            .await?;

        if count >= u64::try_from(venue.capacity).unwrap_or(0) {
            return Err(AppError::CapacityReached(format!(
                "{} is full ({} seats)",
                venue.name, venue.capacity
            )));
        }

        let model = registration::ActiveModel {
            id: Set(self.id_gen.generate()),
            booking_id: Set(booking.id.clone()),
            user_id: Set(actor.id.clone()),
            event_id: Set(booking.event_id.clone()),
            created_at: Set(Utc::now().into()),
        };

        let registration = self.registration_repo.insert(&txn, model).await?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        tracing::info!(
            booking_id = %booking.id,
            user_id = %actor.id,
            seats_taken = count + 1,
            capacity = venue.capacity,
            "Registered for booking"
        );

        Ok(registration)
    }

    /// The actor's registrations, soonest booking first.
    pub async fn list_for_user(&self, actor: &user::Model) -> AppResult<Vec<RegistrationDetails>> {
        let registrations = self.registration_repo.find_by_user(&actor.id).await?;
        if registrations.is_empty() {
            return Ok(vec![]);
        }

        let booking_ids: Vec<String> = registrations.iter().map(|r| r.booking_id.clone()).collect();
        let bookings: HashMap<String, booking::Model> = self
            .booking_repo
            .find_by_ids(&booking_ids)
            .await?
            .into_iter()
            .map(|b| (b.id.clone(), b))
            .collect();

        let mut event_ids: Vec<String> = bookings.values().map(|b| b.event_id.clone()).collect();
        event_ids.sort_unstable();
        event_ids.dedup();
        let mut venue_ids: Vec<String> = bookings.values().map(|b| b.venue_id.clone()).collect();
        venue_ids.sort_unstable();
        venue_ids.dedup();

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

        let mut details: Vec<RegistrationDetails> = registrations
            .into_iter()
            .filter_map(|registration| {
                let booking = bookings.get(&registration.booking_id)?.clone();
                Some(RegistrationDetails {
                    event: events.get(&booking.event_id).cloned(),
                    venue: venues.get(&booking.venue_id).cloned(),
                    booking,
                    registration,
                })
            })
            .collect();

        details.sort_by_key(|d| d.booking.start_time);
        Ok(details)
    }
}
