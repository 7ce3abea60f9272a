//! Business logic services.

#![allow(missing_docs)]

pub mod booking;
pub mod conflict;
pub mod event;
pub mod permissions;
pub mod registration;
pub mod user;
pub mod venue;

pub use booking::{
    ApprovedBooking, BookingDetails, BookingService, CreateBookingInput, UpdateBookingInput,
};
pub use conflict::{ConflictDetector, ConflictingBooking, overlaps};
pub use event::{CreateEventInput, EventService, EventWithOrganizer};
pub use registration::{RegistrationDetails, RegistrationService};
pub use user::UserService;
pub use venue::{CreateVenueInput, VenueService};
