//! API endpoints.

mod bookings;
mod events;
mod registrations;
mod users;
mod venues;

use axum::Router;

use crate::middleware::AppState;

pub use bookings::BookingResponse;
pub use events::EventResponse;
pub use registrations::RegistrationResponse;
pub use users::UserResponse;
pub use venues::VenueResponse;

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/bookings", bookings::router())
        .nest("/registrations", registrations::router())
        .nest("/venues", venues::router())
        .nest("/events", events::router())
        .nest("/users", users::router())
}
