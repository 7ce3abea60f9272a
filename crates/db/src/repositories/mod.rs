//! Database repositories.

mod booking;
mod event;
mod registration;
mod user;
mod venue;

pub use booking::BookingRepository;
pub use event::EventRepository;
pub use registration::RegistrationRepository;
pub use user::UserRepository;
pub use venue::VenueRepository;

use sea_orm::{DbErr, SqlErr};

/// Whether a write failed on the unique index named `index`.
///
/// Postgres names the violated index in the message; drivers and mocks
/// without a structured SQL error are matched on the error text.
pub(crate) fn is_unique_violation(err: &DbErr, index: &str) -> bool {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(message)) => message.contains(index),
        _ => err.to_string().contains(index),
    }
}
