//! Database entities.

pub mod booking;
pub mod event;
pub mod registration;
pub mod user;
pub mod venue;

pub use booking::Entity as Booking;
pub use event::Entity as Event;
pub use registration::Entity as Registration;
pub use user::Entity as User;
pub use venue::Entity as Venue;
