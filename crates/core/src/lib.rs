//! Core business logic for eventhub.
//!
//! Booking lifecycle, venue conflict detection and the registration gate,
//! plus the venue, event and user services around them.

pub mod services;

pub use services::*;
