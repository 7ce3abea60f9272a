//! HTTP API layer for eventhub.
//!
//! JSON endpoints under `/api` for bookings, registrations, venues, events
//! and users. Callers authenticate with a bearer token resolved by
//! [`middleware::auth_middleware`]; handlers receive the user through
//! [`extractors::AuthUser`].
//!
//! Built on Axum 0.8.

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod response;

pub use endpoints::router;
pub use middleware::AppState;
