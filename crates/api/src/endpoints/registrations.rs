//! Registration endpoints.

use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use eventhub_common::AppResult;
use eventhub_core::RegistrationDetails;
use eventhub_db::entities::registration;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{bookings::BookingResponse, events::EventResponse, venues::VenueResponse};
use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// Registration response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationResponse {
    pub id: String,
    pub booking_id: String,
    pub user_id: String,
    pub event_id: String,
    pub created_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub booking: Option<BookingResponse>,
}

impl From<registration::Model> for RegistrationResponse {
    fn from(r: registration::Model) -> Self {
        Self {
            id: r.id,
            booking_id: r.booking_id,
            user_id: r.user_id,
            event_id: r.event_id,
            created_at: r.created_at.to_rfc3339(),
            booking: None,
        }
    }
}

impl From<RegistrationDetails> for RegistrationResponse {
    fn from(d: RegistrationDetails) -> Self {
        let mut booking = BookingResponse::from(d.booking);
        booking.event = d.event.map(EventResponse::from);
        booking.venue = d.venue.map(VenueResponse::from);

        Self {
            booking: Some(booking),
            ..Self::from(d.registration)
        }
    }
}

/// Register request.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[validate(required, length(min = 1, max = 32))]
    pub booking_id: Option<String>,
}

/// Register for an approved booking.
async fn register(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> AppResult<ApiResponse<RegistrationResponse>> {
    req.validate()?;

    let booking_id = req.booking_id.unwrap_or_default();
    let registration = state
        .registration_service
        .register(&user, &booking_id)
        .await?;

    Ok(ApiResponse::created(registration.into()))
}

/// List the caller's registrations.
async fn list_mine(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<RegistrationResponse>>> {
    let registrations = state.registration_service.list_for_user(&user).await?;

    Ok(ApiResponse::ok(
        registrations.into_iter().map(Into::into).collect(),
    ))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(register))
        .route("/my-registrations", get(list_mine))
}
