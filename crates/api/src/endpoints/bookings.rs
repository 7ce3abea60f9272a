//! Booking endpoints.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::{get, put},
};
use chrono::{DateTime, FixedOffset};
use eventhub_common::AppResult;
use eventhub_core::{ApprovedBooking, BookingDetails, CreateBookingInput, UpdateBookingInput};
use eventhub_db::entities::booking;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{events::EventResponse, users::UserResponse, venues::VenueResponse};
use crate::{
    extractors::AuthUser,
    middleware::AppState,
    response::{ApiResponse, no_content},
};

// ==================== Request/Response Types ====================

/// Booking response.
///
/// `event`, `venue` and `requester` are present on reads; `registrationCount`
/// only on the public approved listing.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingResponse {
    pub id: String,
    pub event_id: String,
    pub venue_id: String,
    pub user_id: String,
    pub start_time: String,
    pub end_time: String,
    pub status: booking::BookingStatus,
    pub created_at: String,
    pub updated_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event: Option<EventResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub venue: Option<VenueResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requester: Option<UserResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registration_count: Option<u64>,
}

impl From<booking::Model> for BookingResponse {
    fn from(b: booking::Model) -> Self {
        Self {
            id: b.id,
            event_id: b.event_id,
            venue_id: b.venue_id,
            user_id: b.user_id,
            start_time: b.start_time.to_rfc3339(),
            end_time: b.end_time.to_rfc3339(),
            status: b.status,
            created_at: b.created_at.to_rfc3339(),
            updated_at: b.updated_at.map(|t| t.to_rfc3339()),
            event: None,
            venue: None,
            requester: None,
            registration_count: None,
        }
    }
}

impl From<BookingDetails> for BookingResponse {
    fn from(d: BookingDetails) -> Self {
        Self {
            event: d.event.map(Into::into),
            venue: d.venue.map(Into::into),
            requester: d.requester.map(Into::into),
            ..Self::from(d.booking)
        }
    }
}

impl From<ApprovedBooking> for BookingResponse {
    fn from(a: ApprovedBooking) -> Self {
        Self {
            registration_count: Some(a.registration_count),
            ..Self::from(a.details)
        }
    }
}

/// Create booking request.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingRequest {
    #[validate(length(min = 1, max = 32))]
    pub event_id: Option<String>,
    #[validate(length(min = 1, max = 32))]
    pub venue_id: Option<String>,
    pub start_time: Option<DateTime<FixedOffset>>,
    pub end_time: Option<DateTime<FixedOffset>>,
}

/// Reschedule booking request. Omitted fields keep their value.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBookingRequest {
    pub start_time: Option<DateTime<FixedOffset>>,
    pub end_time: Option<DateTime<FixedOffset>>,
}

/// Review request.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateStatusRequest {
    /// `approved`, `rejected` or `cancelled`.
    #[validate(length(min = 1, max = 20))]
    pub status: String,
}

/// Approved listing query.
#[derive(Debug, Deserialize)]
pub struct ApprovedQuery {
    /// Only bookings starting at or after this instant.
    pub after: Option<DateTime<FixedOffset>>,
}

// ==================== Handlers ====================

/// Request a venue for an event.
async fn create(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<CreateBookingRequest>,
) -> AppResult<ApiResponse<BookingResponse>> {
    req.validate()?;

    let input = CreateBookingInput {
        event_id: req.event_id,
        venue_id: req.venue_id,
        start_time: req.start_time,
        end_time: req.end_time,
    };
    let booking = state.booking_service.create(&user, input).await?;

    Ok(ApiResponse::created(booking.into()))
}

/// List every booking.
async fn list_all(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<BookingResponse>>> {
    let bookings = state.booking_service.list_all(&user).await?;

    Ok(ApiResponse::ok(bookings.into_iter().map(Into::into).collect()))
}

/// List the caller's own bookings.
async fn list_mine(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<BookingResponse>>> {
    let bookings = state.booking_service.list_mine(&user).await?;

    Ok(ApiResponse::ok(bookings.into_iter().map(Into::into).collect()))
}

/// List approved bookings with registration counts.
async fn list_approved(
    AuthUser(_user): AuthUser,
    State(state): State<AppState>,
    Query(query): Query<ApprovedQuery>,
) -> AppResult<ApiResponse<Vec<BookingResponse>>> {
    let bookings = state.booking_service.list_approved(query.after).await?;

    Ok(ApiResponse::ok(bookings.into_iter().map(Into::into).collect()))
}

/// Show a booking.
async fn show(
    AuthUser(_user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<BookingResponse>> {
    let booking = state.booking_service.get_by_id(&id).await?;

    Ok(ApiResponse::ok(booking.into()))
}

/// Reschedule a booking.
async fn update(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateBookingRequest>,
) -> AppResult<ApiResponse<BookingResponse>> {
    let input = UpdateBookingInput {
        start_time: req.start_time,
        end_time: req.end_time,
    };
    let booking = state.booking_service.update(&user, &id, input).await?;

    Ok(ApiResponse::ok(booking.into()))
}

/// Approve, reject or cancel a booking.
async fn update_status(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateStatusRequest>,
) -> AppResult<ApiResponse<BookingResponse>> {
    req.validate()?;

    let booking = state
        .booking_service
        .set_status(&user, &id, &req.status)
        .await?;

    Ok(ApiResponse::ok(booking.into()))
}

/// Delete a booking and its registrations.
async fn delete(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    state.booking_service.delete(&user, &id).await?;

    Ok(no_content())
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_all).post(create))
        .route("/public/approved", get(list_approved))
        .route("/my-bookings", get(list_mine))
        .route("/{id}", get(show).put(update).delete(delete))
        .route("/{id}/status", put(update_status))
}
