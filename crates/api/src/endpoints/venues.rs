//! Venue endpoints.

use axum::{Json, Router, extract::State, routing::get};
use eventhub_common::AppResult;
use eventhub_core::CreateVenueInput;
use eventhub_db::entities::venue;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// Venue response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VenueResponse {
    pub id: String,
    pub name: String,
    pub location: String,
    pub capacity: i32,
    pub created_at: String,
}

impl From<venue::Model> for VenueResponse {
    fn from(v: venue::Model) -> Self {
        Self {
            id: v.id,
            name: v.name,
            location: v.location,
            capacity: v.capacity,
            created_at: v.created_at.to_rfc3339(),
        }
    }
}

/// Create venue request.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateVenueRequest {
    #[validate(length(max = 100))]
    pub name: Option<String>,
    #[validate(length(max = 200))]
    pub location: Option<String>,
    pub capacity: Option<i32>,
}

/// Add a venue.
async fn create(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<CreateVenueRequest>,
) -> AppResult<ApiResponse<VenueResponse>> {
    req.validate()?;

    let input = CreateVenueInput {
        name: req.name,
        location: req.location,
        capacity: req.capacity,
    };
    let venue = state.venue_service.create(&user, input).await?;

    Ok(ApiResponse::created(venue.into()))
}

/// List venues by name.
async fn list(
    AuthUser(_user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<VenueResponse>>> {
    let venues = state.venue_service.list().await?;

    Ok(ApiResponse::ok(venues.into_iter().map(Into::into).collect()))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(list).post(create))
}
