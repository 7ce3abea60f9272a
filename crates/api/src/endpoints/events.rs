//! Event endpoints.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};
use eventhub_common::AppResult;
use eventhub_core::{CreateEventInput, EventWithOrganizer};
use eventhub_db::entities::event;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::users::UserResponse;
use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

// ==================== Request/Response Types ====================

/// Event response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventResponse {
    pub id: String,
    pub name: String,
    pub description: String,
    pub club_name: String,
    pub category: event::EventCategory,
    pub organizer_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organizer: Option<UserResponse>,
    pub created_at: String,
}

impl From<event::Model> for EventResponse {
    fn from(e: event::Model) -> Self {
        Self {
            id: e.id,
            name: e.name,
            description: e.description,
            club_name: e.club_name,
            category: e.category,
            organizer_id: e.organizer_id,
            organizer: None,
            created_at: e.created_at.to_rfc3339(),
        }
    }
}

impl From<EventWithOrganizer> for EventResponse {
    fn from(e: EventWithOrganizer) -> Self {
        Self {
            organizer: e.organizer.map(Into::into),
            ..Self::from(e.event)
        }
    }
}

/// Create event request.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventRequest {
    #[validate(length(max = 100))]
    pub name: Option<String>,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    #[validate(length(max = 100))]
    pub club_name: Option<String>,
    #[validate(length(max = 20))]
    pub category: Option<String>,
}

// ==================== Handlers ====================

/// Create an event.
async fn create(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<CreateEventRequest>,
) -> AppResult<ApiResponse<EventResponse>> {
    req.validate()?;

    let input = CreateEventInput {
        name: req.name,
        description: req.description,
        club_name: req.club_name,
        category: req.category,
    };
    let event = state.event_service.create(&user, input).await?;

    Ok(ApiResponse::created(event.into()))
}

/// List events, newest first.
async fn list(
    AuthUser(_user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<EventResponse>>> {
    let events = state.event_service.list().await?;

    Ok(ApiResponse::ok(events.into_iter().map(Into::into).collect()))
}

/// Show an event.
async fn show(
    AuthUser(_user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<EventResponse>> {
    let event = state.event_service.get_by_id(&id).await?;

    Ok(ApiResponse::ok(event.into()))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", get(show))
}
