//! User endpoints.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, put},
};
use eventhub_common::AppResult;
use eventhub_db::entities::user;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// User response. The bearer token is never exposed.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: user::Role,
    pub created_at: String,
}

impl From<user::Model> for UserResponse {
    fn from(u: user::Model) -> Self {
        Self {
            id: u.id,
            name: u.name,
            email: u.email,
            role: u.role,
            created_at: u.created_at.to_rfc3339(),
        }
    }
}

/// Change role request.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateRoleRequest {
    /// `student`, `club_admin` or `super_admin`.
    #[validate(length(min = 1, max = 20))]
    pub role: String,
}

/// List every user.
async fn list(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<UserResponse>>> {
    let users = state.user_service.list(&user).await?;

    Ok(ApiResponse::ok(users.into_iter().map(Into::into).collect()))
}

/// Change a user's role.
async fn update_role(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateRoleRequest>,
) -> AppResult<ApiResponse<UserResponse>> {
    req.validate()?;

    let updated = state.user_service.update_role(&user, &id, &req.role).await?;

    Ok(ApiResponse::ok(updated.into()))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list))
        .route("/{id}/role", put(update_role))
}
