//! User service.

use eventhub_common::{AppError, AppResult};
use eventhub_db::entities::user;
use eventhub_db::repositories::UserRepository;

use super::permissions;

/// User service for business logic.
#[derive(Clone)]
pub struct UserService {
    user_repo: UserRepository,
}

impl UserService {
    /// Create a new user service.
    #[must_use]
    pub const fn new(user_repo: UserRepository) -> Self {
        Self { user_repo }
    }

    /// Resolve a bearer token to its user.
    pub async fn authenticate_by_token(&self, token: &str) -> AppResult<user::Model> {
        self.user_repo
            .find_by_token(token)
            .await?
            .ok_or(AppError::Unauthorized)
    }

    /// List every user.
    pub async fn list(&self, actor: &user::Model) -> AppResult<Vec<user::Model>> {
        if !permissions::can_moderate(actor) {
            return Err(AppError::Forbidden("Only super admins can list users".to_string()));
        }

        self.user_repo.find_all().await
    }

    /// Change a user's role.
    pub async fn update_role(
        &self,
        actor: &user::Model,
        user_id: &str,
        role: &str,
    ) -> AppResult<user::Model> {
        if !permissions::can_moderate(actor) {
            return Err(AppError::Forbidden("Only super admins can change roles".to_string()));
        }

        let role: user::Role = role.parse().map_err(AppError::Validation)?;
        let target = self.user_repo.get_by_id(user_id).await?;

        let updated = self.user_repo.update_role(&target.id, role).await?;

        tracing::info!(
            user_id = %updated.id,
            from = target.role.as_str(),
            to = updated.role.as_str(),
            actor = %actor.id,
            "User role changed"
        );

        Ok(updated)
    }
}
