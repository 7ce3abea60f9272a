//! Venue service.

use chrono::Utc;
use eventhub_common::{AppError, AppResult, IdGenerator};
use eventhub_db::entities::{user, venue};
use eventhub_db::repositories::VenueRepository;
use sea_orm::Set;
use serde::Deserialize;

use super::permissions;

/// Input for adding a venue.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateVenueInput {
    pub name: Option<String>,
    pub location: Option<String>,
    pub capacity: Option<i32>,
}

#[derive(Clone)]
pub struct VenueService {
    venue_repo: VenueRepository,
    id_gen: IdGenerator,
}

impl VenueService {
    #[must_use]
    pub const fn new(venue_repo: VenueRepository) -> Self {
        Self {
            venue_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Add a venue. Names are trimmed and must be unique.
    pub async fn create(
        &self,
        actor: &user::Model,
        input: CreateVenueInput,
    ) -> AppResult<venue::Model> {
        if !permissions::can_moderate(actor) {
            return Err(AppError::Forbidden(
                "Only super admins can add venues".to_string(),
            ));
        }

        let name = input.name.as_deref().map(str::trim).unwrap_or_default();
        let location = input.location.as_deref().map(str::trim).unwrap_or_default();
        if name.is_empty() || location.is_empty() {
            return Err(AppError::Validation(
                "name, location and capacity are required".to_string(),
            ));
        }

        let capacity = match input.capacity {
            Some(c) if c > 0 => c,
            Some(_) => {
                return Err(AppError::Validation(
                    "capacity must be a positive number".to_string(),
                ));
            }
            None => {
                return Err(AppError::Validation(
                    "name, location and capacity are required".to_string(),
                ));
            }
        };

        if self.venue_repo.find_by_name(name).await?.is_some() {
            return Err(AppError::Conflict(format!("Venue '{name}' already exists")));
        }

        let model = venue::ActiveModel {
            id: Set(self.id_gen.generate()),
            name: Set(name.to_string()),
            location: Set(location.to_string()),
            capacity: Set(capacity),
            created_at: Set(Utc::now().into()),
        };

        let venue = self.venue_repo.create(model).await?;

        tracing::info!(venue_id = %venue.id, name = %venue.name, capacity, "Venue created");

        Ok(venue)
    }

    pub async fn list(&self) -> AppResult<Vec<venue::Model>> {
        self.venue_repo.find_all().await
    }
}
