//! Event service.

use std::collections::HashMap;

use chrono::Utc;
use eventhub_common::{AppError, AppResult, IdGenerator};
use eventhub_db::entities::{event, user};
use eventhub_db::repositories::{EventRepository, UserRepository};
use sea_orm::Set;
use serde::Deserialize;

use super::permissions;

/// Input for creating an event.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub club_name: Option<String>,
    /// One of `Workshop`, `Competition`, `Seminar`, `Cultural`, `Other`.
    /// Defaults to `Seminar`.
    pub category: Option<String>,
}

/// An event with the user who organizes it.
#[derive(Debug, Clone)]
pub struct EventWithOrganizer {
    pub event: event::Model,
    pub organizer: Option<user::Model>,
}

#[derive(Clone)]
pub struct EventService {
    event_repo: EventRepository,
    user_repo: UserRepository,
    id_gen: IdGenerator,
}

impl EventService {
    #[must_use]
    pub const fn new(event_repo: EventRepository, user_repo: UserRepository) -> Self {
        Self {
            event_repo,
            user_repo,
            id_gen: IdGenerator::new(),
        }
    }

    pub async fn create(
        &self,
        actor: &user::Model,
        input: CreateEventInput,
    ) -> AppResult<event::Model> {
        if !permissions::can_request_booking(actor) {
            return Err(AppError::Forbidden(
                "Only club admins can create events".to_string(),
            ));
        }

        let name = required(input.name.as_deref(), "name")?;
        let description = required(input.description.as_deref(), "description")?;
        let club_name = required(input.club_name.as_deref(), "clubName")?;

        let category = match input.category.as_deref() {
            None | Some("") => event::EventCategory::default(),
            Some(c) => c.parse().map_err(AppError::Validation)?,
        };

        let model = event::ActiveModel {
            id: Set(self.id_gen.generate()),
            name: Set(name),
            description: Set(description),
            club_name: Set(club_name),
            category: Set(category),
            organizer_id: Set(actor.id.clone()),
            created_at: Set(Utc::now().into()),
        };

        let event = self.event_repo.create(model).await?;

        tracing::info!(event_id = %event.id, organizer = %actor.id, "Event created");

        Ok(event)
    }

    pub async fn get_by_id(&self, id: &str) -> AppResult<event::Model> {
        self.event_repo.get_by_id(id).await
    }

    /// All events, newest first, with their organizers.
    pub async fn list(&self) -> AppResult<Vec<EventWithOrganizer>> {
        let events = self.event_repo.find_all().await?;

        let mut organizer_ids: Vec<String> =
            events.iter().map(|e| e.organizer_id.clone()).collect();
        organizer_ids.sort_unstable();
        organizer_ids.dedup();

        let organizers: HashMap<String, user::Model> = self
            .user_repo
            .find_by_ids(&organizer_ids)
            .await?
            .into_iter()
            .map(|u| (u.id.clone(), u))
            .collect();

        Ok(events
            .into_iter()
            .map(|event| EventWithOrganizer {
                organizer: organizers.get(&event.organizer_id).cloned(),
                event,
            })
            .collect())
    }
}

fn required(value: Option<&str>, field: &str) -> AppResult<String> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(AppError::Validation(format!("{field} is required"))),
    }
}
