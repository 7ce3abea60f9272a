//! Venue repository.

use std::sync::Arc;

use crate::entities::{Venue, venue};
use eventhub_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait,
    QueryFilter, QueryOrder,
};

/// Venue repository for database operations.
#[derive(Clone)]
pub struct VenueRepository {
    db: Arc<DatabaseConnection>,
}

impl VenueRepository {
    /// Create a new venue repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a venue by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<venue::Model>> {
        Venue::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a venue by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<venue::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Venue: {id}")))
    }

    /// Find a venue by ID on an open transaction, returning an error if not found.
    ///
    /// Callers holding row locks read through here so the lookup does not wait
    /// on a second pooled connection.
    pub async fn get_by_id_in(
        &self,
        txn: &DatabaseTransaction,
        id: &str,
    ) -> AppResult<venue::Model> {
        Venue::find_by_id(id)
            .one(txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
            .ok_or_else(|| AppError::NotFound(format!("Venue: {id}")))
    }

    /// Find venues by IDs.
    pub async fn find_by_ids(&self, ids: &[String]) -> AppResult<Vec<venue::Model>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        Venue::find()
            .filter(venue::Column::Id.is_in(ids.to_vec()))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a venue by exact name.
    pub async fn find_by_name(&self, name: &str) -> AppResult<Option<venue::Model>> {
        Venue::find()
            .filter(venue::Column::Name.eq(name))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List venues by name.
    pub async fn find_all(&self) -> AppResult<Vec<venue::Model>> {
        Venue::find()
            .order_by_asc(venue::Column::Name)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new venue.
    pub async fn create(&self, model: venue::ActiveModel) -> AppResult<venue::Model> {
        model.insert(self.db.as_ref()).await.map_err(|e| {
            if super::is_unique_violation(&e, "idx_venue_name") {
                AppError::Conflict("A venue with this name already exists".to_string())
            } else {
                AppError::Database(e.to_string())
            }
        })
    }
}
