//! Venue entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Venue entity - a bookable room or hall.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "venue")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Venue name, unique across all venues.
    #[sea_orm(unique)]
    pub name: String,

    pub location: String,

    /// Maximum number of registrations per booking held here.
    pub capacity: i32,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::booking::Entity")]
    Bookings,
}

impl Related<super::booking::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Bookings.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
