//! Event entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Event category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
pub enum EventCategory {
    #[sea_orm(string_value = "Workshop")]
    Workshop,
    #[sea_orm(string_value = "Competition")]
    Competition,
    #[sea_orm(string_value = "Seminar")]
    Seminar,
    #[sea_orm(string_value = "Cultural")]
    Cultural,
    #[sea_orm(string_value = "Other")]
    Other,
}

impl Default for EventCategory {
    fn default() -> Self {
        Self::Seminar
    }
}

impl std::str::FromStr for EventCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Workshop" => Ok(Self::Workshop),
            "Competition" => Ok(Self::Competition),
            "Seminar" => Ok(Self::Seminar),
            "Cultural" => Ok(Self::Cultural),
            "Other" => Ok(Self::Other),
            other => Err(format!("Unknown event category: {other}")),
        }
    }
}

/// Event entity - something a club organizes.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "event")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub name: String,

    #[sea_orm(column_type = "Text")]
    pub description: String,

    pub club_name: String,

    pub category: EventCategory,

    /// Club admin who created the event.
    #[sea_orm(indexed)]
    pub organizer_id: String,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::OrganizerId",
        to = "super::user::Column::Id"
    )]
    Organizer,
    #[sea_orm(has_many = "super::booking::Entity")]
    Bookings,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Organizer.def()
    }
}

impl Related<super::booking::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Bookings.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
