//! Booking entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Review state of a booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    /// Waiting for a super admin to review.
    #[sea_orm(string_value = "pending")]
    Pending,
    /// Holds the venue slot; open for registrations.
    #[sea_orm(string_value = "approved")]
    Approved,
    /// Turned down by a super admin; an edit sends it back to review.
    #[sea_orm(string_value = "rejected")]
    Rejected,
    /// Withdrawn by a super admin; frees the slot.
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

impl Default for BookingStatus {
    fn default() -> Self {
        Self::Pending
    }
}

impl BookingStatus {
    /// Wire name of the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Cancelled => "cancelled",
        }
    }
}

impl std::str::FromStr for BookingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(format!("Unknown booking status: {other}")),
        }
    }
}

/// Booking entity - a request to hold a venue for an event during `[start_time, end_time)`.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "booking")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    #[sea_orm(indexed)]
    pub event_id: String,

    #[sea_orm(indexed)]
    pub venue_id: String,

    /// User who requested the booking.
    #[sea_orm(indexed)]
    pub user_id: String,

    pub start_time: DateTimeWithTimeZone,

    /// Exclusive end of the slot; always after `start_time`.
    pub end_time: DateTimeWithTimeZone,

    pub status: BookingStatus,

    pub created_at: DateTimeWithTimeZone,

    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::event::Entity",
        from = "Column::EventId",
        to = "super::event::Column::Id"
    )]
    Event,
    #[sea_orm(
        belongs_to = "super::venue::Entity",
        from = "Column::VenueId",
        to = "super::venue::Column::Id"
    )]
    Venue,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
    #[sea_orm(has_many = "super::registration::Entity")]
    Registrations,
}

impl Related<super::event::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Event.def()
    }
}

impl Related<super::venue::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Venue.def()
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::registration::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Registrations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
