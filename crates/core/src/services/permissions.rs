//! Capability checks for the three roles.

use eventhub_db::entities::{booking, user};

/// Club admins and super admins may create events and request bookings.
#[must_use]
pub const fn can_request_booking(actor: &user::Model) -> bool {
    matches!(actor.role, user::Role::ClubAdmin | user::Role::SuperAdmin)
}

/// Review bookings and manage venues and users.
#[must_use]
pub const fn can_moderate(actor: &user::Model) -> bool {
    matches!(actor.role, user::Role::SuperAdmin)
}

/// Edit or delete a booking: its requester, or a super admin.
#[must_use]
pub fn can_mutate_booking(actor: &user::Model, booking: &booking::Model) -> bool {
    actor.id == booking.user_id || can_moderate(actor)
}

/// Any signed-in user may register for an approved booking.
#[must_use]
pub const fn can_register(_actor: &user::Model) -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn actor(id: &str, role: user::Role) -> user::Model {
        user::Model {
            id: id.to_string(),
            name: id.to_string(),
            email: format!("{id}@college.edu"),
            role,
            token: None,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn booking_by(user_id: &str) -> booking::Model {
        let now = Utc::now();
        booking::Model {
            id: "b1".to_string(),
            event_id: "event1".to_string(),
            venue_id: "venue1".to_string(),
            user_id: user_id.to_string(),
            start_time: now.into(),
            end_time: (now + chrono::Duration::hours(1)).into(),
            status: booking::BookingStatus::Pending,
            created_at: now.into(),
            updated_at: None,
        }
    }

    #[test]
    fn test_request_booking_roles() {
        assert!(!can_request_booking(&actor("s", user::Role::Student)));
        assert!(can_request_booking(&actor("c", user::Role::ClubAdmin)));
        assert!(can_request_booking(&actor("a", user::Role::SuperAdmin)));
    }

    #[test]
    fn test_only_super_admin_moderates() {
        assert!(!can_moderate(&actor("c", user::Role::ClubAdmin)));
        assert!(can_moderate(&actor("a", user::Role::SuperAdmin)));
    }

    #[test]
    fn test_mutate_booking() {
        let booking = booking_by("club1");

        assert!(can_mutate_booking(&actor("club1", user::Role::ClubAdmin), &booking));
        assert!(!can_mutate_booking(&actor("club2", user::Role::ClubAdmin), &booking));
        assert!(can_mutate_booking(&actor("root", user::Role::SuperAdmin), &booking));
    }
}
