//! API integration tests.
//!
//! Requests go through the full router with the auth middleware against a
//! mock database. Each test queues exactly the rows its request reads.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::redundant_clone)]

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode},
    middleware,
    response::Response,
};
use chrono::{Duration, Utc};
use eventhub_api::{middleware::AppState, middleware::auth_middleware, router as api_router};
use eventhub_core::{BookingService, EventService, RegistrationService, UserService, VenueService};
use eventhub_db::entities::{booking, event, registration, user, venue};
use eventhub_db::repositories::{
    BookingRepository, EventRepository, RegistrationRepository, UserRepository, VenueRepository,
};
use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase, MockExecResult, Value};
use serde_json::Value as Json;
use std::sync::Arc;
use tower::ServiceExt;

const STUDENT_TOKEN: &str = "student-token";
const CLUB_TOKEN: &str = "club-token";
const ADMIN_TOKEN: &str = "admin-token";

fn create_test_user(id: &str, role: user::Role) -> user::Model {
    let token = match role {
        user::Role::Student => STUDENT_TOKEN,
        user::Role::ClubAdmin => CLUB_TOKEN,
        user::Role::SuperAdmin => ADMIN_TOKEN,
    };
    user::Model {
        id: id.to_string(),
        name: format!("User {id}"),
        email: format!("{id}@college.edu"),
        role,
        token: Some(token.to_string()),
        created_at: Utc::now().into(),
        updated_at: None,
    }
}

fn create_test_venue(capacity: i32) -> venue::Model {
    venue::Model {
        id: "venue1".to_string(),
        name: "Main Hall".to_string(),
        location: "Block A".to_string(),
        capacity,
        created_at: Utc::now().into(),
    }
}

fn create_test_event() -> event::Model {
    event::Model {
        id: "event1".to_string(),
        name: "Rust Workshop".to_string(),
        description: "Ownership and borrowing".to_string(),
        club_name: "Coding Club".to_string(),
        category: event::EventCategory::Workshop,
        organizer_id: "club1".to_string(),
        created_at: Utc::now().into(),
    }
}

fn create_test_booking(id: &str, status: booking::BookingStatus) -> booking::Model {
    let start = Utc::now() + Duration::days(3);
    booking::Model {
        id: id.to_string(),
        event_id: "event1".to_string(),
        venue_id: "venue1".to_string(),
        user_id: "club1".to_string(),
        start_time: start.into(),
        end_time: (start + Duration::hours(2)).into(),
        status,
        created_at: Utc::now().into(),
        updated_at: None,
    }
}

fn count_row(n: i64) -> std::collections::BTreeMap<&'static str, Value> {
    maplit::btreemap! { "num_items" => Value::BigInt(Some(n)) }
}

/// Build the `/api` router on top of a prepared mock connection.
fn create_test_router(db: DatabaseConnection) -> Router {
    let db = Arc::new(db);

    let user_repo = UserRepository::new(Arc::clone(&db));
    let venue_repo = VenueRepository::new(Arc::clone(&db));
    let event_repo = EventRepository::new(Arc::clone(&db));
    let booking_repo = BookingRepository::new(Arc::clone(&db));
    let registration_repo = RegistrationRepository::new(Arc::clone(&db));

    let state = AppState {
        user_service: UserService::new(user_repo.clone()),
        venue_service: VenueService::new(venue_repo.clone()),
        event_service: EventService::new(event_repo.clone(), user_repo.clone()),
        booking_service: BookingService::new(
            booking_repo.clone(),
            event_repo.clone(),
            venue_repo.clone(),
            user_repo,
            registration_repo.clone(),
        ),
        registration_service: RegistrationService::new(
            registration_repo,
            booking_repo,
            event_repo,
            venue_repo,
        ),
    };

    Router::new()
        .nest("/api", api_router())
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .with_state(state)
}

fn request(method: &str, uri: &str, token: Option<&str>, body: Option<Json>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri).method(method);
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {token}"));
    }
    match body {
        Some(json) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn read_json(response: Response) -> Json {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

// ==================== Authentication ====================

#[tokio::test]
async fn test_missing_token_returns_401() {
    let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
    let app = create_test_router(db);

    let response = app
        .oneshot(request("GET", "/api/venues", None, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = read_json(response).await;
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_unknown_token_returns_401() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<user::Model>::new()])
        .into_connection();
    let app = create_test_router(db);

    let response = app
        .oneshot(request("GET", "/api/venues", Some("stale"), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_unknown_endpoint_returns_404() {
    let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
    let app = create_test_router(db);

    let response = app
        .oneshot(request("GET", "/api/nonexistent", None, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ==================== Venues ====================

#[tokio::test]
async fn test_list_venues_returns_data_envelope() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([[create_test_user("student1", user::Role::Student)]])
        .append_query_results([[create_test_venue(100)]])
        .into_connection();
    let app = create_test_router(db);

    let response = app
        .oneshot(request("GET", "/api/venues", Some(STUDENT_TOKEN), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["data"][0]["name"], "Main Hall");
    assert_eq!(body["data"][0]["capacity"], 100);
    assert!(body["data"][0]["createdAt"].is_string());
}

#[tokio::test]
async fn test_student_cannot_create_venue() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([[create_test_user("student1", user::Role::Student)]])
        .into_connection();
    let app = create_test_router(db);

    let response = app
        .oneshot(request(
            "POST",
            "/api/venues",
            Some(STUDENT_TOKEN),
            Some(serde_json::json!({ "name": "Lab", "location": "Block B", "capacity": 30 })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = read_json(response).await;
    assert_eq!(body["error"]["code"], "FORBIDDEN");
}

#[tokio::test]
async fn test_create_venue_returns_201() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([[create_test_user("admin1", user::Role::SuperAdmin)]])
        .append_query_results([Vec::<venue::Model>::new()])
        .append_query_results([[create_test_venue(100)]])
        .into_connection();
    let app = create_test_router(db);

    let response = app
        .oneshot(request(
            "POST",
            "/api/venues",
            Some(ADMIN_TOKEN),
            Some(serde_json::json!({ "name": "Main Hall", "location": "Block A", "capacity": 100 })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = read_json(response).await;
    assert_eq!(body["data"]["id"], "venue1");
}

// ==================== Bookings ====================

#[tokio::test]
async fn test_create_booking_missing_fields_returns_400() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([[create_test_user("club1", user::Role::ClubAdmin)]])
        .into_connection();
    let app = create_test_router(db);

    let response = app
        .oneshot(request(
            "POST",
            "/api/bookings",
            Some(CLUB_TOKEN),
            Some(serde_json::json!({ "eventId": "event1" })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = read_json(response).await;
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_create_booking_returns_pending() {
    let saved = create_test_booking("booking1", booking::BookingStatus::Pending);

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([[create_test_user("club1", user::Role::ClubAdmin)]])
        .append_query_results([[create_test_event()]])
        .append_query_results([[create_test_venue(100)]])
        .append_query_results([Vec::<booking::Model>::new()])
        .append_query_results([[saved.clone()]])
        .into_connection();
    let app = create_test_router(db);

    let response = app
        .oneshot(request(
            "POST",
            "/api/bookings",
            Some(CLUB_TOKEN),
            Some(serde_json::json!({
                "eventId": "event1",
                "venueId": "venue1",
                "startTime": saved.start_time.to_rfc3339(),
                "endTime": saved.end_time.to_rfc3339(),
            })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = read_json(response).await;
    assert_eq!(body["data"]["status"], "pending");
    assert_eq!(body["data"]["venueId"], "venue1");
}

#[tokio::test]
async fn test_create_booking_conflict_reports_occupied_slot() {
    let approved = create_test_booking("booking0", booking::BookingStatus::Approved);

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([[create_test_user("club1", user::Role::ClubAdmin)]])
        .append_query_results([[create_test_event()]])
        .append_query_results([[create_test_venue(100)]])
        .append_query_results([[approved.clone()]])
        .into_connection();
    let app = create_test_router(db);

    let start = approved.start_time + Duration::minutes(30);
    let end = approved.end_time + Duration::minutes(30);
    let response = app
        .oneshot(request(
            "POST",
            "/api/bookings",
            Some(CLUB_TOKEN),
            Some(serde_json::json!({
                "eventId": "event1",
                "venueId": "venue1",
                "startTime": start.to_rfc3339(),
                "endTime": end.to_rfc3339(),
            })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = read_json(response).await;
    assert_eq!(body["error"]["code"], "BOOKING_CONFLICT");
    let conflicting = &body["error"]["details"]["conflictingBooking"];
    assert_eq!(conflicting["event"], "event1");
    assert_eq!(conflicting["startTime"], approved.start_time.to_rfc3339());
}

#[tokio::test]
async fn test_set_status_rejects_unknown_status() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([[create_test_user("admin1", user::Role::SuperAdmin)]])
        .into_connection();
    let app = create_test_router(db);

    let response = app
        .oneshot(request(
            "PUT",
            "/api/bookings/booking1/status",
            Some(ADMIN_TOKEN),
            Some(serde_json::json!({ "status": "pending" })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_club_admin_cannot_set_status() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([[create_test_user("club1", user::Role::ClubAdmin)]])
        .into_connection();
    let app = create_test_router(db);

    let response = app
        .oneshot(request(
            "PUT",
            "/api/bookings/booking1/status",
            Some(CLUB_TOKEN),
            Some(serde_json::json!({ "status": "approved" })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_delete_by_non_owner_returns_403() {
    let mut other = create_test_user("club2", user::Role::ClubAdmin);
    other.token = Some(CLUB_TOKEN.to_string());

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([[other]])
        .append_query_results([[create_test_booking("booking1", booking::BookingStatus::Approved)]])
        .into_connection();
    let app = create_test_router(db);

    let response = app
        .oneshot(request("DELETE", "/api/bookings/booking1", Some(CLUB_TOKEN), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_delete_by_owner_returns_204() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([[create_test_user("club1", user::Role::ClubAdmin)]])
        .append_query_results([[create_test_booking("booking1", booking::BookingStatus::Approved)]])
        .append_exec_results([
            MockExecResult {
                last_insert_id: 0,
                rows_affected: 3,
            },
            MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            },
        ])
        .into_connection();
    let app = create_test_router(db);

    let response = app
        .oneshot(request("DELETE", "/api/bookings/booking1", Some(CLUB_TOKEN), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_get_missing_booking_returns_404() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([[create_test_user("student1", user::Role::Student)]])
        .append_query_results([Vec::<booking::Model>::new()])
        .into_connection();
    let app = create_test_router(db);

    let response = app
        .oneshot(request("GET", "/api/bookings/missing", Some(STUDENT_TOKEN), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_public_approved_includes_registration_count() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([[create_test_user("student1", user::Role::Student)]])
        .append_query_results([[create_test_booking("booking1", booking::BookingStatus::Approved)]])
        .append_query_results([[create_test_event()]])
        .append_query_results([[create_test_venue(100)]])
        .append_query_results([[create_test_user("club1", user::Role::ClubAdmin)]])
        .append_query_results([[maplit::btreemap! {
            "booking_id" => Value::String(Some(Box::new("booking1".to_string()))),
            "count" => Value::BigInt(Some(2)),
        }]])
        .into_connection();
    let app = create_test_router(db);

    let response = app
        .oneshot(request(
            "GET",
            "/api/bookings/public/approved",
            Some(STUDENT_TOKEN),
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    let first = &body["data"][0];
    assert_eq!(first["status"], "approved");
    assert_eq!(first["registrationCount"], 2);
    assert_eq!(first["venue"]["name"], "Main Hall");
    assert_eq!(first["event"]["clubName"], "Coding Club");
    assert!(first["requester"].get("token").is_none());
}

#[tokio::test]
async fn test_student_cannot_list_my_bookings() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([[create_test_user("student1", user::Role::Student)]])
        .into_connection();
    let app = create_test_router(db);

    let response = app
        .oneshot(request(
            "GET",
            "/api/bookings/my-bookings",
            Some(STUDENT_TOKEN),
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

// ==================== Registrations ====================

#[tokio::test]
async fn test_register_without_booking_id_returns_400() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([[create_test_user("student1", user::Role::Student)]])
        .into_connection();
    let app = create_test_router(db);

    let response = app
        .oneshot(request(
            "POST",
            "/api/registrations",
            Some(STUDENT_TOKEN),
            Some(serde_json::json!({})),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_register_returns_201() {
    let saved = registration::Model {
        id: "reg1".to_string(),
        booking_id: "booking1".to_string(),
        user_id: "student1".to_string(),
        event_id: "event1".to_string(),
        created_at: Utc::now().into(),
    };

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([[create_test_user("student1", user::Role::Student)]])
        .append_query_results([[create_test_booking("booking1", booking::BookingStatus::Approved)]])
        .append_query_results([Vec::<registration::Model>::new()])
        .append_query_results([[create_test_venue(2)]])
        .append_query_results([[count_row(1)]])
        .append_query_results([[saved]])
        .into_connection();
    let app = create_test_router(db);

    let response = app
        .oneshot(request(
            "POST",
            "/api/registrations",
            Some(STUDENT_TOKEN),
            Some(serde_json::json!({ "bookingId": "booking1" })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = read_json(response).await;
    assert_eq!(body["data"]["bookingId"], "booking1");
    assert_eq!(body["data"]["eventId"], "event1");
}

#[tokio::test]
async fn test_register_when_full_returns_capacity_reached() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([[create_test_user("student3", user::Role::Student)]])
        .append_query_results([[create_test_booking("booking1", booking::BookingStatus::Approved)]])
        .append_query_results([Vec::<registration::Model>::new()])
        .append_query_results([[create_test_venue(2)]])
        .append_query_results([[count_row(2)]])
        .into_connection();
    let app = create_test_router(db);

    let response = app
        .oneshot(request(
            "POST",
            "/api/registrations",
            Some(STUDENT_TOKEN),
            Some(serde_json::json!({ "bookingId": "booking1" })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = read_json(response).await;
    assert_eq!(body["error"]["code"], "CAPACITY_REACHED");
}

#[tokio::test]
async fn test_register_for_pending_booking_returns_invalid_state() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([[create_test_user("student1", user::Role::Student)]])
        .append_query_results([[create_test_booking("booking1", booking::BookingStatus::Pending)]])
        .into_connection();
    let app = create_test_router(db);

    let response = app
        .oneshot(request(
            "POST",
            "/api/registrations",
            Some(STUDENT_TOKEN),
            Some(serde_json::json!({ "bookingId": "booking1" })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = read_json(response).await;
    assert_eq!(body["error"]["code"], "INVALID_STATE");
}

// ==================== Users ====================

#[tokio::test]
async fn test_update_role_with_unknown_role_returns_400() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([[create_test_user("admin1", user::Role::SuperAdmin)]])
        .into_connection();
    let app = create_test_router(db);

    let response = app
        .oneshot(request(
            "PUT",
            "/api/users/student1/role",
            Some(ADMIN_TOKEN),
            Some(serde_json::json!({ "role": "dean" })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_list_users_hides_tokens() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([[create_test_user("admin1", user::Role::SuperAdmin)]])
        .append_query_results([[
            create_test_user("admin1", user::Role::SuperAdmin),
            create_test_user("student1", user::Role::Student),
        ]])
        .into_connection();
    let app = create_test_router(db);

    let response = app
        .oneshot(request("GET", "/api/users", Some(ADMIN_TOKEN), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["data"][1]["role"], "student");
    assert!(body["data"][0].get("token").is_none());
}
