use std::sync::Arc;

use assert_matches::assert_matches;
use chrono::{NaiveDate, NaiveTime};
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use appointment_cell::models::{BookAppointmentRequest, BookingError};
use appointment_cell::services::booking::BookingService;
use notification_cell::services::scheduler::ReminderScheduler;
use patient_cell::models::PatientType;
use schedule_cell::models::ScheduleError;
use shared_config::AppConfig;

// ==============================================================================
// FIXTURES
// ==============================================================================

struct TestSetup {
    booking: BookingService,
    reminders: Arc<ReminderScheduler>,
    mock_server: MockServer,
    outbox_dir: TempDir,
}

impl TestSetup {
    async fn new() -> Self {
        let mock_server = MockServer::start().await;
        let outbox_dir = TempDir::new().unwrap();

        let config = AppConfig {
            storage_url: mock_server.uri(),
            storage_service_key: "test-key".to_string(),
            outbox_dir: outbox_dir.path().to_string_lossy().to_string(),
            intake_form_path: "forms/IntakeForm.pdf".to_string(),
            bind_port: 0,
        };

        let reminders = Arc::new(ReminderScheduler::new(&config));
        let booking = BookingService::new(&config, Arc::clone(&reminders));

        Self {
            booking,
            reminders,
            mock_server,
            outbox_dir,
        }
    }

    fn outbox_files(&self) -> Vec<String> {
        match std::fs::read_dir(self.outbox_dir.path()) {
            Ok(entries) => {
                let mut names: Vec<String> = entries
                    .map(|entry| entry.unwrap().file_name().to_string_lossy().to_string())
                    .collect();
                names.sort();
                names
            }
            Err(_) => Vec::new(),
        }
    }
}

fn time(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

fn day_slot(start_h: u32, start_m: u32, available: bool) -> serde_json::Value {
    let start = time(start_h, start_m);
    let end = start + chrono::Duration::minutes(30);
    json!({
        "doctor": "Dr. Adams",
        "date": "2025-01-02",
        "start_time": start.format("%H:%M").to_string(),
        "end_time": end.format("%H:%M").to_string(),
        "slot_minutes": 30,
        "location": "L1",
        "available": available
    })
}

fn full_day() -> Vec<serde_json::Value> {
    (0..16).map(|i| day_slot(9 + i / 2, (i % 2) * 30, true)).collect()
}

fn roster_row() -> serde_json::Value {
    json!([
        {
            "name": "Jane Doe",
            "dob": "1984-06-15",
            "patient_type": "Returning",
            "phone": "5550001111",
            "email": "jane@example.com"
        }
    ])
}

fn persisted_record() -> serde_json::Value {
    json!([
        {
            "appointment_id": "550e8400-e29b-41d4-a716-446655440000",
            "patient_name": "Jane Doe",
            "date_of_birth": "1984-06-15",
            "patient_type": "Returning",
            "doctor": "Dr. Adams",
            "location": "L1",
            "date": "2025-01-02",
            "start_time": "09:00",
            "end_time": "09:30",
            "duration_minutes": 30,
            "insurance_carrier": "Acme Health",
            "member_id": "M-1",
            "group_number": "G-1",
            "phone": "5550001111",
            "email": "jane@example.com",
            "status": "confirmed",
            "created_at": "2025-01-01T08:00:00Z"
        }
    ])
}

fn booking_request() -> BookAppointmentRequest {
    BookAppointmentRequest {
        patient_name: "Jane Doe".to_string(),
        date_of_birth: NaiveDate::from_ymd_opt(1984, 6, 15).unwrap(),
        doctor: "Dr. Adams".to_string(),
        location: "L1".to_string(),
        date: NaiveDate::from_ymd_opt(2025, 1, 2).unwrap(),
        start_time: time(9, 0),
        insurance_carrier: "Acme Health".to_string(),
        member_id: "M-1".to_string(),
        group_number: "G-1".to_string(),
        phone: None,
        email: None,
    }
}

async fn mount_happy_path(setup: &TestSetup, roster: serde_json::Value, flipped: usize) {
    Mock::given(method("GET"))
        .and(path("/rest/v1/patients"))
        .respond_with(ResponseTemplate::new(200).set_body_json(roster))
        .mount(&setup.mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/schedule_slots"))
        .respond_with(ResponseTemplate::new(200).set_body_json(full_day()))
        .mount(&setup.mock_server)
        .await;

    let flipped_rows: Vec<_> = (0..flipped)
        .map(|i| day_slot(9 + (i as u32) / 2, ((i as u32) % 2) * 30, false))
        .collect();
    Mock::given(method("PATCH"))
        .and(path("/rest/v1/schedule_slots"))
        .respond_with(ResponseTemplate::new(200).set_body_json(flipped_rows))
        .expect(1)
        .mount(&setup.mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(201).set_body_json(persisted_record()))
        .expect(1)
        .mount(&setup.mock_server)
        .await;
}

// ==============================================================================
// WORKFLOW TESTS
// ==============================================================================

#[tokio::test]
async fn returning_patient_books_a_single_slot() {
    let setup = TestSetup::new().await;
    mount_happy_path(&setup, roster_row(), 1).await;

    let confirmation = setup.booking.book_appointment(booking_request()).await.unwrap();

    assert_eq!(confirmation.patient_type, PatientType::Returning);
    assert_eq!(confirmation.duration_minutes, 30);
    assert_eq!(confirmation.start_time, time(9, 0));
    assert_eq!(confirmation.end_time, time(9, 30));
}

#[tokio::test]
async fn unknown_patient_gets_the_longer_intake_block() {
    let setup = TestSetup::new().await;
    mount_happy_path(&setup, json!([]), 2).await;

    let confirmation = setup.booking.book_appointment(booking_request()).await.unwrap();

    assert_eq!(confirmation.patient_type, PatientType::New);
    assert_eq!(confirmation.duration_minutes, 60);
    assert_eq!(confirmation.end_time, time(10, 0));
}

#[tokio::test]
async fn confirmation_lands_in_the_outbox_and_reminders_are_queued() {
    let setup = TestSetup::new().await;
    mount_happy_path(&setup, roster_row(), 1).await;

    setup.booking.book_appointment(booking_request()).await.unwrap();

    let files = setup.outbox_files();
    assert_eq!(files.len(), 1);
    assert!(files[0].starts_with("email_"));

    let content =
        std::fs::read_to_string(setup.outbox_dir.path().join(&files[0])).unwrap();
    assert!(content.contains("TO: jane@example.com"));
    assert!(content.contains("SUBJECT: Appointment Confirmation"));
    assert!(content.contains("Doctor: Dr. Adams"));
    assert!(content.contains("Time: 09:00-09:30"));
    assert!(content.contains("- forms/IntakeForm.pdf"));

    assert_eq!(setup.reminders.pending().await.len(), 6);
}

#[tokio::test]
async fn failed_reservation_aborts_the_whole_booking() {
    let setup = TestSetup::new().await;

    // New patient needs 09:00 and 09:30; the second slot is already taken.
    let mut day = full_day();
    day[1] = day_slot(9, 30, false);

    Mock::given(method("GET"))
        .and(path("/rest/v1/patients"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&setup.mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/schedule_slots"))
        .respond_with(ResponseTemplate::new(200).set_body_json(day))
        .mount(&setup.mock_server)
        .await;

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/schedule_slots"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&setup.mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(201).set_body_json(persisted_record()))
        .expect(0)
        .mount(&setup.mock_server)
        .await;

    let result = setup.booking.book_appointment(booking_request()).await;

    assert_matches!(
        result,
        Err(BookingError::Schedule(
            ScheduleError::InsufficientAvailability
        ))
    );
    assert!(setup.outbox_files().is_empty());
    assert!(setup.reminders.pending().await.is_empty());
}

#[tokio::test]
async fn booking_an_off_grid_start_time_is_not_found() {
    let setup = TestSetup::new().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/patients"))
        .respond_with(ResponseTemplate::new(200).set_body_json(roster_row()))
        .mount(&setup.mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/schedule_slots"))
        .respond_with(ResponseTemplate::new(200).set_body_json(full_day()))
        .mount(&setup.mock_server)
        .await;

    let mut request = booking_request();
    request.start_time = time(9, 5);
    let result = setup.booking.book_appointment(request).await;

    assert_matches!(
        result,
        Err(BookingError::Schedule(ScheduleError::SlotNotFound))
    );
}

#[tokio::test]
async fn form_contact_details_override_the_roster() {
    let setup = TestSetup::new().await;
    mount_happy_path(&setup, roster_row(), 1).await;

    let mut request = booking_request();
    request.email = Some("newer@example.com".to_string());
    setup.booking.book_appointment(request).await.unwrap();

    let files = setup.outbox_files();
    let content =
        std::fs::read_to_string(setup.outbox_dir.path().join(&files[0])).unwrap();
    assert!(content.contains("TO: newer@example.com"));
}
