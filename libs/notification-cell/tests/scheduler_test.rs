use std::sync::Arc;

use chrono::{Duration, NaiveDate, NaiveTime, Utc};
use tempfile::TempDir;
use uuid::Uuid;

use notification_cell::models::{BookingNotice, MessageChannel, OutboxMessage, ScheduledReminder};
use notification_cell::services::outbox::OutboxService;
use notification_cell::services::scheduler::ReminderScheduler;

fn notice(date: NaiveDate) -> BookingNotice {
    BookingNotice {
        appointment_id: Uuid::new_v4(),
        patient_name: "Jane Doe".to_string(),
        doctor: "Dr. Adams".to_string(),
        location: "L1".to_string(),
        date,
        start_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
        end_time: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
        phone: "5550001111".to_string(),
        email: "jane@example.com".to_string(),
    }
}

fn scheduler_in(dir: &TempDir) -> Arc<ReminderScheduler> {
    Arc::new(ReminderScheduler::with_outbox(OutboxService::with_dir(
        dir.path(),
    )))
}

fn outbox_files(dir: &TempDir) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    names.sort();
    names
}

#[tokio::test]
async fn booking_queues_all_six_reminders() {
    let dir = TempDir::new().unwrap();
    let scheduler = scheduler_in(&dir);

    let far_future = Utc::now().date_naive() + Duration::days(30);
    scheduler.schedule_booking(&notice(far_future)).await;

    assert_eq!(scheduler.pending().await.len(), 6);
}

#[tokio::test]
async fn only_due_reminders_are_dispatched() {
    let dir = TempDir::new().unwrap();
    let scheduler = scheduler_in(&dir);
    let now = Utc::now();

    let appointment_id = Uuid::new_v4();
    let due = ScheduledReminder {
        appointment_id,
        due_at: now - Duration::minutes(5),
        message: OutboxMessage::email("jane@example.com", "Reminder", "due".to_string()),
    };
    let waiting = ScheduledReminder {
        appointment_id,
        due_at: now + Duration::hours(5),
        message: OutboxMessage::sms("5550001111", "later".to_string()),
    };

    scheduler.enqueue(vec![due, waiting]).await;

    let dispatched = scheduler.dispatch_due(now).await;

    assert_eq!(dispatched, 1);
    assert_eq!(scheduler.pending().await.len(), 1);
    assert_eq!(outbox_files(&dir).len(), 1);
    assert!(outbox_files(&dir)[0].starts_with("email_"));
}

#[tokio::test]
async fn past_due_reminders_dispatch_on_the_next_tick() {
    let dir = TempDir::new().unwrap();
    let scheduler = scheduler_in(&dir);

    // Appointment in 26 hours: the 72-hour wave is already past due, the
    // 24-hour and 2-hour waves still wait.
    let start = Utc::now() + Duration::hours(26);
    let mut soon = notice(start.date_naive());
    soon.start_time = start.time();
    scheduler.schedule_booking(&soon).await;

    let dispatched = scheduler.dispatch_due(Utc::now()).await;

    assert_eq!(dispatched, 2);
    assert_eq!(scheduler.pending().await.len(), 4);
}

#[tokio::test]
async fn dispatched_reminders_land_in_the_outbox_with_channel_prefixes() {
    let dir = TempDir::new().unwrap();
    let scheduler = scheduler_in(&dir);

    let yesterday = Utc::now().date_naive() - Duration::days(1);
    scheduler.schedule_booking(&notice(yesterday)).await;
    scheduler.dispatch_due(Utc::now()).await;

    let files = outbox_files(&dir);
    assert_eq!(files.len(), 6);
    assert_eq!(files.iter().filter(|f| f.starts_with("email_")).count(), 3);
    assert_eq!(files.iter().filter(|f| f.starts_with("sms_")).count(), 3);
}

#[tokio::test]
async fn sms_messages_carry_no_subject() {
    let dir = TempDir::new().unwrap();
    let scheduler = scheduler_in(&dir);

    let yesterday = Utc::now().date_naive() - Duration::days(1);
    scheduler.schedule_booking(&notice(yesterday)).await;
    scheduler.dispatch_due(Utc::now()).await;

    for file in outbox_files(&dir) {
        let content = std::fs::read_to_string(dir.path().join(&file)).unwrap();
        assert!(content.starts_with("TO: "));
        if file.starts_with("sms_") {
            assert!(!content.contains("SUBJECT:"));
        } else {
            assert!(content.contains("SUBJECT:"));
        }
    }
}

#[test]
fn channel_serializes_as_snake_case() {
    let raw = serde_json::to_string(&MessageChannel::Email).unwrap();
    assert_eq!(raw, "\"email\"");
}
