use chrono::Duration;

use crate::models::{BookingNotice, OutboxMessage, ScheduledReminder};

/// Hours before the appointment start at which each reminder wave fires.
pub const REMINDER_OFFSET_HOURS: [i64; 3] = [72, 24, 2];

/// Build the full reminder schedule for a confirmed booking: three waves,
/// each delivered over both email and SMS.
pub fn build_reminder_schedule(notice: &BookingNotice) -> Vec<ScheduledReminder> {
    let appointment_start = notice.date.and_time(notice.start_time).and_utc();

    let waves = [
        (
            "Appointment Reminder",
            format!(
                "Hi {}, reminder of your appointment on {} at {}.",
                notice.patient_name,
                notice.date,
                notice.start_time.format("%H:%M")
            ),
        ),
        (
            "Action Needed: Intake Form + Confirmation",
            format!(
                "Hi {}, have you filled the intake form? Please confirm your visit.",
                notice.patient_name
            ),
        ),
        (
            "Final Reminder",
            format!(
                "Hi {}, final reminder: confirm your visit for {} at {} or reply with a cancellation reason.",
                notice.patient_name,
                notice.date,
                notice.start_time.format("%H:%M")
            ),
        ),
    ];

    let mut reminders = Vec::with_capacity(waves.len() * 2);
    for (offset_hours, (subject, text)) in REMINDER_OFFSET_HOURS.iter().zip(waves) {
        let due_at = appointment_start - Duration::hours(*offset_hours);

        reminders.push(ScheduledReminder {
            appointment_id: notice.appointment_id,
            due_at,
            message: OutboxMessage::email(&notice.email, subject, text.clone()),
        });
        reminders.push(ScheduledReminder {
            appointment_id: notice.appointment_id,
            due_at,
            message: OutboxMessage::sms(&notice.phone, text),
        });
    }

    reminders
}
