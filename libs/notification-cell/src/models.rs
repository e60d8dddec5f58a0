use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageChannel {
    Email,
    Sms,
}

/// One message destined for the outbox. Email messages carry a subject and
/// optionally a list of attachment paths; SMS messages carry neither.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutboxMessage {
    pub channel: MessageChannel,
    pub to: String,
    pub subject: Option<String>,
    pub body: String,
    #[serde(default)]
    pub attachments: Vec<String>,
}

impl OutboxMessage {
    pub fn email(to: &str, subject: &str, body: String) -> Self {
        Self {
            channel: MessageChannel::Email,
            to: to.to_string(),
            subject: Some(subject.to_string()),
            body,
            attachments: Vec::new(),
        }
    }

    pub fn sms(to: &str, body: String) -> Self {
        Self {
            channel: MessageChannel::Sms,
            to: to.to_string(),
            subject: None,
            body,
            attachments: Vec::new(),
        }
    }

    pub fn with_attachment(mut self, path: &str) -> Self {
        self.attachments.push(path.to_string());
        self
    }
}

/// A message parked until its due time. The scheduler owns these explicitly;
/// there is no ambient timer state anywhere.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduledReminder {
    pub appointment_id: Uuid,
    pub due_at: DateTime<Utc>,
    pub message: OutboxMessage,
}

/// Confirmed-booking fields the notification side needs. Handed over
/// explicitly by the booking workflow rather than read from shared state.
#[derive(Debug, Clone)]
pub struct BookingNotice {
    pub appointment_id: Uuid,
    pub patient_name: String,
    pub doctor: String,
    pub location: String,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub phone: String,
    pub email: String,
}

#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    #[error("Failed to write outbox message: {0}")]
    Io(#[from] std::io::Error),
}
