use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use patient_cell::models::PatientType;
use schedule_cell::models::hhmm;
use schedule_cell::models::ScheduleError;

// ==============================================================================
// CORE APPOINTMENT MODELS
// ==============================================================================

/// One confirmed appointment as persisted to the appointments sink.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppointmentRecord {
    pub appointment_id: Uuid,
    pub patient_name: String,
    pub date_of_birth: NaiveDate,
    pub patient_type: PatientType,
    pub doctor: String,
    pub location: String,
    pub date: NaiveDate,
    #[serde(with = "hhmm")]
    pub start_time: NaiveTime,
    #[serde(with = "hhmm")]
    pub end_time: NaiveTime,
    pub duration_minutes: i32,
    pub insurance_carrier: String,
    pub member_id: String,
    pub group_number: String,
    pub phone: String,
    pub email: String,
    pub status: AppointmentStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Confirmed,
    Cancelled,
    NoShow,
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentStatus::Confirmed => write!(f, "confirmed"),
            AppointmentStatus::Cancelled => write!(f, "cancelled"),
            AppointmentStatus::NoShow => write!(f, "no_show"),
        }
    }
}

// ==============================================================================
// REQUEST/RESPONSE MODELS
// ==============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct BookAppointmentRequest {
    pub patient_name: String,
    pub date_of_birth: NaiveDate,
    pub doctor: String,
    pub location: String,
    pub date: NaiveDate,
    #[serde(with = "hhmm")]
    pub start_time: NaiveTime,
    pub insurance_carrier: String,
    pub member_id: String,
    pub group_number: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BookingConfirmation {
    pub appointment_id: Uuid,
    pub patient_type: PatientType,
    pub doctor: String,
    pub location: String,
    pub date: NaiveDate,
    #[serde(with = "hhmm")]
    pub start_time: NaiveTime,
    #[serde(with = "hhmm")]
    pub end_time: NaiveTime,
    pub duration_minutes: i32,
}

/// How long each class of visit takes; new patients get the longer intake
/// block.
#[derive(Debug, Clone)]
pub struct VisitPolicy {
    pub new_patient_minutes: i32,
    pub returning_patient_minutes: i32,
}

impl VisitPolicy {
    pub fn required_minutes(&self, patient_type: PatientType) -> i32 {
        match patient_type {
            PatientType::New => self.new_patient_minutes,
            PatientType::Returning => self.returning_patient_minutes,
        }
    }
}

impl Default for VisitPolicy {
    fn default() -> Self {
        Self {
            new_patient_minutes: 60,
            returning_patient_minutes: 30,
        }
    }
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Debug, thiserror::Error)]
pub enum BookingError {
    #[error(transparent)]
    Schedule(#[from] ScheduleError),

    #[error("Patient lookup failed: {0}")]
    PatientLookup(String),

    #[error("Failed to persist appointment: {0}")]
    Persistence(String),
}

impl From<BookingError> for shared_models::AppError {
    fn from(err: BookingError) -> Self {
        match err {
            BookingError::Schedule(inner) => inner.into(),
            BookingError::PatientLookup(msg) => shared_models::AppError::Storage(msg),
            BookingError::Persistence(msg) => shared_models::AppError::Storage(msg),
        }
    }
}
