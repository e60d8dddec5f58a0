use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A roster row as stored. The classification column is optional; older
/// imports never carried it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatientRecord {
    pub name: String,
    pub dob: NaiveDate,
    #[serde(default)]
    pub patient_type: Option<String>,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PatientType {
    New,
    Returning,
}

impl PatientType {
    /// Stored classifications are free text; anything that is not "New"
    /// counts as a returning patient.
    pub fn from_stored(raw: Option<&str>) -> Self {
        match raw {
            Some(text) if text.trim().eq_ignore_ascii_case("new") => PatientType::New,
            Some(_) => PatientType::Returning,
            None => PatientType::Returning,
        }
    }
}

impl fmt::Display for PatientType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatientType::New => write!(f, "New"),
            PatientType::Returning => write!(f, "Returning"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PatientLookupRequest {
    pub name: String,
    pub dob: NaiveDate,
}

/// The lookup outcome the booking workflow consumes: whether the patient is
/// on the roster, how they are classified, and any stored contact details.
#[derive(Debug, Clone, Serialize)]
pub struct PatientMatch {
    pub exists: bool,
    pub patient_type: PatientType,
    pub phone: String,
    pub email: String,
}

impl PatientMatch {
    pub fn unknown() -> Self {
        Self {
            exists: false,
            patient_type: PatientType::New,
            phone: String::new(),
            email: String::new(),
        }
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum PatientError {
    #[error("Storage error: {0}")]
    Storage(String),
}

impl From<PatientError> for shared_models::AppError {
    fn from(err: PatientError) -> Self {
        match err {
            PatientError::Storage(msg) => shared_models::AppError::Storage(msg),
        }
    }
}
