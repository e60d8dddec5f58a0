use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Deserializer, Serialize};

// ==============================================================================
// SLOT LEDGER MODELS
// ==============================================================================

/// One fixed-duration bookable time unit for one doctor at one location on
/// one date. Identity is (doctor, location, date, start_time).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleSlot {
    pub doctor: String,
    pub date: NaiveDate,
    #[serde(with = "hhmm")]
    pub start_time: NaiveTime,
    #[serde(with = "hhmm")]
    pub end_time: NaiveTime,
    pub slot_minutes: i32,
    pub location: String,
    #[serde(deserialize_with = "deserialize_available")]
    pub available: bool,
}

/// A bookable interval offered to the caller: the start of a contiguous run
/// of free slots plus the end implied by the requested duration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotSuggestion {
    #[serde(with = "hhmm")]
    pub start_time: NaiveTime,
    #[serde(with = "hhmm")]
    pub end_time: NaiveTime,
}

/// The result of a committed reservation: which slots were consumed, in
/// order, and the end of the last one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReservationOutcome {
    pub consumed_starts: Vec<NaiveTime>,
    pub end_time: NaiveTime,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenerateScheduleRequest {
    pub doctors: Vec<String>,
    pub locations: Vec<String>,
    pub start_date: NaiveDate,
    pub days: u32,
    #[serde(with = "hhmm", default = "default_work_start")]
    pub work_start: NaiveTime,
    #[serde(with = "hhmm", default = "default_work_end")]
    pub work_end: NaiveTime,
    #[serde(default = "default_slot_minutes")]
    pub slot_minutes: i32,
}

fn default_work_start() -> NaiveTime {
    NaiveTime::from_hms_opt(9, 0, 0).unwrap()
}

fn default_work_end() -> NaiveTime {
    NaiveTime::from_hms_opt(17, 0, 0).unwrap()
}

fn default_slot_minutes() -> i32 {
    30
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Debug, Clone, thiserror::Error)]
pub enum ScheduleError {
    #[error("No slot starts at the requested time")]
    SlotNotFound,

    #[error("Insufficient contiguous availability for the requested duration")]
    InsufficientAvailability,

    #[error("Storage error: {0}")]
    Storage(String),
}

impl From<ScheduleError> for shared_models::AppError {
    fn from(err: ScheduleError) -> Self {
        match err {
            ScheduleError::SlotNotFound => shared_models::AppError::NotFound(err.to_string()),
            ScheduleError::InsufficientAvailability => {
                shared_models::AppError::Conflict(err.to_string())
            }
            ScheduleError::Storage(msg) => shared_models::AppError::Storage(msg),
        }
    }
}

// ==============================================================================
// SERDE HELPERS
// ==============================================================================

/// Wall-clock times are stored as `HH:MM` strings; accept `HH:MM:SS` too
/// since exported spreadsheets sometimes carry seconds.
pub mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%H:%M";

    pub fn serialize<S>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&time.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        NaiveTime::parse_from_str(&raw, FORMAT)
            .or_else(|_| NaiveTime::parse_from_str(&raw, "%H:%M:%S"))
            .map_err(serde::de::Error::custom)
    }
}

/// Availability arrives either as a real boolean or as the legacy literal
/// "Yes"/"No" text, depending on which generator wrote the row. Normalize
/// to a boolean at the boundary.
fn deserialize_available<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawAvailability {
        Flag(bool),
        Text(String),
    }

    match RawAvailability::deserialize(deserializer)? {
        RawAvailability::Flag(flag) => Ok(flag),
        RawAvailability::Text(text) => {
            let text = text.trim();
            Ok(text.eq_ignore_ascii_case("yes") || text.eq_ignore_ascii_case("true"))
        }
    }
}
