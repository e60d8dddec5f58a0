use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use chrono::{Duration, NaiveDate, NaiveTime};
use serde::Deserialize;
use serde_json::json;
use tokio::sync::Mutex;
use tracing::{debug, error, warn};

use shared_config::AppConfig;
use shared_database::{eq_filter, TableStore};

use crate::models::{ReservationOutcome, ScheduleError, ScheduleSlot, SlotSuggestion};

const SLOTS_TABLE: &str = "schedule_slots";

pub const DEFAULT_SUGGESTION_LIMIT: usize = 10;

type DayKey = (String, String, NaiveDate);

/// The authoritative ledger of bookable slots. All availability queries and
/// the reservation commit go through here; everything else consumes its
/// results.
pub struct SlotLedgerService {
    store: Arc<TableStore>,
    day_locks: Mutex<HashMap<DayKey, Arc<Mutex<()>>>>,
}

impl SlotLedgerService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            store: Arc::new(TableStore::new(config)),
            day_locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_store(store: Arc<TableStore>) -> Self {
        Self {
            store,
            day_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Distinct doctors present in the ledger, sorted lexicographically.
    pub async fn list_doctors(&self) -> Result<Vec<String>, ScheduleError> {
        #[derive(Deserialize)]
        struct DoctorRow {
            doctor: String,
        }

        let rows: Vec<DoctorRow> = self
            .store
            .select(SLOTS_TABLE, "select=doctor")
            .await
            .map_err(|e| ScheduleError::Storage(e.to_string()))?;

        let doctors: BTreeSet<String> = rows.into_iter().map(|row| row.doctor).collect();
        Ok(doctors.into_iter().collect())
    }

    /// Distinct locations where the doctor has any slot, sorted. Unknown
    /// doctors yield an empty list, not an error.
    pub async fn list_locations(&self, doctor: &str) -> Result<Vec<String>, ScheduleError> {
        #[derive(Deserialize)]
        struct LocationRow {
            location: String,
        }

        let query = format!("select=location&{}", eq_filter("doctor", doctor));
        let rows: Vec<LocationRow> = self
            .store
            .select(SLOTS_TABLE, &query)
            .await
            .map_err(|e| ScheduleError::Storage(e.to_string()))?;

        let locations: BTreeSet<String> = rows.into_iter().map(|row| row.location).collect();
        Ok(locations.into_iter().collect())
    }

    /// Distinct dates with at least one slot for the pair, ascending.
    pub async fn list_dates(
        &self,
        doctor: &str,
        location: &str,
    ) -> Result<Vec<NaiveDate>, ScheduleError> {
        #[derive(Deserialize)]
        struct DateRow {
            date: NaiveDate,
        }

        let query = format!(
            "select=date&{}&{}",
            eq_filter("doctor", doctor),
            eq_filter("location", location)
        );
        let rows: Vec<DateRow> = self
            .store
            .select(SLOTS_TABLE, &query)
            .await
            .map_err(|e| ScheduleError::Storage(e.to_string()))?;

        let dates: BTreeSet<NaiveDate> = rows.into_iter().map(|row| row.date).collect();
        Ok(dates.into_iter().collect())
    }

    /// All of one day's slots for a (doctor, location) pair, sorted by start.
    pub async fn day_slots(
        &self,
        doctor: &str,
        location: &str,
        date: NaiveDate,
    ) -> Result<Vec<ScheduleSlot>, ScheduleError> {
        let query = format!(
            "{}&{}&date=eq.{}&order=start_time.asc",
            eq_filter("doctor", doctor),
            eq_filter("location", location),
            date
        );
        self.store
            .select(SLOTS_TABLE, &query)
            .await
            .map_err(|e| ScheduleError::Storage(e.to_string()))
    }

    /// Start times at which a contiguous run of free slots covers the
    /// required duration, in ascending order, truncated to `limit`.
    pub async fn suggest_slots(
        &self,
        doctor: &str,
        location: &str,
        date: NaiveDate,
        required_minutes: i32,
        limit: Option<usize>,
    ) -> Result<Vec<SlotSuggestion>, ScheduleError> {
        debug!(
            "Suggesting {}-minute slots for {} at {} on {}",
            required_minutes, doctor, location, date
        );

        let day = self.day_slots(doctor, location, date).await?;
        let mut suggestions = contiguous_runs(&day, required_minutes);
        suggestions.truncate(limit.unwrap_or(DEFAULT_SUGGESTION_LIMIT));

        debug!("Found {} candidate start times", suggestions.len());
        Ok(suggestions)
    }

    /// Commit a reservation: flip the whole run of slots covering the
    /// required duration, or nothing at all.
    ///
    /// The read-modify-write runs under a per-day lock so concurrent
    /// bookings of the same (doctor, location, date) are serialized, and
    /// the flip itself is issued as a single filtered update.
    pub async fn reserve(
        &self,
        doctor: &str,
        location: &str,
        date: NaiveDate,
        start_time: NaiveTime,
        required_minutes: i32,
    ) -> Result<ReservationOutcome, ScheduleError> {
        debug!(
            "Reserving {} minutes from {} for {} at {} on {}",
            required_minutes, start_time, doctor, location, date
        );

        let lock = self
            .day_lock((doctor.to_string(), location.to_string(), date))
            .await;
        let _guard = lock.lock().await;

        let day = self.day_slots(doctor, location, date).await?;
        let outcome = plan_reservation(&day, start_time, required_minutes)?;

        let starts: Vec<String> = outcome
            .consumed_starts
            .iter()
            .map(|start| start.format("%H:%M").to_string())
            .collect();
        let query = format!(
            "{}&{}&date=eq.{}&start_time=in.({})&available=eq.true",
            eq_filter("doctor", doctor),
            eq_filter("location", location),
            date,
            starts.join(",")
        );

        let updated: Vec<ScheduleSlot> = self
            .store
            .update(SLOTS_TABLE, &query, json!({ "available": false }))
            .await
            .map_err(|e| ScheduleError::Storage(e.to_string()))?;

        if updated.len() != outcome.consumed_starts.len() {
            // An external writer changed the day between our read and the
            // update; the in-process lock rules this out for our own callers.
            error!(
                "Reservation update touched {} of {} slots for {} at {} on {}",
                updated.len(),
                outcome.consumed_starts.len(),
                doctor,
                location,
                date
            );
            return Err(ScheduleError::Storage(
                "reservation update did not cover the full run".to_string(),
            ));
        }

        Ok(outcome)
    }

    async fn day_lock(&self, key: DayKey) -> Arc<Mutex<()>> {
        let mut locks = self.day_locks.lock().await;
        locks
            .entry(key)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}

// ==============================================================================
// CONTIGUOUS-RUN SEARCH
// ==============================================================================
//
// The grid is made of small fixed slots (typically 30 minutes) while a visit
// may need a longer block, so both the suggestion query and the reservation
// commit reduce to: find `needed` back-to-back free slots. These helpers are
// pure so the search is testable without storage.

/// How many slots the requested duration consumes, derived from the day's
/// own per-row slot duration (floor division, minimum one slot). A day with
/// no slots, or with a nonsensical slot duration, needs zero.
fn needed_slots(day: &[ScheduleSlot], required_minutes: i32) -> usize {
    match day.first() {
        Some(first) if first.slot_minutes > 0 => {
            (required_minutes / first.slot_minutes).max(1) as usize
        }
        _ => 0,
    }
}

/// Whether `needed` slots starting at `start_index` are all present, all
/// free, and exactly back-to-back.
fn run_is_valid(day: &[ScheduleSlot], start_index: usize, needed: usize) -> bool {
    if needed == 0 {
        return false;
    }
    for offset in 0..needed {
        let index = start_index + offset;
        let Some(slot) = day.get(index) else {
            return false;
        };
        if !slot.available {
            return false;
        }
        if offset > 0 && day[index - 1].end_time != slot.start_time {
            return false;
        }
    }
    true
}

/// Every start time whose contiguous run covers `required_minutes`, paired
/// with the implied end time. Duplicate candidates (possible only with
/// malformed, overlapping input) are dropped keeping first-seen order.
pub fn contiguous_runs(day: &[ScheduleSlot], required_minutes: i32) -> Vec<SlotSuggestion> {
    let mut day = day.to_vec();
    day.sort_by_key(|slot| slot.start_time);

    let needed = needed_slots(&day, required_minutes);
    let mut suggestions: Vec<SlotSuggestion> = Vec::new();

    for start_index in 0..day.len() {
        if !run_is_valid(&day, start_index, needed) {
            continue;
        }
        let start_time = day[start_index].start_time;
        let candidate = SlotSuggestion {
            start_time,
            end_time: start_time + Duration::minutes(required_minutes as i64),
        };
        if !suggestions.contains(&candidate) {
            suggestions.push(candidate);
        }
    }

    suggestions
}

/// Validate the run a reservation would consume, without mutating anything.
/// Structurally broken day data (missing rows, gaps, bad flags) comes back
/// as `InsufficientAvailability`, never a panic.
pub fn plan_reservation(
    day: &[ScheduleSlot],
    start_time: NaiveTime,
    required_minutes: i32,
) -> Result<ReservationOutcome, ScheduleError> {
    let mut day = day.to_vec();
    day.sort_by_key(|slot| slot.start_time);

    let start_index = day
        .iter()
        .position(|slot| slot.start_time == start_time)
        .ok_or(ScheduleError::SlotNotFound)?;

    let needed = needed_slots(&day, required_minutes);
    if !run_is_valid(&day, start_index, needed) {
        warn!(
            "Run of {} slots from {} is not contiguously available",
            needed, start_time
        );
        return Err(ScheduleError::InsufficientAvailability);
    }

    let run = &day[start_index..start_index + needed];
    Ok(ReservationOutcome {
        consumed_starts: run.iter().map(|slot| slot.start_time).collect(),
        end_time: run[run.len() - 1].end_time,
    })
}
