use std::sync::Arc;

use anyhow::{anyhow, Result};
use chrono::Duration;
use serde_json::Value;
use tracing::{debug, info};

use shared_config::AppConfig;
use shared_database::TableStore;

use crate::models::{GenerateScheduleRequest, ScheduleSlot};

const SLOTS_TABLE: &str = "schedule_slots";

/// Bulk schedule generation: one slot row per slot per doctor per working
/// day, locations rotated by day index.
pub struct CalendarService {
    store: Arc<TableStore>,
}

impl CalendarService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            store: Arc::new(TableStore::new(config)),
        }
    }

    pub fn with_store(store: Arc<TableStore>) -> Self {
        Self { store }
    }

    pub async fn generate_schedule(&self, request: GenerateScheduleRequest) -> Result<usize> {
        if request.doctors.is_empty() {
            return Err(anyhow!("At least one doctor is required"));
        }
        if request.locations.is_empty() {
            return Err(anyhow!("At least one location is required"));
        }
        if request.days == 0 {
            return Err(anyhow!("Day count must be at least 1"));
        }
        if request.slot_minutes <= 0 {
            return Err(anyhow!("Slot duration must be positive"));
        }
        if request.work_start >= request.work_end {
            return Err(anyhow!("Working day must start before it ends"));
        }

        let slots = build_slot_grid(&request);
        if slots.is_empty() {
            return Err(anyhow!("Working window is shorter than one slot"));
        }

        debug!(
            "Generated {} slots for {} doctors over {} days",
            slots.len(),
            request.doctors.len(),
            request.days
        );

        let body = serde_json::to_value(&slots)?;
        let created: Vec<Value> = self.store.insert(SLOTS_TABLE, body).await?;

        if created.is_empty() {
            return Err(anyhow!("Failed to persist generated schedule"));
        }

        info!("Persisted {} schedule slots", created.len());
        Ok(created.len())
    }
}

fn build_slot_grid(request: &GenerateScheduleRequest) -> Vec<ScheduleSlot> {
    let slot_span = Duration::minutes(request.slot_minutes as i64);
    let mut slots = Vec::new();

    for day_index in 0..request.days {
        let date = request.start_date + Duration::days(day_index as i64);
        let location = &request.locations[day_index as usize % request.locations.len()];

        for doctor in &request.doctors {
            let mut current = request.work_start;
            while current < request.work_end {
                slots.push(ScheduleSlot {
                    doctor: doctor.clone(),
                    date,
                    start_time: current,
                    end_time: current + slot_span,
                    slot_minutes: request.slot_minutes,
                    location: location.clone(),
                    available: true,
                });
                current += slot_span;
            }
        }
    }

    slots
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};

    fn request() -> GenerateScheduleRequest {
        GenerateScheduleRequest {
            doctors: vec!["Dr. Adams".to_string(), "Dr. Brown".to_string()],
            locations: vec!["L1".to_string(), "L2".to_string()],
            start_date: NaiveDate::from_ymd_opt(2025, 1, 2).unwrap(),
            days: 2,
            work_start: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            work_end: NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
            slot_minutes: 30,
        }
    }

    #[test]
    fn grid_covers_the_working_day_per_doctor() {
        let slots = build_slot_grid(&request());

        // 16 half-hour slots per doctor per day.
        assert_eq!(slots.len(), 16 * 2 * 2);
        assert!(slots.iter().all(|slot| slot.available));
    }

    #[test]
    fn every_slot_spans_exactly_the_slot_duration() {
        for slot in build_slot_grid(&request()) {
            assert_eq!(
                slot.end_time - slot.start_time,
                Duration::minutes(slot.slot_minutes as i64)
            );
        }
    }

    #[test]
    fn locations_rotate_by_day() {
        let slots = build_slot_grid(&request());
        let first_day = NaiveDate::from_ymd_opt(2025, 1, 2).unwrap();
        let second_day = NaiveDate::from_ymd_opt(2025, 1, 3).unwrap();

        assert!(slots
            .iter()
            .filter(|slot| slot.date == first_day)
            .all(|slot| slot.location == "L1"));
        assert!(slots
            .iter()
            .filter(|slot| slot.date == second_day)
            .all(|slot| slot.location == "L2"));
    }
}
