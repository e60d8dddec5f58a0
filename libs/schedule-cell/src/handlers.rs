use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{json, Value};

use shared_config::AppConfig;
use shared_models::AppError;

use crate::models::GenerateScheduleRequest;
use crate::services::{calendar::CalendarService, ledger::SlotLedgerService};

#[derive(Clone)]
pub struct ScheduleCellState {
    pub ledger: Arc<SlotLedgerService>,
    pub calendar: Arc<CalendarService>,
}

impl ScheduleCellState {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            ledger: Arc::new(SlotLedgerService::new(config)),
            calendar: Arc::new(CalendarService::new(config)),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct DatesQuery {
    pub location: String,
}

#[derive(Debug, Deserialize)]
pub struct SuggestQuery {
    pub doctor: String,
    pub location: String,
    pub date: NaiveDate,
    pub duration_minutes: i32,
    pub limit: Option<usize>,
}

#[axum::debug_handler]
pub async fn list_doctors(
    State(state): State<ScheduleCellState>,
) -> Result<Json<Value>, AppError> {
    let doctors = state.ledger.list_doctors().await?;

    Ok(Json(json!({
        "doctors": doctors,
        "total": doctors.len()
    })))
}

#[axum::debug_handler]
pub async fn list_locations(
    State(state): State<ScheduleCellState>,
    Path(doctor): Path<String>,
) -> Result<Json<Value>, AppError> {
    let locations = state.ledger.list_locations(&doctor).await?;

    Ok(Json(json!({
        "doctor": doctor,
        "locations": locations
    })))
}

#[axum::debug_handler]
pub async fn list_dates(
    State(state): State<ScheduleCellState>,
    Path(doctor): Path<String>,
    Query(query): Query<DatesQuery>,
) -> Result<Json<Value>, AppError> {
    let dates = state.ledger.list_dates(&doctor, &query.location).await?;

    Ok(Json(json!({
        "doctor": doctor,
        "location": query.location,
        "dates": dates
    })))
}

#[axum::debug_handler]
pub async fn suggest_slots(
    State(state): State<ScheduleCellState>,
    Query(query): Query<SuggestQuery>,
) -> Result<Json<Value>, AppError> {
    if query.duration_minutes <= 0 {
        return Err(AppError::BadRequest(
            "duration_minutes must be positive".to_string(),
        ));
    }

    let suggestions = state
        .ledger
        .suggest_slots(
            &query.doctor,
            &query.location,
            query.date,
            query.duration_minutes,
            query.limit,
        )
        .await?;

    Ok(Json(json!({
        "doctor": query.doctor,
        "location": query.location,
        "date": query.date,
        "duration_minutes": query.duration_minutes,
        "suggestions": suggestions,
        "total": suggestions.len()
    })))
}

#[axum::debug_handler]
pub async fn generate_schedule(
    State(state): State<ScheduleCellState>,
    Json(request): Json<GenerateScheduleRequest>,
) -> Result<Json<Value>, AppError> {
    let created = state
        .calendar
        .generate_schedule(request)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(Json(json!({
        "created_slots": created
    })))
}
