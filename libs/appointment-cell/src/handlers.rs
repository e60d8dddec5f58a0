use std::sync::Arc;

use axum::{extract::State, Json};
use serde_json::{json, Value};

use notification_cell::services::scheduler::ReminderScheduler;
use shared_config::AppConfig;
use shared_models::AppError;

use crate::models::BookAppointmentRequest;
use crate::services::booking::BookingService;

#[derive(Clone)]
pub struct AppointmentCellState {
    pub booking: Arc<BookingService>,
}

impl AppointmentCellState {
    pub fn new(config: &AppConfig, reminders: Arc<ReminderScheduler>) -> Self {
        Self {
            booking: Arc::new(BookingService::new(config, reminders)),
        }
    }
}

#[axum::debug_handler]
pub async fn book_appointment(
    State(state): State<AppointmentCellState>,
    Json(request): Json<BookAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    if request.patient_name.trim().is_empty() {
        return Err(AppError::BadRequest(
            "patient_name must not be empty".to_string(),
        ));
    }

    let confirmation = state.booking.book_appointment(request).await?;

    Ok(Json(json!(confirmation)))
}
