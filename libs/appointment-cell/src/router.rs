use std::sync::Arc;

use axum::{routing::post, Router};

use notification_cell::services::scheduler::ReminderScheduler;
use shared_config::AppConfig;

use crate::handlers::{self, AppointmentCellState};

pub fn appointment_routes(
    config: Arc<AppConfig>,
    reminders: Arc<ReminderScheduler>,
) -> Router {
    let state = AppointmentCellState::new(&config, reminders);

    Router::new()
        .route("/", post(handlers::book_appointment))
        .with_state(state)
}
