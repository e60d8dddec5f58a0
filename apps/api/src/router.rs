use std::sync::Arc;

use axum::{routing::get, Router};

use appointment_cell::router::appointment_routes;
use notification_cell::router::notification_routes;
use notification_cell::services::scheduler::ReminderScheduler;
use patient_cell::router::patient_routes;
use schedule_cell::router::schedule_routes;
use shared_config::AppConfig;

pub fn create_router(config: Arc<AppConfig>, reminders: Arc<ReminderScheduler>) -> Router {
    Router::new()
        .route("/", get(|| async { "Clinic Scheduling API is running!" }))
        .nest("/schedule", schedule_routes(config.clone()))
        .nest("/patients", patient_routes(config.clone()))
        .nest(
            "/appointments",
            appointment_routes(config.clone(), reminders.clone()),
        )
        .nest("/reminders", notification_routes(reminders))
}
