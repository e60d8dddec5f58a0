use std::sync::Arc;

use axum::{routing::get, Router};

use crate::handlers;
use crate::services::scheduler::ReminderScheduler;

pub fn notification_routes(scheduler: Arc<ReminderScheduler>) -> Router {
    Router::new()
        .route("/pending", get(handlers::pending_reminders))
        .with_state(scheduler)
}
