use std::sync::Arc;

use axum::{extract::State, Json};
use serde_json::{json, Value};

use shared_models::AppError;

use crate::services::scheduler::ReminderScheduler;

#[axum::debug_handler]
pub async fn pending_reminders(
    State(scheduler): State<Arc<ReminderScheduler>>,
) -> Result<Json<Value>, AppError> {
    let pending = scheduler.pending().await;

    Ok(Json(json!({
        "pending": pending,
        "total": pending.len()
    })))
}
