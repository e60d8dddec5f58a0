use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use shared_config::AppConfig;

use crate::handlers::{self, ScheduleCellState};

pub fn schedule_routes(config: Arc<AppConfig>) -> Router {
    let state = ScheduleCellState::new(&config);

    Router::new()
        .route("/doctors", get(handlers::list_doctors))
        .route("/doctors/{doctor}/locations", get(handlers::list_locations))
        .route("/doctors/{doctor}/dates", get(handlers::list_dates))
        .route("/slots", get(handlers::suggest_slots))
        .route("/generate", post(handlers::generate_schedule))
        .with_state(state)
}
