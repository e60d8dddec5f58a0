use std::sync::Arc;

use axum::{routing::post, Router};

use shared_config::AppConfig;

use crate::handlers::{self, PatientCellState};

pub fn patient_routes(config: Arc<AppConfig>) -> Router {
    let state = PatientCellState::new(&config);

    Router::new()
        .route("/lookup", post(handlers::lookup_patient))
        .with_state(state)
}
