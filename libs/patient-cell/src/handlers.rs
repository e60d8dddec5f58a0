use std::sync::Arc;

use axum::{extract::State, Json};
use serde_json::{json, Value};

use shared_config::AppConfig;
use shared_models::AppError;

use crate::models::PatientLookupRequest;
use crate::services::roster::PatientRosterService;

#[derive(Clone)]
pub struct PatientCellState {
    pub roster: Arc<PatientRosterService>,
}

impl PatientCellState {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            roster: Arc::new(PatientRosterService::new(config)),
        }
    }
}

#[axum::debug_handler]
pub async fn lookup_patient(
    State(state): State<PatientCellState>,
    Json(request): Json<PatientLookupRequest>,
) -> Result<Json<Value>, AppError> {
    if request.name.trim().is_empty() {
        return Err(AppError::BadRequest("name must not be empty".to_string()));
    }

    let lookup = state
        .roster
        .find_patient(&request.name, request.dob)
        .await?;

    Ok(Json(json!(lookup)))
}
