use std::sync::Arc;

use anyhow::{anyhow, Result};
use tracing::debug;

use shared_config::AppConfig;
use shared_database::TableStore;

use crate::models::AppointmentRecord;

const APPOINTMENTS_TABLE: &str = "appointments";

/// Persists confirmed appointments to the appointments sink.
pub struct AppointmentRecordsService {
    store: Arc<TableStore>,
}

impl AppointmentRecordsService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            store: Arc::new(TableStore::new(config)),
        }
    }

    pub fn with_store(store: Arc<TableStore>) -> Self {
        Self { store }
    }

    pub async fn append_appointment(&self, record: &AppointmentRecord) -> Result<()> {
        debug!("Persisting appointment {}", record.appointment_id);

        let body = serde_json::to_value(record)?;
        let created: Vec<AppointmentRecord> =
            self.store.insert(APPOINTMENTS_TABLE, body).await?;

        if created.is_empty() {
            return Err(anyhow!("Failed to persist appointment record"));
        }

        debug!("Appointment {} persisted", record.appointment_id);
        Ok(())
    }
}
