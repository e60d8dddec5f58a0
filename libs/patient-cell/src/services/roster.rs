use std::sync::Arc;

use chrono::NaiveDate;
use tracing::debug;

use shared_config::AppConfig;
use shared_database::TableStore;

use crate::models::{PatientError, PatientMatch, PatientRecord, PatientType};

const PATIENTS_TABLE: &str = "patients";

pub struct PatientRosterService {
    store: Arc<TableStore>,
}

impl PatientRosterService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            store: Arc::new(TableStore::new(config)),
        }
    }

    pub fn with_store(store: Arc<TableStore>) -> Self {
        Self { store }
    }

    /// Exact-match roster lookup: date of birth filters server-side, the
    /// name comparison is case-insensitive and whitespace-normalized on our
    /// side. No fuzzy matching.
    pub async fn find_patient(
        &self,
        name: &str,
        dob: NaiveDate,
    ) -> Result<PatientMatch, PatientError> {
        debug!("Looking up patient born {}", dob);

        let query = format!("dob=eq.{}", dob);
        let candidates: Vec<PatientRecord> = self
            .store
            .select(PATIENTS_TABLE, &query)
            .await
            .map_err(|e| PatientError::Storage(e.to_string()))?;

        let target = normalize_name(name);
        let found = candidates
            .into_iter()
            .find(|record| normalize_name(&record.name) == target);

        match found {
            Some(record) => {
                debug!("Roster match found for {}", dob);
                Ok(PatientMatch {
                    exists: true,
                    patient_type: PatientType::from_stored(record.patient_type.as_deref()),
                    phone: record.phone,
                    email: record.email,
                })
            }
            None => Ok(PatientMatch::unknown()),
        }
    }
}

/// Lowercase and collapse internal whitespace so "  Jane   DOE " matches
/// "Jane Doe".
pub fn normalize_name(name: &str) -> String {
    name.split_whitespace()
        .map(|word| word.to_lowercase())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalization_collapses_case_and_whitespace() {
        assert_eq!(normalize_name("  Jane   DOE "), "jane doe");
        assert_eq!(normalize_name("Jane Doe"), "jane doe");
        assert_eq!(normalize_name(""), "");
    }

    #[test]
    fn stored_classification_wins_when_present() {
        assert_eq!(PatientType::from_stored(Some("New")), PatientType::New);
        assert_eq!(PatientType::from_stored(Some("new ")), PatientType::New);
        assert_eq!(
            PatientType::from_stored(Some("Returning")),
            PatientType::Returning
        );
        assert_eq!(PatientType::from_stored(None), PatientType::Returning);
    }
}
