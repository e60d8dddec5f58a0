use std::env;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub storage_url: String,
    pub storage_service_key: String,
    pub outbox_dir: String,
    pub intake_form_path: String,
    pub bind_port: u16,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let config = Self {
            storage_url: env::var("STORAGE_URL")
                .unwrap_or_else(|_| {
                    warn!("STORAGE_URL not set, using empty value");
                    String::new()
                }),
            storage_service_key: env::var("STORAGE_SERVICE_KEY")
                .unwrap_or_else(|_| {
                    warn!("STORAGE_SERVICE_KEY not set, using empty value");
                    String::new()
                }),
            outbox_dir: env::var("OUTBOX_DIR")
                .unwrap_or_else(|_| "outbox".to_string()),
            intake_form_path: env::var("INTAKE_FORM_PATH")
                .unwrap_or_else(|_| "forms/IntakeForm.pdf".to_string()),
            bind_port: env::var("BIND_PORT")
                .ok()
                .and_then(|raw| raw.parse().ok())
                .unwrap_or_else(|| {
                    warn!("BIND_PORT not set or invalid, using default 3000");
                    3000
                }),
        };

        if !config.is_configured() {
            warn!("Application not fully configured - missing environment variables");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        !self.storage_url.is_empty() && !self.storage_service_key.is_empty()
    }
}
