use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::debug;
use uuid::Uuid;

use shared_config::AppConfig;

use crate::models::{MessageChannel, NotificationError, OutboxMessage};

/// Records composed messages as files in the outbox directory. Actual
/// transport is somebody else's problem; the outbox is the delivery record.
pub struct OutboxService {
    dir: PathBuf,
}

impl OutboxService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            dir: PathBuf::from(&config.outbox_dir),
        }
    }

    pub fn with_dir(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub async fn deliver(&self, message: &OutboxMessage) -> Result<PathBuf, NotificationError> {
        tokio::fs::create_dir_all(&self.dir).await?;

        let prefix = match message.channel {
            MessageChannel::Email => "email",
            MessageChannel::Sms => "sms",
        };
        let stamp = Utc::now().format("%Y%m%d-%H%M%S");
        // The timestamp alone collides when several messages are written in
        // the same second, so a short random suffix keeps names unique.
        let nonce = Uuid::new_v4().simple().to_string();
        let path = self
            .dir
            .join(format!("{}_{}_{}.txt", prefix, stamp, &nonce[..8]));

        tokio::fs::write(&path, render(message)).await?;
        debug!("Wrote {} message to {}", prefix, path.display());

        Ok(path)
    }
}

fn render(message: &OutboxMessage) -> String {
    let mut content = match (&message.channel, &message.subject) {
        (MessageChannel::Email, Some(subject)) => {
            format!("TO: {}\nSUBJECT: {}\n\n{}", message.to, subject, message.body)
        }
        _ => format!("TO: {}\n\n{}", message.to, message.body),
    };

    if !message.attachments.is_empty() {
        content.push_str("\n\nAttachments:\n");
        for attachment in &message.attachments {
            content.push_str(&format!("- {}\n", attachment));
        }
    }

    content
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_rendering_includes_headers_and_attachments() {
        let message = OutboxMessage::email("jane@example.com", "Confirmation", "Hello".to_string())
            .with_attachment("forms/IntakeForm.pdf");

        let content = render(&message);

        assert!(content.starts_with("TO: jane@example.com\nSUBJECT: Confirmation\n\nHello"));
        assert!(content.contains("Attachments:\n- forms/IntakeForm.pdf"));
    }

    #[test]
    fn sms_rendering_has_no_subject_line() {
        let message = OutboxMessage::sms("5550001111", "Hello".to_string());
        assert_eq!(render(&message), "TO: 5550001111\n\nHello");
    }
}
