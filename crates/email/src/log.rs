//! Log-backed email service for local development
//!
//! Writes outgoing messages to the tracing log instead of delivering them.
//! This is the default provider; real transport lives behind the same
//! trait in deployment-specific crates.

use chrono::Utc;
use uuid::Uuid;

use crate::{EmailConfig, EmailError, EmailMessage, EmailReceipt, EmailService};

pub struct LogEmailService {
    config: EmailConfig,
}

impl LogEmailService {
    pub fn new(config: EmailConfig) -> Self {
        Self { config }
    }
}

#[async_trait::async_trait]
impl EmailService for LogEmailService {
    async fn send_email(&self, message: EmailMessage) -> Result<EmailReceipt, EmailError> {
        tracing::info!(
            to = %message.to,
            subject = %message.subject,
            email_type = message.metadata.get("email_type").map(String::as_str),
            "outgoing email"
        );
        tracing::debug!(body = %message.body_text, "email body");

        Ok(EmailReceipt {
            message_id: format!("log-{}", Uuid::new_v4()),
            sent_at: Utc::now(),
            provider: "log".to_string(),
            metadata: message.metadata,
        })
    }

    fn default_from(&self) -> String {
        self.config.default_from.clone()
    }

    fn app_base_url(&self) -> &str {
        &self.config.app_base_url
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> EmailConfig {
        EmailConfig {
            provider: "log".to_string(),
            default_from: "from@example.com".to_string(),
            enabled: true,
            app_base_url: "https://example.com".to_string(),
        }
    }

    #[tokio::test]
    async fn test_log_service_returns_receipt() {
        let service = LogEmailService::new(test_config());
        let message = EmailMessage::new(
            "to@example.com".to_string(),
            "from@example.com".to_string(),
            "Subject".to_string(),
            "Body".to_string(),
        );

        let receipt = service.send_email(message).await.unwrap();
        assert!(receipt.message_id.starts_with("log-"));
        assert_eq!(receipt.provider, "log");
    }

    #[test]
    fn test_log_service_exposes_config() {
        let service = LogEmailService::new(test_config());
        assert_eq!(service.default_from(), "from@example.com");
        assert_eq!(service.app_base_url(), "https://example.com");
    }
}
