//! Coterie Email Service
//!
//! Notification dispatch for the membership workflows:
//! - Invitation emails sent to invited addresses
//! - Join-request notices sent to organization admins
//! - Mock service with capture for testing, log service for development
//!
//! Delivery is fire-and-forget from the coordinator's point of view; a
//! failed dispatch is the dispatcher's problem, never the caller's.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

pub mod content;
pub mod log;
pub mod mock;

pub use log::LogEmailService;
pub use mock::MockEmailService;

#[derive(Error, Debug)]
pub enum EmailError {
    #[error("Email configuration error: {0}")]
    Configuration(String),

    #[error("Email validation error: {0}")]
    Validation(String),
}

/// Email message to be sent
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailMessage {
    pub to: String,
    pub from: String,
    pub reply_to: Option<String>,
    pub subject: String,
    pub body_text: String,
    pub body_html: Option<String>,
    pub metadata: HashMap<String, String>,
}

impl EmailMessage {
    /// Create a new email message
    pub fn new(to: String, from: String, subject: String, body_text: String) -> Self {
        Self {
            to,
            from,
            reply_to: None,
            subject,
            body_text,
            body_html: None,
            metadata: HashMap::new(),
        }
    }

    /// Add HTML body content
    pub fn with_html(mut self, body_html: String) -> Self {
        self.body_html = Some(body_html);
        self
    }

    /// Add reply-to address
    pub fn with_reply_to(mut self, reply_to: String) -> Self {
        self.reply_to = Some(reply_to);
        self
    }

    /// Add metadata for tracking
    pub fn with_metadata(mut self, key: String, value: String) -> Self {
        self.metadata.insert(key, value);
        self
    }
}

/// Email delivery receipt
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailReceipt {
    pub message_id: String,
    pub sent_at: DateTime<Utc>,
    pub provider: String,
    pub metadata: HashMap<String, String>,
}

/// Email service configuration
#[derive(Debug, Clone)]
pub struct EmailConfig {
    /// Email service provider (log, mock)
    pub provider: String,
    /// Default from address
    pub default_from: String,
    /// Enable email sending (can disable for testing)
    pub enabled: bool,
    /// Base URL for the application (used in invitation links)
    pub app_base_url: String,
}

impl EmailConfig {
    /// Create email config from environment variables
    pub fn from_env() -> Result<Self, EmailError> {
        dotenvy::dotenv().ok();

        let provider = std::env::var("EMAIL_PROVIDER").unwrap_or_else(|_| "log".to_string());

        let default_from =
            std::env::var("FROM_EMAIL").unwrap_or_else(|_| "invitations@coterie.app".to_string());

        let enabled = std::env::var("EMAIL_ENABLED")
            .unwrap_or_else(|_| "true".to_string())
            .parse()
            .unwrap_or(true);

        let app_base_url =
            std::env::var("APP_BASE_URL").unwrap_or_else(|_| "https://coterie.app".to_string());

        Ok(Self {
            provider,
            default_from,
            enabled,
            app_base_url,
        })
    }
}

/// Email service trait for different implementations
#[async_trait::async_trait]
pub trait EmailService: Send + Sync {
    /// Send an email message
    async fn send_email(&self, message: EmailMessage) -> Result<EmailReceipt, EmailError>;

    /// Return the default "from" address for outgoing emails
    fn default_from(&self) -> String;

    /// Return the application base URL for building links
    fn app_base_url(&self) -> &str;

    /// Send an organization invitation email to the invited address
    async fn send_organization_invitation(
        &self,
        organization_name: &str,
        organization_id: Uuid,
        invitation_token: &str,
        recipient_email: &str,
        inviter_name: &str,
    ) -> Result<EmailReceipt, EmailError> {
        let invitation_url = format!(
            "{}/invitations/{}/accept",
            self.app_base_url(),
            invitation_token
        );

        let subject = format!("Invitation to join {}", organization_name);
        let body_text = content::organization_invitation_text(
            inviter_name,
            organization_name,
            &invitation_url,
        );
        let body_html = content::organization_invitation_html(
            inviter_name,
            organization_name,
            &invitation_url,
        );

        let message = EmailMessage::new(
            recipient_email.to_string(),
            self.default_from(),
            subject,
            body_text,
        )
        .with_html(body_html)
        .with_metadata("email_type".to_string(), "org_invitation".to_string())
        .with_metadata("organization_id".to_string(), organization_id.to_string());

        self.send_email(message).await
    }

    /// Send a join-request notice to an organization admin
    async fn send_join_request_notice(
        &self,
        organization_name: &str,
        organization_id: Uuid,
        admin_email: &str,
        requester_name: &str,
    ) -> Result<EmailReceipt, EmailError> {
        let review_url = format!(
            "{}/organizations/{}/invitations",
            self.app_base_url(),
            organization_id
        );

        let subject = format!("{} has requested to join {}", requester_name, organization_name);
        let body_text = content::join_request_text(requester_name, organization_name, &review_url);
        let body_html = content::join_request_html(requester_name, organization_name, &review_url);

        let message = EmailMessage::new(
            admin_email.to_string(),
            self.default_from(),
            subject,
            body_text,
        )
        .with_html(body_html)
        .with_metadata("email_type".to_string(), "join_request".to_string())
        .with_metadata("organization_id".to_string(), organization_id.to_string());

        self.send_email(message).await
    }
}

/// Email service factory
pub struct EmailServiceFactory;

impl EmailServiceFactory {
    /// Create email service based on configuration
    pub fn create(config: EmailConfig) -> Result<Box<dyn EmailService>, EmailError> {
        if !config.enabled {
            tracing::info!("Email service disabled, using mock implementation");
            return Ok(Box::new(mock::MockEmailService::new()));
        }

        match config.provider.as_str() {
            "log" => {
                tracing::info!("Creating log email service");
                Ok(Box::new(log::LogEmailService::new(config)))
            }
            "mock" => {
                tracing::info!("Creating mock email service");
                Ok(Box::new(mock::MockEmailService::new()))
            }
            provider => Err(EmailError::Configuration(format!(
                "Unknown email provider: {}. Supported providers: log, mock",
                provider
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_message_creation() {
        let message = EmailMessage::new(
            "test@example.com".to_string(),
            "sender@example.com".to_string(),
            "Test Subject".to_string(),
            "Test body".to_string(),
        )
        .with_html("<p>Test body</p>".to_string())
        .with_reply_to("reply@example.com".to_string())
        .with_metadata("organization_id".to_string(), "123".to_string());

        assert_eq!(message.to, "test@example.com");
        assert_eq!(message.from, "sender@example.com");
        assert_eq!(message.subject, "Test Subject");
        assert_eq!(message.body_text, "Test body");
        assert_eq!(message.body_html, Some("<p>Test body</p>".to_string()));
        assert_eq!(message.reply_to, Some("reply@example.com".to_string()));
        assert_eq!(
            message.metadata.get("organization_id"),
            Some(&"123".to_string())
        );
    }

    #[test]
    fn test_email_config_from_env() {
        // Test with defaults
        std::env::remove_var("EMAIL_PROVIDER");
        std::env::remove_var("FROM_EMAIL");
        std::env::remove_var("EMAIL_ENABLED");

        let config = EmailConfig::from_env().unwrap();
        assert_eq!(config.provider, "log");
        assert_eq!(config.default_from, "invitations@coterie.app");
        assert!(config.enabled);
    }

    #[test]
    fn test_factory_rejects_unknown_provider() {
        let config = EmailConfig {
            provider: "carrier-pigeon".to_string(),
            default_from: "from@example.com".to_string(),
            enabled: true,
            app_base_url: "https://example.com".to_string(),
        };
        assert!(EmailServiceFactory::create(config).is_err());
    }
}
