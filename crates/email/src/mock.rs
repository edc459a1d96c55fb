//! Mock Email Service Implementation
//!
//! Provides in-memory email capture for testing without external
//! dependencies. Tests can look up captured invitation and join-request
//! emails by recipient to validate workflows.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{EmailError, EmailMessage, EmailReceipt, EmailService};

/// Email captured by the mock service
#[derive(Debug, Clone)]
pub struct CapturedEmail {
    pub message: EmailMessage,
    pub receipt: EmailReceipt,
    pub captured_at: DateTime<Utc>,
}

impl CapturedEmail {
    /// Extract the organization ID from message metadata
    pub fn extract_organization_id(&self) -> Option<Uuid> {
        self.message
            .metadata
            .get("organization_id")
            .and_then(|s| Uuid::parse_str(s).ok())
    }

    /// Whether this email is of the given type (`org_invitation`, `join_request`)
    pub fn is_type(&self, email_type: &str) -> bool {
        self.message
            .metadata
            .get("email_type")
            .map(|t| t == email_type)
            .unwrap_or(false)
    }
}

/// Mock email service for testing
#[derive(Debug, Clone)]
pub struct MockEmailService {
    emails: Arc<Mutex<Vec<CapturedEmail>>>,
    email_by_recipient: Arc<Mutex<HashMap<String, Vec<CapturedEmail>>>>,
}

impl MockEmailService {
    /// Create a new mock email service
    pub fn new() -> Self {
        Self {
            emails: Arc::new(Mutex::new(Vec::new())),
            email_by_recipient: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Get all captured emails
    pub fn get_all_emails(&self) -> Vec<CapturedEmail> {
        self.emails.lock().unwrap().clone()
    }

    /// Get emails sent to a specific recipient
    pub fn get_emails_for_recipient(&self, email: &str) -> Vec<CapturedEmail> {
        self.email_by_recipient
            .lock()
            .unwrap()
            .get(email)
            .cloned()
            .unwrap_or_default()
    }

    /// Get the most recent invitation email for a recipient
    pub fn get_latest_invitation_email(&self, email: &str) -> Option<CapturedEmail> {
        self.get_emails_for_recipient(email)
            .into_iter()
            .filter(|e| e.is_type("org_invitation"))
            .max_by_key(|e| e.captured_at)
    }

    /// Check if an invitation email was sent to a specific email address
    pub fn was_invitation_sent_to(&self, email: &str) -> bool {
        self.get_latest_invitation_email(email).is_some()
    }

    /// Get count of emails sent
    pub fn email_count(&self) -> usize {
        self.emails.lock().unwrap().len()
    }

    /// Clear all captured emails
    pub fn clear(&self) {
        self.emails.lock().unwrap().clear();
        self.email_by_recipient.lock().unwrap().clear();
    }
}

impl Default for MockEmailService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl EmailService for MockEmailService {
    async fn send_email(&self, message: EmailMessage) -> Result<EmailReceipt, EmailError> {
        tracing::info!("Mock email service capturing email to: {}", message.to);

        let receipt = EmailReceipt {
            message_id: format!("mock-{}", Uuid::new_v4()),
            sent_at: Utc::now(),
            provider: "mock".to_string(),
            metadata: message.metadata.clone(),
        };

        let captured = CapturedEmail {
            message: message.clone(),
            receipt: receipt.clone(),
            captured_at: Utc::now(),
        };

        self.emails.lock().unwrap().push(captured.clone());

        self.email_by_recipient
            .lock()
            .unwrap()
            .entry(message.to)
            .or_default()
            .push(captured);

        Ok(receipt)
    }

    fn default_from(&self) -> String {
        "invitations@coterie.app".to_string()
    }

    fn app_base_url(&self) -> &str {
        "https://coterie.app"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_email_service() {
        let service = MockEmailService::new();

        let message = EmailMessage::new(
            "test@example.com".to_string(),
            "sender@coterie.app".to_string(),
            "Test Subject".to_string(),
            "Test body".to_string(),
        );

        let receipt = service.send_email(message).await.unwrap();

        assert!(receipt.message_id.starts_with("mock-"));
        assert_eq!(receipt.provider, "mock");
        assert_eq!(service.email_count(), 1);

        let emails = service.get_emails_for_recipient("test@example.com");
        assert_eq!(emails.len(), 1);
        assert_eq!(emails[0].message.subject, "Test Subject");
    }

    #[tokio::test]
    async fn test_organization_invitation_email() {
        let service = MockEmailService::new();
        let organization_id = Uuid::new_v4();

        let receipt = service
            .send_organization_invitation(
                "MuckRake",
                organization_id,
                "tok-abc123",
                "invitee@example.com",
                "Inviter User",
            )
            .await
            .unwrap();

        assert_eq!(receipt.provider, "mock");

        let captured = service
            .get_latest_invitation_email("invitee@example.com")
            .unwrap();
        assert_eq!(captured.extract_organization_id(), Some(organization_id));
        assert!(captured.message.body_text.contains("tok-abc123"));
        assert!(service.was_invitation_sent_to("invitee@example.com"));
    }

    #[tokio::test]
    async fn test_join_request_notice_is_not_an_invitation() {
        let service = MockEmailService::new();

        service
            .send_join_request_notice(
                "MuckRake",
                Uuid::new_v4(),
                "admin@example.com",
                "requester",
            )
            .await
            .unwrap();

        // Join-request notices must not count as invitation emails
        assert!(!service.was_invitation_sent_to("admin@example.com"));
        assert_eq!(service.get_emails_for_recipient("admin@example.com").len(), 1);
    }

    #[tokio::test]
    async fn test_clear_resets_capture() {
        let service = MockEmailService::new();
        let message = EmailMessage::new(
            "a@example.com".to_string(),
            "sender@coterie.app".to_string(),
            "Subject".to_string(),
            "Body".to_string(),
        );
        service.send_email(message).await.unwrap();
        assert_eq!(service.email_count(), 1);

        service.clear();
        assert_eq!(service.email_count(), 0);
        assert!(service.get_emails_for_recipient("a@example.com").is_empty());
    }
}
