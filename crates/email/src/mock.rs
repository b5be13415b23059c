//! Mock Email Service Implementation
//!
//! Captures emails in memory so tests can assert on invitation workflows
//! without external dependencies.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

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
    /// Invitation ID from metadata, falling back to the accept link in the body
    pub fn extract_invitation_id(&self) -> Option<Uuid> {
        if let Some(id) = self
            .message
            .metadata
            .get("invitation_id")
            .and_then(|raw| Uuid::parse_str(raw).ok())
        {
            return Some(id);
        }

        let text = format!(
            "{} {}",
            self.message.body_text,
            self.message.body_html.as_deref().unwrap_or("")
        );

        let re = regex::Regex::new(r"/invitations/([0-9a-f-]{36})/accept").ok()?;
        let captures = re.captures(&text)?;
        Uuid::parse_str(captures.get(1)?.as_str()).ok()
    }

    pub fn is_invitation(&self) -> bool {
        self.message.metadata.get("email_type").map(String::as_str) == Some("staff_invitation")
    }
}

/// Mock email service for testing
#[derive(Debug, Clone)]
pub struct MockEmailService {
    emails: Arc<Mutex<Vec<CapturedEmail>>>,
    enabled: bool,
    app_base_url: String,
}

impl MockEmailService {
    pub fn new() -> Self {
        Self {
            emails: Arc::new(Mutex::new(Vec::new())),
            enabled: true,
            app_base_url: "https://propdesk.app".to_string(),
        }
    }

    /// A mock that acknowledges sends without capturing them
    pub fn new_disabled() -> Self {
        Self {
            enabled: false,
            ..Self::new()
        }
    }

    fn captured(&self) -> MutexGuard<'_, Vec<CapturedEmail>> {
        self.emails.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn get_all_emails(&self) -> Vec<CapturedEmail> {
        self.captured().clone()
    }

    /// Emails sent to a recipient, compared without case
    pub fn get_emails_for_recipient(&self, email: &str) -> Vec<CapturedEmail> {
        self.captured()
            .iter()
            .filter(|e| e.message.to.eq_ignore_ascii_case(email))
            .cloned()
            .collect()
    }

    /// Most recent invitation email for a recipient
    pub fn get_latest_invitation_email(&self, email: &str) -> Option<CapturedEmail> {
        self.get_emails_for_recipient(email)
            .into_iter()
            .filter(CapturedEmail::is_invitation)
            .max_by_key(|e| e.captured_at)
    }

    pub fn get_invitation_id_for_email(&self, email: &str) -> Option<Uuid> {
        self.get_latest_invitation_email(email)
            .and_then(|email| email.extract_invitation_id())
    }

    pub fn was_invitation_sent_to(&self, email: &str) -> bool {
        self.get_invitation_id_for_email(email).is_some()
    }

    pub fn email_count(&self) -> usize {
        self.captured().len()
    }

    pub fn clear(&self) {
        self.captured().clear();
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
        if !self.enabled {
            tracing::warn!("Mock email service disabled, skipping send");
            return Ok(EmailReceipt {
                message_id: format!("disabled-{}", Uuid::new_v4()),
                sent_at: Utc::now(),
                provider: "mock-disabled".to_string(),
                metadata: message.metadata,
            });
        }

        let receipt = EmailReceipt {
            message_id: format!("mock-{}", Uuid::new_v4()),
            sent_at: Utc::now(),
            provider: "mock".to_string(),
            metadata: message.metadata.clone(),
        };

        tracing::info!(
            to = %message.to,
            message_id = %receipt.message_id,
            "Mock email captured"
        );

        self.captured().push(CapturedEmail {
            message,
            receipt: receipt.clone(),
            captured_at: Utc::now(),
        });

        Ok(receipt)
    }

    fn default_from(&self) -> String {
        "team@propdesk.app".to_string()
    }

    fn app_base_url(&self) -> &str {
        &self.app_base_url
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::InvitationEmail;
    use std::collections::HashMap;

    fn plain(to: &str) -> EmailMessage {
        EmailMessage::new(
            to.to_string(),
            "team@propdesk.app".to_string(),
            "Test Subject".to_string(),
            "Test body".to_string(),
        )
    }

    #[tokio::test]
    async fn test_mock_captures_email() {
        let service = MockEmailService::new();

        let receipt = service.send_email(plain("test@example.com")).await.unwrap();

        assert!(receipt.message_id.starts_with("mock-"));
        assert_eq!(receipt.provider, "mock");
        assert_eq!(service.email_count(), 1);

        let emails = service.get_emails_for_recipient("TEST@example.com");
        assert_eq!(emails.len(), 1);
        assert_eq!(emails[0].message.subject, "Test Subject");
        assert!(!emails[0].is_invitation());
    }

    #[tokio::test]
    async fn test_staff_invitation_is_traceable() {
        let service = MockEmailService::new();
        let invitation_id = Uuid::new_v4();
        let titles = vec!["Downtown Apartments".to_string()];

        service
            .send_staff_invitation(InvitationEmail {
                invitation_id,
                recipient_email: "fixit@example.com",
                inviter_name: "Dana",
                role_name: "Contractor",
                property_titles: &titles,
                expires_in_days: 7,
            })
            .await
            .unwrap();

        let captured = service
            .get_latest_invitation_email("fixit@example.com")
            .unwrap();
        assert!(captured.message.subject.contains("Contractor"));
        assert!(captured
            .message
            .body_text
            .contains(&format!("https://propdesk.app/invitations/{}/accept", invitation_id)));
        assert_eq!(
            service.get_invitation_id_for_email("fixit@example.com"),
            Some(invitation_id)
        );
        assert!(!service.was_invitation_sent_to("someone-else@example.com"));
    }

    #[test]
    fn test_invitation_id_from_body_link() {
        let message = EmailMessage::new(
            "test@example.com".to_string(),
            "team@propdesk.app".to_string(),
            "Invitation".to_string(),
            "Accept: https://propdesk.app/invitations/550e8400-e29b-41d4-a716-446655440000/accept"
                .to_string(),
        );

        let captured = CapturedEmail {
            message,
            receipt: EmailReceipt {
                message_id: "test".to_string(),
                sent_at: Utc::now(),
                provider: "test".to_string(),
                metadata: HashMap::new(),
            },
            captured_at: Utc::now(),
        };

        assert_eq!(
            captured.extract_invitation_id().map(|id| id.to_string()),
            Some("550e8400-e29b-41d4-a716-446655440000".to_string())
        );
    }

    #[tokio::test]
    async fn test_disabled_mock_does_not_capture() {
        let service = MockEmailService::new_disabled();

        let receipt = service.send_email(plain("test@example.com")).await.unwrap();

        assert!(receipt.message_id.starts_with("disabled-"));
        assert_eq!(receipt.provider, "mock-disabled");
        assert_eq!(service.email_count(), 0);
    }

    #[tokio::test]
    async fn test_clear() {
        let service = MockEmailService::new();
        service.send_email(plain("a@example.com")).await.unwrap();
        service.clear();
        assert_eq!(service.email_count(), 0);
    }
}
