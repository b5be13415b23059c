//! PropDesk Email Service
//!
//! Delivers staff invitation emails through:
//! - AWS SES for production delivery
//! - An in-memory mock for tests and local development
//! - LocalStack when `AWS_ENDPOINT_URL` points at it

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

pub mod aws_ses;
pub mod content;
pub mod mock;

#[derive(Error, Debug)]
pub enum EmailError {
    #[error("Email configuration error: {0}")]
    Configuration(String),

    #[error("Email validation error: {0}")]
    Validation(String),

    #[error("AWS SES error: {0}")]
    AwsSes(String),
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

    pub fn with_html(mut self, body_html: String) -> Self {
        self.body_html = Some(body_html);
        self
    }

    pub fn with_reply_to(mut self, reply_to: String) -> Self {
        self.reply_to = Some(reply_to);
        self
    }

    /// Attach a tracking key; providers echo metadata on the receipt
    pub fn with_metadata(mut self, key: &str, value: impl Into<String>) -> Self {
        self.metadata.insert(key.to_string(), value.into());
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

/// What an invitation email needs to say
#[derive(Debug, Clone)]
pub struct InvitationEmail<'a> {
    pub invitation_id: Uuid,
    pub recipient_email: &'a str,
    pub inviter_name: &'a str,
    /// Human-readable role, e.g. "Maintenance Lead"
    pub role_name: &'a str,
    /// Titles of the properties the invitee will be linked to
    pub property_titles: &'a [String],
    pub expires_in_days: i64,
}

/// Email service configuration
#[derive(Debug, Clone)]
pub struct EmailConfig {
    /// Email service provider (ses, mock)
    pub provider: String,
    pub aws_region: Option<String>,
    /// AWS endpoint URL (for LocalStack)
    pub aws_endpoint_url: Option<String>,
    pub default_from: String,
    /// When false the mock is used regardless of `provider`
    pub enabled: bool,
    /// Base URL of the web app, used in invitation links
    pub app_base_url: String,
}

impl EmailConfig {
    pub fn from_env() -> Result<Self, EmailError> {
        dotenvy::dotenv().ok();

        let provider = std::env::var("EMAIL_PROVIDER").unwrap_or_else(|_| "mock".to_string());

        let aws_region = std::env::var("AWS_REGION").ok();
        let aws_endpoint_url = std::env::var("AWS_ENDPOINT_URL").ok();

        let default_from =
            std::env::var("FROM_EMAIL").unwrap_or_else(|_| "team@propdesk.app".to_string());

        let enabled = match std::env::var("EMAIL_ENABLED") {
            Ok(raw) => raw.parse().map_err(|_| {
                EmailError::Configuration(format!(
                    "EMAIL_ENABLED must be true or false, got '{}'",
                    raw
                ))
            })?,
            Err(_) => true,
        };

        let app_base_url =
            std::env::var("APP_BASE_URL").unwrap_or_else(|_| "https://propdesk.app".to_string());

        Ok(Self {
            provider,
            aws_region,
            aws_endpoint_url,
            default_from,
            enabled,
            app_base_url,
        })
    }
}

/// Email service trait for different implementations
#[async_trait::async_trait]
pub trait EmailService: Send + Sync {
    async fn send_email(&self, message: EmailMessage) -> Result<EmailReceipt, EmailError>;

    /// Default "from" address for outgoing emails
    fn default_from(&self) -> String;

    /// Base URL for building links
    fn app_base_url(&self) -> &str;

    /// Send a staff invitation
    async fn send_staff_invitation(
        &self,
        invitation: InvitationEmail<'_>,
    ) -> Result<EmailReceipt, EmailError> {
        let invitation_url =
            content::invitation_url(self.app_base_url(), invitation.invitation_id);

        let subject = content::staff_invitation_subject(invitation.role_name);
        let body_text = content::staff_invitation_text(&invitation, &invitation_url);
        let body_html = content::staff_invitation_html(&invitation, &invitation_url);

        let message = EmailMessage::new(
            invitation.recipient_email.to_string(),
            self.default_from(),
            subject,
            body_text,
        )
        .with_html(body_html)
        .with_metadata("email_type", "staff_invitation")
        .with_metadata("invitation_id", invitation.invitation_id.to_string())
        .with_metadata("role", invitation.role_name);

        self.send_email(message).await
    }
}

/// Email service factory
pub struct EmailServiceFactory;

impl EmailServiceFactory {
    /// Create email service based on configuration
    pub async fn create(config: EmailConfig) -> Result<Box<dyn EmailService>, EmailError> {
        if !config.enabled {
            tracing::info!("Email service disabled, using mock implementation");
            return Ok(Box::new(mock::MockEmailService::new()));
        }

        match config.provider.as_str() {
            "ses" | "aws-ses" => {
                tracing::info!("Creating AWS SES email service");
                let ses_service = aws_ses::SesEmailService::new(config).await?;
                Ok(Box::new(ses_service))
            }
            "mock" => {
                tracing::info!("Creating mock email service");
                Ok(Box::new(mock::MockEmailService::new()))
            }
            provider => Err(EmailError::Configuration(format!(
                "Unknown email provider: {}. Supported providers: ses, mock",
                provider
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(provider: &str, enabled: bool) -> EmailConfig {
        EmailConfig {
            provider: provider.to_string(),
            aws_region: None,
            aws_endpoint_url: None,
            default_from: "team@propdesk.app".to_string(),
            enabled,
            app_base_url: "https://propdesk.app".to_string(),
        }
    }

    #[test]
    fn test_email_message_builder() {
        let message = EmailMessage::new(
            "tenant@example.com".to_string(),
            "team@propdesk.app".to_string(),
            "Subject".to_string(),
            "Body".to_string(),
        )
        .with_html("<p>Body</p>".to_string())
        .with_reply_to("manager@example.com".to_string())
        .with_metadata("invitation_id", "123");

        assert_eq!(message.to, "tenant@example.com");
        assert_eq!(message.body_html.as_deref(), Some("<p>Body</p>"));
        assert_eq!(message.reply_to.as_deref(), Some("manager@example.com"));
        assert_eq!(
            message.metadata.get("invitation_id").map(String::as_str),
            Some("123")
        );
    }

    #[tokio::test]
    async fn test_factory_disabled_falls_back_to_mock() {
        let service = EmailServiceFactory::create(config("ses", false)).await.unwrap();
        assert_eq!(service.app_base_url(), "https://propdesk.app");
    }

    #[tokio::test]
    async fn test_factory_rejects_unknown_provider() {
        let result = EmailServiceFactory::create(config("carrier-pigeon", true)).await;
        assert!(matches!(result, Err(EmailError::Configuration(_))));
    }
}
