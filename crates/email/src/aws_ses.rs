//! AWS SES Email Service Implementation
//!
//! Production delivery through Simple Email Service. A custom endpoint
//! (LocalStack) switches to static dummy credentials.

use aws_config::{BehaviorVersion, Region};
use aws_credential_types::Credentials;
use aws_sdk_ses::config::SharedCredentialsProvider;
use aws_sdk_ses::types::{Body, Content, Destination, Message};
use aws_sdk_ses::Client as SesClient;
use chrono::Utc;

use crate::{EmailConfig, EmailError, EmailMessage, EmailReceipt, EmailService};

const DEFAULT_REGION: &str = "us-east-1";

pub struct SesEmailService {
    client: SesClient,
    config: EmailConfig,
}

impl SesEmailService {
    pub async fn new(config: EmailConfig) -> Result<Self, EmailError> {
        let region = config
            .aws_region
            .clone()
            .unwrap_or_else(|| DEFAULT_REGION.to_string());

        let loader = aws_config::defaults(BehaviorVersion::latest()).region(Region::new(region));

        let aws_config = match config.aws_endpoint_url.as_ref() {
            Some(endpoint_url) => {
                tracing::info!(endpoint_url = %endpoint_url, "Using custom AWS endpoint");
                let credentials = Credentials::new(
                    "test-access-key",
                    "test-secret-key",
                    None,
                    None,
                    "localstack-email-provider",
                );
                loader
                    .endpoint_url(endpoint_url)
                    .credentials_provider(SharedCredentialsProvider::new(credentials))
                    .load()
                    .await
            }
            None => loader.load().await,
        };

        let client = SesClient::new(&aws_config);

        // LocalStack may not have SES ready yet; a failed probe is not fatal
        match client.get_send_quota().send().await {
            Ok(_) => tracing::info!("Connected to AWS SES"),
            Err(e) => tracing::warn!(error = %e, "SES quota probe failed"),
        }

        Ok(Self { client, config })
    }

    fn content(data: &str, part: &str) -> Result<Content, EmailError> {
        Content::builder()
            .data(data)
            .charset("UTF-8")
            .build()
            .map_err(|e| EmailError::AwsSes(format!("Failed to build {}: {}", part, e)))
    }

    fn build_ses_message(message: &EmailMessage) -> Result<Message, EmailError> {
        let subject = Self::content(&message.subject, "subject")?;
        let mut body = Body::builder().text(Self::content(&message.body_text, "text body")?);

        if let Some(html) = &message.body_html {
            body = body.html(Self::content(html, "HTML body")?);
        }

        Ok(Message::builder().subject(subject).body(body.build()).build())
    }
}

#[async_trait::async_trait]
impl EmailService for SesEmailService {
    async fn send_email(&self, message: EmailMessage) -> Result<EmailReceipt, EmailError> {
        if !message.to.contains('@') || !message.from.contains('@') {
            return Err(EmailError::Validation(
                "Invalid email address format".to_string(),
            ));
        }

        tracing::info!(to = %message.to, "Sending email via AWS SES");

        let ses_message = Self::build_ses_message(&message)?;
        let destination = Destination::builder().to_addresses(&message.to).build();

        let mut request = self
            .client
            .send_email()
            .source(&message.from)
            .destination(destination)
            .message(ses_message);

        if let Some(reply_to) = &message.reply_to {
            request = request.reply_to_addresses(reply_to);
        }

        let result = request
            .send()
            .await
            .map_err(|e| EmailError::AwsSes(format!("Failed to send email: {}", e)))?;

        let message_id = result.message_id().to_string();
        tracing::info!(message_id = %message_id, "Email sent via SES");

        Ok(EmailReceipt {
            message_id,
            sent_at: Utc::now(),
            provider: "aws-ses".to_string(),
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
