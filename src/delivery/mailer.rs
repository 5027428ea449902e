use std::path::Path;

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::config::SmtpConfig;
use crate::error::DeliveryError;

#[derive(Debug, Clone)]
pub struct OutgoingMail<'a> {
    pub to: &'a str,
    pub subject: &'a str,
    pub body: &'a str,
    pub attachment: &'a Path,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send_with_attachment(&self, mail: OutgoingMail<'_>) -> Result<(), DeliveryError>;
}

/// SMTP over STARTTLS. Without configuration every send fails with
/// `DeliveryError::NotConfigured`.
pub struct SmtpMailer {
    config: Option<SmtpConfig>,
}

impl SmtpMailer {
    pub fn new(config: Option<SmtpConfig>) -> Self {
        if config.is_none() {
            tracing::warn!("SMTP is not configured; /api/finalize will fail to send");
        }
        Self { config }
    }
}

/// Builds the multipart message: plain-text body plus the PDF attachment.
pub fn build_message(
    from: &str,
    mail: &OutgoingMail<'_>,
    pdf: Vec<u8>,
) -> Result<Message, DeliveryError> {
    let from: Mailbox = from
        .parse()
        .map_err(|_| DeliveryError::Address(from.to_string()))?;
    let to: Mailbox = mail
        .to
        .parse()
        .map_err(|_| DeliveryError::Address(mail.to.to_string()))?;

    let file_name = mail
        .attachment
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "proposal.pdf".to_string());
    let pdf_type = ContentType::parse("application/pdf")
        .map_err(|e| DeliveryError::Message(e.to_string()))?;

    Message::builder()
        .from(from)
        .to(to)
        .subject(mail.subject)
        .multipart(
            MultiPart::mixed()
                .singlepart(SinglePart::plain(mail.body.to_string()))
                .singlepart(Attachment::new(file_name).body(pdf, pdf_type)),
        )
        .map_err(|e| DeliveryError::Message(e.to_string()))
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send_with_attachment(&self, mail: OutgoingMail<'_>) -> Result<(), DeliveryError> {
        let config = self.config.as_ref().ok_or(DeliveryError::NotConfigured)?;

        let pdf = tokio::fs::read(mail.attachment).await?;
        let message = build_message(&config.from, &mail, pdf)?;

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
            .map_err(|e| DeliveryError::Smtp(e.to_string()))?
            .port(config.port)
            .credentials(Credentials::new(config.username.clone(), config.password.clone()))
            .build();

        transport
            .send(message)
            .await
            .map_err(|e| DeliveryError::Smtp(e.to_string()))?;

        tracing::info!(to = mail.to, attachment = %mail.attachment.display(), "proposal emailed");
        Ok(())
    }
}
