//! SMTP mail dispatcher.
//!
//! Sends notifications using the lettre crate. Every delivery opens its own
//! session, so no connection is kept between alerts.

use std::time::Duration;

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::client::{Tls, TlsParameters};
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use super::{MailError, MailResult, Mailer};
use crate::config::{ConfigError, SmtpConfig, SmtpTls};
use crate::models::OutboundMessage;

/// SMTP dispatcher for a single sender and recipient
pub struct SmtpMailer {
    host: String,
    port: u16,
    tls: SmtpTls,
    credentials: Credentials,
    from: Mailbox,
    to: Mailbox,
    timeout: Duration,
}

impl SmtpMailer {
    /// Creates a mailer, validating the sender and recipient addresses
    pub fn new(config: &SmtpConfig) -> Result<Self, ConfigError> {
        let from = config
            .sender
            .parse::<Mailbox>()
            .map_err(|e| ConfigError::Invalid {
                key: "SENDER_EMAIL",
                reason: e.to_string(),
            })?;
        let to = config
            .recipient
            .parse::<Mailbox>()
            .map_err(|e| ConfigError::Invalid {
                key: "RECIPIENT_EMAIL",
                reason: e.to_string(),
            })?;

        Ok(Self {
            host: config.host.clone(),
            port: config.port,
            tls: config.tls,
            credentials: Credentials::new(config.sender.clone(), config.password.clone()),
            from,
            to,
            timeout: config.timeout,
        })
    }

    /// Builds the MIME message: text and HTML alternatives, with the snapshot
    /// image as an inline related part when present
    pub fn build_message(&self, message: &OutboundMessage) -> MailResult<Message> {
        let html_part = match &message.attachment {
            Some(image) => {
                let content_type = ContentType::parse(&image.content_type)
                    .map_err(|e| MailError::Build(format!("invalid image content type: {}", e)))?;

                MultiPart::related()
                    .singlepart(SinglePart::html(message.html_body.clone()))
                    .singlepart(
                        Attachment::new_inline(image.content_id.clone())
                            .body(image.data.to_vec(), content_type),
                    )
            }
            None => MultiPart::related().singlepart(SinglePart::html(message.html_body.clone())),
        };

        let email = Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject(&message.subject)
            .multipart(
                MultiPart::alternative()
                    .singlepart(SinglePart::plain(message.text_body.clone()))
                    .multipart(html_part),
            )?;

        Ok(email)
    }

    /// Builds a fresh transport for one delivery
    ///
    /// Port 465 = implicit TLS (SMTPS), port 587 = STARTTLS, unless overridden.
    fn transport(&self) -> MailResult<AsyncSmtpTransport<Tokio1Executor>> {
        let builder = match self.tls {
            SmtpTls::Wrapper => {
                let tls_params = TlsParameters::new(self.host.clone())?;
                AsyncSmtpTransport::<Tokio1Executor>::relay(&self.host)?
                    .port(self.port)
                    .tls(Tls::Wrapper(tls_params))
            }
            SmtpTls::StartTls => {
                AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.host)?.port(self.port)
            }
            SmtpTls::None => {
                AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&self.host).port(self.port)
            }
        };

        Ok(builder
            .credentials(self.credentials.clone())
            .timeout(Some(self.timeout))
            .build())
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn deliver(&self, message: &OutboundMessage) -> MailResult<()> {
        let email = self.build_message(message)?;
        let mailer = self.transport()?;

        mailer.send(email).await?;
        log::debug!("Email sent successfully to {}", self.to);
        Ok(())
    }
}
