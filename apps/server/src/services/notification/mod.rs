//! Mail dispatch.
//!
//! The pipeline hands each composed message to a [`Mailer`]. Production uses
//! [`SmtpMailer`]; tests substitute their own implementation.

pub mod email;

use async_trait::async_trait;

use crate::models::OutboundMessage;

pub use email::SmtpMailer;

// =============================================================================
// Mail Errors
// =============================================================================

/// Failure to deliver a message
#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("Failed to build email: {0}")]
    Build(String),

    #[error("Failed to send email: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),
}

impl From<lettre::error::Error> for MailError {
    fn from(e: lettre::error::Error) -> Self {
        MailError::Build(e.to_string())
    }
}

pub type MailResult<T> = Result<T, MailError>;

// =============================================================================
// Mailer Trait
// =============================================================================

/// Delivers one composed message to the configured recipient
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Sends exactly one message. Failures are returned, never retried.
    async fn deliver(&self, message: &OutboundMessage) -> MailResult<()>;
}
