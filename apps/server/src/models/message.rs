//! Composed notification ready for delivery.

use bytes::Bytes;

/// Content-ID used to reference the inline snapshot image from the HTML body
pub const SNAPSHOT_CONTENT_ID: &str = "snapshot";

/// One email, built fresh for a single alert
#[derive(Debug, Clone, PartialEq)]
pub struct OutboundMessage {
    pub subject: String,
    pub html_body: String,
    pub text_body: String,
    pub attachment: Option<ImageAttachment>,
}

/// Snapshot image sent inline with the message
#[derive(Debug, Clone, PartialEq)]
pub struct ImageAttachment {
    pub content_id: String,
    pub content_type: String,
    pub data: Bytes,
}
