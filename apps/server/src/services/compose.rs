//! Notification composer.
//!
//! Turns an alert plus its snapshot into a subject, an HTML body and a
//! plain-text body. Composition never fails: missing annotations render as
//! empty strings and a missing snapshot renders as the placeholder text.

use crate::models::{
    Alert, ImageAttachment, OutboundMessage, SnapshotReference, SNAPSHOT_CONTENT_ID,
    SNAPSHOT_PLACEHOLDER,
};

pub const SUBJECT_PREFIX: &str = "Monitor Alert: ";

/// Builds the message for one alert
///
/// `snapshot` is `None` when acquisition failed.
pub fn compose(alert: &Alert, snapshot: Option<&SnapshotReference>) -> OutboundMessage {
    let attachment = match snapshot {
        Some(SnapshotReference::Image { content_type, data }) => Some(ImageAttachment {
            content_id: SNAPSHOT_CONTENT_ID.to_string(),
            content_type: content_type.clone(),
            data: data.clone(),
        }),
        _ => None,
    };

    OutboundMessage {
        subject: format!("{}{}", SUBJECT_PREFIX, alert.summary()),
        html_body: format_html(alert, snapshot),
        text_body: format_text(alert, snapshot),
        attachment,
    }
}

fn format_html(alert: &Alert, snapshot: Option<&SnapshotReference>) -> String {
    let mut html = format!(
        "<h1>{}</h1><p>{}</p>",
        html_escape(alert.summary()),
        html_escape(alert.description())
    );

    if !alert.status.is_empty() {
        html.push_str(&format!(
            "<p><strong>Status:</strong> {}</p>",
            html_escape(&alert.status)
        ));
    }

    if !alert.labels.is_empty() {
        html.push_str("<table>");
        for (name, value) in &alert.labels {
            html.push_str(&format!(
                "<tr><td>{}</td><td>{}</td></tr>",
                html_escape(name),
                html_escape(value)
            ));
        }
        html.push_str("</table>");
    }

    if let Some(starts_at) = alert.starts_at {
        html.push_str(&format!(
            "<p>Started: {}</p>",
            starts_at.format("%Y-%m-%d %H:%M:%S UTC")
        ));
    }

    if let Some(generator_url) = &alert.generator_url {
        html.push_str(&format!(
            "<p><a href='{}'>Source</a></p>",
            html_escape(generator_url)
        ));
    }

    html.push_str("<br><br>Grafana Snapshot: ");
    match snapshot {
        Some(SnapshotReference::Link(url)) => {
            html.push_str(&format!("<a href='{}'>View Snapshot</a>", html_escape(url)));
        }
        Some(SnapshotReference::Image { .. }) => {
            html.push_str(&format!(
                "<br><img src='cid:{}' alt='Dashboard snapshot'>",
                SNAPSHOT_CONTENT_ID
            ));
        }
        None => html.push_str(SNAPSHOT_PLACEHOLDER),
    }

    html
}

fn format_text(alert: &Alert, snapshot: Option<&SnapshotReference>) -> String {
    let mut text = format!("{}\n\n{}\n", alert.summary(), alert.description());

    if !alert.status.is_empty() {
        text.push_str(&format!("\nStatus: {}\n", alert.status));
    }

    for (name, value) in &alert.labels {
        text.push_str(&format!("{}: {}\n", name, value));
    }

    if let Some(starts_at) = alert.starts_at {
        text.push_str(&format!(
            "Started: {}\n",
            starts_at.format("%Y-%m-%d %H:%M:%S UTC")
        ));
    }

    if let Some(generator_url) = &alert.generator_url {
        text.push_str(&format!("Source: {}\n", generator_url));
    }

    let snapshot_line = match snapshot {
        Some(SnapshotReference::Link(url)) => url.as_str(),
        Some(SnapshotReference::Image { .. }) => "see attached image",
        None => SNAPSHOT_PLACEHOLDER,
    };
    text.push_str(&format!("\nGrafana Snapshot: {}\n", snapshot_line));

    text
}

/// Simple HTML escaping for email content
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
