//! Visual references attached to a notification.

use bytes::Bytes;

/// Text used in place of a snapshot link when acquisition failed
pub const SNAPSHOT_PLACEHOLDER: &str = "failed to get snapshot url";

/// A shareable view of the dashboard, produced once per alert
#[derive(Debug, Clone, PartialEq)]
pub enum SnapshotReference {
    /// URL of a hosted snapshot that expires after a fixed window
    Link(String),
    /// Rendered panel image
    Image { content_type: String, data: Bytes },
}

/// Which dashboard (and panel) a snapshot is taken of
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardTarget {
    pub dashboard_uid: String,
    pub panel_id: Option<String>,
}

impl DashboardTarget {
    pub fn new(dashboard_uid: impl Into<String>) -> Self {
        Self {
            dashboard_uid: dashboard_uid.into(),
            panel_id: None,
        }
    }

    pub fn with_panel(mut self, panel_id: impl Into<String>) -> Self {
        self.panel_id = Some(panel_id.into());
        self
    }
}
