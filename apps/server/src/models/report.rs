//! Per-alert delivery outcomes for one webhook call.

use serde::Serialize;
use uuid::Uuid;

/// What happened to a single alert
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AlertOutcome {
    Delivered,
    /// Mail went out with the placeholder instead of a snapshot
    DeliveredWithoutSnapshot { reason: String },
    DeliveryFailed { error: String },
}

impl AlertOutcome {
    pub fn is_delivered(&self) -> bool {
        !matches!(self, AlertOutcome::DeliveryFailed { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlertReport {
    /// Position of the alert in the inbound batch
    pub index: usize,
    pub summary: String,
    #[serde(flatten)]
    pub outcome: AlertOutcome,
}

/// Overall result of a batch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchDisposition {
    /// Every alert was delivered (an empty batch counts)
    Complete,
    /// Some deliveries failed, some succeeded
    Partial,
    /// No alert was delivered
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchReport {
    pub batch_id: Uuid,
    pub delivered: usize,
    pub failed: usize,
    pub alerts: Vec<AlertReport>,
}

impl BatchReport {
    pub fn new(batch_id: Uuid, alerts: Vec<AlertReport>) -> Self {
        let delivered = alerts.iter().filter(|a| a.outcome.is_delivered()).count();
        let failed = alerts.len() - delivered;

        Self {
            batch_id,
            delivered,
            failed,
            alerts,
        }
    }

    pub fn disposition(&self) -> BatchDisposition {
        match (self.delivered, self.failed) {
            (_, 0) => BatchDisposition::Complete,
            (0, _) => BatchDisposition::Failed,
            _ => BatchDisposition::Partial,
        }
    }
}
