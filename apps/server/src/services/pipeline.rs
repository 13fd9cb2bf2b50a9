//! Alert processing pipeline.
//!
//! For every alert in a batch, in order: acquire a snapshot, compose the
//! message, deliver it. Each alert is handled on its own. A snapshot failure
//! degrades that alert's mail to the placeholder text, and a delivery failure
//! is recorded without stopping the rest of the batch.

use std::sync::Arc;

use uuid::Uuid;

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::models::{Alert, AlertBatch, AlertOutcome, AlertReport, BatchReport, DashboardTarget};
use crate::services::compose::compose;
use crate::services::notification::{Mailer, SmtpMailer};
use crate::services::snapshot::{create_provider, SnapshotProvider};

pub struct AlertPipeline {
    snapshots: Arc<dyn SnapshotProvider>,
    mailer: Arc<dyn Mailer>,
    target: DashboardTarget,
}

impl AlertPipeline {
    pub fn new(
        snapshots: Arc<dyn SnapshotProvider>,
        mailer: Arc<dyn Mailer>,
        target: DashboardTarget,
    ) -> Self {
        Self {
            snapshots,
            mailer,
            target,
        }
    }

    /// Wires the Grafana client and SMTP mailer described by `config`
    pub fn from_config(config: &Config) -> AppResult<Self> {
        let snapshots = create_provider(&config.grafana)
            .map_err(|e| AppError::Internal(e.to_string()))?;
        let mailer = Arc::new(SmtpMailer::new(&config.smtp)?);

        let mut target = DashboardTarget::new(config.grafana.dashboard_uid.clone());
        if let Some(panel_id) = &config.grafana.panel_id {
            target = target.with_panel(panel_id.clone());
        }

        Ok(Self::new(snapshots, mailer, target))
    }

    /// Processes every alert of the batch sequentially, in input order
    pub async fn process(&self, batch: AlertBatch) -> BatchReport {
        let batch_id = Uuid::new_v4();
        log::info!(
            "Processing batch {} with {} alert(s) using {} snapshots",
            batch_id,
            batch.len(),
            self.snapshots.strategy()
        );

        let mut reports = Vec::with_capacity(batch.len());
        for (index, alert) in batch.alerts.iter().enumerate() {
            let outcome = self.process_alert(batch_id, index, alert).await;
            reports.push(AlertReport {
                index,
                summary: alert.summary().to_string(),
                outcome,
            });
        }

        let report = BatchReport::new(batch_id, reports);
        log::info!(
            "Batch {} completed: {} delivered, {} failed",
            batch_id,
            report.delivered,
            report.failed
        );
        report
    }

    async fn process_alert(&self, batch_id: Uuid, index: usize, alert: &Alert) -> AlertOutcome {
        log::info!(
            "[{}#{}] received {} alert: {}",
            batch_id,
            index,
            alert.status,
            alert.summary()
        );

        let (snapshot, snapshot_error) = match self.snapshots.acquire(&self.target).await {
            Ok(snapshot) => (Some(snapshot), None),
            Err(e) => {
                log::warn!("[{}#{}] error creating Grafana snapshot: {}", batch_id, index, e);
                (None, Some(e.to_string()))
            }
        };

        let message = compose(alert, snapshot.as_ref());

        if let Err(e) = self.mailer.deliver(&message).await {
            log::error!("[{}#{}] error sending email: {}", batch_id, index, e);
            return AlertOutcome::DeliveryFailed {
                error: e.to_string(),
            };
        }

        match snapshot_error {
            Some(reason) => AlertOutcome::DeliveredWithoutSnapshot { reason },
            None => AlertOutcome::Delivered,
        }
    }
}
