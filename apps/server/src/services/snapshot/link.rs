//! Hosted snapshot strategy.
//!
//! Fetches the dashboard model and posts it back to the snapshot API with a
//! one hour expiry. The dashboard JSON is passed through untouched.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use super::{ensure_success, SnapshotError, SnapshotProvider, SnapshotResult};
use crate::config::SnapshotStrategy;
use crate::models::{DashboardTarget, SnapshotReference};

/// Lifetime of a created snapshot, in seconds
pub const SNAPSHOT_EXPIRY_SECS: u64 = 3600;

const DASHBOARD_ENDPOINT: &str = "dashboard";
const SNAPSHOT_ENDPOINT: &str = "snapshot";

/// `GET /api/dashboards/uid/{uid}` response
#[derive(Debug, Deserialize)]
struct DashboardResponse {
    dashboard: Option<Value>,
}

/// `POST /api/snapshots` response
#[derive(Debug, Deserialize)]
struct CreateSnapshotResponse {
    url: Option<Value>,
}

/// Creates expiring dashboard snapshots and returns their URL
pub struct LinkSnapshotClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl LinkSnapshotClient {
    pub fn new(client: reqwest::Client, base_url: &str, api_key: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    /// Fetches the full dashboard definition
    async fn fetch_dashboard(&self, dashboard_uid: &str) -> SnapshotResult<Value> {
        let url = format!("{}/api/dashboards/uid/{}", self.base_url, dashboard_uid);

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| SnapshotError::transport(DASHBOARD_ENDPOINT, e))?;
        let response = ensure_success(DASHBOARD_ENDPOINT, response).await?;

        let body: DashboardResponse = read_json(DASHBOARD_ENDPOINT, response).await?;
        match body.dashboard {
            Some(dashboard @ Value::Object(_)) => Ok(dashboard),
            _ => Err(SnapshotError::InvalidResponse {
                endpoint: DASHBOARD_ENDPOINT,
                reason: "dashboard data not found in response".to_string(),
            }),
        }
    }

    /// Submits the dashboard to the snapshot API and returns the shareable URL
    async fn create_snapshot(&self, dashboard: Value) -> SnapshotResult<String> {
        let url = format!("{}/api/snapshots", self.base_url);
        let payload = json!({
            "dashboard": dashboard,
            "expires": SNAPSHOT_EXPIRY_SECS,
        });

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| SnapshotError::transport(SNAPSHOT_ENDPOINT, e))?;
        let response = ensure_success(SNAPSHOT_ENDPOINT, response).await?;

        let body: CreateSnapshotResponse = read_json(SNAPSHOT_ENDPOINT, response).await?;
        match body.url {
            Some(Value::String(url)) => Ok(url),
            _ => Err(SnapshotError::InvalidResponse {
                endpoint: SNAPSHOT_ENDPOINT,
                reason: "snapshot URL not found in response".to_string(),
            }),
        }
    }
}

async fn read_json<T: serde::de::DeserializeOwned>(
    endpoint: &'static str,
    response: reqwest::Response,
) -> SnapshotResult<T> {
    let bytes = response
        .bytes()
        .await
        .map_err(|e| SnapshotError::transport(endpoint, e))?;

    serde_json::from_slice(&bytes).map_err(|e| SnapshotError::InvalidResponse {
        endpoint,
        reason: format!("error decoding response: {}", e),
    })
}

#[async_trait]
impl SnapshotProvider for LinkSnapshotClient {
    async fn acquire(&self, target: &DashboardTarget) -> SnapshotResult<SnapshotReference> {
        let dashboard = self.fetch_dashboard(&target.dashboard_uid).await?;
        let url = self.create_snapshot(dashboard).await?;

        log::debug!(
            "Created snapshot of dashboard {}: {}",
            target.dashboard_uid,
            url
        );
        Ok(SnapshotReference::Link(url))
    }

    fn strategy(&self) -> SnapshotStrategy {
        SnapshotStrategy::Link
    }
}
