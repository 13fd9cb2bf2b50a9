//! Rendered panel strategy.
//!
//! Asks the Grafana image renderer for a single panel and returns the image.

use async_trait::async_trait;
use url::Url;

use super::{ensure_success, SnapshotError, SnapshotProvider, SnapshotResult};
use crate::config::SnapshotStrategy;
use crate::models::{DashboardTarget, SnapshotReference};

pub const RENDER_WIDTH: u32 = 1000;
pub const RENDER_HEIGHT: u32 = 500;

const RENDER_ENDPOINT: &str = "render";

/// Renders a dashboard panel to an image
pub struct RenderSnapshotClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    org_id: u32,
}

impl RenderSnapshotClient {
    pub fn new(client: reqwest::Client, base_url: &str, api_key: &str, org_id: u32) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            org_id,
        }
    }

    /// Builds `{base}/render/d-solo/{uid}?orgId=..&panelId=..&width=..&height=..`
    pub fn render_url(&self, dashboard_uid: &str, panel_id: &str) -> SnapshotResult<Url> {
        let mut url = Url::parse(&format!("{}/render/d-solo/{}", self.base_url, dashboard_uid))?;

        url.query_pairs_mut()
            .append_pair("orgId", &self.org_id.to_string())
            .append_pair("panelId", panel_id)
            .append_pair("width", &RENDER_WIDTH.to_string())
            .append_pair("height", &RENDER_HEIGHT.to_string());

        Ok(url)
    }
}

#[async_trait]
impl SnapshotProvider for RenderSnapshotClient {
    async fn acquire(&self, target: &DashboardTarget) -> SnapshotResult<SnapshotReference> {
        let panel_id = target
            .panel_id
            .as_deref()
            .ok_or(SnapshotError::MissingPanel)?;
        let url = self.render_url(&target.dashboard_uid, panel_id)?;

        let response = self
            .client
            .get(url)
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| SnapshotError::transport(RENDER_ENDPOINT, e))?;
        let response = ensure_success(RENDER_ENDPOINT, response).await?;

        // Error pages are sometimes served with 200, so the content type decides
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();
        if !content_type.starts_with("image/") {
            return Err(SnapshotError::InvalidResponse {
                endpoint: RENDER_ENDPOINT,
                reason: format!("expected an image, got content type {:?}", content_type),
            });
        }

        let data = response
            .bytes()
            .await
            .map_err(|e| SnapshotError::transport(RENDER_ENDPOINT, e))?;

        log::debug!(
            "Rendered panel {} of dashboard {} ({} bytes)",
            panel_id,
            target.dashboard_uid,
            data.len()
        );
        Ok(SnapshotReference::Image { content_type, data })
    }

    fn strategy(&self) -> SnapshotStrategy {
        SnapshotStrategy::Render
    }
}
