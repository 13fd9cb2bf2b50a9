//! Dashboard snapshot acquisition.
//!
//! Two interchangeable strategies sit behind [`SnapshotProvider`]:
//! - [`LinkSnapshotClient`] creates a hosted, expiring Grafana snapshot and
//!   returns its URL.
//! - [`RenderSnapshotClient`] renders one panel through the image renderer
//!   and returns the PNG bytes.

pub mod link;
pub mod render;

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::{GrafanaConfig, SnapshotStrategy};
use crate::models::{DashboardTarget, SnapshotReference};

pub use link::LinkSnapshotClient;
pub use render::RenderSnapshotClient;

// =============================================================================
// Snapshot Errors
// =============================================================================

/// Failure to obtain a snapshot from Grafana
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("Failed to create HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("Request to {endpoint} failed: {message}")]
    Transport {
        endpoint: &'static str,
        message: String,
    },

    #[error("Unexpected status code {status} from {endpoint}, body: {body}")]
    Status {
        endpoint: &'static str,
        status: u16,
        body: String,
    },

    #[error("Invalid response from {endpoint}: {reason}")]
    InvalidResponse {
        endpoint: &'static str,
        reason: String,
    },

    #[error("Invalid request URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Render strategy requires a panel id")]
    MissingPanel,
}

impl SnapshotError {
    fn transport(endpoint: &'static str, e: reqwest::Error) -> Self {
        let message = if e.is_timeout() {
            "request timed out".to_string()
        } else if e.is_connect() {
            format!("connection failed: {}", e)
        } else {
            e.to_string()
        };
        SnapshotError::Transport { endpoint, message }
    }
}

pub type SnapshotResult<T> = Result<T, SnapshotError>;

// =============================================================================
// Snapshot Provider Trait
// =============================================================================

/// Produces a visual reference for a dashboard (Strategy pattern)
#[async_trait]
pub trait SnapshotProvider: Send + Sync {
    /// Acquire a fresh snapshot of the target dashboard
    async fn acquire(&self, target: &DashboardTarget) -> SnapshotResult<SnapshotReference>;

    fn strategy(&self) -> SnapshotStrategy;
}

// =============================================================================
// Provider Factory
// =============================================================================

/// Creates the provider selected by configuration
///
/// Both strategies share one HTTP client bounded by the configured timeout.
pub fn create_provider(config: &GrafanaConfig) -> SnapshotResult<Arc<dyn SnapshotProvider>> {
    let client = reqwest::Client::builder()
        .timeout(config.timeout)
        .build()
        .map_err(SnapshotError::Client)?;

    let provider: Arc<dyn SnapshotProvider> = match config.strategy {
        SnapshotStrategy::Link => Arc::new(LinkSnapshotClient::new(
            client,
            &config.url,
            &config.api_key,
        )),
        SnapshotStrategy::Render => Arc::new(RenderSnapshotClient::new(
            client,
            &config.url,
            &config.api_key,
            config.org_id,
        )),
    };

    Ok(provider)
}

/// Returns the response if its status is a success, otherwise the status and body as an error
async fn ensure_success(
    endpoint: &'static str,
    response: reqwest::Response,
) -> SnapshotResult<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(SnapshotError::Status {
        endpoint,
        status: status.as_u16(),
        body,
    })
}
