use std::env;
use std::time::Duration;

use url::Url;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Largest accepted webhook body, in bytes
    pub max_body_bytes: usize,
    pub grafana: GrafanaConfig,
    pub smtp: SmtpConfig,
}

/// How a dashboard snapshot is obtained for each alert
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotStrategy {
    /// Create a hosted snapshot and link to it
    Link,
    /// Render a single panel to PNG and attach it
    Render,
}

impl std::fmt::Display for SnapshotStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SnapshotStrategy::Link => write!(f, "link"),
            SnapshotStrategy::Render => write!(f, "render"),
        }
    }
}

/// Grafana connection settings and the dashboard to snapshot
#[derive(Debug, Clone)]
pub struct GrafanaConfig {
    /// Base URL without trailing slash
    pub url: String,
    pub api_key: String,
    pub dashboard_uid: String,
    /// Required by the render strategy only
    pub panel_id: Option<String>,
    pub org_id: u32,
    pub strategy: SnapshotStrategy,
    pub timeout: Duration,
}

/// Transport security used for the SMTP session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmtpTls {
    /// Implicit TLS (SMTPS, usually port 465)
    Wrapper,
    /// Plain connection upgraded with STARTTLS (usually port 587)
    StartTls,
    /// No encryption. Only meant for local relays.
    None,
}

/// Outbound mail relay settings
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub tls: SmtpTls,
    pub sender: String,
    pub password: String,
    pub recipient: String,
    pub timeout: Duration,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} environment variable is required")]
    Missing(&'static str),

    #[error("{key} is invalid: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: required("PORT")?.parse().map_err(|_| ConfigError::Invalid {
                key: "PORT",
                reason: "must be a valid port number".to_string(),
            })?,
            max_body_bytes: env::var("MAX_BODY_BYTES")
                .unwrap_or_else(|_| "1048576".to_string())
                .parse()
                .unwrap_or(1_048_576),
            grafana: GrafanaConfig::from_env()?,
            smtp: SmtpConfig::from_env()?,
        })
    }
}

impl GrafanaConfig {
    /// Load Grafana configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let url = normalize_base_url(&required("GRAFANA_URL")?)?;

        let strategy = match env::var("SNAPSHOT_STRATEGY")
            .unwrap_or_else(|_| "link".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
            "link" => SnapshotStrategy::Link,
            "render" => SnapshotStrategy::Render,
            other => {
                return Err(ConfigError::Invalid {
                    key: "SNAPSHOT_STRATEGY",
                    reason: format!("expected \"link\" or \"render\", got {:?}", other),
                })
            }
        };

        let panel_id = env::var("PANEL_ID").ok().filter(|p| !p.is_empty());
        if strategy == SnapshotStrategy::Render && panel_id.is_none() {
            return Err(ConfigError::Missing("PANEL_ID"));
        }

        Ok(Self {
            url,
            api_key: required("GRAFANA_API_KEY")?,
            dashboard_uid: required("DASHBOARD_UID")?,
            panel_id,
            org_id: env::var("GRAFANA_ORG_ID")
                .unwrap_or_else(|_| "1".to_string())
                .parse()
                .unwrap_or(1),
            strategy,
            timeout: Duration::from_secs(
                env::var("GRAFANA_TIMEOUT_SECS")
                    .unwrap_or_else(|_| "10".to_string())
                    .parse()
                    .unwrap_or(10),
            ),
        })
    }
}

impl SmtpConfig {
    /// Load SMTP configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let port = match env::var("SMTP_PORT") {
            Ok(value) => value.parse().unwrap_or_else(|_| {
                log::warn!("SMTP_PORT {:?} is not a valid port, using 587", value);
                587
            }),
            Err(_) => 587,
        };

        let tls = match env::var("SMTP_TLS").ok().as_deref() {
            None | Some("") => {
                if port == 465 {
                    SmtpTls::Wrapper
                } else {
                    SmtpTls::StartTls
                }
            }
            Some("wrapper") | Some("tls") => SmtpTls::Wrapper,
            Some("starttls") => SmtpTls::StartTls,
            Some("none") => SmtpTls::None,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    key: "SMTP_TLS",
                    reason: format!("expected wrapper, starttls or none, got {:?}", other),
                })
            }
        };

        Ok(Self {
            host: required("SMTP_SERVER")?,
            port,
            tls,
            sender: required("SENDER_EMAIL")?,
            password: required("SENDER_PASSWORD")?,
            recipient: required("RECIPIENT_EMAIL")?,
            timeout: Duration::from_secs(
                env::var("SMTP_TIMEOUT_SECS")
                    .unwrap_or_else(|_| "10".to_string())
                    .parse()
                    .unwrap_or(10),
            ),
        })
    }
}

/// Reads a variable that must be present and non-empty
fn required(key: &'static str) -> Result<String, ConfigError> {
    match env::var(key) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::Missing(key)),
    }
}

/// Validates an http(s) base URL and strips the trailing slash
pub fn normalize_base_url(raw: &str) -> Result<String, ConfigError> {
    let parsed = Url::parse(raw).map_err(|e| ConfigError::Invalid {
        key: "GRAFANA_URL",
        reason: e.to_string(),
    })?;

    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(ConfigError::Invalid {
            key: "GRAFANA_URL",
            reason: "must use HTTP or HTTPS".to_string(),
        });
    }

    Ok(raw.trim_end_matches('/').to_string())
}
