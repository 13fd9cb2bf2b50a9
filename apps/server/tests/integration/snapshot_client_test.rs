//! Integration tests for the Grafana snapshot clients
//!
//! Each test starts a fake Grafana with actix-test and points a real
//! `reqwest` client at it.

use std::collections::HashMap;
use std::time::Duration;

use actix_web::{web, App, HttpRequest, HttpResponse};
use serde_json::{json, Value};
use snapmail::models::{DashboardTarget, SnapshotReference};
use snapmail::services::snapshot::{
    LinkSnapshotClient, RenderSnapshotClient, SnapshotError, SnapshotProvider,
};

const API_KEY: &str = "test-api-key";
const PNG: &[u8] = b"\x89PNG\r\n\x1a\nfake";

fn authorized(req: &HttpRequest) -> bool {
    req.headers()
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(|v| v == format!("Bearer {}", API_KEY))
        .unwrap_or(false)
}

// =============================================================================
// Fake Grafana
// =============================================================================

async fn dashboard(req: HttpRequest, path: web::Path<String>) -> HttpResponse {
    if !authorized(&req) {
        return HttpResponse::Unauthorized().json(json!({"message": "Unauthorized"}));
    }

    match path.as_str() {
        "missing" => HttpResponse::NotFound().json(json!({"message": "Dashboard not found"})),
        "no-dashboard" => HttpResponse::Ok().json(json!({"meta": {}})),
        "garbage" => HttpResponse::Ok()
            .content_type("application/json")
            .body("<html>oops</html>"),
        "slow" => {
            tokio::time::sleep(Duration::from_secs(2)).await;
            HttpResponse::Ok().json(json!({"dashboard": {"title": "slow"}}))
        }
        uid => HttpResponse::Ok().json(json!({
            "dashboard": {"uid": uid, "title": uid, "panels": [{"id": 2}]},
            "meta": {"slug": uid}
        })),
    }
}

async fn snapshots(req: HttpRequest, body: web::Json<Value>) -> HttpResponse {
    if !authorized(&req) {
        return HttpResponse::Unauthorized().finish();
    }
    if body["expires"] != 3600 {
        return HttpResponse::BadRequest().json(json!({"message": "bad expiry"}));
    }

    match body["dashboard"]["title"].as_str() {
        Some("no-url") => HttpResponse::Ok().json(json!({"key": "abc"})),
        Some("rejected") => {
            HttpResponse::InternalServerError().json(json!({"message": "snapshot failed"}))
        }
        Some(title) => HttpResponse::Ok().json(json!({
            "url": format!("https://grafana.test/dashboard/snapshot/{}", title),
            "key": title,
        })),
        None => HttpResponse::BadRequest().finish(),
    }
}

async fn render(
    req: HttpRequest,
    path: web::Path<String>,
    query: web::Query<HashMap<String, String>>,
) -> HttpResponse {
    if !authorized(&req) {
        return HttpResponse::Unauthorized().finish();
    }
    if query.get("width").map(String::as_str) != Some("1000")
        || query.get("height").map(String::as_str) != Some("500")
        || query.get("orgId").map(String::as_str) != Some("1")
    {
        return HttpResponse::BadRequest().finish();
    }

    match (path.as_str(), query.get("panelId").map(String::as_str)) {
        ("login-page", _) => HttpResponse::Ok()
            .content_type("text/html; charset=utf-8")
            .body("<html>login</html>"),
        (_, Some("2")) => HttpResponse::Ok().content_type("image/png").body(PNG),
        _ => HttpResponse::NotFound().body("panel not found"),
    }
}

fn start_grafana() -> actix_test::TestServer {
    actix_test::start(|| {
        App::new()
            .route("/api/dashboards/uid/{uid}", web::get().to(dashboard))
            .route("/api/snapshots", web::post().to(snapshots))
            .route("/render/d-solo/{uid}", web::get().to(render))
    })
}

fn http_client(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .expect("Failed to create HTTP client")
}

fn link_client(grafana: &actix_test::TestServer, api_key: &str) -> LinkSnapshotClient {
    LinkSnapshotClient::new(
        http_client(Duration::from_secs(5)),
        &format!("http://{}", grafana.addr()),
        api_key,
    )
}

fn render_client(grafana: &actix_test::TestServer) -> RenderSnapshotClient {
    RenderSnapshotClient::new(
        http_client(Duration::from_secs(5)),
        &format!("http://{}/", grafana.addr()),
        API_KEY,
        1,
    )
}

// =============================================================================
// Link Strategy
// =============================================================================

#[actix_web::test]
async fn test_link_snapshot_returns_url() {
    let grafana = start_grafana();
    let client = link_client(&grafana, API_KEY);

    let snapshot = client
        .acquire(&DashboardTarget::new("nodes"))
        .await
        .expect("snapshot should be created");

    assert_eq!(
        snapshot,
        SnapshotReference::Link("https://grafana.test/dashboard/snapshot/nodes".to_string())
    );
}

#[actix_web::test]
async fn test_link_snapshot_rejected_api_key() {
    let grafana = start_grafana();
    let client = link_client(&grafana, "wrong-key");

    let err = client
        .acquire(&DashboardTarget::new("nodes"))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        SnapshotError::Status {
            endpoint: "dashboard",
            status: 401,
            ..
        }
    ));
}

#[actix_web::test]
async fn test_link_snapshot_unknown_dashboard_carries_body() {
    let grafana = start_grafana();
    let client = link_client(&grafana, API_KEY);

    let err = client
        .acquire(&DashboardTarget::new("missing"))
        .await
        .unwrap_err();

    match err {
        SnapshotError::Status { status, body, .. } => {
            assert_eq!(status, 404);
            assert!(body.contains("Dashboard not found"));
        }
        other => panic!("expected status error, got {:?}", other),
    }
}

#[actix_web::test]
async fn test_link_snapshot_missing_dashboard_field() {
    let grafana = start_grafana();
    let client = link_client(&grafana, API_KEY);

    let err = client
        .acquire(&DashboardTarget::new("no-dashboard"))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        SnapshotError::InvalidResponse {
            endpoint: "dashboard",
            ..
        }
    ));
}

#[actix_web::test]
async fn test_link_snapshot_undecodable_response() {
    let grafana = start_grafana();
    let client = link_client(&grafana, API_KEY);

    let err = client
        .acquire(&DashboardTarget::new("garbage"))
        .await
        .unwrap_err();

    assert!(matches!(err, SnapshotError::InvalidResponse { .. }));
}

#[actix_web::test]
async fn test_link_snapshot_missing_url_field() {
    let grafana = start_grafana();
    let client = link_client(&grafana, API_KEY);

    let err = client
        .acquire(&DashboardTarget::new("no-url"))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        SnapshotError::InvalidResponse {
            endpoint: "snapshot",
            ..
        }
    ));
}

#[actix_web::test]
async fn test_link_snapshot_creation_failure() {
    let grafana = start_grafana();
    let client = link_client(&grafana, API_KEY);

    let err = client
        .acquire(&DashboardTarget::new("rejected"))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        SnapshotError::Status {
            endpoint: "snapshot",
            status: 500,
            ..
        }
    ));
}

#[actix_web::test]
async fn test_link_snapshot_times_out() {
    let grafana = start_grafana();
    let client = LinkSnapshotClient::new(
        http_client(Duration::from_millis(200)),
        &format!("http://{}", grafana.addr()),
        API_KEY,
    );

    let err = client
        .acquire(&DashboardTarget::new("slow"))
        .await
        .unwrap_err();

    match err {
        SnapshotError::Transport { message, .. } => assert_eq!(message, "request timed out"),
        other => panic!("expected timeout, got {:?}", other),
    }
}

#[actix_web::test]
async fn test_unreachable_grafana_is_transport_error() {
    // Nothing listens on port 9 (discard) in the test environment
    let client = LinkSnapshotClient::new(
        http_client(Duration::from_secs(2)),
        "http://127.0.0.1:9",
        API_KEY,
    );

    let err = client
        .acquire(&DashboardTarget::new("nodes"))
        .await
        .unwrap_err();

    assert!(matches!(err, SnapshotError::Transport { .. }));
}

// =============================================================================
// Render Strategy
// =============================================================================

#[actix_web::test]
async fn test_render_returns_image_bytes() {
    let grafana = start_grafana();
    let client = render_client(&grafana);

    let snapshot = client
        .acquire(&DashboardTarget::new("nodes").with_panel("2"))
        .await
        .expect("panel should render");

    match snapshot {
        SnapshotReference::Image { content_type, data } => {
            assert_eq!(content_type, "image/png");
            assert_eq!(&data[..], PNG);
        }
        other => panic!("expected image, got {:?}", other),
    }
}

#[actix_web::test]
async fn test_render_rejects_non_image_response() {
    let grafana = start_grafana();
    let client = render_client(&grafana);

    let err = client
        .acquire(&DashboardTarget::new("login-page").with_panel("2"))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        SnapshotError::InvalidResponse {
            endpoint: "render",
            ..
        }
    ));
}

#[actix_web::test]
async fn test_render_rejects_error_status() {
    let grafana = start_grafana();
    let client = render_client(&grafana);

    let err = client
        .acquire(&DashboardTarget::new("nodes").with_panel("99"))
        .await
        .unwrap_err();

    assert!(matches!(err, SnapshotError::Status { status: 404, .. }));
}

#[actix_web::test]
async fn test_render_requires_panel() {
    let grafana = start_grafana();
    let client = render_client(&grafana);

    let err = client
        .acquire(&DashboardTarget::new("nodes"))
        .await
        .unwrap_err();

    assert!(matches!(err, SnapshotError::MissingPanel));
}
