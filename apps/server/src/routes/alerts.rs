//! Alertmanager webhook endpoint.
//!
//! - POST /alert - Receive a batch of alerts and email each one

use actix_web::http::header::{self, HeaderName, HeaderValue};
use actix_web::{http::StatusCode, web, HttpRequest, HttpResponse};
use futures_util::StreamExt;

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::models::{AlertBatch, BatchDisposition};
use crate::services::AlertPipeline;

/// POST /alert
///
/// Responds 200 with an empty body when every alert was delivered, 207 with
/// the batch report when only some were, and 500 with the report when none
/// were. The batch runs on its own task and finishes even if the caller
/// disconnects.
pub async fn receive_alerts(
    config: web::Data<Config>,
    pipeline: web::Data<AlertPipeline>,
    req: HttpRequest,
    payload: web::Payload,
) -> AppResult<HttpResponse> {
    log::info!("Received {} request to {}", req.method(), req.path());
    for (name, value) in req.headers() {
        log::debug!("{}: {}", name, loggable_header_value(name, value));
    }

    // 1. Read the whole body
    let body = read_body(payload, config.max_body_bytes).await?;
    log::debug!("request body:\n{}", String::from_utf8_lossy(&body));

    // 2. Decode the batch
    let batch: AlertBatch =
        serde_json::from_slice(&body).map_err(|e| AppError::Validation(e.to_string()))?;

    // 3. Process alerts
    let pipeline = pipeline.into_inner();
    let report = tokio::spawn(async move { pipeline.process(batch).await })
        .await
        .map_err(|e| AppError::Internal(format!("alert processing task failed: {}", e)))?;

    // 4. Respond with the aggregate status
    let response = match report.disposition() {
        BatchDisposition::Complete => HttpResponse::Ok().finish(),
        BatchDisposition::Partial => HttpResponse::build(StatusCode::MULTI_STATUS).json(report),
        BatchDisposition::Failed => HttpResponse::InternalServerError().json(report),
    };
    Ok(response)
}

/// Header value as written to the debug log, with credentials masked
fn loggable_header_value<'a>(name: &HeaderName, value: &'a HeaderValue) -> &'a str {
    if *name == header::AUTHORIZATION
        || *name == header::PROXY_AUTHORIZATION
        || *name == header::COOKIE
    {
        return "<redacted>";
    }
    value.to_str().unwrap_or("<binary>")
}

/// Collects the request body, rejecting it once it grows past `limit` bytes
async fn read_body(mut payload: web::Payload, limit: usize) -> AppResult<web::BytesMut> {
    let mut body = web::BytesMut::new();

    while let Some(chunk) = payload.next().await {
        let chunk = chunk.map_err(|e| {
            log::error!("error reading request body: {}", e);
            AppError::BodyRead(e.to_string())
        })?;

        if body.len() + chunk.len() > limit {
            return Err(AppError::PayloadTooLarge(format!(
                "request body exceeds {} bytes",
                limit
            )));
        }
        body.extend_from_slice(&chunk);
    }

    Ok(body)
}

/// Configures the alert routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/alert", web::post().to(receive_alerts));
}
