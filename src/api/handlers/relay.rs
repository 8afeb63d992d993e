// src/api/handlers/relay.rs
//
// Same-origin forwarding route used by the capture UI. With a relay
// upstream configured the request is re-issued to the analysis backend and
// its normalized response passes through unchanged; only transport failures
// are mapped here. Without one, the analysis runs in this process.

use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse, web};
use uuid::Uuid;

use super::analyze::{self, AnalyzeRequest, error_response};
use crate::api::AppState;
use crate::config::RelayConfig;
use crate::errors::AnalyzeError;

pub async fn analyze_entry(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Json<AnalyzeRequest>,
) -> HttpResponse {
    let request_id = Uuid::new_v4();
    match &state.config.relay {
        Some(relay) => forward(&state, relay, body.into_inner(), request_id).await,
        None => analyze::handle(&state, &req, body.into_inner(), request_id).await,
    }
}

async fn forward(
    state: &AppState,
    relay: &RelayConfig,
    body: AnalyzeRequest,
    request_id: Uuid,
) -> HttpResponse {
    if body.image.as_deref().unwrap_or("").is_empty() {
        return error_response(
            request_id,
            &AnalyzeError::InvalidRequest("Image is required".to_string()),
        );
    }

    let url = format!("{}/analyze", relay.upstream_url);

    let sent = state
        .client
        .post(&url)
        .timeout(relay.timeout)
        .json(&body)
        .send()
        .await;

    let resp = match sent {
        Ok(resp) => resp,
        Err(e) if e.is_timeout() => {
            return error_response(request_id, &AnalyzeError::Timeout);
        }
        Err(e) => {
            return error_response(request_id, &AnalyzeError::Request(e));
        }
    };

    let upstream_status = resp.status().as_u16();

    let value = match resp.json::<serde_json::Value>().await {
        Ok(value) => value,
        Err(e) => {
            return error_response(
                request_id,
                &AnalyzeError::UpstreamProtocol(e.to_string()),
            );
        }
    };

    // A missing model on the backend means the deployment is broken, not
    // that the caller should see the backend's raw failure.
    if mentions_missing_model(&value) {
        log::error!("[{}] analysis backend reports missing model", request_id);
        return error_response(
            request_id,
            &AnalyzeError::UpstreamUnavailable {
                details: "model_not_found".to_string(),
            },
        );
    }

    let status =
        StatusCode::from_u16(upstream_status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    if !status.is_success() {
        log::warn!("[{}] analysis backend returned {}", request_id, status);
    }
    HttpResponse::build(status).json(value)
}

fn mentions_missing_model(value: &serde_json::Value) -> bool {
    ["message", "details"].iter().any(|field| {
        value
            .get(field)
            .and_then(|v| v.as_str())
            .is_some_and(|s| s.contains("model_not_found"))
    })
}
