// src/api/handlers/analyze.rs
use actix_web::{HttpRequest, HttpResponse, web};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::analyzer;
use crate::api::AppState;
use crate::errors::AnalyzeError;

pub const API_KEY_HEADER: &str = "X-API-Key";

#[derive(Clone, Deserialize, Serialize)]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub image: Option<String>,
}

/// The normalized response contract shared by every outcome.
#[derive(Serialize)]
pub struct AnalyzeResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl AnalyzeResponse {
    pub fn ok(result: String) -> Self {
        Self {
            success: true,
            result: Some(result),
            message: None,
            details: None,
        }
    }

    pub fn failure(err: &AnalyzeError) -> Self {
        Self {
            success: false,
            result: None,
            message: Some(err.user_message()),
            details: err.details(),
        }
    }
}

/// Converts a failure into the normalized JSON shape, logging the detail
/// server-side. The raw image payload is never logged.
pub fn error_response(request_id: Uuid, err: &AnalyzeError) -> HttpResponse {
    match err {
        AnalyzeError::InvalidRequest(_) | AnalyzeError::Unauthorized => {
            log::warn!("[{}] request rejected: {}", request_id, err);
        }
        _ => log::error!("[{}] analysis failed: {}", request_id, err),
    }
    HttpResponse::build(err.status_code()).json(AnalyzeResponse::failure(err))
}

pub async fn analyze(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Json<AnalyzeRequest>,
) -> HttpResponse {
    let request_id = Uuid::new_v4();
    handle(&state, &req, body.into_inner(), request_id).await
}

/// Shared by the service route and the forwarding route's local fallback.
pub(super) async fn handle(
    state: &AppState,
    req: &HttpRequest,
    body: AnalyzeRequest,
    request_id: Uuid,
) -> HttpResponse {
    let client_key = req
        .connection_info()
        .realip_remote_addr()
        .unwrap_or("unknown")
        .to_string();

    if !state.limiter.check(&client_key) {
        log::warn!("[{}] rate limit exceeded for {}", request_id, client_key);
        return error_response(request_id, &AnalyzeError::RateLimited { details: None });
    }

    let provided_key = req
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok());

    let image = body.image.as_deref().unwrap_or("");

    match analyzer::analyze_image(&state.config, &state.client, provided_key, image).await {
        Ok(result) => {
            log::info!("[{}] analysis succeeded", request_id);
            HttpResponse::Ok().json(AnalyzeResponse::ok(result))
        }
        Err(e) => error_response(request_id, &e),
    }
}
