// src/errors.rs
use actix_web::http::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalyzeError {
    #[error("{0}")]
    InvalidRequest(String),

    #[error("Missing or incorrect API key")]
    Unauthorized,

    #[error("Rate limit exceeded")]
    RateLimited { details: Option<String> },

    #[error("Upstream authentication failed")]
    UpstreamAuth { details: String },

    #[error("Upstream rejected the request: {details}")]
    UpstreamBadRequest { details: String },

    #[error("Upstream service unavailable")]
    UpstreamUnavailable { details: String },

    #[error("Upstream request timed out")]
    Timeout,

    #[error("Unexpected response structure: {0}")]
    UpstreamProtocol(String),

    #[error("Upstream request failed with status {status}: {details}")]
    UpstreamStatus { status: u16, details: String },

    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl AnalyzeError {
    /// HTTP status the caller sees for this failure class.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AnalyzeError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            AnalyzeError::Unauthorized => StatusCode::UNAUTHORIZED,
            AnalyzeError::UpstreamAuth { .. } => StatusCode::UNAUTHORIZED,
            AnalyzeError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            AnalyzeError::UpstreamUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            AnalyzeError::Timeout => StatusCode::GATEWAY_TIMEOUT,
            // A provider-side 400 means this service built a bad request;
            // the caller did nothing wrong, so it surfaces as a 500.
            AnalyzeError::UpstreamBadRequest { .. }
            | AnalyzeError::UpstreamProtocol(_)
            | AnalyzeError::UpstreamStatus { .. }
            | AnalyzeError::Request(_)
            | AnalyzeError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// User-facing summary. Never contains provider payloads or secrets.
    pub fn user_message(&self) -> String {
        match self {
            AnalyzeError::InvalidRequest(msg) => msg.clone(),
            AnalyzeError::Unauthorized => "Missing or incorrect API key.".to_string(),
            AnalyzeError::UpstreamAuth { .. } => {
                "Authentication failed. Please check service configuration.".to_string()
            }
            AnalyzeError::RateLimited { .. } => {
                "Too many requests. Please try again later.".to_string()
            }
            AnalyzeError::UpstreamUnavailable { .. } => {
                "Service temporarily unavailable. Please try again later.".to_string()
            }
            AnalyzeError::Timeout => "Request timeout. Please try again.".to_string(),
            _ => "Error processing your request".to_string(),
        }
    }

    /// Provider-supplied diagnostic text, when there is any.
    pub fn details(&self) -> Option<String> {
        match self {
            AnalyzeError::UpstreamAuth { details }
            | AnalyzeError::UpstreamBadRequest { details }
            | AnalyzeError::UpstreamUnavailable { details } => Some(details.clone()),
            AnalyzeError::RateLimited { details } => details.clone(),
            AnalyzeError::UpstreamStatus { details, .. } => Some(details.clone()),
            AnalyzeError::UpstreamProtocol(msg) => Some(msg.clone()),
            AnalyzeError::Request(e) => Some(e.to_string()),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, AnalyzeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            AnalyzeError::InvalidRequest("Image is required".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(AnalyzeError::Unauthorized.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            AnalyzeError::RateLimited { details: None }.status_code(),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            AnalyzeError::UpstreamUnavailable { details: String::new() }.status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(AnalyzeError::Timeout.status_code(), StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(
            AnalyzeError::UpstreamProtocol("no choices".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_upstream_bad_request_is_internal() {
        // The caller never sees a 400 for a provider-side 400.
        let err = AnalyzeError::UpstreamBadRequest { details: "bad model".into() };
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.user_message(), "Error processing your request");
        assert_eq!(err.details().as_deref(), Some("bad model"));
    }

    #[test]
    fn test_messages_never_leak_details() {
        let err = AnalyzeError::UpstreamAuth { details: "invalid api key sk-abc".into() };
        assert!(!err.user_message().contains("sk-abc"));
    }
}
