// src/config.rs
use std::time::Duration;

use crate::errors::{AnalyzeError, Result};

pub const DEFAULT_MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// Configuration for the vision model provider.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub api_base: String,
    pub api_key: String,
    pub model: String,
    pub max_tokens: u32,
}

/// Optional outbound forward proxy for the provider call.
#[derive(Debug, Clone)]
pub struct ProxyConfig {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl ProxyConfig {
    pub fn url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

/// Fixed-window rate limit settings. `max_requests == 0` disables the limiter.
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    pub max_requests: u32,
    pub window: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 100,
            window: Duration::from_secs(900), // 15 minutes
        }
    }
}

/// Configuration for the same-origin forwarding route. When set, the
/// `/api/analyze` route relays to `<upstream_url>/analyze` instead of
/// analyzing locally.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub upstream_url: String,
    pub timeout: Duration,
}

/// High-level application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub provider: ProviderConfig,
    /// Shared secret for inbound requests; `None` disables the check.
    pub inbound_api_key: Option<String>,
    /// Decoded-size ceiling for incoming images; 0 means unbounded.
    pub max_image_bytes: usize,
    pub upstream_timeout: Duration,
    pub proxy: Option<ProxyConfig>,
    pub rate_limit: RateLimitConfig,
    pub relay: Option<RelayConfig>,
    /// Restrict CORS to one origin; `None` keeps the permissive default.
    pub cors_allowed_origin: Option<String>,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY").map_err(|_| {
            AnalyzeError::Config(
                "No vision provider configured. Please set OPENAI_API_KEY.".to_string(),
            )
        })?;
        let api_base = std::env::var("OPENAI_API_BASE")
            .unwrap_or_else(|_| "https://api.openai.com/v1".to_string());
        let model = std::env::var("OPENAI_MODEL")
            .unwrap_or_else(|_| "gpt-4-vision-preview".to_string());

        let provider = ProviderConfig {
            api_base,
            api_key,
            model,
            max_tokens: 2000,
        };

        let mut proxy = None;
        if let Ok(host) = std::env::var("PROXY_HOST") {
            let port = parse_env("PROXY_PORT", 8080u16)?;
            proxy = Some(ProxyConfig {
                host,
                port,
                username: std::env::var("PROXY_USERNAME").ok(),
                password: std::env::var("PROXY_PASSWORD").ok(),
            });
        }

        let mut relay = None;
        if let Ok(upstream_url) = std::env::var("RELAY_UPSTREAM_URL") {
            let timeout_secs = parse_env("RELAY_TIMEOUT_SECS", 30u64)?;
            relay = Some(RelayConfig {
                upstream_url: upstream_url.trim_end_matches('/').to_string(),
                timeout: Duration::from_secs(timeout_secs),
            });
        }

        let defaults = RateLimitConfig::default();
        let rate_limit = RateLimitConfig {
            max_requests: parse_env("RATE_LIMIT_MAX", defaults.max_requests)?,
            window: Duration::from_secs(parse_env(
                "RATE_LIMIT_WINDOW_SECS",
                defaults.window.as_secs(),
            )?),
        };

        Ok(AppConfig {
            port: parse_env("PORT", 5000u16)?,
            provider,
            inbound_api_key: std::env::var("API_KEY").ok().filter(|k| !k.is_empty()),
            max_image_bytes: parse_env("MAX_IMAGE_BYTES", DEFAULT_MAX_IMAGE_BYTES)?,
            upstream_timeout: Duration::from_secs(parse_env("UPSTREAM_TIMEOUT_SECS", 30u64)?),
            proxy,
            rate_limit,
            relay,
            cors_allowed_origin: std::env::var("CORS_ALLOWED_ORIGIN").ok(),
        })
    }

    /// Payload ceiling for the JSON body extractor. Base64 inflates the
    /// image by 4/3 and the data URL adds prefix overhead, so double the
    /// decoded ceiling with a floor that always admits small requests.
    pub fn json_payload_limit(&self) -> usize {
        const FLOOR: usize = 2 * 1024 * 1024;
        if self.max_image_bytes == 0 {
            64 * 1024 * 1024
        } else {
            FLOOR.max(self.max_image_bytes * 2)
        }
    }
}

fn parse_env<T: std::str::FromStr>(name: &str, default: T) -> Result<T> {
    match std::env::var(name) {
        Ok(raw) => raw.trim().parse::<T>().map_err(|_| {
            AnalyzeError::Config(format!("Invalid value for {}: {:?}", name, raw))
        }),
        Err(_) => Ok(default),
    }
}
