// src/analyzer.rs
//
// The validate-then-forward sequence behind POST /analyze. Each call is
// independent: validate the payload, send one provider request, map the
// outcome. No retries, no caching.

use reqwest::Client;

use crate::config::AppConfig;
use crate::errors::{AnalyzeError, Result};
use crate::image;
use crate::providers::VisionProvider;
use crate::providers::openai::OpenAIProvider;

/// Fixed instruction sent with every image.
pub const ANALYSIS_PROMPT: &str = "You are a helpful assistant for parents. \
Analyze the provided image which may contain:\n\
1. A child's homework problem (math, science, etc.) - solve it step by step with explanations\n\
2. Foreign language text - translate it to the parent's language\n\
3. General question - provide a clear, concise answer\n\n\
Format your response to be easy for a parent to understand and explain to their child.";

/// Runs the full validation sequence and forwards the image to the vision
/// provider. First failure wins: image presence, data-URL format, size
/// ceiling, then the inbound API key. The provider is never contacted for
/// an invalid request. Returns the model's free-text answer.
pub async fn analyze_image(
    config: &AppConfig,
    client: &Client,
    provided_key: Option<&str>,
    image: &str,
) -> Result<String> {
    let decoded_len = image::validate_data_url(image, config.max_image_bytes)?;
    check_api_key(config, provided_key)?;

    log::debug!("image validated ({} bytes decoded)", decoded_len);

    let provider = OpenAIProvider::new(client.clone(), config.provider.clone());
    let (answer, latency_ms) = provider.analyze(ANALYSIS_PROMPT, image).await?;

    log::info!("analysis completed in {}ms", latency_ms);
    Ok(answer)
}

/// Exact string comparison against the configured shared secret.
/// No secret configured means the check is disabled.
fn check_api_key(config: &AppConfig, provided: Option<&str>) -> Result<()> {
    match &config.inbound_api_key {
        None => Ok(()),
        Some(expected) if provided == Some(expected.as_str()) => Ok(()),
        Some(_) => Err(AnalyzeError::Unauthorized),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ProviderConfig, RateLimitConfig};
    use std::time::Duration;

    fn config_with_key(key: Option<&str>) -> AppConfig {
        AppConfig {
            port: 5000,
            provider: ProviderConfig {
                api_base: "http://127.0.0.1:9".to_string(),
                api_key: "test-key".to_string(),
                model: "gpt-4-vision-preview".to_string(),
                max_tokens: 2000,
            },
            inbound_api_key: key.map(str::to_string),
            max_image_bytes: 0,
            upstream_timeout: Duration::from_secs(30),
            proxy: None,
            rate_limit: RateLimitConfig::default(),
            relay: None,
            cors_allowed_origin: None,
        }
    }

    #[test]
    fn test_prompt_covers_all_categories() {
        assert!(ANALYSIS_PROMPT.contains("homework"));
        assert!(ANALYSIS_PROMPT.contains("Foreign language"));
        assert!(ANALYSIS_PROMPT.contains("General question"));
    }

    #[test]
    fn test_api_key_check_disabled_without_secret() {
        let config = config_with_key(None);
        assert!(check_api_key(&config, None).is_ok());
        assert!(check_api_key(&config, Some("anything")).is_ok());
    }

    #[test]
    fn test_api_key_check_exact_match() {
        let config = config_with_key(Some("shared-secret"));
        assert!(check_api_key(&config, Some("shared-secret")).is_ok());
        assert!(matches!(
            check_api_key(&config, Some("wrong")),
            Err(AnalyzeError::Unauthorized)
        ));
        assert!(matches!(
            check_api_key(&config, None),
            Err(AnalyzeError::Unauthorized)
        ));
        // Prefix of the secret must not pass.
        assert!(check_api_key(&config, Some("shared")).is_err());
    }
}
