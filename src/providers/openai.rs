// src/providers/openai.rs

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::config::ProviderConfig;
use crate::errors::{AnalyzeError, Result};
use crate::providers::VisionProvider;

/// A provider for OpenAI-compatible vision models.
pub struct OpenAIProvider {
    client: Client,
    config: ProviderConfig,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
    max_tokens: u32,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: Vec<ContentPart<'a>>,
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart<'a> {
    Text { text: &'a str },
    ImageUrl { image_url: ImageUrl<'a> },
}

#[derive(Serialize)]
struct ImageUrl<'a> {
    url: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: MessageContent,
}

#[derive(Deserialize)]
struct MessageContent {
    content: String,
}

impl OpenAIProvider {
    /// Creates a new `OpenAIProvider`.
    pub fn new(client: Client, config: ProviderConfig) -> Self {
        Self { client, config }
    }
}

impl VisionProvider for OpenAIProvider {
    /// Calls the chat-completions endpoint with the instruction prompt and
    /// the image inlined as a data URL, and returns the answer text and latency.
    async fn analyze(&self, prompt: &str, image_data_url: &str) -> Result<(String, u64)> {
        let url = format!("{}/chat/completions", self.config.api_base.trim_end_matches('/'));

        let body = ChatRequest {
            model: &self.config.model,
            messages: vec![Message {
                role: "user",
                content: vec![
                    ContentPart::Text { text: prompt },
                    ContentPart::ImageUrl {
                        image_url: ImageUrl { url: image_data_url },
                    },
                ],
            }],
            max_tokens: self.config.max_tokens,
        };

        let start = Instant::now();

        let resp = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AnalyzeError::Timeout
                } else {
                    AnalyzeError::Request(e)
                }
            })?;

        let status = resp.status();
        let latency_ms = start.elapsed().as_millis() as u64;

        log::info!("vision provider responded: {} ({}ms)", status, latency_ms);

        if !status.is_success() {
            let error_body = resp
                .text()
                .await
                .unwrap_or_else(|_| "Could not read error body".to_string());
            let details = error_details(&error_body);
            return Err(match status {
                StatusCode::UNAUTHORIZED => AnalyzeError::UpstreamAuth { details },
                StatusCode::TOO_MANY_REQUESTS => AnalyzeError::RateLimited {
                    details: Some(details),
                },
                StatusCode::BAD_REQUEST => AnalyzeError::UpstreamBadRequest { details },
                StatusCode::SERVICE_UNAVAILABLE => AnalyzeError::UpstreamUnavailable { details },
                _ => AnalyzeError::UpstreamStatus {
                    status: status.as_u16(),
                    details,
                },
            });
        }

        let chat_resp: ChatResponse = resp
            .json()
            .await
            .map_err(|e| AnalyzeError::UpstreamProtocol(e.to_string()))?;

        let answer = chat_resp
            .choices
            .first()
            .map(|c| c.message.content.clone())
            .ok_or_else(|| AnalyzeError::UpstreamProtocol("No choices in response".to_string()))?;

        if answer.is_empty() {
            return Err(AnalyzeError::UpstreamProtocol(
                "Empty message content in response".to_string(),
            ));
        }

        Ok((answer, latency_ms))
    }
}

/// Pulls `error.message` out of a provider error body, falling back to the
/// raw text. Long bodies are truncated so logs stay readable.
fn error_details(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        if let Some(message) = value
            .get("error")
            .and_then(|e| e.get("message"))
            .and_then(|m| m.as_str())
        {
            return message.to_string();
        }
    }
    let mut details = body.trim().to_string();
    if details.len() > 500 {
        // Truncation must land on a char boundary or it panics on
        // multi-byte text, e.g. a localized gateway error page.
        let mut cut = 500;
        while !details.is_char_boundary(cut) {
            cut -= 1;
        }
        details.truncate(cut);
    }
    details
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_error_details_extracts_provider_message() {
        let body = json!({
            "error": { "message": "Rate limit reached", "type": "requests" }
        })
        .to_string();
        assert_eq!(error_details(&body), "Rate limit reached");
    }

    #[test]
    fn test_error_details_falls_back_to_raw_body() {
        assert_eq!(error_details("upstream exploded"), "upstream exploded");
    }

    #[test]
    fn test_error_details_truncates_long_bodies() {
        let body = "x".repeat(600);
        assert_eq!(error_details(&body).len(), 500);
    }

    #[test]
    fn test_error_details_truncates_on_char_boundary() {
        // A multi-byte char straddling the 500-byte limit must not panic.
        let mut body = "x".repeat(499);
        body.push('é');
        body.push_str(&"y".repeat(100));
        let details = error_details(&body);
        assert_eq!(details.len(), 499);
        assert!(details.is_char_boundary(details.len()));

        // Same for a non-JSON HTML error page in a non-Latin script.
        let html = format!("<html><body>{}</body></html>", "サービス利用不可".repeat(50));
        let details = error_details(&html);
        assert!(details.len() <= 500);
        assert!(details.is_char_boundary(details.len()));
    }

    #[test]
    fn test_request_serializes_multimodal_content() {
        let body = ChatRequest {
            model: "gpt-4-vision-preview",
            messages: vec![Message {
                role: "user",
                content: vec![
                    ContentPart::Text { text: "describe" },
                    ContentPart::ImageUrl {
                        image_url: ImageUrl { url: "data:image/png;base64,AAAA" },
                    },
                ],
            }],
            max_tokens: 2000,
        };

        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["messages"][0]["content"][0]["type"], "text");
        assert_eq!(value["messages"][0]["content"][1]["type"], "image_url");
        assert_eq!(
            value["messages"][0]["content"][1]["image_url"]["url"],
            "data:image/png;base64,AAAA"
        );
    }
}
