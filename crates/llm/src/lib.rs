use std::time::Duration;

use reqwest::Client;
use task_core::{Lang, EMPTY_COMPLETION_FALLBACK};
use thiserror::Error;
use tracing::warn;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1/responses";
const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Persona preamble for last-tier answers: stay on TASK's domain, admit
/// uncertainty, hand off to a human when in doubt.
const FALLBACK_PERSONA: &str = "You are the assistant for the Trenton Area Soup Kitchen (TASK), a social-services organization in Trenton, NJ. Prefer TASK program and service context when it is relevant. If you are not sure, say so plainly instead of guessing. Answer in the same language the question was asked in. When a staff member should take over, suggest calling (609) 695-5456.";

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("generative service is not configured")]
    NotConfigured,
    #[error("generative request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("generative upstream returned status {status}: {detail}")]
    Upstream { status: u16, detail: String },
    #[error("generative response had no usable text")]
    MalformedResponse,
}

/// External text-generation service: a prompt in, a best-effort completion
/// out. The core is agnostic to the model family behind it.
pub trait GenerativeClient: Send + Sync {
    async fn complete(&self, system: &str, user: &str) -> Result<String, GenerationError>;
}

#[derive(Debug, Clone)]
pub struct GenerativeConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
}

impl GenerativeConfig {
    pub fn from_env() -> Option<Self> {
        let api_key = std::env::var("TASK_GENERATIVE_API_KEY").ok()?;
        Some(Self {
            api_key,
            model: std::env::var("TASK_GENERATIVE_MODEL")
                .unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
            base_url: std::env::var("TASK_GENERATIVE_URL")
                .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
        })
    }
}

/// HTTP client for an OpenAI-style responses endpoint. One blocking call
/// per request, bounded by the client timeout; no retries.
#[derive(Clone)]
pub struct HttpGenerativeClient {
    http: Client,
    config: Option<GenerativeConfig>,
}

impl HttpGenerativeClient {
    pub fn new(config: Option<GenerativeConfig>) -> Result<Self, GenerationError> {
        let http = Client::builder()
            .connect_timeout(Duration::from_secs(6))
            .timeout(Duration::from_secs(20))
            .build()?;

        Ok(Self { http, config })
    }

    pub fn from_env() -> Result<Self, GenerationError> {
        Self::new(GenerativeConfig::from_env())
    }

    pub fn is_configured(&self) -> bool {
        self.config.is_some()
    }
}

impl GenerativeClient for HttpGenerativeClient {
    async fn complete(&self, system: &str, user: &str) -> Result<String, GenerationError> {
        let config = self.config.as_ref().ok_or(GenerationError::NotConfigured)?;

        let payload = serde_json::json!({
            "model": config.model,
            "input": [
                {
                    "role": "system",
                    "content": [
                        { "type": "input_text", "text": system }
                    ]
                },
                {
                    "role": "user",
                    "content": [
                        { "type": "input_text", "text": user }
                    ]
                }
            ]
        });

        let response = self
            .http
            .post(&config.base_url)
            .bearer_auth(&config.api_key)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(GenerationError::Upstream {
                status: status.as_u16(),
                detail,
            });
        }

        let body: serde_json::Value = response.json().await?;
        extract_output_text(&body).ok_or(GenerationError::MalformedResponse)
    }
}

fn extract_output_text(payload: &serde_json::Value) -> Option<String> {
    if let Some(value) = payload.get("output_text").and_then(|value| value.as_str()) {
        return Some(value.to_string());
    }

    let output = payload.get("output")?.as_array()?;
    let mut chunks = Vec::new();
    for item in output {
        if let Some(content) = item.get("content").and_then(|value| value.as_array()) {
            for content_item in content {
                if content_item.get("type").and_then(|value| value.as_str()) == Some("output_text")
                {
                    if let Some(text) = content_item.get("text").and_then(|value| value.as_str()) {
                        chunks.push(text.to_string());
                    }
                }
            }
        }
    }

    if chunks.is_empty() {
        None
    } else {
        Some(chunks.join("\n\n"))
    }
}

/// Tier-2: send the original query, wrapped in the fixed persona. A success
/// with no usable text becomes the fixed "please call us" message; upstream
/// failures propagate for the router to turn into the apology answer.
pub async fn answer_fallback<G: GenerativeClient>(
    client: &G,
    query: &str,
) -> Result<String, GenerationError> {
    let text = client.complete(FALLBACK_PERSONA, query).await?;
    if text.trim().is_empty() {
        return Ok(EMPTY_COMPLETION_FALLBACK.to_string());
    }

    Ok(text)
}

/// Translate a finished Tier-0/Tier-1 answer. English input passes through
/// untouched; an empty translation falls back to the original. Upstream
/// failures propagate so the caller can degrade (and count) them.
pub async fn translate_answer<G: GenerativeClient>(
    client: &G,
    text: &str,
    lang: Lang,
) -> Result<String, GenerationError> {
    if lang == Lang::En {
        return Ok(text.to_string());
    }

    let instruction = format!(
        "Translate the user's message into {}. Keep URLs, phone numbers, dates, and times exactly as written. Return only the translation.",
        lang.display_name()
    );

    let translated = client.complete(&instruction, text).await?;
    if translated.trim().is_empty() {
        warn!(lang = lang.as_code(), "empty translation, returning original text");
        return Ok(text.to_string());
    }

    Ok(translated)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_top_level_output_text() {
        let payload = serde_json::json!({ "output_text": "hello" });
        assert_eq!(extract_output_text(&payload).as_deref(), Some("hello"));
    }

    #[test]
    fn extracts_nested_output_chunks() {
        let payload = serde_json::json!({
            "output": [
                {
                    "content": [
                        { "type": "output_text", "text": "part one" },
                        { "type": "reasoning", "text": "ignored" },
                        { "type": "output_text", "text": "part two" }
                    ]
                }
            ]
        });
        assert_eq!(
            extract_output_text(&payload).as_deref(),
            Some("part one\n\npart two")
        );
    }

    #[test]
    fn missing_output_is_none() {
        assert_eq!(extract_output_text(&serde_json::json!({})), None);
    }

    #[test]
    fn unconfigured_client_reports_not_configured() {
        let client = HttpGenerativeClient::new(None).unwrap();
        assert!(!client.is_configured());
    }
}
