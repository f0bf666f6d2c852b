//! Google Gemini implementation of the AI service

use super::{AiError, AiService};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const TEXT_MODEL: &str = "gemini-pro";
const VISION_MODEL: &str = "gemini-1.5-flash";
const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

const DESCRIBE_PROMPT: &str = "Analyze this image and describe what you see in detail";

/// Gemini service implementation
pub struct GeminiClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(api_key: String, base_url: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            api_key,
            base_url: base_url.into(),
        }
    }

    fn summary_prompt(topic: &str) -> String {
        format!(
            "For the search query: \"{topic}\"\n\n\
             Provide a concise summary of what someone might find when \
             searching this topic. Include:\n\
             1. Key points or main information\n\
             2. Types of resources likely to be found\n\
             3. One specific search tip\n\n\
             Keep the summary under 150 words."
        )
    }

    async fn generate(&self, model: &str, parts: Vec<GeminiPart>) -> Result<String, AiError> {
        let request = GeminiRequest {
            contents: vec![GeminiContent {
                role: Some("user".to_string()),
                parts,
            }],
        };

        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url.trim_end_matches('/'),
            model,
            self.api_key
        );

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AiError::network(format!("Request timeout: {e}"))
                } else if e.is_connect() {
                    AiError::network(format!("Connection failed: {e}"))
                } else {
                    AiError::unknown(format!("Request failed: {e}"))
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AiError::network(format!("Failed to read response: {e}")))?;

        if !status.is_success() {
            if let Ok(error_resp) = serde_json::from_str::<GeminiErrorResponse>(&body) {
                let message = error_resp.error.message;
                return Err(match status.as_u16() {
                    400 => AiError::invalid_request(format!("Invalid request: {message}")),
                    401 | 403 => AiError::auth(format!("Authentication failed: {message}")),
                    429 => AiError::rate_limit(format!("Rate limit exceeded: {message}")),
                    500..=599 => AiError::server_error(format!("Server error: {message}")),
                    _ => AiError::unknown(format!("HTTP {status}: {message}")),
                });
            }
            return Err(AiError::unknown(format!("HTTP {status} error: {body}")));
        }

        let gemini_response: GeminiResponse = serde_json::from_str(&body)
            .map_err(|e| AiError::unknown(format!("Failed to parse response: {e}")))?;

        Self::extract_text(gemini_response)
    }

    fn extract_text(resp: GeminiResponse) -> Result<String, AiError> {
        let candidate = resp
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| AiError::unknown("No candidates in response"))?;

        let text: String = candidate
            .content
            .parts
            .into_iter()
            .filter_map(|part| match part {
                GeminiPart::Text { text } => Some(text),
                GeminiPart::InlineData { .. } => None,
            })
            .collect::<Vec<_>>()
            .join("");

        if text.is_empty() {
            return Err(AiError::unknown("Empty response text"));
        }
        Ok(text)
    }
}

#[async_trait]
impl AiService for GeminiClient {
    async fn summarize(&self, topic: &str) -> Result<String, AiError> {
        let parts = vec![GeminiPart::Text {
            text: Self::summary_prompt(topic),
        }];
        self.generate(TEXT_MODEL, parts).await
    }

    async fn converse(&self, prompt: &str) -> Result<String, AiError> {
        let parts = vec![GeminiPart::Text {
            text: prompt.to_string(),
        }];
        self.generate(TEXT_MODEL, parts).await
    }

    async fn describe_image(&self, media_type: &str, data: &str) -> Result<String, AiError> {
        let parts = vec![
            GeminiPart::Text {
                text: DESCRIBE_PROMPT.to_string(),
            },
            GeminiPart::InlineData {
                inline_data: GeminiInlineData {
                    mime_type: media_type.to_string(),
                    data: data.to_string(),
                },
            },
        ];
        self.generate(VISION_MODEL, parts).await
    }
}

// Gemini API types

#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
enum GeminiPart {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: GeminiInlineData,
    },
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiInlineData {
    #[serde(rename = "mimeType")]
    mime_type: String,
    data: String,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: GeminiContent,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorResponse {
    error: GeminiErrorBody,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorBody {
    message: String,
    #[allow(dead_code)]
    code: Option<i32>,
    #[allow(dead_code)]
    status: Option<String>,
}
