//! Generative-AI collaborator
//!
//! Three operations, all recoverable on failure: topic summaries for web
//! search, chat completions, and vision descriptions of uploaded images.

mod error;
mod gemini;

pub use error::{AiError, AiErrorKind};
pub use gemini::GeminiClient;

use async_trait::async_trait;
use std::sync::Arc;

/// Common interface for the generative-AI service
#[async_trait]
pub trait AiService: Send + Sync {
    /// Natural-language summary of a search topic
    async fn summarize(&self, topic: &str) -> Result<String, AiError>;

    /// Free-form chat completion for a verbatim prompt
    async fn converse(&self, prompt: &str) -> Result<String, AiError>;

    /// Vision description of an image (base64 data + media type)
    async fn describe_image(&self, media_type: &str, data: &str) -> Result<String, AiError>;
}

#[async_trait]
impl<T: AiService + ?Sized> AiService for Arc<T> {
    async fn summarize(&self, topic: &str) -> Result<String, AiError> {
        (**self).summarize(topic).await
    }

    async fn converse(&self, prompt: &str) -> Result<String, AiError> {
        (**self).converse(prompt).await
    }

    async fn describe_image(&self, media_type: &str, data: &str) -> Result<String, AiError> {
        (**self).describe_image(media_type, data).await
    }
}

/// Logging wrapper for AI services
pub struct LoggingService<A> {
    inner: A,
}

impl<A: AiService> LoggingService<A> {
    pub fn new(inner: A) -> Self {
        Self { inner }
    }

    async fn timed(
        &self,
        op: &'static str,
        fut: impl std::future::Future<Output = Result<String, AiError>>,
    ) -> Result<String, AiError> {
        let start = std::time::Instant::now();
        let result = fut.await;
        let duration = start.elapsed();

        match &result {
            Ok(text) => {
                tracing::info!(
                    op,
                    duration_ms = %duration.as_millis(),
                    response_chars = text.len(),
                    "AI request completed"
                );
            }
            Err(e) => {
                tracing::error!(
                    op,
                    duration_ms = %duration.as_millis(),
                    error = %e.message,
                    retryable = e.kind.is_retryable(),
                    "AI request failed"
                );
            }
        }

        result
    }
}

#[async_trait]
impl<A: AiService> AiService for LoggingService<A> {
    async fn summarize(&self, topic: &str) -> Result<String, AiError> {
        self.timed("summarize", self.inner.summarize(topic)).await
    }

    async fn converse(&self, prompt: &str) -> Result<String, AiError> {
        self.timed("converse", self.inner.converse(prompt)).await
    }

    async fn describe_image(&self, media_type: &str, data: &str) -> Result<String, AiError> {
        self.timed("describe_image", self.inner.describe_image(media_type, data))
            .await
    }
}
