use async_trait::async_trait;
use futures::Stream;
use std::pin::Pin;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum CompletionProviderError {
    #[error("Network error: {0}")]
    NetworkError(String),
    #[error("API error: {0}")]
    ApiError(String),
    #[error("Stream error: {0}")]
    StreamError(String),
    #[error("Rate limit exceeded")]
    RateLimitExceeded,
    #[error("Service unavailable")]
    ServiceUnavailable,
}

/// Sampling parameters for conversational answers.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationParams {
    pub max_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            max_tokens: 1024,
            temperature: 0.7,
            top_p: 0.9,
        }
    }
}

/// Finite sequence of text increments. An `Err` item ends the answer.
pub type CompletionStream =
    Pin<Box<dyn Stream<Item = Result<String, CompletionProviderError>> + Send>>;

#[async_trait]
pub trait CompletionProvider: Send + Sync {
    async fn stream(
        &self,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<CompletionStream, CompletionProviderError>;

    fn model_info(&self) -> String;
}
