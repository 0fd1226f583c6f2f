use async_trait::async_trait;
use eventsource_stream::Eventsource;
use futures::{StreamExt, future};
use reqwest::{Client, Error as ReqwestError, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::application::ports::completion_provider::{
    CompletionProvider, CompletionProviderError, CompletionStream, GenerationParams,
};

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    stream: bool,
    max_tokens: u32,
    temperature: f32,
    top_p: f32,
}

#[derive(Deserialize)]
struct ChatStreamChunk {
    choices: Vec<ChatStreamChoice>,
}

#[derive(Deserialize)]
struct ChatStreamChoice {
    delta: ChatStreamDelta,
}

#[derive(Deserialize)]
struct ChatStreamDelta {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CompletionClientConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub model: String,
    pub timeout_secs: u64,
}

impl Default for CompletionClientConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            api_key: None,
            model: "gpt-4o-mini".to_string(),
            timeout_secs: 120,
        }
    }
}

/// Streams chat completions from any OpenAI-compatible `/chat/completions`
/// endpoint.
#[derive(Debug, Clone)]
pub struct OpenAiCompletionProvider {
    client: Client,
    config: CompletionClientConfig,
}

impl OpenAiCompletionProvider {
    pub fn new(config: CompletionClientConfig) -> Result<Self, ReqwestError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { client, config })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'))
    }
}

/// Maps one SSE `data:` payload to a text increment. Keep-alives, role-only
/// deltas and the `[DONE]` sentinel produce nothing.
fn parse_stream_event(data: &str) -> Option<Result<String, CompletionProviderError>> {
    if data == "[DONE]" {
        return None;
    }

    match serde_json::from_str::<ChatStreamChunk>(data) {
        Ok(chunk) => {
            let content = chunk
                .choices
                .first()
                .and_then(|c| c.delta.content.as_deref())
                .unwrap_or_default();

            if content.is_empty() {
                None
            } else {
                Some(Ok(content.to_owned()))
            }
        }
        Err(e) => Some(Err(CompletionProviderError::StreamError(format!(
            "failed to parse SSE data: {e}"
        )))),
    }
}

fn status_error(status: StatusCode, body: &str) -> CompletionProviderError {
    match status {
        StatusCode::TOO_MANY_REQUESTS => CompletionProviderError::RateLimitExceeded,
        StatusCode::SERVICE_UNAVAILABLE => CompletionProviderError::ServiceUnavailable,
        _ => CompletionProviderError::ApiError(format!("{}: {}", status, body.trim())),
    }
}

#[async_trait]
impl CompletionProvider for OpenAiCompletionProvider {
    async fn stream(
        &self,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<CompletionStream, CompletionProviderError> {
        let request = ChatCompletionRequest {
            model: &self.config.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            stream: true,
            max_tokens: params.max_tokens,
            temperature: params.temperature,
            top_p: params.top_p,
        };

        let mut builder = self.client.post(self.endpoint()).json(&request);
        if let Some(api_key) = &self.config.api_key {
            builder = builder.bearer_auth(api_key);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| CompletionProviderError::NetworkError(e.without_url().to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status = %status, "Completion request rejected");
            return Err(status_error(status, &body));
        }

        let chunks = response
            .bytes_stream()
            .eventsource()
            .filter_map(|event| {
                future::ready(match event {
                    Ok(event) => parse_stream_event(&event.data),
                    Err(e) => Some(Err(CompletionProviderError::StreamError(e.to_string()))),
                })
            });

        Ok(Box::pin(chunks))
    }

    fn model_info(&self) -> String {
        self.config.model.clone()
    }
}
