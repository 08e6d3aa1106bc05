//! Azure OpenAI service for non-streaming chat completions.
//!
//! Endpoint derived from [`CompletionConfig`]:
//! - POST {endpoint}/openai/deployments/{deployment}/chat/completions?api-version={v}
//!
//! Constructor validation:
//! - `cfg.endpoint` must start with http:// or https://
//! - `cfg.api_key` and `cfg.deployment` must be non-empty
//!
//! Calls go through the retry executor; transport-class failures are retried,
//! everything else propagates to the caller untouched.

use std::time::{Duration, Instant};

use reqwest::header;
use retry_policy::run_with_retry;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::config::completion_config::CompletionConfig;
use crate::error_handler::{AiCompletionError, ConfigError, make_snippet, validate_http_endpoint};

/// Sampling temperature for deployments that accept it.
const DEFAULT_TEMPERATURE: f32 = 0.5;

/// Generation cap for deployments that accept it.
const DEFAULT_MAX_COMPLETION_TOKENS: u32 = 1000;

/// Thin client for the hosted chat-completion deployment.
///
/// Constructed once at process start; internally keeps a preconfigured
/// `reqwest::Client` (timeout and `api-key` default header).
#[derive(Debug)]
pub struct AzureOpenAiService {
    client: reqwest::Client,
    cfg: CompletionConfig,
    url_chat: String,
}

impl AzureOpenAiService {
    /// Creates a new [`AzureOpenAiService`] from the given config.
    ///
    /// # Errors
    /// - [`ConfigError::InvalidFormat`] for a non-HTTP endpoint
    /// - [`ConfigError::MissingVar`] for an empty key or deployment
    /// - [`AiCompletionError::HttpTransport`] if the client cannot be built
    pub fn new(cfg: CompletionConfig) -> Result<Self, AiCompletionError> {
        validate_http_endpoint("AZURE_OPENAI_ENDPOINT", cfg.endpoint.trim())?;
        if cfg.api_key.trim().is_empty() {
            return Err(ConfigError::MissingVar("AZURE_OPENAI_API_KEY").into());
        }
        if cfg.deployment.trim().is_empty() {
            return Err(ConfigError::MissingVar("AZURE_OPENAI_DEPLOYMENT_NAME").into());
        }

        let mut headers = header::HeaderMap::new();
        headers.insert(
            "api-key",
            header::HeaderValue::from_str(&cfg.api_key).map_err(|e| {
                AiCompletionError::Decode(format!("invalid API key header: {e}"))
            })?,
        );
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .default_headers(headers)
            .build()?;

        let base = cfg.endpoint.trim().trim_end_matches('/').to_string();
        let url_chat = format!(
            "{}/openai/deployments/{}/chat/completions?api-version={}",
            base, cfg.deployment, cfg.api_version
        );

        info!(
            deployment = %cfg.deployment,
            endpoint = %cfg.endpoint,
            api_version = %cfg.api_version,
            timeout_secs = cfg.timeout_secs,
            "AzureOpenAiService initialized"
        );

        Ok(Self {
            client,
            cfg,
            url_chat,
        })
    }

    pub fn deployment(&self) -> &str {
        &self.cfg.deployment
    }

    /// Performs a retry-wrapped, non-streaming chat completion.
    ///
    /// Unlike retrieval, failures here are the caller's problem: fatal
    /// errors and exhausted retries propagate unchanged.
    ///
    /// # Errors
    /// - [`AiCompletionError::HttpStatus`] for non-2xx responses
    /// - [`AiCompletionError::HttpTransport`] for client/network failures
    /// - [`AiCompletionError::Decode`] if the JSON cannot be parsed
    /// - [`AiCompletionError::EmptyChoices`] if no choice carries content
    pub async fn complete(
        &self,
        messages: &[ChatMessage],
    ) -> Result<CompletionOutcome, AiCompletionError> {
        run_with_retry(&self.cfg.retry, "chat_completion", || {
            self.try_complete(messages)
        })
        .await
    }

    /// Single completion attempt.
    async fn try_complete(
        &self,
        messages: &[ChatMessage],
    ) -> Result<CompletionOutcome, AiCompletionError> {
        let started = Instant::now();
        let body = ChatCompletionRequest::for_deployment(&self.cfg.deployment, messages);

        debug!(
            deployment = %self.cfg.deployment,
            message_count = messages.len(),
            minimal_params = minimal_params(&self.cfg.deployment),
            "POST {}", self.url_chat
        );

        let resp = self.client.post(&self.url_chat).json(&body).send().await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let url = self.url_chat.clone();
            let text = resp.text().await.unwrap_or_default();
            let snippet = make_snippet(&text);

            error!(
                %status,
                %url,
                %snippet,
                deployment = %self.cfg.deployment,
                latency_ms = started.elapsed().as_millis(),
                "chat completion returned non-success status"
            );

            return Err(AiCompletionError::HttpStatus {
                status,
                url,
                snippet,
            });
        }

        let out: ChatCompletionResponse = resp.json().await.map_err(|e| {
            error!(
                error = %e,
                deployment = %self.cfg.deployment,
                latency_ms = started.elapsed().as_millis(),
                "failed to decode chat completion response"
            );
            AiCompletionError::Decode(format!(
                "serde error: {e}; expected `choices[0].message.content`"
            ))
        })?;

        let choice_count = out.choices.len();
        let text = out
            .choices
            .into_iter()
            .find_map(|c| c.message.content)
            .ok_or(AiCompletionError::EmptyChoices)?;

        info!(
            deployment = %self.cfg.deployment,
            choice_count,
            latency_ms = started.elapsed().as_millis(),
            "chat completion completed"
        );

        Ok(CompletionOutcome {
            text,
            model: out.model.unwrap_or_else(|| self.cfg.deployment.clone()),
            choice_count,
        })
    }
}

/// Whether the deployment's model family rejects sampling/length parameters.
///
/// The o1 family accepts only `{model, messages}`; sending `temperature` or
/// token caps makes the service reject the request outright.
pub fn minimal_params(deployment: &str) -> bool {
    deployment.to_lowercase().contains("o1")
}

/// Generated text plus minimal metadata, returned to the HTTP layer as-is.
#[derive(Debug, Clone)]
pub struct CompletionOutcome {
    pub text: String,
    pub model: String,
    pub choice_count: usize,
}

/// One turn in the conversation; also deserialized straight from request
/// bodies carrying `conversation_history`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// One of: "system" | "user" | "assistant".
    pub role: String,
    pub content: String,
}

/* ===========================================================================
HTTP payloads
======================================================================== */

/// Request body for the chat-completions call (non-streaming).
#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_completion_tokens: Option<u32>,
}

impl<'a> ChatCompletionRequest<'a> {
    /// Builds the request body, selecting parameters by deployment family.
    fn for_deployment(deployment: &'a str, messages: &'a [ChatMessage]) -> Self {
        if minimal_params(deployment) {
            Self {
                model: deployment,
                messages,
                temperature: None,
                max_completion_tokens: None,
            }
        } else {
            Self {
                model: deployment,
                messages,
                temperature: Some(DEFAULT_TEMPERATURE),
                max_completion_tokens: Some(DEFAULT_MAX_COMPLETION_TOKENS),
            }
        }
    }
}

/// Minimal response shape for the chat-completions call.
#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
    #[serde(default)]
    model: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessageOut,
}

#[derive(Debug, Deserialize)]
struct ChatMessageOut {
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn msgs() -> Vec<ChatMessage> {
        vec![ChatMessage {
            role: "user".to_string(),
            content: "hi".to_string(),
        }]
    }

    #[test]
    fn o1_family_detection_is_case_insensitive() {
        assert!(minimal_params("o1-preview"));
        assert!(minimal_params("O1-Mini"));
        assert!(minimal_params("my-o1-deployment"));
        assert!(!minimal_params("gpt-4o"));
        assert!(!minimal_params("gpt-35-turbo"));
    }

    #[test]
    fn o1_body_omits_sampling_parameters() {
        let messages = msgs();
        let body = ChatCompletionRequest::for_deployment("o1-preview", &messages);
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["model"], "o1-preview");
        assert!(json.get("temperature").is_none());
        assert!(json.get("max_completion_tokens").is_none());
    }

    #[test]
    fn standard_body_carries_sampling_parameters() {
        let messages = msgs();
        let body = ChatCompletionRequest::for_deployment("gpt-4o", &messages);
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["temperature"], 0.5);
        assert_eq!(json["max_completion_tokens"], 1000);
        assert_eq!(json["messages"][0]["role"], "user");
    }
}
