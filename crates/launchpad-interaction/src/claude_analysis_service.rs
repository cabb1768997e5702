//! ClaudeAnalysisService - Anthropic Messages API implementation of the analysis service.
//!
//! Configuration priority: ~/.config/launchpad/secret.json > environment variables

use crate::prompts::{PromptRenderer, SYSTEM_PROMPT};
use async_trait::async_trait;
use launchpad_core::analysis::{AnalysisError, AnalysisService};
use launchpad_core::config::AnalysisConfig;
use launchpad_core::report::ReportType;
use launchpad_core::startup::StartupInput;
use launchpad_infrastructure::storage::SecretStorage;
use reqwest::{Client, StatusCode, header::HeaderValue};
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Analysis service that talks to the Claude HTTP API.
#[derive(Clone)]
pub struct ClaudeAnalysisService {
    client: Client,
    api_key: String,
    config: AnalysisConfig,
    prompts: std::sync::Arc<PromptRenderer>,
}

impl ClaudeAnalysisService {
    /// Creates a new service with the provided API key and settings.
    pub fn new(api_key: impl Into<String>, config: AnalysisConfig) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            config,
            prompts: std::sync::Arc::new(PromptRenderer::new()),
        }
    }

    /// Loads the API key from ~/.config/launchpad/secret.json or `ANTHROPIC_API_KEY`.
    pub fn try_from_env(config: AnalysisConfig) -> Result<Self, AnalysisError> {
        if let Ok(storage) = SecretStorage::new() {
            if let Ok(secret_config) = storage.load() {
                if let Some(claude) = secret_config.claude {
                    return Ok(Self::new(claude.api_key, config));
                }
            }
        }

        let api_key = env::var("ANTHROPIC_API_KEY").map_err(|_| {
            AnalysisError::request(
                "ANTHROPIC_API_KEY not found in ~/.config/launchpad/secret.json or environment variables",
                false,
            )
        })?;

        Ok(Self::new(api_key, config))
    }

    async fn send_request(&self, body: &CreateMessageRequest) -> Result<String, AnalysisError> {
        let response = self
            .client
            .post(&self.config.endpoint)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(body)
            .send()
            .await
            .map_err(|err| AnalysisError::Request {
                status_code: None,
                message: format!("Claude API request failed: {err}"),
                is_retryable: err.is_connect() || err.is_timeout(),
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let retry_after = parse_retry_after(response.headers().get("retry-after"));
            let body_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read Claude error body".to_string());
            return Err(map_http_error(status, body_text, retry_after));
        }

        let parsed: CreateMessageResponse = response.json().await.map_err(|err| {
            AnalysisError::InvalidResponse(format!("Failed to parse Claude response: {err}"))
        })?;

        extract_text_response(parsed)
    }
}

#[async_trait]
impl AnalysisService for ClaudeAnalysisService {
    async fn analyze(
        &self,
        report_type: ReportType,
        input: &StartupInput,
    ) -> Result<String, AnalysisError> {
        let prompt = self.prompts.render(report_type, input).map_err(|err| {
            AnalysisError::request(format!("Failed to render prompt: {err}"), false)
        })?;

        tracing::debug!(
            "[ClaudeAnalysisService] Requesting {} with model {}",
            report_type,
            self.config.model
        );

        let request = CreateMessageRequest {
            model: self.config.model.clone(),
            messages: vec![Message {
                role: "user".to_string(),
                content: vec![ContentBlock::text(prompt)],
            }],
            max_tokens: self.config.max_tokens,
            system: Some(SYSTEM_PROMPT.to_string()),
        };

        self.send_request(&request).await
    }
}

#[derive(Serialize)]
struct CreateMessageRequest {
    model: String,
    messages: Vec<Message>,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
}

#[derive(Serialize)]
struct Message {
    role: String,
    content: Vec<ContentBlock>,
}

#[derive(Serialize)]
struct ContentBlock {
    r#type: &'static str,
    text: String,
}

impl ContentBlock {
    fn text(text: String) -> Self {
        Self {
            r#type: "text",
            text,
        }
    }
}

#[derive(Deserialize)]
struct CreateMessageResponse {
    content: Vec<ContentBlockResponse>,
}

#[derive(Deserialize)]
#[serde(tag = "type")]
enum ContentBlockResponse {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(other)]
    Other,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

fn extract_text_response(response: CreateMessageResponse) -> Result<String, AnalysisError> {
    let text: Vec<String> = response
        .content
        .into_iter()
        .filter_map(|block| match block {
            ContentBlockResponse::Text { text } => Some(text),
            ContentBlockResponse::Other => None,
        })
        .collect();

    if text.is_empty() {
        return Err(AnalysisError::InvalidResponse(
            "Claude API returned no text in the response content".into(),
        ));
    }
    Ok(text.join("\n"))
}

fn map_http_error(status: StatusCode, body: String, retry_after: Option<Duration>) -> AnalysisError {
    let message = serde_json::from_str::<ErrorResponse>(&body)
        .map(|wrapper| wrapper.error.message)
        .unwrap_or(body);

    if status == StatusCode::TOO_MANY_REQUESTS {
        return AnalysisError::RateLimited {
            message,
            retry_after,
        };
    }

    let is_retryable = matches!(
        status,
        StatusCode::INTERNAL_SERVER_ERROR
            | StatusCode::BAD_GATEWAY
            | StatusCode::SERVICE_UNAVAILABLE
            | StatusCode::GATEWAY_TIMEOUT
    ) || status.as_u16() == 529;

    AnalysisError::Request {
        status_code: Some(status.as_u16()),
        message,
        is_retryable,
    }
}

fn parse_retry_after(header: Option<&HeaderValue>) -> Option<Duration> {
    let value = header?.to_str().ok()?;
    // HTTP-date values are not supported
    value.trim().parse::<u64>().ok().map(Duration::from_secs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_429_maps_to_rate_limited() {
        let err = map_http_error(
            StatusCode::TOO_MANY_REQUESTS,
            r#"{"type":"error","error":{"type":"rate_limit_error","message":"Too many requests"}}"#
                .to_string(),
            Some(Duration::from_secs(7)),
        );

        assert!(err.is_rate_limited());
        assert_eq!(err.retry_after(), Some(Duration::from_secs(7)));
        assert_eq!(err.to_string(), "Rate limited: Too many requests");
    }

    #[test]
    fn test_server_errors_are_retryable() {
        let err = map_http_error(StatusCode::BAD_GATEWAY, "upstream".to_string(), None);
        assert!(err.is_retryable());
        assert!(!err.is_rate_limited());

        let overloaded = map_http_error(StatusCode::from_u16(529).unwrap(), "overloaded".into(), None);
        assert!(overloaded.is_retryable());
    }

    #[test]
    fn test_client_errors_are_not_retryable() {
        let err = map_http_error(StatusCode::UNAUTHORIZED, "bad key".to_string(), None);
        assert!(!err.is_retryable());
        match err {
            AnalysisError::Request { status_code, .. } => assert_eq!(status_code, Some(401)),
            _ => panic!("Expected Request error"),
        }
    }

    #[test]
    fn test_parse_retry_after_seconds() {
        let value = HeaderValue::from_static("12");
        assert_eq!(parse_retry_after(Some(&value)), Some(Duration::from_secs(12)));

        let date = HeaderValue::from_static("Wed, 21 Oct 2015 07:28:00 GMT");
        assert_eq!(parse_retry_after(Some(&date)), None);
    }

    #[test]
    fn test_extract_joins_text_blocks() {
        let response: CreateMessageResponse = serde_json::from_str(
            r##"{"content":[{"type":"text","text":"# Plan"},{"type":"thinking","thinking":"..."},{"type":"text","text":"Details"}]}"##,
        )
        .unwrap();

        assert_eq!(extract_text_response(response).unwrap(), "# Plan\nDetails");
    }

    #[test]
    fn test_extract_without_text_is_invalid() {
        let response: CreateMessageResponse = serde_json::from_str(r#"{"content":[]}"#).unwrap();
        assert!(matches!(
            extract_text_response(response),
            Err(AnalysisError::InvalidResponse(_))
        ));
    }
}
