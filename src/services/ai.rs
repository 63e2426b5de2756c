use crate::config::OpenAiSettings;
use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessage,
    ChatCompletionRequestUserMessage, ChatCompletionRequestUserMessageContent,
    ChatCompletionResponseFormat, ChatCompletionResponseFormatType,
    CreateChatCompletionRequestArgs, Role,
};
use async_trait::async_trait;
use serde::Deserialize;

/// One chat completion: a system instruction plus a single user message.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub model: String,
    pub system: String,
    pub user: String,
    pub json_mode: bool,
    pub temperature: f32,
    pub max_tokens: u16,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("completion failed (status {status:?}): {message}")]
pub struct UpstreamError {
    pub status: Option<u16>,
    pub code: Option<String>,
    pub message: String,
}

impl UpstreamError {
    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            status: None,
            code: None,
            message: message.into(),
        }
    }
}

/// Boundary to the text-generation service.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// False when no API credential is available.
    fn is_configured(&self) -> bool;

    /// Returns the raw text of the first choice.
    async fn complete(&self, request: CompletionRequest) -> Result<String, UpstreamError>;
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
    #[serde(default)]
    code: Option<serde_json::Value>,
}

/// Chat completions over HTTP. The body is built with async-openai's typed
/// builder and sent with reqwest so the HTTP status stays visible, and so no
/// automatic rate-limit retry happens behind our back.
#[derive(Clone)]
pub struct OpenAiBackend {
    http: reqwest::Client,
    api_key: Option<String>,
    organization: Option<String>,
    project: Option<String>,
    base_url: String,
}

impl OpenAiBackend {
    pub fn new(settings: &OpenAiSettings) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(settings.timeout)
            .build()?;
        Ok(Self {
            http,
            api_key: settings.api_key.clone(),
            organization: settings.organization.clone(),
            project: settings.project.clone(),
            base_url: settings.base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl CompletionBackend for OpenAiBackend {
    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    async fn complete(&self, request: CompletionRequest) -> Result<String, UpstreamError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| UpstreamError::transport("OPENAI_API_KEY is not set"))?;

        let messages = vec![
            ChatCompletionRequestMessage::System(ChatCompletionRequestSystemMessage {
                role: Role::System,
                content: request.system,
                name: None,
            }),
            ChatCompletionRequestMessage::User(ChatCompletionRequestUserMessage {
                role: Role::User,
                content: ChatCompletionRequestUserMessageContent::Text(request.user),
                name: None,
            }),
        ];

        let mut args = CreateChatCompletionRequestArgs::default();
        args.model(request.model)
            .messages(messages)
            .temperature(request.temperature)
            .max_tokens(request.max_tokens);
        if request.json_mode {
            args.response_format(ChatCompletionResponseFormat {
                r#type: ChatCompletionResponseFormatType::JsonObject,
            });
        }
        let body = args
            .build()
            .map_err(|e| UpstreamError::transport(format!("invalid completion request: {e}")))?;

        let mut http_request = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(api_key)
            .json(&body);
        if let Some(org) = &self.organization {
            http_request = http_request.header("OpenAI-Organization", org);
        }
        if let Some(project) = &self.project {
            http_request = http_request.header("OpenAI-Project", project);
        }

        let resp = http_request.send().await.map_err(|e| UpstreamError {
            status: e.status().map(|s| s.as_u16()),
            code: None,
            message: e.to_string(),
        })?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            let envelope = serde_json::from_str::<ErrorEnvelope>(&text).ok();
            let (message, code) = match envelope {
                Some(ErrorEnvelope { error }) => (
                    error.message,
                    error.code.map(|c| match c {
                        serde_json::Value::String(s) => s,
                        other => other.to_string(),
                    }),
                ),
                None => (format!("OpenAI request failed with status {status}"), None),
            };
            return Err(UpstreamError {
                status: Some(status.as_u16()),
                code,
                message,
            });
        }

        let json: serde_json::Value = resp.json().await.map_err(|e| UpstreamError {
            status: Some(status.as_u16()),
            code: None,
            message: format!("unreadable completion response: {e}"),
        })?;

        Ok(json
            .pointer("/choices/0/message/content")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn settings(api_key: Option<&str>) -> OpenAiSettings {
        OpenAiSettings {
            api_key: api_key.map(str::to_string),
            organization: None,
            project: None,
            model: "gpt-4o-mini".into(),
            max_tokens: 300,
            temperature: 0.6,
            base_url: "http://127.0.0.1:9/v1/".into(),
            timeout: Duration::from_secs(1),
        }
    }

    #[test]
    fn test_configured_follows_api_key() {
        assert!(!OpenAiBackend::new(&settings(None)).unwrap().is_configured());
        let backend = OpenAiBackend::new(&settings(Some("sk-test"))).unwrap();
        assert!(backend.is_configured());
        assert_eq!(backend.base_url, "http://127.0.0.1:9/v1");
    }

    #[tokio::test]
    async fn test_unreachable_host_has_no_status() {
        let backend = OpenAiBackend::new(&settings(Some("sk-test"))).unwrap();
        let err = backend
            .complete(CompletionRequest {
                model: "gpt-4o-mini".into(),
                system: "sys".into(),
                user: "{}".into(),
                json_mode: true,
                temperature: 0.6,
                max_tokens: 300,
            })
            .await
            .unwrap_err();
        assert_eq!(err.status, None);
    }
}
