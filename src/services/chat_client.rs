//! Outbound completion calls to the DeepSeek chat API.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const ROLE_SYSTEM: &str = "system";
pub const ROLE_USER: &str = "user";

/// Network failure or an upstream body that is not the expected JSON.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("response parsing failed: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ChatMessage {
    pub role: &'static str,
    pub content: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
    pub temperature: f32,
    pub stream: bool,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct ChoiceMessage {
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct Choice {
    #[serde(default)]
    pub message: Option<ChoiceMessage>,
}

#[derive(Debug, Default, Deserialize)]
struct CompletionBody {
    #[serde(default)]
    choices: Vec<Choice>,
}

/// What came back from the provider, successful or not.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Completion {
    pub status: u16,
    pub choices: Vec<Choice>,
    /// Raw body of a non-2xx response, kept for logging.
    pub error_body: Option<String>,
}

impl Completion {
    pub fn ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// `choices[0].message.content`, if present and non-empty.
    pub fn reply(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|c| c.message.as_ref())
            .and_then(|m| m.content.as_deref())
            .filter(|s| !s.is_empty())
    }
}

#[async_trait]
pub trait ChatClient: Send + Sync {
    async fn complete(
        &self,
        request: &CompletionRequest,
        api_key: &str,
    ) -> Result<Completion, TransportError>;
}

#[derive(Debug, Clone)]
pub struct DeepSeekClient {
    http: reqwest::Client,
    url: String,
}

impl DeepSeekClient {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            url: url.into(),
        }
    }
}

#[async_trait]
impl ChatClient for DeepSeekClient {
    async fn complete(
        &self,
        request: &CompletionRequest,
        api_key: &str,
    ) -> Result<Completion, TransportError> {
        let response = self
            .http
            .post(&self.url)
            .bearer_auth(api_key)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Ok(Completion {
                status: status.as_u16(),
                choices: Vec::new(),
                error_body: Some(text),
            });
        }

        let body: CompletionBody = serde_json::from_str(&text)?;
        Ok(Completion {
            status: status.as_u16(),
            choices: body.choices,
            error_body: None,
        })
    }
}
