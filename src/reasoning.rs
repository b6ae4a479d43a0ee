//! Client for the natural-language reasoning service
//!
//! Wraps the Groq OpenAI-compatible chat-completions endpoint. Callers that
//! need machine-readable output use [`ReasoningClient::complete_json`] and
//! validate the returned document themselves; any failure here surfaces as
//! a [`SynthesisError`] that the safety and trending paths degrade to "no
//! signal".

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::ReasoningConfig;
use crate::error::SynthesisError;
use crate::{Result, TripSenseError};

/// Role of one chat message
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One role-tagged message in a completion request
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// Client for the chat-completions endpoint
pub struct ReasoningClient {
    http: Client,
    api_key: Option<String>,
    base_url: String,
    model: String,
}

impl ReasoningClient {
    /// Build a client from configuration
    pub fn new(config: &ReasoningConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(u64::from(config.timeout_seconds)))
            .user_agent("TripSense/0.1.0")
            .build()
            .map_err(|e| {
                TripSenseError::config(format!("Failed to build reasoning HTTP client: {e}"))
            })?;

        Ok(Self {
            http,
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
        })
    }

    /// Request a completion constrained to a well-formed JSON object
    pub async fn complete_json(
        &self,
        messages: &[ChatMessage],
        temperature: f32,
    ) -> std::result::Result<String, SynthesisError> {
        self.complete(&ChatRequest {
            model: &self.model,
            messages,
            temperature,
            max_tokens: None,
            response_format: Some(ResponseFormat {
                format_type: "json_object",
            }),
        })
        .await
    }

    /// Request a free-text completion
    pub async fn complete_text(
        &self,
        messages: &[ChatMessage],
        temperature: f32,
        max_tokens: u32,
    ) -> std::result::Result<String, SynthesisError> {
        self.complete(&ChatRequest {
            model: &self.model,
            messages,
            temperature,
            max_tokens: Some(max_tokens),
            response_format: None,
        })
        .await
    }

    async fn complete(
        &self,
        request: &ChatRequest<'_>,
    ) -> std::result::Result<String, SynthesisError> {
        let api_key = self.api_key.as_ref().ok_or(SynthesisError::Credentials)?;

        let url = format!("{}/chat/completions", self.base_url);
        debug!("Reasoning request to {} with model {}", url, request.model);

        let response = self
            .http
            .post(&url)
            .bearer_auth(api_key)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SynthesisError::Status { status, body });
        }

        let completion: ChatResponse = response
            .json()
            .await
            .map_err(|e| SynthesisError::malformed(e.to_string()))?;

        completion
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or(SynthesisError::Empty)
    }
}
