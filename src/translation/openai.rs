use super::{TranslationRequest, TranslationService};
use crate::config::{ApiKey, Config};
use crate::error::LocaleError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// OpenAI Chat Completion request for locale translation
#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<Message>,
    response_format: ResponseFormat,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reasoning_effort: Option<String>,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

/// Check if a model is a reasoning model that doesn't support temperature
fn is_reasoning_model(model: &str) -> bool {
    model.starts_with("gpt-5")
        || model.starts_with("o1")
        || model.starts_with("o3")
        || model.starts_with("o4")
}

#[derive(Debug, Serialize, Deserialize)]
struct Message {
    role: String,
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Message,
}

const SYSTEM_PROMPT: &str = "You are a strict JSON translator for software localization. \
Return only a JSON object. Keep all keys identical. Preserve placeholders exactly, \
including {name}, {{count}}, and %s-style tokens.";

/// Build the user prompt for translating one locale map
fn build_user_prompt(request: &TranslationRequest<'_>) -> Result<String, LocaleError> {
    let input = serde_json::to_string(request.source_map)
        .map_err(|e| LocaleError::Service(format!("Failed to encode source map: {}", e)))?;

    Ok([
        format!(
            "Translate the JSON values from {} to {}.",
            request.source_locale, request.target_locale
        ),
        "Rules:".to_string(),
        "1) Output valid JSON object only.".to_string(),
        "2) Keep all keys exactly as provided.".to_string(),
        "3) Do not add or remove keys.".to_string(),
        "4) Preserve placeholders and formatting tokens exactly.".to_string(),
        format!("Input JSON: {}", input),
    ]
    .join("\n"))
}

/// Translation service backed by an OpenAI-compatible chat-completions API.
#[derive(Debug, Clone)]
pub struct OpenAiTranslator {
    client: reqwest::Client,
    api_url: String,
    api_key: ApiKey,
}

impl OpenAiTranslator {
    pub fn new(client: reqwest::Client, api_url: impl Into<String>, api_key: ApiKey) -> Self {
        Self {
            client,
            api_url: api_url.into(),
            api_key,
        }
    }

    /// Build a translator with a client that applies the configured timeout.
    pub fn from_config(config: &Config, api_key: ApiKey) -> Result<Self, LocaleError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| LocaleError::Service(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self::new(client, config.openai_api_url.clone(), api_key))
    }

    fn build_request(&self, request: &TranslationRequest<'_>) -> Result<ChatRequest, LocaleError> {
        // Reasoning models don't support temperature - use reasoning_effort instead
        let is_reasoning = is_reasoning_model(request.model);

        Ok(ChatRequest {
            model: request.model.to_string(),
            messages: vec![
                Message {
                    role: "system".to_string(),
                    content: Some(SYSTEM_PROMPT.to_string()),
                },
                Message {
                    role: "user".to_string(),
                    content: Some(build_user_prompt(request)?),
                },
            ],
            response_format: ResponseFormat {
                kind: "json_object",
            },
            temperature: if is_reasoning { None } else { Some(0.0) },
            reasoning_effort: is_reasoning.then(|| "low".to_string()),
        })
    }
}

#[async_trait]
impl TranslationService for OpenAiTranslator {
    async fn translate(&self, request: &TranslationRequest<'_>) -> Result<String, LocaleError> {
        let body = self.build_request(request)?;

        debug!(
            "Requesting {} -> {} translation of {} keys with {}",
            request.source_locale,
            request.target_locale,
            request.source_map.len(),
            request.model
        );

        let response = self
            .client
            .post(&self.api_url)
            .header("Authorization", format!("Bearer {}", self.api_key.expose()))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                LocaleError::Service(format!("Failed to send translation request to OpenAI API: {}", e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|e| format!("<failed to read body: {}>", e));
            return Err(LocaleError::Service(format!(
                "OpenAI API error during translation ({}): {}",
                status, body
            )));
        }

        let chat_response: ChatResponse = response.json().await.map_err(|e| {
            LocaleError::Service(format!("Failed to parse OpenAI translation response: {}", e))
        })?;

        chat_response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| LocaleError::Service("OpenAI returned an empty response.".to_string()))
    }
}
