//! OpenAI-compatible HTTP adapter.
//!
//! Text goes through `/chat/completions`, images through
//! `/images/generations`. Any provider that speaks that wire format works;
//! connection details come from [`OpenAiSettings`].

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use super::{AdapterError, ImageBackend, ImagePayload, TextBackend};
use crate::config::OpenAiSettings;

/// OpenAI adapter serving both text and image calls
pub struct OpenAiAdapter {
    client: reqwest::Client,
    settings: OpenAiSettings,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ImageResponse {
    #[serde(default)]
    data: Vec<ImageDatum>,
}

#[derive(Debug, Deserialize)]
struct ImageDatum {
    url: Option<String>,
    b64_json: Option<String>,
}

impl OpenAiAdapter {
    /// Build an adapter with a client bounded by `settings.timeout_seconds`
    pub fn from_settings(settings: &OpenAiSettings) -> Result<Self, AdapterError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_seconds))
            .build()
            .map_err(|e| AdapterError::Request(e.to_string()))?;

        Ok(Self {
            client,
            settings: settings.clone(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.settings.base_url.trim_end_matches('/'), path)
    }

    /// POST a JSON body and return the parsed success response
    async fn post<T: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        body: serde_json::Value,
    ) -> Result<T, AdapterError> {
        let url = self.endpoint(path);
        debug!(%url, "Calling backend");

        let mut request = self.client.post(&url).json(&body);

        // Attach Authorization only when a non-empty key is configured
        if let Some(key) = self.settings.api_key.as_deref().filter(|k| !k.is_empty()) {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AdapterError::Status {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| AdapterError::Parse(e.to_string()))
    }
}

#[async_trait]
impl TextBackend for OpenAiAdapter {
    fn name(&self) -> &str {
        "openai-chat"
    }

    async fn complete(&self, prompt: &str) -> Result<String, AdapterError> {
        let body = json!({
            "model": self.settings.text_model,
            "messages": [{ "role": "user", "content": prompt }],
        });

        let response: ChatResponse = self.post("chat/completions", body).await?;

        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default();

        if content.trim().is_empty() {
            return Err(AdapterError::EmptyResponse);
        }

        Ok(content)
    }
}

#[async_trait]
impl ImageBackend for OpenAiAdapter {
    fn name(&self) -> &str {
        "openai-images"
    }

    async fn generate_image(&self, prompt: &str) -> Result<ImagePayload, AdapterError> {
        let body = json!({
            "model": self.settings.image_model,
            "prompt": prompt,
            "n": 1,
            "size": self.settings.image_size,
            "quality": self.settings.image_quality,
        });

        let response: ImageResponse = self.post("images/generations", body).await?;

        let datum = response
            .data
            .into_iter()
            .next()
            .ok_or(AdapterError::EmptyResponse)?;

        match (datum.url, datum.b64_json) {
            (Some(url), _) if !url.is_empty() => Ok(ImagePayload::Url(url)),
            (_, Some(data)) if !data.is_empty() => Ok(ImagePayload::Base64(data)),
            _ => Err(AdapterError::EmptyResponse),
        }
    }
}
