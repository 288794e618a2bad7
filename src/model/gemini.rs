use anyhow::Result;
use async_trait::async_trait;
use log::{debug, info};
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;

use crate::config::GeminiConfig;
use crate::error::ProviderError;
use crate::model::Provider;

// Client for the Gemini `generateContent` REST endpoint
pub struct GeminiModel {
    config: GeminiConfig,
    client: Client,
}

impl GeminiModel {
    pub fn new(config: GeminiConfig, timeout: Duration) -> Result<Self> {
        info!("Using Gemini model {} at {}", config.model, config.api_base);

        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { config, client })
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.config.api_base, self.config.model)
    }

    fn payload(&self, prompt: &str) -> Value {
        json!({
            "contents": [{
                "parts": [{ "text": prompt }]
            }],
            "generationConfig": {
                "maxOutputTokens": self.config.max_output_tokens,
                "temperature": self.config.temperature
            }
        })
    }
}

#[async_trait]
impl Provider for GeminiModel {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn generate(&self, prompt: &str) -> Result<String, ProviderError> {
        debug!("Prompt: {}", prompt);

        // The key goes in the query string; never log the full URL.
        let response = self
            .client
            .post(self.endpoint())
            .query(&[("key", self.config.api_key.as_str())])
            .json(&self.payload(prompt))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_else(|e| {
                debug!("Failed to read {} error body: {}", status, e);
                String::new()
            });
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body: error_message(&body).unwrap_or(body),
            });
        }

        let response_json: Value = response.json().await?;
        debug!("Response JSON: {}", response_json);

        extract_text(&response_json)
    }
}

/// Pull the generated text out of a `generateContent` response.
///
/// All text parts of the first candidate are concatenated. A body carrying
/// `error.message` is reported as an API error.
pub fn extract_text(response_json: &Value) -> Result<String, ProviderError> {
    if let Some(message) = response_json
        .get("error")
        .and_then(|error| error.get("message"))
        .and_then(|message| message.as_str())
    {
        return Err(ProviderError::Api(message.to_string()));
    }

    let parts = response_json
        .get("candidates")
        .and_then(|candidates| candidates.get(0))
        .and_then(|candidate| candidate.get("content"))
        .and_then(|content| content.get("parts"))
        .and_then(|parts| parts.as_array())
        .ok_or_else(|| {
            ProviderError::Malformed("missing candidates[0].content.parts".to_string())
        })?;

    let text: String = parts
        .iter()
        .filter_map(|part| part.get("text").and_then(|text| text.as_str()))
        .collect();

    Ok(text)
}

fn error_message(body: &str) -> Option<String> {
    serde_json::from_str::<Value>(body)
        .ok()?
        .get("error")?
        .get("message")?
        .as_str()
        .map(str::to_string)
}
