use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

use crate::config::ProviderConfig;
use crate::error::ProviderError;
use crate::providers::traits::CompletionProvider;

/// Client for Groq's OpenAI-compatible chat completions endpoint. Any server
/// speaking the same wire format works by pointing `api_url` at it.
#[derive(Clone)]
pub struct GroqProvider {
    api_key: String,
    client: Client,
    model: String,
    api_url: String,
    temperature: f32,
}

impl GroqProvider {
    pub fn new(config: &ProviderConfig) -> Result<Self, ProviderError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            api_key: config.api_key.clone().unwrap_or_default(),
            client: builder.build()?,
            model: config.model.clone(),
            api_url: config.api_url.clone(),
            temperature: config.temperature,
        })
    }
}

#[async_trait]
impl CompletionProvider for GroqProvider {
    async fn complete(&self, prompt: &str) -> Result<String, ProviderError> {
        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&json!({
                "model": self.model,
                "messages": [
                    {
                        "role": "user",
                        "content": prompt
                    }
                ],
                "temperature": self.temperature
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await?;
            return Err(ProviderError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let response_json: Value = response.json().await?;
        extract_content(&response_json)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

fn extract_content(response_json: &Value) -> Result<String, ProviderError> {
    if let Some(error) = response_json.get("error") {
        return Err(ProviderError::Malformed(format!("API returned error: {}", error)));
    }

    response_json
        .get("choices")
        .and_then(|choices| choices.get(0))
        .and_then(|choice| choice.get("message"))
        .and_then(|message| message.get("content"))
        .and_then(|content| content.as_str())
        .map(|s| s.to_string())
        .ok_or_else(|| ProviderError::Malformed(response_json.to_string()))
}
