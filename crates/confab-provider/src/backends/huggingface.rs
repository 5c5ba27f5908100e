use super::{status_error, transport_error, ProviderBackend};
use crate::config::ProviderConfig;
use confab_core::{RelayError, RelayResult, Turn};
use async_trait::async_trait;
use std::fmt::Write as _;

/// Hugging Face Inference API backend for text-generation models.
///
/// These models take a single prompt string, so the turn list is
/// flattened to `role: content` lines with a trailing `assistant:` cue.
pub struct HuggingFaceBackend {
    config: ProviderConfig,
    http: reqwest::Client,
}

impl HuggingFaceBackend {
    /// Creates the backend from validated configuration.
    pub fn new(config: ProviderConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }
}

/// Flattens the turn list into a prompt for completion-style models.
fn flatten_prompt(turns: &[Turn]) -> String {
    let mut prompt = String::new();
    for turn in turns {
        let _ = writeln!(prompt, "{}: {}", turn.role.as_str(), turn.content);
    }
    prompt.push_str("assistant:");
    prompt
}

#[async_trait]
impl ProviderBackend for HuggingFaceBackend {
    async fn generate(&self, turns: &[Turn], model: &str) -> RelayResult<String> {
        let url = format!("{}/models/{}", self.config.base_url(), model);

        let body = serde_json::json!({
            "inputs": flatten_prompt(turns),
            "options": {"use_cache": false},
        });

        let resp = self
            .http
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;

        let status = resp.status();
        let text = resp.text().await.map_err(transport_error)?;

        if !status.is_success() {
            return Err(status_error(status, &text));
        }

        let value: serde_json::Value = serde_json::from_str(&text)
            .map_err(|_| RelayError::ProviderResponse(text.clone()))?;
        parse_inference_response(&value)
    }
}

/// The inference API returns different shapes per model family. Text
/// generation is usually `[{"generated_text": "..."}]`; some models
/// return a bare string. Anything else is a contract violation.
fn parse_inference_response(value: &serde_json::Value) -> RelayResult<String> {
    if let Some(text) = value[0]["generated_text"].as_str() {
        return Ok(text.trim().to_string());
    }
    if let Some(text) = value.as_str() {
        return Ok(text.trim().to_string());
    }
    Err(RelayError::ProviderResponse(value.to_string()))
}
