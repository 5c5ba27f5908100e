use super::{status_error, transport_error, ProviderBackend};
use crate::config::ProviderConfig;
use confab_core::{RelayError, RelayResult, Turn};
use async_trait::async_trait;

/// OpenAI chat completions backend.
///
/// Works with OpenAI and any server implementing the same API.
pub struct OpenAiBackend {
    config: ProviderConfig,
    http: reqwest::Client,
}

impl OpenAiBackend {
    /// Creates the backend from validated configuration.
    pub fn new(config: ProviderConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }

    fn build_messages(&self, turns: &[Turn]) -> Vec<serde_json::Value> {
        turns
            .iter()
            .map(|t| {
                serde_json::json!({
                    "role": t.role.as_str(),
                    "content": t.content,
                })
            })
            .collect()
    }
}

#[async_trait]
impl ProviderBackend for OpenAiBackend {
    async fn generate(&self, turns: &[Turn], model: &str) -> RelayResult<String> {
        let url = format!("{}/v1/chat/completions", self.config.base_url());

        let body = serde_json::json!({
            "model": model,
            "max_tokens": self.config.max_tokens,
            "messages": self.build_messages(turns),
        });

        let resp = self
            .http
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .header("Content-Type", "application/json")
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
        parse_chat_completion(&value)
    }
}

/// Extracts the primary candidate's text from a chat completions
/// response. Any other shape is a contract violation, reported with the
/// raw payload rather than silently returning a malformed value.
fn parse_chat_completion(value: &serde_json::Value) -> RelayResult<String> {
    value["choices"][0]["message"]["content"]
        .as_str()
        .map(|s| s.trim().to_string())
        .ok_or_else(|| RelayError::ProviderResponse(value.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn parses_primary_choice() {
        let value = serde_json::json!({
            "choices": [
                {"message": {"role": "assistant", "content": " hi there \n"}}
            ]
        });
        assert_eq!(parse_chat_completion(&value).unwrap(), "hi there");
    }

    #[test]
    fn unrecognized_shape_is_provider_response_error() {
        let value = serde_json::json!({"unexpected": true});
        let err = parse_chat_completion(&value).unwrap_err();
        assert!(matches!(err, RelayError::ProviderResponse(_)));
        // Raw payload preserved for diagnosis.
        assert!(err.to_string().contains("unexpected"));
    }
}
