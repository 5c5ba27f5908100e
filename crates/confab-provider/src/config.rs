use confab_core::{RelayError, RelayResult};
use serde::{Deserialize, Serialize};

/// Which generation backend is active.
///
/// Selection is explicit: there is no presence-of-credential fallback
/// order. If the selected backend is missing its credential, construction
/// fails fast with a configuration error instead of silently trying the
/// next one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// OpenAI chat completions API (or any compatible server).
    OpenAi,
    /// Hugging Face Inference API text-generation models.
    HuggingFace,
}

/// Configuration for the active generation backend.
///
/// The API key is injected here at construction time and never accepted
/// as a call argument further down. Deliberately not `Serialize`: the
/// key has no business being written back out.
#[derive(Clone, Deserialize)]
pub struct ProviderConfig {
    /// The active backend.
    pub backend: ProviderKind,
    /// Credential for the active backend.
    pub api_key: String,
    /// Model identifier passed through to the backend.
    #[serde(default = "default_model")]
    pub model: String,
    /// Override for the backend base URL (testing, proxies, compatible
    /// servers).
    pub api_base_url: Option<String>,
    /// Completion token cap for backends that accept one.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

fn default_model() -> String {
    "gpt-3.5-turbo".to_string()
}

fn default_max_tokens() -> u32 {
    300
}

impl ProviderConfig {
    /// Fails with [`RelayError::Configuration`] if the selected backend
    /// cannot possibly work. Called before any network traffic.
    pub fn validate(&self) -> RelayResult<()> {
        if self.api_key.trim().is_empty() {
            return Err(RelayError::Configuration(
                "provider api_key is empty; set one for the selected backend".to_string(),
            ));
        }
        if self.model.trim().is_empty() {
            return Err(RelayError::Configuration(
                "provider model is empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Base URL for the active backend.
    pub fn base_url(&self) -> &str {
        if let Some(url) = &self.api_base_url {
            url
        } else {
            match self.backend {
                ProviderKind::OpenAi => "https://api.openai.com",
                ProviderKind::HuggingFace => "https://api-inference.huggingface.co",
            }
        }
    }
}

// Manual Debug so the API key never leaks into logs.
impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("backend", &self.backend)
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("api_base_url", &self.api_base_url)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}
