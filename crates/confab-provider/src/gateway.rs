use crate::backends::huggingface::HuggingFaceBackend;
use crate::backends::openai::OpenAiBackend;
use crate::backends::ProviderBackend;
use crate::config::{ProviderConfig, ProviderKind};
use confab_core::{RelayResult, Turn};

/// Dispatches generation calls to the single configured backend.
///
/// Uses the `ProviderBackend` trait to abstract away provider-specific
/// API differences. Construction fails fast on unusable configuration,
/// before any network call is made.
pub struct ProviderGateway {
    backend: Box<dyn ProviderBackend>,
    default_model: String,
}

impl std::fmt::Debug for ProviderGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderGateway")
            .field("default_model", &self.default_model)
            .finish_non_exhaustive()
    }
}

impl ProviderGateway {
    /// Builds the gateway for the configured backend. Fails with a
    /// configuration error if credentials or model are missing.
    pub fn new(config: ProviderConfig) -> RelayResult<Self> {
        config.validate()?;
        let default_model = config.model.clone();
        let backend: Box<dyn ProviderBackend> = match config.backend {
            ProviderKind::OpenAi => Box::new(OpenAiBackend::new(config)),
            ProviderKind::HuggingFace => Box::new(HuggingFaceBackend::new(config)),
        };
        Ok(Self {
            backend,
            default_model,
        })
    }

    /// Create from a pre-built backend (for tests and custom providers).
    pub fn from_backend(backend: Box<dyn ProviderBackend>, default_model: impl Into<String>) -> Self {
        Self {
            backend,
            default_model: default_model.into(),
        }
    }

    /// The model used when callers do not name one.
    pub fn default_model(&self) -> &str {
        &self.default_model
    }

    /// One generation attempt for the given context window, oldest-first.
    /// `model` overrides the configured default when non-empty.
    pub async fn generate(&self, turns: &[Turn], model: Option<&str>) -> RelayResult<String> {
        let model = match model {
            Some(m) if !m.is_empty() => m,
            _ => &self.default_model,
        };
        tracing::debug!(model, turns = turns.len(), "calling generation backend");
        self.backend.generate(turns, model).await
    }
}
