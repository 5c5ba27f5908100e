/// Hugging Face Inference API backend.
pub mod huggingface;
/// OpenAI chat completions backend.
pub mod openai;

use confab_core::{RelayError, RelayResult, Turn};
use async_trait::async_trait;

/// Trait for text-generation provider backends.
///
/// Each backend owns its request/response shape; the rest of the relay
/// only sees an ordered turn list going in and reply text coming out.
///
/// To add a new provider:
/// 1. Create a new module in `backends/`
/// 2. Implement `ProviderBackend` for your struct
/// 3. Add the variant to `ProviderKind` in `config.rs`
/// 4. Wire it up in `ProviderGateway::new()` in `gateway.rs`
#[async_trait]
pub trait ProviderBackend: Send + Sync {
    /// One generation attempt. `turns` is the context window oldest-first.
    /// No retries, no backoff; that policy belongs to the caller.
    async fn generate(&self, turns: &[Turn], model: &str) -> RelayResult<String>;
}

/// Maps a reqwest transport failure onto the taxonomy. Timeouts and
/// connection failures alike are "retry might help".
pub(crate) fn transport_error(e: reqwest::Error) -> RelayError {
    RelayError::ProviderUnavailable(e.to_string())
}

/// Maps a non-2xx status onto the taxonomy: 401/403 mean the credential
/// was rejected, everything else is treated as transient.
pub(crate) fn status_error(status: reqwest::StatusCode, body: &str) -> RelayError {
    if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
        RelayError::ProviderAuth(format!("{status}: {body}"))
    } else {
        RelayError::ProviderUnavailable(format!("{status}: {body}"))
    }
}
