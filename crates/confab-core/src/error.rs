use thiserror::Error;

/// A convenience `Result` alias using [`RelayError`].
pub type RelayResult<T> = Result<T, RelayError>;

/// Top-level error type for the Confab relay.
///
/// The first six variants form the user-visible taxonomy: each one maps to
/// a stable `kind` string in the HTTP error envelope, so callers can tell
/// "retry might help" (`ProviderUnavailable`) apart from "reconfigure
/// credentials" (`ProviderAuth`) and "backend contract changed"
/// (`ProviderResponse`).
#[derive(Debug, Error)]
pub enum RelayError {
    /// Missing or invalid backend setup. Fatal at startup or first use,
    /// never retried.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Transient network or timeout failure talking to the generation
    /// backend. Safe to retry with backoff; retry policy lives outside
    /// this core.
    #[error("provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// The generation backend rejected our credentials (HTTP 401/403).
    #[error("provider rejected credentials: {0}")]
    ProviderAuth(String),

    /// The generation backend returned a shape we do not recognize. The
    /// raw payload is carried for diagnosis; never retried.
    #[error("unrecognized provider response: {0}")]
    ProviderResponse(String),

    /// Transcript store failure. Fatal to the current request.
    #[error("persistence error: {0}")]
    Persistence(String),

    /// The session id is unknown to the transcript store.
    #[error("unknown session: {0}")]
    NotFound(String),

    /// A JSON serialization or deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A standard I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl RelayError {
    /// Stable machine-readable kind for the error envelope.
    pub fn kind(&self) -> &'static str {
        match self {
            RelayError::Configuration(_) => "configuration",
            RelayError::ProviderUnavailable(_) => "provider_unavailable",
            RelayError::ProviderAuth(_) => "provider_auth",
            RelayError::ProviderResponse(_) => "provider_response",
            RelayError::Persistence(_) => "persistence",
            RelayError::NotFound(_) => "not_found",
            RelayError::Json(_) => "serialization",
            RelayError::Io(_) => "io",
        }
    }
}
