//! Provider gateway: a uniform interface over interchangeable
//! text-generation backends.
//!
//! Exactly one backend is active per deployment, selected explicitly by
//! [`ProviderConfig::backend`]. The gateway makes one outbound HTTP call
//! per [`ProviderGateway::generate`], normalizes the backend's response
//! shape to plain reply text, and maps failures onto the relay error
//! taxonomy so callers can tell transient outages from credential
//! rejections from contract changes. Retry policy belongs to callers.

/// Per-provider API implementations.
pub mod backends;
/// Backend selection and credentials.
pub mod config;
/// Dispatch to the configured backend.
pub mod gateway;

pub use backends::ProviderBackend;
pub use config::{ProviderConfig, ProviderKind};
pub use gateway::ProviderGateway;
