//! HTTP and WebSocket ingress for the Confab relay.
//!
//! Two paths funnel into the same orchestrator: a one-shot POST that
//! returns the reply directly, and a persistent WebSocket whose replies
//! arrive via the session registry fan-out.

/// Error envelope mapping.
pub mod error;
/// Router and handlers.
pub mod server;

pub use error::ApiError;
pub use server::GatewayServer;
