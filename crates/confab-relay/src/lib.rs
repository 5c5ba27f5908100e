//! The relay core: per-session listener fan-out and the chat request
//! lifecycle.
//!
//! [`SessionRegistry`] tracks which live listeners are attached to which
//! session and delivers reply frames to all of them, best-effort.
//! [`ChatOrchestrator`] drives one user message through persist →
//! generate → persist → fan-out, owning the per-request ordering and
//! failure rules.

/// The request lifecycle driver.
pub mod orchestrator;
/// Session-to-listener fan-out.
pub mod registry;

pub use orchestrator::{ChatOrchestrator, OrchestratorSettings};
pub use registry::{Listener, SessionRegistry};
