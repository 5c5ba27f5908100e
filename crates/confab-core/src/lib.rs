//! Core types and error definitions for the Confab chat relay.
//!
//! This crate provides the foundational types shared across all Confab
//! crates: the error taxonomy, message and role representations, and the
//! `Turn` unit passed to generation backends.
//!
//! # Main types
//!
//! - [`RelayError`] — Unified error enum for all Confab subsystems.
//! - [`RelayResult`] — Convenience alias for `Result<T, RelayError>`.
//! - [`Role`] — Message role (user, assistant, system).
//! - [`StoredMessage`] — A persisted message within a session transcript.
//! - [`Turn`] — One (role, content) unit of history sent to a backend.

/// The relay error taxonomy.
pub mod error;
/// Message, role, and turn types.
pub mod message;

pub use error::{RelayError, RelayResult};
pub use message::{Role, StoredMessage, Turn};
